use super::{BlobError, BlobStorage};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

const UPLOAD_PREFIX: &str = "uploads";

/// A bucket directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalBlobStorage {
    bucket: PathBuf,
}

impl LocalBlobStorage {
    pub fn new<P: AsRef<Path>>(root_dir: P, bucket_name: &str) -> Self {
        Self {
            bucket: root_dir.as_ref().join(bucket_name),
        }
    }

    /// Resolves a reference inside the bucket, refusing anything that would escape it.
    pub fn path_of(&self, reference: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(reference);
        let contained = !reference.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !contained {
            return Err(BlobError::InvalidReference(reference.to_string()));
        }
        Ok(self.bucket.join(relative))
    }
}

fn sanitize(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    match cleaned.trim_matches('.') {
        "" => "file".to_string(),
        _ => cleaned,
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    #[tracing::instrument(name = "Upload blob", skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String, BlobError> {
        let reference = format!(
            "{UPLOAD_PREFIX}/{}-{}",
            uuid::Uuid::new_v4(),
            sanitize(file_name)
        );
        let path = self.path_of(&reference)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        Ok(reference)
    }

    #[tracing::instrument(name = "Delete blob", skip(self))]
    async fn delete(&self, reference: &str) -> Result<(), BlobError> {
        let path = self.path_of(reference)?;
        tokio::fs::remove_file(path).await?;
        Ok(())
    }
}
