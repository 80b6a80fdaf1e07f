//! Storage for uploaded file bodies. The database only keeps the returned reference.

use async_trait::async_trait;

mod local;

pub use local::LocalBlobStorage;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid blob reference {0:?}")]
    InvalidReference(String),
}

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Stores `bytes` durably and returns the reference to persist.
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String, BlobError>;

    async fn delete(&self, reference: &str) -> Result<(), BlobError>;
}
