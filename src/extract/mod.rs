//! Text extraction for uploaded documents.
//!
//! Extraction is a strategy lookup: the lower-cased file extension selects a
//! [`TextExtractor`]. Extensions without a registered extractor yield
//! [`ExtractError::Unsupported`], which callers treat as "no text" rather than a failure.

mod docx;
mod pdf;
mod plain;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use plain::PlainTextExtractor;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported format: {extension:?}")]
    Unsupported { extension: String },
    #[error("document is not valid UTF-8 text: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("failed to open document: {0}")]
    Malformed(String),
    #[error("failed to extract text from page {index}: {reason}")]
    Page { index: u32, reason: String },
    #[error("failed to strip markup: {0}")]
    Markup(String),
}

impl ExtractError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ExtractError::Unsupported { .. })
    }
}

/// Turns the raw bytes of one file format into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

#[derive(Clone)]
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// txt/md as plain text, pdf page by page, docx through its document XML.
    pub fn with_defaults() -> Self {
        let plain: Arc<dyn TextExtractor> = Arc::new(PlainTextExtractor);
        Self::empty()
            .register("txt", plain.clone())
            .register("md", plain)
            .register("pdf", Arc::new(PdfExtractor))
            .register("docx", Arc::new(DocxExtractor))
    }

    pub fn register(mut self, extension: &str, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractors
            .insert(normalize_extension(extension), extractor);
        self
    }

    pub fn supports(&self, extension: &str) -> bool {
        self.extractors
            .contains_key(&normalize_extension(extension))
    }

    pub fn extract(&self, bytes: &[u8], extension: &str) -> Result<String, ExtractError> {
        let extension = normalize_extension(extension);
        match self.extractors.get(&extension) {
            Some(extractor) => extractor.extract(bytes),
            None => Err(ExtractError::Unsupported { extension }),
        }
    }

    /// Dispatches on the extension of `file_name`.
    pub fn extract_file(&self, bytes: &[u8], file_name: &str) -> Result<String, ExtractError> {
        self.extract(bytes, &extension_of(file_name))
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(normalize_extension)
        .unwrap_or_default()
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shouting;

    impl TextExtractor for Shouting {
        fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
            Ok(String::from_utf8(bytes.to_vec())?.to_uppercase())
        }
    }

    #[test]
    fn plain_text_is_returned_verbatim() {
        let registry = ExtractorRegistry::with_defaults();
        let input = "  hello <b>world</b>\r\n\ttabs & markup stay\n";

        assert_eq!(registry.extract(input.as_bytes(), "txt").unwrap(), input);
        assert_eq!(registry.extract(input.as_bytes(), ".md").unwrap(), input);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let registry = ExtractorRegistry::with_defaults();
        let err = registry.extract(b"binary", "exe").unwrap_err();

        assert!(err.is_unsupported());
        assert!(matches!(err, ExtractError::Unsupported { ref extension } if extension == "exe"));
    }

    #[test]
    fn file_without_extension_is_unsupported() {
        let registry = ExtractorRegistry::with_defaults();
        assert!(registry.extract_file(b"data", "README").unwrap_err().is_unsupported());
    }

    #[test]
    fn dispatch_uses_file_name_extension_case_insensitively() {
        let registry = ExtractorRegistry::with_defaults();
        assert_eq!(registry.extract_file(b"hello world", "Notes.TXT").unwrap(), "hello world");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("no_extension"), "");
    }

    #[test]
    fn new_formats_register_without_touching_dispatch() {
        let registry = ExtractorRegistry::with_defaults().register("log", Arc::new(Shouting));

        assert!(registry.supports("LOG"));
        assert_eq!(registry.extract(b"quiet", "log").unwrap(), "QUIET");
    }

    #[test]
    fn invalid_utf8_plain_text_is_an_encoding_error() {
        let registry = ExtractorRegistry::with_defaults();
        let err = registry.extract(&[0xff, 0xfe, 0x00], "txt").unwrap_err();
        assert!(matches!(err, ExtractError::Encoding(_)));
    }
}
