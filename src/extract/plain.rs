use super::{ExtractError, TextExtractor};

/// Plain-text formats: the bytes are the text.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}
