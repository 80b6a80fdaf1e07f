use super::{ExtractError, TextExtractor};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

const DOCUMENT_XML: &str = "word/document.xml";
// zip-bomb guard for the decompressed document part
const MAX_DOCUMENT_XML_BYTES: u64 = 50 * 1024 * 1024;

/// Office Open XML word documents.
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|err| ExtractError::Malformed(err.to_string()))?;
        let entry = archive
            .by_name(DOCUMENT_XML)
            .map_err(|err| ExtractError::Malformed(format!("{DOCUMENT_XML}: {err}")))?;

        let mut xml = Vec::new();
        entry
            .take(MAX_DOCUMENT_XML_BYTES)
            .read_to_end(&mut xml)
            .map_err(|err| ExtractError::Malformed(err.to_string()))?;
        if xml.len() as u64 >= MAX_DOCUMENT_XML_BYTES {
            return Err(ExtractError::Malformed(format!(
                "{DOCUMENT_XML} exceeds {MAX_DOCUMENT_XML_BYTES} bytes"
            )));
        }

        strip_markup(&xml)
    }
}

/// Keeps only character data, one token per line, trimmed as a whole.
fn strip_markup(xml: &[u8]) -> Result<String, ExtractError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut text = String::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(chars)) => {
                let chars = chars
                    .unescape()
                    .map_err(|err| ExtractError::Markup(err.to_string()))?;
                text.push_str(&chars);
                text.push('\n');
            }
            Ok(Event::CData(chars)) => {
                text.push_str(&String::from_utf8_lossy(&chars.into_inner()));
                text.push('\n');
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(ExtractError::Markup(format!(
                    "at position {}: {err}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(text.trim().to_string())
}
