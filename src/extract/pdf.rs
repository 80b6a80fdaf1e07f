use super::{ExtractError, TextExtractor};
use lopdf::{Document, Object, ObjectId};

/// Reads the embedded text layer page by page, in page order.
/// A failure on any page fails the whole document.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let document =
            Document::load_mem(bytes).map_err(|err| ExtractError::Malformed(err.to_string()))?;

        let mut text = String::new();
        // BTreeMap keyed by 1-based page number
        for (page_number, page_id) in document.get_pages() {
            let page_error = |reason: String| ExtractError::Page {
                index: page_number,
                reason,
            };

            // extract_text skips unresolvable or undecodable content streams
            check_page_contents(&document, page_id).map_err(page_error)?;
            let page_text = document
                .extract_text(&[page_number])
                .map_err(|err| page_error(err.to_string()))?;
            text.push_str(&page_text);
            text.push('\n');
        }

        Ok(text)
    }
}

/// Resolves every content stream of a page and decodes the filtered ones.
fn check_page_contents(document: &Document, page_id: ObjectId) -> Result<(), String> {
    let page = document
        .get_dictionary(page_id)
        .map_err(|err| format!("page object {} {}: {err}", page_id.0, page_id.1))?;

    // a page without Contents is blank
    let contents = match page.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(()),
    };
    let contents = match contents {
        Object::Reference(id) => resolve(document, *id)?,
        other => other,
    };
    let entries: Vec<&Object> = match contents {
        Object::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    for entry in entries {
        let stream = match entry {
            Object::Reference(id) => resolve(document, *id)?,
            other => other,
        }
        .as_stream()
        .map_err(|err| format!("content entry is not a stream: {err}"))?;

        if stream.dict.has(b"Filter") {
            stream
                .decompressed_content()
                .map_err(|err| format!("undecodable content stream: {err}"))?;
        }
    }

    Ok(())
}

fn resolve(document: &Document, id: ObjectId) -> Result<&Object, String> {
    document
        .get_object(id)
        .map_err(|err| format!("content stream {} {}: {err}", id.0, id.1))
}
