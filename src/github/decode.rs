//! Decoding of contents-API payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Decode file content according to the encoding the API reported.
///
/// `base64` payloads are decoded and read as UTF-8 with invalid sequences
/// dropped; an undecodable payload yields an empty string. Any other
/// encoding is returned unchanged.
pub fn decode(content: &str, encoding: &str) -> String {
    if encoding != "base64" {
        return content.to_string();
    }

    // The API wraps base64 at 60 columns.
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    match STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => bytes.utf8_chunks().map(|chunk| chunk.valid()).collect(),
        Err(e) => {
            tracing::warn!("Dropping undecodable base64 content: {}", e);
            String::new()
        }
    }
}
