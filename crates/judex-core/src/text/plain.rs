//! Plain-text decoding with a UTF-8 → GBK fallback.

use encoding_rs::{GBK, UTF_8};
use tracing::debug;

use super::DirectText;
use crate::error::ReadError;

/// Decodes plain-text files of mixed origin.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextReader;

impl PlainTextReader {
    pub fn new() -> Self {
        Self
    }

    /// Decode as UTF-8, retrying as GBK when the bytes are not valid UTF-8.
    pub fn read(&self, data: &[u8]) -> Result<DirectText, ReadError> {
        let text = decode(data)?;
        Ok(DirectText::from_text(&text))
    }
}

fn decode(data: &[u8]) -> Result<String, ReadError> {
    let body = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(body) {
        return Ok(text.into_owned());
    }

    debug!("Text is not valid UTF-8, retrying as GBK");
    GBK.decode_without_bom_handling_and_without_replacement(data)
        .map(|text| text.into_owned())
        .ok_or(ReadError::Encoding)
}
