//! Loading study source text from files and stdin.
//!
//! Source text is decoded lossily: invalid UTF-8 sequences are replaced
//! rather than rejected, so everything downstream (prompts, log lines) only
//! ever sees valid UTF-8.

use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

/// Decode bytes as UTF-8, replacing invalid sequences with U+FFFD.
pub fn decode_text(bytes: &[u8]) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            warn!(bytes = bytes.len(), "source text was not valid UTF-8, decoded lossily");
            text
        }
    }
}

pub fn read_text_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read source {}", path.display()))?;
    Ok(decode_text(&bytes))
}

pub fn read_stdin() -> Result<String> {
    let mut bytes = Vec::new();
    std::io::stdin()
        .read_to_end(&mut bytes)
        .context("read source from stdin")?;
    Ok(decode_text(&bytes))
}
