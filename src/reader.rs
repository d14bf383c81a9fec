//! Turning included files into text.

use crate::notebook::flatten_notebook;
use chardetng::EncodingDetector;
use std::fs;
use std::path::Path;
use thiserror::Error;

const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} looks binary (NUL bytes)")]
    Binary { path: String },

    #[error("{path} is not valid UTF-8 or {encoding}")]
    Undecodable { path: String, encoding: String },
}

/// Decode bytes as UTF-8, falling back to a single guessed encoding.
pub fn decode(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_string());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        None
    } else {
        Some(decoded.into_owned())
    }
}

fn fallback_name(bytes: &[u8]) -> String {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true).name().to_lowercase()
}

pub fn read_text(path: &Path) -> Result<String, ReadError> {
    let bytes = fs::read(path).map_err(|source| ReadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    if bytes.contains(&0) {
        return Err(ReadError::Binary {
            path: path.display().to_string(),
        });
    }

    decode(&bytes).ok_or_else(|| ReadError::Undecodable {
        path: path.display().to_string(),
        encoding: fallback_name(&bytes),
    })
}

/// The text a file contributes to the document: decoded, with notebooks
/// flattened to plain cells.
pub fn document_text(path: &Path) -> Result<String, ReadError> {
    let text = read_text(path)?;
    if is_notebook(path) {
        Ok(flatten_notebook(&text))
    } else {
        Ok(text)
    }
}

pub fn is_notebook(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "ipynb")
}
