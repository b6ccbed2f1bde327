//! Reads the wide source table from disk.

use std::io::ErrorKind;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::encoding::{TextEncoding, decode_first};
use crate::error::LoadError;

/// The source table as delimited text, before any role is assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Header row, each name trimmed.
    pub headers: Vec<String>,
    /// Data rows. Rows may be shorter or longer than `headers`.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();
        Self { headers, rows }
    }
}

/// Parses decoded comma-separated text into a [`RawTable`].
///
/// # Errors
///
/// Returns an error if the text is not well-formed CSV.
pub fn parse_table(text: &str) -> Result<RawTable, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Reads `path` and decodes it with the first candidate encoding that fits.
///
/// # Errors
///
/// [`LoadError::NotFound`] if the file is absent, [`LoadError::Undecodable`]
/// if every candidate fails.
pub fn read_source(
    path: &Path,
    encodings: &[TextEncoding],
) -> Result<(String, TextEncoding), LoadError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io(e),
    })?;
    debug!(bytes = bytes.len(), path = %path.display(), "Source bytes read");

    decode_first(&bytes, encodings).ok_or_else(|| LoadError::Undecodable {
        path: path.to_path_buf(),
        attempted: encodings.iter().map(|e| e.label().to_string()).collect(),
    })
}

/// Reads, decodes and parses the source file in one step.
pub fn read_table(
    path: &Path,
    encodings: &[TextEncoding],
) -> Result<(RawTable, TextEncoding), LoadError> {
    let (text, encoding) = read_source(path, encodings)?;
    debug!(encoding = %encoding, "Source decoded");
    Ok((parse_table(&text)?, encoding))
}
