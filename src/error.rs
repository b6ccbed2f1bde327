//! Errors that stop a dataset load.
//!
//! Anything recoverable (a malformed time header, an unparseable crowding
//! cell, a missing filter bound) is absorbed where it happens and never shows
//! up here.

use std::path::PathBuf;
use thiserror::Error;

use crate::schema::MIN_COLUMNS;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("source file not found: {}; check the path or place the file in the working directory", .path.display())]
    NotFound { path: PathBuf },

    #[error("could not decode {} with any of the candidate encodings: {}", .path.display(), .attempted.join(", "))]
    Undecodable {
        path: PathBuf,
        attempted: Vec<String>,
    },

    #[error("table has {found} columns but at least {min} are required (5 identifier columns and one or more time columns)", min = MIN_COLUMNS)]
    Schema { found: usize },

    #[error("no usable rows survived normalization; check the file layout and encoding")]
    EmptyDataset,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
