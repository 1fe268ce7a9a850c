//! Error types for catalog lookup, scaling and index evaluation.

use thiserror::Error;

/// Every failure is a bad request or a bad catalog record; nothing here is
/// transient, so callers decide whether to abort or skip.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unknown spectral index: {0}")]
    UnknownIndex(String),

    #[error("unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("no scale/offset registered for band {band} of dataset {dataset}")]
    UnknownDatasetBand { dataset: String, band: String },

    #[error("index {index} requires variable {variable}, which was not supplied")]
    MissingVariable { index: String, variable: String },

    #[error("variable {variable} selects band {band}, which the image does not have")]
    UnknownBand { variable: String, band: String },

    #[error("image has no band named {0}")]
    MissingBand(String),

    #[error("image already has a band named {0}")]
    DuplicateBand(String),

    #[error("image of {width}x{height} pixels is too large")]
    ImageTooLarge { width: usize, height: usize },

    #[error("band {band} has {actual} values, expected {expected}")]
    SizeMismatch {
        band: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid formula {formula:?} at offset {position}: {message}")]
    Formula {
        formula: String,
        position: usize,
        message: String,
    },

    #[error("invalid catalog record {name}: {reason}")]
    InvalidCatalog { name: String, reason: String },

    #[error("invalid JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
