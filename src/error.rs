use std::path::PathBuf;

use thiserror::Error;

/// A config file that could not be read at all.
#[derive(Debug, Error)]
#[error("could not open {kind} config file {path:?}: {source}")]
pub struct ConfigError {
    pub kind: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Why a single config line was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum LineError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("missing '+' between color name and offset")]
    MissingPlus,
    #[error("invalid integer '{0}'")]
    Int(String),
    #[error("color offset {0} is out of range")]
    OffsetRange(i32),
    #[error("invalid number '{0}'")]
    Float(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum HistogramError {
    #[error("histogram '{0}' has incompatible binning")]
    Incompatible(String),
    #[error("histogram '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid JSON store: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid CSV store: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Histogram(#[from] HistogramError),
    #[error("ROOT binary files are not supported, convert {0:?} to .json or .csv")]
    RootBinary(PathBuf),
    #[error("unsupported histogram file format: {0:?}")]
    Unsupported(PathBuf),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[cfg(feature = "pdf")]
    #[error("PDF conversion failed: {0}")]
    Pdf(String),
}

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not open input file list {path:?}: {source}")]
    InputList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not create output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not open output file for integrals {path:?}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
