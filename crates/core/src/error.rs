use thiserror::Error;

/// Errors returned by layout, loading and export.
#[derive(Debug, Error)]
pub enum Error {
    /// A weight was negative, NaN or infinite.
    #[error("invalid weight {weight} for topic {label:?}")]
    InvalidWeight { label: String, weight: f64 },

    /// Container dimensions were negative or not finite.
    #[error("invalid container size {width} x {height}")]
    InvalidContainer { width: f64, height: f64 },

    /// A packer parameter was out of range.
    #[error("invalid parameter {name}: {message}")]
    InvalidConfig {
        name: &'static str,
        message: &'static str,
    },

    /// A drill-down segment does not name a subtopic of its parent.
    #[error("no topic matching {segment:?} under {parent:?}")]
    UnknownTopic { segment: String, parent: String },

    #[error("unsupported topic file {0:?}, expected .json or .csv")]
    UnsupportedFormat(std::path::PathBuf),

    #[error("malformed topic record at line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("loading cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
