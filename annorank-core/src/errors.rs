//! errors.rs - Custom error types for the annorank-core library.
//!
//! Scoring and classification never fail; missing evidence degrades to a zero score or
//! the worst confidence level. The variants below cover the one genuine failure class,
//! malformed configuration, plus the I/O and parse errors of the file loaders.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `annorank-core` library.
///
/// Marked `#[non_exhaustive]` so new variants can be added without breaking
/// downstream matches.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnnorankError {
    #[error("Invalid {name} tolerance: {value} (must be finite and greater than 0)")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("Invalid weight for axis '{axis}': {value} (must be finite and non-negative)")]
    InvalidWeight { axis: &'static str, value: f64 },

    #[error("Unknown ranking policy '{0}'")]
    UnknownPolicy(String),

    #[error("Unknown RT tolerance unit '{0}' (expected 'minutes' or 'percent')")]
    UnknownRtUnit(String),

    #[error("Unknown {scale} level '{label}'")]
    UnknownLevel { scale: &'static str, label: String },

    #[error("Failed to parse sort configuration: {0}")]
    ConfigParse(#[from] serde_yml::Error),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),
}
