use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy for configuration parsing
// ---------------------------------------------------------------------------

/// Everything that can go wrong while turning a trace configuration file
/// into structured data.
///
/// All of these are raised at the point of detection; there is no partial
/// recovery. Duplicate keys are *not* errors (last write wins, see the
/// parser and grouper docs).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The input was not usable as configuration text, e.g. a file whose
    /// contents are not valid UTF-8, or an empty required keyword field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A multi-value line contained a token that is not a numeric literal.
    #[error("unexpected value {token:?} for {key}")]
    MalformedValue { key: String, token: String },

    /// A range-shaped key carried a suffix outside `_0` / `_1`.
    #[error("unexpected range variable {key}")]
    UnexpectedRangeVariable { key: String },

    /// The configuration file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
