//! # feeds-median
//!
//! Median reporting for price feeds.
//!
//! Every oracle in a quorum contributes an attributed observation. The
//! aggregator folds a quorum's observations into one canonical report that
//! all honest oracles compute identically, the report codec moves that report
//! through a schema-tagged wire encoding, and a deviation function decides
//! locally whether a fresh value differs enough from the last on-chain value
//! to be worth another round.
//!
//! ## Modules
//!
//! - [`aggregate`] — deterministic aggregation of attributed observations
//! - [`report_codec`] — building reports and recovering the median from them
//! - [`deviation`] — configurable deviation functions
//! - [`clock`] — current-time sources
//! - [`data_source`] — single-oracle observations from an external pipeline

pub mod aggregate;
pub mod clock;
pub mod data_source;
pub mod deviation;
pub mod report_codec;

use feeds_codec::CodecError;

/// Error types for median reporting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MedianError {
    /// No observations were supplied.
    #[error("cannot build report from empty attributed observations")]
    EmptyInput,

    /// A report decoded successfully but carries no values.
    #[error("decoded report contains no observations")]
    EmptyReport,

    /// A deviation function definition is missing, malformed or unsupported.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A required argument was absent.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The generic codec failed. Carried unchanged.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The external pipeline failed to produce an observation.
    #[error("pipeline execution failed: {0}")]
    Pipeline(String),
}

/// Convenience result type for median reporting.
pub type Result<T> = std::result::Result<T, MedianError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_is_transparent() {
        let inner = CodecError::Deserialization("bad bytes".to_string());
        let err = MedianError::from(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err, MedianError::Codec(inner));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            MedianError::EmptyInput.to_string(),
            "cannot build report from empty attributed observations"
        );
        assert_eq!(
            MedianError::InvalidConfig("x".into()).to_string(),
            "invalid config: x"
        );
        assert_eq!(
            MedianError::Pipeline("not enough results".into()).to_string(),
            "pipeline execution failed: not enough results"
        );
    }
}
