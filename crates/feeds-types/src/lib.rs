//! # feeds-types
//!
//! Shared domain types used across the feeds workspace.
//!
//! ## Modules
//!
//! - [`observation`] — one oracle's attributed observation
//! - [`report`] — the canonical aggregate of a quorum's observations
//! - [`fixed_point`] — decimal string to fixed-point integer conversion

pub mod fixed_point;
pub mod observation;
pub mod report;

pub use num_bigint::BigInt;
pub use observation::AttributedObservation;
pub use report::AggregateReport;

/// Identity of an oracle within one quorum round.
pub type OracleId = u8;

/// Maximum number of oracles participating in a single report.
pub const MAX_ORACLES: usize = 32;

/// Conventional number of decimals for fixed-point observation values.
pub const DEFAULT_DECIMALS: u32 = 18;

/// Error types for shared type conversions.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// Text could not be parsed as a base-10 decimal number.
    #[error("invalid decimal: {0:?}")]
    InvalidDecimal(String),
}

/// Convenience result type for type conversions.
pub type Result<T> = std::result::Result<T, TypesError>;
