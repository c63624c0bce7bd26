//! # feeds-codec
//!
//! Schema-tagged byte encoding for report payloads.
//!
//! Components that produce wire-format reports do not own a byte layout.
//! They hand typed values to a [`GenericCodec`] together with a schema tag
//! and get opaque bytes back, which lets the wire format evolve
//! independently of whatever produced the value.
//!
//! - [`codec`] — the [`GenericCodec`] capability and the CBOR-backed [`CborCodec`]
//! - [`cbor`] — CBOR (RFC 8949) serialization helpers over [`ciborium`]

pub mod cbor;
pub mod codec;

pub use codec::{CborCodec, GenericCodec, SchemaLimits};

/// Error types for codec operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// CBOR serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// CBOR deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The schema tag has not been registered with the codec.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A size estimate does not fit in `usize`.
    #[error("size overflow estimating {type_name} for {n} items")]
    SizeOverflow {
        /// Schema tag being estimated.
        type_name: String,
        /// Number of items requested.
        n: usize,
    },
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
