//! The generic codec capability.
//!
//! A [`GenericCodec`] encodes and decodes arbitrary serde types under a
//! schema tag and estimates the maximum encoded size of a batch. The
//! [`CborCodec`] implementation only accepts tags that were registered with
//! their [`SchemaLimits`].

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};

use crate::{cbor, CodecError, Result};

/// Schema-tagged encoder and decoder.
///
/// Implementations must be safe to share between threads. Callers propagate
/// every error returned here unchanged and never retry.
pub trait GenericCodec: Send + Sync {
    /// Encode `item` as the schema identified by `type_name`.
    fn encode<T: Serialize>(&self, item: &T, type_name: &str) -> Result<Vec<u8>>;

    /// Decode `raw` as the schema identified by `type_name`.
    fn decode<T: DeserializeOwned>(&self, raw: &[u8], type_name: &str) -> Result<T>;

    /// Upper bound on the encoded size of a `type_name` value holding `n` items.
    fn max_encoded_size(&self, n: usize, type_name: &str) -> Result<usize>;
}

/// Encoded-size budget for one schema.
///
/// The bound for `n` items is `fixed_bytes + n * per_item_bytes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemaLimits {
    /// Bytes used independently of the number of items.
    pub fixed_bytes: usize,
    /// Bytes used by each item.
    pub per_item_bytes: usize,
}

impl SchemaLimits {
    /// Upper bound for a value holding `n` items, or `None` on overflow.
    pub fn bound(&self, n: usize) -> Option<usize> {
        n.checked_mul(self.per_item_bytes)?
            .checked_add(self.fixed_bytes)
    }
}

/// CBOR implementation of [`GenericCodec`].
#[derive(Clone, Debug, Default)]
pub struct CborCodec {
    schemas: HashMap<String, SchemaLimits>,
}

impl CborCodec {
    /// Create a codec with no registered schemas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema tag with its size budget.
    pub fn with_type(mut self, type_name: impl Into<String>, limits: SchemaLimits) -> Self {
        self.schemas.insert(type_name.into(), limits);
        self
    }

    fn limits(&self, type_name: &str) -> Result<&SchemaLimits> {
        self.schemas
            .get(type_name)
            .ok_or_else(|| CodecError::UnknownType(type_name.to_string()))
    }
}

impl GenericCodec for CborCodec {
    fn encode<T: Serialize>(&self, item: &T, type_name: &str) -> Result<Vec<u8>> {
        self.limits(type_name)?;
        let bytes = cbor::to_vec(item, type_name)?;
        tracing::trace!(type_name, len = bytes.len(), "encoded payload");
        Ok(bytes)
    }

    fn decode<T: DeserializeOwned>(&self, raw: &[u8], type_name: &str) -> Result<T> {
        self.limits(type_name)?;
        cbor::from_slice(raw, type_name)
    }

    fn max_encoded_size(&self, n: usize, type_name: &str) -> Result<usize> {
        self.limits(type_name)?
            .bound(n)
            .ok_or_else(|| CodecError::SizeOverflow {
                type_name: type_name.to_string(),
                n,
            })
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use serde::Deserialize;

    use super::*;

    const SAMPLE: &str = "Sample";

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        ids: Vec<u8>,
        amounts: Vec<BigInt>,
    }

    fn codec() -> CborCodec {
        CborCodec::new().with_type(
            SAMPLE,
            SchemaLimits {
                fixed_bytes: 32,
                per_item_bytes: 48,
            },
        )
    }

    #[test]
    fn test_roundtrip_bigints() {
        let sample = Sample {
            ids: vec![3, 1, 2],
            amounts: vec![
                BigInt::from(-5),
                BigInt::from(0),
                BigInt::from(10).pow(30),
            ],
        };
        let codec = codec();
        let bytes = codec.encode(&sample, SAMPLE).expect("encode");
        let restored: Sample = codec.decode(&bytes, SAMPLE).expect("decode");
        assert_eq!(sample, restored);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let codec = codec();
        let err = codec.encode(&1u8, "Other").expect_err("unregistered");
        assert_eq!(err, CodecError::UnknownType("Other".to_string()));

        let err = codec.decode::<u8>(&[0x01], "Other").expect_err("unregistered");
        assert_eq!(err, CodecError::UnknownType("Other".to_string()));

        let err = codec.max_encoded_size(1, "Other").expect_err("unregistered");
        assert_eq!(err, CodecError::UnknownType("Other".to_string()));
    }

    #[test]
    fn test_garbage_does_not_decode() {
        let err = codec()
            .decode::<Sample>(&[5, 6, 7, 8], SAMPLE)
            .expect_err("garbage");
        assert!(matches!(err, CodecError::Deserialization(_)));
    }

    #[test]
    fn test_max_encoded_size() {
        let codec = codec();
        assert_eq!(codec.max_encoded_size(0, SAMPLE).expect("size"), 32);
        assert_eq!(codec.max_encoded_size(10, SAMPLE).expect("size"), 32 + 480);
    }

    #[test]
    fn test_max_encoded_size_bounds_actual_encoding() {
        let codec = codec();
        let n = 31;
        let sample = Sample {
            ids: (0..n as u8).collect(),
            amounts: (0..n).map(|i| BigInt::from(10).pow(18) * i).collect(),
        };
        let bytes = codec.encode(&sample, SAMPLE).expect("encode");
        assert!(bytes.len() <= codec.max_encoded_size(n, SAMPLE).expect("size"));
    }

    #[test]
    fn test_max_encoded_size_overflow() {
        let err = codec()
            .max_encoded_size(usize::MAX, SAMPLE)
            .expect_err("overflow");
        assert!(matches!(err, CodecError::SizeOverflow { .. }));
    }
}
