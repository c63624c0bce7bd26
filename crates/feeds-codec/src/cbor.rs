//! CBOR serialization helpers.
//!
//! Thin wrappers over [`ciborium`] that map its errors into [`CodecError`]
//! with the schema tag included for easier debugging.

use serde::{de::DeserializeOwned, Serialize};

use crate::{CodecError, Result};

/// Serialize a value to CBOR bytes.
///
/// # Errors
///
/// Returns [`CodecError::Serialization`] if the value cannot be serialized.
pub fn to_vec<T: Serialize>(value: &T, type_name: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| {
        CodecError::Serialization(format!("CBOR serialization of {type_name} failed: {e}"))
    })?;
    Ok(buf)
}

/// Deserialize a value from CBOR bytes.
///
/// # Errors
///
/// Returns [`CodecError::Deserialization`] if the bytes cannot be deserialized
/// into the target type.
pub fn from_slice<T: DeserializeOwned>(data: &[u8], type_name: &str) -> Result<T> {
    ciborium::from_reader(data).map_err(|e| {
        CodecError::Deserialization(format!("CBOR deserialization of {type_name} failed: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        round: u32,
        values: Vec<i64>,
    }

    #[test]
    fn test_roundtrip() {
        let sample = Sample {
            round: 7,
            values: vec![-1, 0, 1],
        };
        let bytes = to_vec(&sample, "Sample").expect("serialize");
        let restored: Sample = from_slice(&bytes, "Sample").expect("deserialize");
        assert_eq!(sample, restored);
    }

    #[test]
    fn test_invalid_data_returns_error() {
        let bad_data = &[0xFF, 0xFF, 0xFF];
        let err = from_slice::<Sample>(bad_data, "Sample").expect_err("should fail");
        assert!(matches!(err, CodecError::Deserialization(ref msg) if msg.contains("Sample")));
    }

    #[test]
    fn test_empty_data_returns_error() {
        let result: Result<Sample> = from_slice(&[], "Sample");
        assert!(result.is_err());
    }

    #[test]
    fn test_cbor_is_compact() {
        let sample = Sample {
            round: 0,
            values: vec![0; 8],
        };
        let cbor = to_vec(&sample, "Sample").expect("serialize");
        let json = serde_json::to_vec(&sample).expect("serialize json");
        assert!(cbor.len() <= json.len());
    }
}
