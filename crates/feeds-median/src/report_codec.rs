//! Median report encoding.
//!
//! [`ReportCodec`] turns a quorum's attributed observations into wire bytes
//! and recovers the median value from wire bytes. It owns no byte layout:
//! the aggregated report is handed to a [`GenericCodec`] under the
//! [`REPORT_TYPE_NAME`] schema tag, and every codec error is returned to the
//! caller unchanged.
//!
//! ```text
//! observations --aggregate--> AggregateReport --encode("MedianReport")--> bytes
//! bytes --decode("MedianReport")--> AggregateReport --values[len / 2]--> median
//! ```

use feeds_codec::{CborCodec, GenericCodec, SchemaLimits};
use feeds_types::{AggregateReport, AttributedObservation, BigInt};

use crate::aggregate::aggregate;
use crate::{MedianError, Result};

/// Schema tag of an encoded [`AggregateReport`].
pub const REPORT_TYPE_NAME: &str = "MedianReport";

/// Encoded-size budget of a CBOR [`AggregateReport`].
///
/// Sized for observation values and fee-coin rates whose magnitude fits in
/// 256 bits. Wider values still encode, but may exceed the bound.
pub const MEDIAN_REPORT_LIMITS: SchemaLimits = SchemaLimits {
    fixed_bytes: 128,
    per_item_bytes: 48,
};

/// A [`CborCodec`] with the median report schema registered.
pub fn median_report_codec() -> CborCodec {
    CborCodec::new().with_type(REPORT_TYPE_NAME, MEDIAN_REPORT_LIMITS)
}

/// Builds median reports and reads them back through a [`GenericCodec`].
#[derive(Clone, Debug)]
pub struct ReportCodec<C> {
    codec: C,
}

impl<C: GenericCodec> ReportCodec<C> {
    /// Create a report codec delegating byte encoding to `codec`.
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// The underlying generic codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Aggregate `observations` and encode the result.
    ///
    /// # Errors
    ///
    /// - [`MedianError::EmptyInput`] if `observations` is empty
    /// - [`MedianError::Codec`] if the generic codec fails to encode
    pub fn build_report(&self, observations: &[AttributedObservation]) -> Result<Vec<u8>> {
        if observations.is_empty() {
            return Err(MedianError::EmptyInput);
        }

        let report = aggregate(observations)?;
        let encoded = self.codec.encode(&report, REPORT_TYPE_NAME)?;

        tracing::debug!(
            observations = observations.len(),
            len = encoded.len(),
            "built median report"
        );
        tracing::trace!(report = %hex::encode(&encoded), "encoded median report");

        Ok(encoded)
    }

    /// Decode `report` and return the value at index `len / 2`.
    ///
    /// # Errors
    ///
    /// - [`MedianError::Codec`] if the generic codec fails to decode
    /// - [`MedianError::EmptyReport`] if the decoded report carries no values
    pub fn median_from_report(&self, report: &[u8]) -> Result<BigInt> {
        let decoded: AggregateReport = self.codec.decode(report, REPORT_TYPE_NAME)?;
        if decoded.is_empty() {
            return Err(MedianError::EmptyReport);
        }
        tracing::trace!(observations = decoded.len(), "decoded median report");
        decoded.median().cloned().ok_or(MedianError::EmptyReport)
    }

    /// Maximum encoded length of a report built from `n` observations.
    ///
    /// With [`median_report_codec`] this holds for values and fee-coin rates
    /// whose magnitude fits in 256 bits; see [`MEDIAN_REPORT_LIMITS`].
    ///
    /// # Errors
    ///
    /// - [`MedianError::Codec`] if the generic codec cannot estimate the size
    pub fn max_report_length(&self, n: usize) -> Result<usize> {
        Ok(self.codec.max_encoded_size(n, REPORT_TYPE_NAME)?)
    }
}
