//! Aggregate reports.
//!
//! An [`AggregateReport`] is the canonical, order-independent summary of one
//! quorum's observations. It carries the selected timestamp and fee-coin rate
//! plus every observed value, sorted ascending, with the oracle that reported
//! each one.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::OracleId;

/// Canonical summary of one quorum's attributed observations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Timestamp selected from the observations.
    pub timestamp: u32,
    /// `observers[i]` reported `values[i]`.
    pub observers: Vec<OracleId>,
    /// All observed values in ascending order.
    pub values: Vec<BigInt>,
    /// Fee-coin rate selected from the observations.
    pub juels_per_fee_coin: BigInt,
}

/// Index of the element picked as "the median" of `len` sorted items.
///
/// This is always `len / 2`, the upper of the two middle elements for even
/// lengths. Values are never averaged.
pub fn median_index(len: usize) -> usize {
    len / 2
}

impl AggregateReport {
    /// Number of observations in the report.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the report carries no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at [`median_index`] of the sorted values, if any.
    pub fn median(&self) -> Option<&BigInt> {
        self.values.get(median_index(self.values.len()))
    }
}
