//! Attributed observations.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::OracleId;

/// One oracle's contribution to a report round.
///
/// The timestamp is claimed by the observer and is not trusted. Values are
/// fixed-point integers; no range or sign checks are applied here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributedObservation {
    /// Claimed observation time in unix seconds.
    pub timestamp: u32,
    /// Observed quantity.
    pub value: BigInt,
    /// Observed cost of one unit of the native fee coin.
    pub juels_per_fee_coin: BigInt,
    /// Oracle that made the observation.
    pub observer: OracleId,
}

impl AttributedObservation {
    /// Create a new attributed observation.
    pub fn new(
        timestamp: u32,
        value: impl Into<BigInt>,
        juels_per_fee_coin: impl Into<BigInt>,
        observer: OracleId,
    ) -> Self {
        Self {
            timestamp,
            value: value.into(),
            juels_per_fee_coin: juels_per_fee_coin.into(),
            observer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_converts_values() {
        let obs = AttributedObservation::new(123, 300i64, 100u32, 4);
        assert_eq!(obs.timestamp, 123);
        assert_eq!(obs.value, BigInt::from(300));
        assert_eq!(obs.juels_per_fee_coin, BigInt::from(100));
        assert_eq!(obs.observer, 4);
    }

    #[test]
    fn test_negative_value_accepted() {
        let obs = AttributedObservation::new(1, -5i64, 0i64, 0);
        assert_eq!(obs.value, BigInt::from(-5));
    }
}
