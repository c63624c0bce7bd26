//! Deviation functions.
//!
//! A deviation function decides whether a freshly aggregated value differs
//! enough from the last on-chain value to justify another reporting round.
//! Each oracle evaluates it locally, so results may differ between oracles
//! evaluating at slightly different instants.
//!
//! Functions are defined in configuration as a [`DeviationDefinition`],
//! validated eagerly into a typed [`DeviationConfig`], and built into a
//! [`DeviationFunc`].
//!
//! ## Expiring instruments
//!
//! For a value that decays toward a known expiry, a fixed relative threshold
//! is too strict far from expiry and too loose close to it. The difference is
//! weighted by the remaining time to expiry instead:
//!
//! ```text
//! years_to_expiry = (expires_at - now) / SECONDS_IN_YEAR
//! scaled_diff     = |new - old| / multiplier     (exact, rounded to f64 once)
//! log_threshold   = ln(1 + threshold_ppb / 1e9)
//! deviates        = scaled_diff * years_to_expiry > log_threshold
//! ```

use feeds_types::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::clock::{unix_seconds_f64, Clock, SystemClock};
use crate::{MedianError, Result};

/// Kind tag of the expiring-instrument deviation function.
pub const EXPIRING_INSTRUMENT: &str = "expiring-instrument";

/// Seconds in a 365-day year.
pub const SECONDS_IN_YEAR: f64 = (365 * 24 * 60 * 60) as f64;

/// Fixed-point scale used when a definition omits `multiplier` (10^18).
pub const DEFAULT_MULTIPLIER: u64 = 1_000_000_000_000_000_000;

/// Parts-per-billion denominator.
const PPB: f64 = 1e9;

/// Decides whether a new value deviates enough from an old one.
pub trait DeviationFunc: Send + Sync {
    /// Compare `new` against `old` under a threshold in parts per billion.
    ///
    /// # Errors
    ///
    /// - [`MedianError::InvalidArguments`] if `old` or `new` is absent
    fn deviates(
        &self,
        threshold_ppb: u64,
        old: Option<&BigInt>,
        new: Option<&BigInt>,
    ) -> Result<bool>;
}

/// A deviation function definition as written in configuration.
///
/// Fields are kept loosely typed so that malformed values are reported as
/// [`MedianError::InvalidConfig`] by [`DeviationConfig::try_from`] rather than
/// as a parse failure of the surrounding document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviationDefinition {
    /// Function kind, e.g. [`EXPIRING_INSTRUMENT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Expiry as unix seconds; fractions allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<serde_json::Value>,
    /// Fixed-point scale as a base-10 integer string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<serde_json::Value>,
}

/// A validated deviation function configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviationConfig {
    /// See [`ExpiringInstrumentDeviation`].
    ExpiringInstrument {
        /// Expiry as unix seconds.
        expires_at: f64,
        /// Fixed-point scale of compared values. Always positive.
        multiplier: BigInt,
    },
}

impl TryFrom<&DeviationDefinition> for DeviationConfig {
    type Error = MedianError;

    fn try_from(def: &DeviationDefinition) -> Result<Self> {
        let kind = def.kind.as_deref().ok_or_else(|| {
            MedianError::InvalidConfig(
                "missing or invalid 'kind' field in deviation function definition".to_string(),
            )
        })?;

        match kind {
            EXPIRING_INSTRUMENT => {
                let expires_at = def
                    .expires_at
                    .as_ref()
                    .and_then(serde_json::Value::as_f64)
                    .ok_or_else(|| {
                        MedianError::InvalidConfig(
                            "missing or invalid 'expiresAt' field in deviation function definition"
                                .to_string(),
                        )
                    })?;
                let multiplier = match &def.multiplier {
                    None => BigInt::from(DEFAULT_MULTIPLIER),
                    Some(raw) => parse_multiplier(raw)?,
                };
                Ok(Self::ExpiringInstrument {
                    expires_at,
                    multiplier,
                })
            }
            other => Err(MedianError::InvalidConfig(format!(
                "unsupported function kind in deviation function definition: {other}"
            ))),
        }
    }
}

impl TryFrom<DeviationDefinition> for DeviationConfig {
    type Error = MedianError;

    fn try_from(def: DeviationDefinition) -> Result<Self> {
        Self::try_from(&def)
    }
}

fn parse_multiplier(raw: &serde_json::Value) -> Result<BigInt> {
    let invalid = || {
        MedianError::InvalidConfig(format!(
            "invalid 'multiplier' field in deviation function definition: {raw}"
        ))
    };
    let text = raw.as_str().ok_or_else(invalid)?;
    let multiplier = BigInt::parse_bytes(text.as_bytes(), 10).ok_or_else(invalid)?;
    if !multiplier.is_positive() {
        return Err(invalid());
    }
    Ok(multiplier)
}

impl DeviationConfig {
    /// Build the configured function against the system clock.
    pub fn build(&self) -> Box<dyn DeviationFunc> {
        self.build_with_clock(SystemClock)
    }

    /// Build the configured function against `clock`.
    pub fn build_with_clock<C: Clock + 'static>(&self, clock: C) -> Box<dyn DeviationFunc> {
        match self {
            Self::ExpiringInstrument {
                expires_at,
                multiplier,
            } => Box::new(ExpiringInstrumentDeviation::new(
                *expires_at,
                multiplier.clone(),
                clock,
            )),
        }
    }
}

/// Validate `definition` and build its function against the system clock.
///
/// # Errors
///
/// - [`MedianError::InvalidConfig`] if the definition is missing a field,
///   has a malformed one, or names an unsupported kind
pub fn new_deviation_func(definition: &DeviationDefinition) -> Result<Box<dyn DeviationFunc>> {
    Ok(DeviationConfig::try_from(definition)?.build())
}

/// Deviation function for values decaying toward a known expiry.
///
/// The multiplier is fixed at construction. The clock is read once per
/// evaluation.
#[derive(Clone, Debug)]
pub struct ExpiringInstrumentDeviation<C = SystemClock> {
    expires_at: f64,
    multiplier: BigInt,
    clock: C,
}

impl<C: Clock> ExpiringInstrumentDeviation<C> {
    /// Create a deviation function for an instrument expiring at `expires_at`.
    pub fn new(expires_at: f64, multiplier: BigInt, clock: C) -> Self {
        Self {
            expires_at,
            multiplier,
            clock,
        }
    }

    /// Expiry as unix seconds.
    pub fn expires_at(&self) -> f64 {
        self.expires_at
    }

    /// Fixed-point scale of compared values.
    pub fn multiplier(&self) -> &BigInt {
        &self.multiplier
    }
}

impl<C: Clock> DeviationFunc for ExpiringInstrumentDeviation<C> {
    fn deviates(
        &self,
        threshold_ppb: u64,
        old: Option<&BigInt>,
        new: Option<&BigInt>,
    ) -> Result<bool> {
        let (Some(old), Some(new)) = (old, new) else {
            return Err(MedianError::InvalidArguments(
                "old and new values must both be present".to_string(),
            ));
        };

        let now = unix_seconds_f64(self.clock.now());
        let years_to_expiry = (self.expires_at - now) / SECONDS_IN_YEAR;

        let diff = (new - old).abs();
        let scaled_diff = scaled_diff(diff, &self.multiplier);

        let log_threshold = (1.0 + threshold_ppb as f64 / PPB).ln();

        let weighted = scaled_diff * years_to_expiry;
        let deviates = weighted > log_threshold;

        tracing::debug!(
            multiplier = %self.multiplier,
            expires_at = self.expires_at,
            threshold_ppb,
            old = %old,
            new = %new,
            now,
            years_to_expiry,
            scaled_diff,
            log_threshold,
            weighted,
            deviates,
            "expiring instrument deviation"
        );

        Ok(deviates)
    }
}

/// `diff / multiplier` rounded to `f64` once.
fn scaled_diff(diff: BigInt, multiplier: &BigInt) -> f64 {
    if multiplier.is_zero() {
        return f64::INFINITY;
    }
    BigRational::new(diff, multiplier.clone())
        .to_f64()
        .unwrap_or(f64::INFINITY)
}
