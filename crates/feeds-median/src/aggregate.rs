//! Deterministic aggregation of attributed observations.
//!
//! Three independent stable sorts are taken over the input, each starting
//! from the caller's order:
//!
//! ```text
//! by timestamp          -> report.timestamp          = sorted[n / 2]
//! by juels_per_fee_coin -> report.juels_per_fee_coin = sorted[n / 2]
//! by value              -> report.observers, report.values (all n)
//! ```
//!
//! Stability is required for agreement: when two observations tie on a key
//! their input order decides, so every oracle given the same sequence
//! produces the same report bytes. The pick at `n / 2` is never averaged.

use std::cmp::Ordering;

use feeds_types::report::median_index;
use feeds_types::{AggregateReport, AttributedObservation};

use crate::{MedianError, Result};

/// Fold a quorum's observations into an [`AggregateReport`].
///
/// The input is never reordered. No value is validated, dropped or
/// deduplicated; observer uniqueness is the caller's responsibility.
///
/// # Errors
///
/// - [`MedianError::EmptyInput`] if `observations` is empty
pub fn aggregate(observations: &[AttributedObservation]) -> Result<AggregateReport> {
    let n = observations.len();
    if n == 0 {
        return Err(MedianError::EmptyInput);
    }
    let mid = median_index(n);

    let by_timestamp = sorted_by(observations, |a, b| a.timestamp.cmp(&b.timestamp));
    let timestamp = by_timestamp[mid].timestamp;

    let by_juels = sorted_by(observations, |a, b| {
        a.juels_per_fee_coin.cmp(&b.juels_per_fee_coin)
    });
    let juels_per_fee_coin = by_juels[mid].juels_per_fee_coin.clone();

    let by_value = sorted_by(observations, |a, b| a.value.cmp(&b.value));
    let (observers, values): (Vec<_>, Vec<_>) = by_value
        .into_iter()
        .map(|o| (o.observer, o.value.clone()))
        .unzip();

    tracing::trace!(n, timestamp, %juels_per_fee_coin, "aggregated observations");

    Ok(AggregateReport {
        timestamp,
        observers,
        values,
        juels_per_fee_coin,
    })
}

/// Borrow `observations` in input order and stable-sort them by `compare`.
fn sorted_by<F>(
    observations: &[AttributedObservation],
    mut compare: F,
) -> Vec<&AttributedObservation>
where
    F: FnMut(&AttributedObservation, &AttributedObservation) -> Ordering,
{
    let mut sorted: Vec<&AttributedObservation> = observations.iter().collect();
    // `sort_by` is stable.
    sorted.sort_by(|a, b| compare(a, b));
    sorted
}
