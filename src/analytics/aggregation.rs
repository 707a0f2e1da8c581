//! Stage 1: Strike Aggregation
//!
//! Groups call and put records by exact strike and ranks the resulting buckets.

use std::collections::BTreeMap;

use crate::core::{ContractRecord, OptionSide};

use super::{StrikeBucket, StrikeKey};

/// Buckets keyed by strike; iteration is ascending strike
pub type StrikeBuckets = BTreeMap<StrikeKey, StrikeBucket>;

/// Accumulate volume and open interest per strike
///
/// Duplicate strikes on a side are summed. A strike quoted on only one side
/// still gets a bucket, with zeros on the other side. Negative values from
/// malformed input are summed as-is.
pub fn aggregate_by_strike(calls: &[ContractRecord], puts: &[ContractRecord]) -> StrikeBuckets {
    let mut buckets = StrikeBuckets::new();

    let records = calls
        .iter()
        .map(|r| (OptionSide::Call, r))
        .chain(puts.iter().map(|r| (OptionSide::Put, r)));

    for (side, record) in records {
        buckets
            .entry(StrikeKey(record.strike))
            .or_insert_with(|| StrikeBucket::new(record.strike))
            .accumulate(side, record);
    }

    buckets
}

/// Top `n` strikes by total (call + put) volume, returned ascending by strike
pub fn top_by_volume(buckets: &StrikeBuckets, n: usize) -> Vec<StrikeBucket> {
    top_by(buckets, n, StrikeBucket::total_volume)
}

/// Top `n` strikes by total (call + put) open interest, returned ascending by strike
pub fn top_by_open_interest(buckets: &StrikeBuckets, n: usize) -> Vec<StrikeBucket> {
    top_by(buckets, n, StrikeBucket::total_open_interest)
}

/// Rank descending by `metric`, keep `n`, re-sort ascending by strike
///
/// The sort is stable over ascending-strike input, so equal metrics keep the
/// lower strike first when the cut falls inside a tie.
fn top_by<F>(buckets: &StrikeBuckets, n: usize, metric: F) -> Vec<StrikeBucket>
where
    F: Fn(&StrikeBucket) -> i64,
{
    let mut ranked: Vec<StrikeBucket> = buckets.values().copied().collect();
    ranked.sort_by(|a, b| metric(b).cmp(&metric(a)));
    ranked.truncate(n);
    ranked.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    ranked
}
