//! Stage 2: Signal Extraction
//!
//! Chain-wide totals, put/call ratio, and unusual volume relative to open interest.

use crate::core::{ContractRecord, OptionSide};

use super::{SentimentSummary, UnusualEntry};

/// Sum volume and open interest per side and compute the put/call ratio
///
/// Total over any input; missing fields count as zero, sums saturate at the
/// `i64` bounds, and the ratio is 0 when there is no call volume.
pub fn summarize(calls: &[ContractRecord], puts: &[ContractRecord]) -> SentimentSummary {
    let total = |records: &[ContractRecord], field: fn(&ContractRecord) -> i64| -> i64 {
        records.iter().map(field).fold(0i64, i64::saturating_add)
    };

    let total_call_volume = total(calls, ContractRecord::volume_or_zero);
    let total_put_volume = total(puts, ContractRecord::volume_or_zero);
    let total_call_open_interest = total(calls, ContractRecord::open_interest_or_zero);
    let total_put_open_interest = total(puts, ContractRecord::open_interest_or_zero);

    let put_call_ratio = if total_call_volume == 0 {
        0.0
    } else {
        total_put_volume as f64 / total_call_volume as f64
    };

    SentimentSummary {
        total_call_volume,
        total_put_volume,
        total_call_open_interest,
        total_put_open_interest,
        put_call_ratio,
    }
}

/// Contracts whose volume / open interest exceeds `threshold`
///
/// Records without positive volume and open interest are dropped before
/// scoring. Calls and puts are merged (calls first, input order) and sorted
/// descending by ratio with a stable sort, so equal ratios keep that merged
/// order. At most `limit` entries are returned.
pub fn detect_unusual(
    calls: &[ContractRecord],
    puts: &[ContractRecord],
    threshold: f64,
    limit: usize,
) -> Vec<UnusualEntry> {
    let mut entries: Vec<UnusualEntry> = calls
        .iter()
        .map(|r| (OptionSide::Call, r))
        .chain(puts.iter().map(|r| (OptionSide::Put, r)))
        .filter_map(|(side, record)| UnusualEntry::score(side, record))
        .filter(|entry| entry.ratio() > threshold)
        .collect();

    entries.sort_by(|a, b| b.ratio().total_cmp(&a.ratio()));
    entries.truncate(limit);
    entries
}
