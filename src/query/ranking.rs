use std::collections::HashMap;
use std::num::NonZeroUsize;

use crate::query::filter::Subset;
use crate::query::types::RankingEntry;
use crate::query::utility::Accumulator;

/// Default number of ranked groups.
pub const DEFAULT_TOP_N: usize = 20;

/// Ranks (station_name, station_code, direction) groups by peak crowding.
///
/// Peak, mean and peak time are computed together in a single pass. Groups
/// are sorted by peak descending with a stable sort, so equal peaks keep the
/// order in which their groups first appear in `subset`. The first `top_n`
/// groups get ranks `1..=k`.
pub fn rank(subset: &Subset<'_>, top_n: NonZeroUsize) -> Vec<RankingEntry> {
    let mut index: HashMap<(&str, &str, &str), usize> = HashMap::new();
    let mut groups: Vec<((&str, &str, &str), Accumulator)> = Vec::new();

    for record in subset.iter() {
        let key = (
            record.station_name.as_str(),
            record.station_code.as_str(),
            record.direction.as_str(),
        );
        match index.get(&key) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(key, groups.len());
                groups.push((key, Accumulator::new(record)));
            }
        }
    }

    groups.sort_by(|(_, a), (_, b)| b.max.total_cmp(&a.max));

    groups
        .into_iter()
        .take(top_n.get())
        .enumerate()
        .map(
            |(i, ((station_name, station_code, direction), acc))| RankingEntry {
                rank: i + 1,
                station_name: station_name.to_string(),
                station_code: station_code.to_string(),
                direction: direction.to_string(),
                peak: acc.max,
                avg: acc.mean(),
                peak_time: acc.peak_time,
            },
        )
        .collect()
}
