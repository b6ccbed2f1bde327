use std::collections::HashSet;

use crate::query::filter::Subset;
use crate::query::types::{StationProfile, StationSample, SubsetSummary};
use crate::query::utility::Accumulator;

/// Most stations that can be compared side by side.
pub const MAX_COMPARED_STATIONS: usize = 3;

/// Peak, mean, peak time and the time series for `station_name`.
///
/// Samples are sorted by `time_order`, then direction. Returns `None` when
/// the station has no rows in `subset`.
pub fn station_profile(subset: &Subset<'_>, station_name: &str) -> Option<StationProfile> {
    let mut rows: Vec<_> = subset
        .iter()
        .filter(|r| r.station_name == station_name)
        .collect();

    let (first, rest) = rows.split_first()?;
    let mut acc = Accumulator::new(first);
    for record in rest {
        acc.push(record);
    }

    rows.sort_by(|a, b| {
        a.time_order
            .cmp(&b.time_order)
            .then_with(|| a.direction.cmp(&b.direction))
    });

    Some(StationProfile {
        station_name: station_name.to_string(),
        peak: acc.max,
        avg: acc.mean(),
        peak_time: acc.peak_time,
        samples: rows
            .into_iter()
            .map(|r| StationSample {
                time_label: r.time_label.clone(),
                direction: r.direction.clone(),
                crowding: r.crowding,
            })
            .collect(),
    })
}

/// Row count, distinct stations, and max/mean/min crowding for `subset`.
pub fn summarize(subset: &Subset<'_>) -> Option<SubsetSummary> {
    let mut records = subset.iter();
    let mut acc = Accumulator::new(records.next()?);
    for record in records {
        acc.push(record);
    }

    let stations: HashSet<&str> = subset.iter().map(|r| r.station_name.as_str()).collect();

    Some(SubsetSummary {
        rows: acc.count,
        station_count: stations.len(),
        max: acc.max,
        avg: acc.mean(),
        min: acc.min,
    })
}
