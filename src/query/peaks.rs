use std::collections::HashMap;

use crate::query::filter::Subset;
use crate::query::types::{StationOrder, StationPeak};

/// Default cap on the number of stations shown.
pub const DEFAULT_MAX_STATIONS: usize = 20;

/// Maximum crowding per station name, collapsing directions and times.
///
/// Stations appear in the order they are first seen in `subset`.
pub fn station_peaks(subset: &Subset<'_>) -> Vec<StationPeak> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut peaks: Vec<StationPeak> = Vec::new();

    for record in subset.iter() {
        match index.get(record.station_name.as_str()) {
            Some(&i) => {
                let peak = &mut peaks[i].peak_crowding;
                *peak = peak.max(record.crowding);
            }
            None => {
                index.insert(&record.station_name, peaks.len());
                peaks.push(StationPeak {
                    station_name: record.station_name.clone(),
                    peak_crowding: record.crowding,
                });
            }
        }
    }

    peaks
}

/// Orders station peaks for display and keeps the first `cap`.
pub fn order_station_peaks(
    mut peaks: Vec<StationPeak>,
    order: StationOrder,
    cap: usize,
) -> Vec<StationPeak> {
    match order {
        StationOrder::Alphabetical => peaks.sort_by(|a, b| a.station_name.cmp(&b.station_name)),
        StationOrder::PeakDescending => {
            peaks.sort_by(|a, b| b.peak_crowding.total_cmp(&a.peak_crowding))
        }
    }
    peaks.truncate(cap);
    peaks
}
