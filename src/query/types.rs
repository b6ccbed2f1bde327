//! Derived tables returned by the query functions.

use serde::Serialize;

/// One ranked (station, code, direction) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub station_name: String,
    pub station_code: String,
    pub direction: String,
    pub peak: f64,
    pub avg: f64,
    pub peak_time: String,
}

/// Highest crowding seen at a station, across directions and times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationPeak {
    pub station_name: String,
    pub peak_crowding: f64,
}

/// How station peaks are ordered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StationOrder {
    #[default]
    Alphabetical,
    PeakDescending,
}

/// One point of a station's time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSample {
    pub time_label: String,
    pub direction: String,
    pub crowding: f64,
}

/// Headline figures and the time series for a single station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationProfile {
    pub station_name: String,
    pub peak: f64,
    pub avg: f64,
    pub peak_time: String,
    pub samples: Vec<StationSample>,
}

/// Figures over a whole filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsetSummary {
    pub rows: usize,
    pub station_count: usize,
    pub max: f64,
    pub avg: f64,
    pub min: f64,
}
