//! The canonical long-format dataset.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::query::filter::Subset;
use crate::stats::LoadStats;

/// Sentinel direction value meaning "every direction".
pub const ALL_DIRECTIONS: &str = "all";

/// One (station, direction, time slot) reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrowdingRecord {
    pub operator: String,
    pub line: String,
    pub station_code: String,
    pub station_name: String,
    pub direction: String,
    /// Normalized `HH:MM`.
    pub time_label: String,
    /// Minute-of-day with `00:xx` shifted past 24:00.
    pub time_order: u32,
    pub crowding: f64,
}

/// Normalized records plus the counts they were built from.
///
/// Immutable once built; queries borrow from it and return new values.
#[derive(Debug, Clone)]
pub struct CrowdingDataset {
    records: Vec<CrowdingRecord>,
    stats: LoadStats,
}

impl CrowdingDataset {
    pub(crate) fn new(records: Vec<CrowdingRecord>, stats: LoadStats) -> Self {
        Self { records, stats }
    }

    pub fn records(&self) -> &[CrowdingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// Every record, as an unfiltered subset.
    pub fn all(&self) -> Subset<'_> {
        Subset::from_records(self.records.iter())
    }

    /// Values for populating filter controls across the whole dataset.
    pub fn options(&self) -> FilterOptions {
        FilterOptions::from_records(&self.records)
    }

    /// Lines across the whole dataset; directions, stations and times
    /// restricted to `line`.
    pub fn options_for_line(&self, line: &str) -> FilterOptions {
        let mut options =
            FilterOptions::from_records(self.records.iter().filter(|r| r.line == line));
        options.lines = self.options().lines;
        options
    }
}

/// Distinct, ordered values for each filterable field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub lines: Vec<String>,
    /// Starts with [`ALL_DIRECTIONS`].
    pub directions: Vec<String>,
    pub stations: Vec<String>,
    /// Ordered by `time_order`, not lexically.
    pub time_labels: Vec<String>,
}

impl FilterOptions {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CrowdingRecord>) -> Self {
        let mut lines = BTreeSet::new();
        let mut directions = BTreeSet::new();
        let mut stations = BTreeSet::new();
        let mut times = BTreeSet::new();

        for record in records {
            lines.insert(record.line.as_str());
            directions.insert(record.direction.as_str());
            stations.insert(record.station_name.as_str());
            times.insert((record.time_order, record.time_label.as_str()));
        }

        Self {
            lines: lines.into_iter().map(str::to_string).collect(),
            directions: std::iter::once(ALL_DIRECTIONS)
                .chain(directions)
                .map(str::to_string)
                .collect(),
            stations: stations.into_iter().map(str::to_string).collect(),
            time_labels: times
                .into_iter()
                .map(|(_, label)| label.to_string())
                .collect(),
        }
    }
}
