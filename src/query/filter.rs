//! Equality and time-range filtering over the canonical dataset.

use std::fmt;

use tracing::warn;

use crate::dataset::{ALL_DIRECTIONS, CrowdingDataset, CrowdingRecord};

/// Filter parameters. Every field is optional; an empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// Exact, case-sensitive line name.
    pub line: Option<String>,
    /// Exact direction, or [`ALL_DIRECTIONS`].
    pub direction: Option<String>,
    /// Inclusive `(start, end)` pair of `HH:MM` labels.
    pub time_range: Option<(String, String)>,
    /// Station names to keep. Empty keeps every station.
    pub stations: Vec<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = Some(line.into());
        self
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    pub fn with_time_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.time_range = Some((start.into(), end.into()));
        self
    }

    pub fn with_stations<I, S>(mut self, stations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stations = stations.into_iter().map(Into::into).collect();
        self
    }
}

/// A recoverable problem met while filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterWarning {
    /// A time bound did not occur in the line/direction subset, so no time
    /// filter was applied.
    TimeBoundNotFound {
        start: String,
        end: String,
        missing: Vec<String>,
    },
}

impl fmt::Display for FilterWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterWarning::TimeBoundNotFound {
                start,
                end,
                missing,
            } => write!(
                f,
                "time range {start}-{end} ignored: {} not present for the selected line/direction",
                missing.join(", ")
            ),
        }
    }
}

/// Borrowed records selected from a dataset, plus any warnings raised while
/// selecting them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subset<'a> {
    records: Vec<&'a CrowdingRecord>,
    warnings: Vec<FilterWarning>,
}

impl<'a> Subset<'a> {
    pub fn from_records(records: impl IntoIterator<Item = &'a CrowdingRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
            warnings: Vec::new(),
        }
    }

    pub fn records(&self) -> &[&'a CrowdingRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CrowdingRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn warnings(&self) -> &[FilterWarning] {
        &self.warnings
    }

    /// Applies `filter` on top of this subset.
    ///
    /// Line and direction go first. Time bounds are then resolved against
    /// what is left; if either label is missing there, the time filter is
    /// skipped and a [`FilterWarning`] is recorded instead. Station names are
    /// applied last so they never affect bound resolution.
    pub fn refine(&self, filter: &Filter) -> Subset<'a> {
        let mut warnings = self.warnings.clone();

        let direction = filter
            .direction
            .as_deref()
            .filter(|direction| *direction != ALL_DIRECTIONS);

        let mut records: Vec<&'a CrowdingRecord> = self
            .iter()
            .filter(|r| filter.line.as_deref().is_none_or(|line| r.line == line))
            .filter(|r| direction.is_none_or(|direction| r.direction == direction))
            .collect();

        if let Some((start, end)) = &filter.time_range {
            match resolve_bounds(&records, start, end) {
                Ok((from, to)) => records.retain(|r| from <= r.time_order && r.time_order <= to),
                Err(missing) => {
                    let warning = FilterWarning::TimeBoundNotFound {
                        start: start.clone(),
                        end: end.clone(),
                        missing,
                    };
                    warn!(%warning, "Time filter skipped");
                    warnings.push(warning);
                }
            }
        }

        if !filter.stations.is_empty() {
            records.retain(|r| filter.stations.iter().any(|s| *s == r.station_name));
        }

        Subset { records, warnings }
    }
}

/// Looks up the `time_order` for both labels, or returns the labels not found.
fn resolve_bounds(
    records: &[&CrowdingRecord],
    start: &str,
    end: &str,
) -> Result<(u32, u32), Vec<String>> {
    let lookup = |label: &str| {
        records
            .iter()
            .find(|r| r.time_label == label)
            .map(|r| r.time_order)
    };

    match (lookup(start), lookup(end)) {
        (Some(from), Some(to)) => Ok((from, to)),
        (from, to) => Err([(start, from), (end, to)]
            .into_iter()
            .filter(|(_, order)| order.is_none())
            .map(|(label, _)| label.to_string())
            .collect()),
    }
}

/// Filters the whole dataset. See [`Subset::refine`].
pub fn filter<'a>(dataset: &'a CrowdingDataset, filter: &Filter) -> Subset<'a> {
    dataset.all().refine(filter)
}
