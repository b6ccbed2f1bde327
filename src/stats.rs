use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::encoding::TextEncoding;

/// Aggregate counts from one normalization run.
///
/// Per-row drops are never reported individually; these totals are the only
/// trace they leave.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LoadStats {
    pub loaded_at: Option<DateTime<Utc>>,
    pub encoding: Option<TextEncoding>,

    // source shape
    pub identifier_rows: usize,
    pub time_columns: usize,
    pub skipped_time_columns: usize,

    // reshape
    pub reshaped_rows: usize,
    pub dropped_unparsed_time: usize,
    pub dropped_missing_crowding: usize,
    pub kept_rows: usize,
}

impl LoadStats {
    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn dropped_rows(&self) -> usize {
        self.dropped_unparsed_time + self.dropped_missing_crowding
    }

    /// Share of reshaped rows that made it into the dataset.
    pub fn kept_pct(&self) -> f64 {
        Self::pct(self.kept_rows, self.reshaped_rows)
    }

    /// Upper bound on canonical rows: identifier rows times parsed time columns.
    pub fn max_rows(&self) -> usize {
        self.identifier_rows * (self.time_columns - self.skipped_time_columns)
    }

    /// Set source metadata (decode encoding and load time)
    pub fn with_source_info(mut self, encoding: TextEncoding) -> Self {
        self.encoding = Some(encoding);
        self.loaded_at = Some(Utc::now());
        self
    }
}
