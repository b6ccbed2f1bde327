//! Output formatting and export for query results.
//!
//! Supports JSON serialization and CSV export of rankings.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use tracing::{debug, info};

use crate::query::types::RankingEntry;
use crate::query::utility::round1;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A [`RankingEntry`] as it appears in an export, numbers rounded to one decimal.
#[derive(Debug, Serialize)]
struct RankingRow<'a> {
    rank: usize,
    station_name: &'a str,
    station_code: &'a str,
    direction: &'a str,
    peak: f64,
    avg: f64,
    peak_time: &'a str,
}

impl<'a> From<&'a RankingEntry> for RankingRow<'a> {
    fn from(entry: &'a RankingEntry) -> Self {
        Self {
            rank: entry.rank,
            station_name: &entry.station_name,
            station_code: &entry.station_code,
            direction: &entry.direction,
            peak: round1(entry.peak),
            avg: round1(entry.avg),
            peak_time: &entry.peak_time,
        }
    }
}

/// Writes a ranking as CSV to `writer`, prefixed with a UTF-8 byte-order mark.
///
/// Columns are `rank, station_name, station_code, direction, peak, avg,
/// peak_time`. The header row is written even when `entries` is empty.
pub fn write_ranking<W: Write>(mut writer: W, entries: &[RankingEntry]) -> Result<()> {
    writer.write_all(UTF8_BOM)?;

    let mut csv = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record([
        "rank",
        "station_name",
        "station_code",
        "direction",
        "peak",
        "avg",
        "peak_time",
    ])?;
    for entry in entries {
        csv.serialize(RankingRow::from(entry))?;
    }
    csv.flush()?;

    Ok(())
}

/// Exports a ranking to a new CSV file at `path`, replacing any existing file.
pub fn export_ranking(path: &Path, entries: &[RankingEntry]) -> Result<()> {
    debug!(path = %path.display(), rows = entries.len(), "Exporting ranking");
    let file = File::create(path)
        .with_context(|| format!("failed to create export file: {}", path.display()))?;
    write_ranking(file, entries)
}

/// Export filename for a ranking of `line`, stamped with `now`.
pub fn export_file_name<Tz: TimeZone>(line: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("crowding_ranking_{}_{}.csv", line, now.format("%Y%m%d_%H%M%S"))
}

/// Joins `dir` with [`export_file_name`].
pub fn export_path_in<Tz: TimeZone>(dir: &Path, line: &str, now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    dir.join(export_file_name(line, now))
}
