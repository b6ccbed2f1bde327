//! Wide table → canonical long-format dataset.

use std::path::Path;

use tracing::{debug, info};

use crate::dataset::{CrowdingDataset, CrowdingRecord};
use crate::encoding::TextEncoding;
use crate::error::LoadError;
use crate::parser::{RawTable, read_table};
use crate::schema::TableSchema;
use crate::stats::LoadStats;

/// Reads, decodes and normalizes the crowding table at `path`.
///
/// # Errors
///
/// Any of the fatal [`LoadError`] variants: missing file, no candidate
/// encoding fits, too few columns, or no usable rows.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_dataset(path: &Path, encodings: &[TextEncoding]) -> Result<CrowdingDataset, LoadError> {
    let (raw, encoding) = read_table(path, encodings)?;
    let dataset = normalize_with(&raw, LoadStats::default().with_source_info(encoding))?;

    info!(
        encoding = %encoding,
        rows = dataset.len(),
        dropped = dataset.stats().dropped_rows(),
        skipped_columns = dataset.stats().skipped_time_columns,
        "Dataset loaded"
    );
    Ok(dataset)
}

/// Reshapes a raw table into the canonical dataset.
///
/// Rows are produced column by column: every identifier row for the first
/// time column, then every row for the second, and so on. Columns whose
/// header is not a time slot and cells that are not a crowding value are
/// dropped silently and only counted.
///
/// # Errors
///
/// [`LoadError::Schema`] for fewer than six columns,
/// [`LoadError::EmptyDataset`] if nothing survives.
pub fn normalize(raw: &RawTable) -> Result<CrowdingDataset, LoadError> {
    normalize_with(raw, LoadStats::default())
}

fn normalize_with(raw: &RawTable, stats: LoadStats) -> Result<CrowdingDataset, LoadError> {
    let schema = TableSchema::from_headers(&raw.headers)?;

    let mut stats = LoadStats {
        identifier_rows: raw.rows.len(),
        time_columns: schema.time_columns.len(),
        skipped_time_columns: schema.skipped_time_columns(),
        ..stats
    };

    let mut records = Vec::with_capacity(stats.max_rows());

    for column in schema.time_columns.iter().filter(|c| c.slot.is_none()) {
        debug!(header = %column.header, "Skipping column without a time slot");
    }
    stats.dropped_unparsed_time = stats.skipped_time_columns * raw.rows.len();
    stats.reshaped_rows = stats.dropped_unparsed_time;

    for (column, slot) in schema.valid_time_columns() {
        let time_label = slot.label();
        let time_order = slot.order();

        for row in &raw.rows {
            stats.reshaped_rows += 1;

            let Some(crowding) = row.get(column.index).and_then(|cell| parse_crowding(cell))
            else {
                stats.dropped_missing_crowding += 1;
                continue;
            };

            let identifier = |index: usize| row.get(index).cloned().unwrap_or_default();
            records.push(CrowdingRecord {
                operator: identifier(schema.operator),
                line: identifier(schema.line),
                station_code: identifier(schema.station_code),
                station_name: identifier(schema.station_name),
                direction: identifier(schema.direction),
                time_label: time_label.clone(),
                time_order,
                crowding,
            });
        }
    }

    stats.kept_rows = records.len();
    debug!(
        reshaped = stats.reshaped_rows,
        kept = stats.kept_rows,
        kept_pct = stats.kept_pct(),
        "Normalization finished"
    );

    if records.is_empty() {
        return Err(LoadError::EmptyDataset);
    }

    Ok(CrowdingDataset::new(records, stats))
}

/// Parses a crowding cell, stripping whitespace and thousands separators.
///
/// Empty, non-numeric, non-finite and negative values are `None`; a missing
/// reading is never treated as zero.
pub fn parse_crowding(cell: &str) -> Option<f64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    const HEADERS: [&str; 7] = ["operator", "line", "code", "name", "direction", "5시30분", "5시40분"];

    #[test]
    fn test_parse_crowding() {
        assert_eq!(parse_crowding(" 23 "), Some(23.0));
        assert_eq!(parse_crowding("1,234.5"), Some(1234.5));
        assert_eq!(parse_crowding("0"), Some(0.0));
        assert_eq!(parse_crowding(""), None);
        assert_eq!(parse_crowding("  "), None);
        assert_eq!(parse_crowding("-"), None);
        assert_eq!(parse_crowding("N/A"), None);
        assert_eq!(parse_crowding("NaN"), None);
        assert_eq!(parse_crowding("inf"), None);
        assert_eq!(parse_crowding("-3"), None);
    }

    #[test]
    fn test_normalize_two_slots() {
        let raw = table(
            &HEADERS,
            &[&["SeoulMetro", "1호선", "150", "StationA", "상행", "23", "45"]],
        );
        let dataset = normalize(&raw).unwrap();

        assert_eq!(dataset.len(), 2);
        let first = &dataset.records()[0];
        assert_eq!(first.operator, "SeoulMetro");
        assert_eq!(first.station_code, "150");
        assert_eq!(first.time_label, "05:30");
        assert_eq!(first.time_order, 330);
        assert_eq!(first.crowding, 23.0);

        let second = &dataset.records()[1];
        assert_eq!(second.time_label, "05:40");
        assert_eq!(second.time_order, 340);
        assert_eq!(second.crowding, 45.0);
    }

    #[test]
    fn test_normalize_is_column_major() {
        let raw = table(
            &HEADERS,
            &[
                &["M", "1호선", "150", "A", "상행", "1", "2"],
                &["M", "1호선", "151", "B", "상행", "3", "4"],
            ],
        );
        let dataset = normalize(&raw).unwrap();
        let values: Vec<_> = dataset.records().iter().map(|r| r.crowding).collect();
        assert_eq!(values, vec![1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_normalize_drops_bad_cells_and_headers() {
        let raw = table(
            &["operator", "line", "code", "name", "direction", "5시30분", "비고", "0시0분"],
            &[
                &["M", "1호선", "150", "A", "상행", "10", "x", ""],
                &["M", "1호선", "151", "B", "상행", "-", "y", "7"],
                &["M", "1호선", "152", "C", "상행", "12"],
            ],
        );
        let dataset = normalize(&raw).unwrap();
        let stats = dataset.stats();

        assert_eq!(dataset.len(), 3);
        assert_eq!(stats.identifier_rows, 3);
        assert_eq!(stats.skipped_time_columns, 1);
        assert_eq!(stats.reshaped_rows, 9);
        assert_eq!(stats.dropped_unparsed_time, 3);
        assert_eq!(stats.dropped_missing_crowding, 3);
        assert_eq!(stats.kept_rows, 3);
        assert!(dataset.len() <= stats.max_rows());

        let midnight = dataset
            .records()
            .iter()
            .find(|r| r.station_name == "B")
            .unwrap();
        assert_eq!(midnight.time_label, "00:00");
        assert_eq!(midnight.time_order, 1440);
    }

    #[test]
    fn test_normalize_skips_oversized_time_header() {
        let raw = table(
            &["operator", "line", "code", "name", "direction", "5시30분", "71582789시0분"],
            &[&["M", "1호선", "150", "A", "상행", "23", "45"]],
        );
        let dataset = normalize(&raw).unwrap();
        let stats = dataset.stats();

        assert_eq!(stats.skipped_time_columns, 1);
        assert_eq!(stats.dropped_unparsed_time, 1);
        assert_eq!(stats.reshaped_rows, 2);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].time_label, "05:30");
        assert_eq!(dataset.records()[0].crowding, 23.0);
    }

    #[test]
    fn test_normalize_full_when_nothing_dropped() {
        let raw = table(
            &HEADERS,
            &[
                &["M", "1호선", "150", "A", "상행", "1", "2"],
                &["M", "1호선", "150", "A", "하행", "3", "4"],
                &["M", "1호선", "151", "B", "상행", "5", "6"],
            ],
        );
        let dataset = normalize(&raw).unwrap();
        assert_eq!(dataset.len(), 3 * 2);
        assert_eq!(dataset.len(), dataset.stats().max_rows());
    }

    #[test]
    fn test_normalize_rejects_narrow_table() {
        let raw = table(&["a", "b", "c", "d", "e"], &[&["1", "2", "3", "4", "5"]]);
        assert!(matches!(normalize(&raw), Err(LoadError::Schema { found: 5 })));
    }

    #[test]
    fn test_normalize_rejects_all_placeholders() {
        let raw = table(
            &HEADERS,
            &[
                &["M", "1호선", "150", "A", "상행", "-", "N/A"],
                &["M", "1호선", "151", "B", "상행", "없음", ""],
            ],
        );
        assert!(matches!(normalize(&raw), Err(LoadError::EmptyDataset)));
    }

    #[test]
    fn test_normalize_rejects_when_no_header_parses() {
        let raw = table(
            &["a", "b", "c", "d", "e", "total"],
            &[&["M", "1호선", "150", "A", "상행", "5"]],
        );
        assert!(matches!(normalize(&raw), Err(LoadError::EmptyDataset)));
    }
}
