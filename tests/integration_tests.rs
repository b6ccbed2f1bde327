use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use encoding_rs::EUC_KR;
use subway_crowding::output::export_ranking;
use subway_crowding::query::{StationOrder, order_station_peaks, summarize};
use subway_crowding::{
    DatasetCache, Filter, LoadError, TextEncoding, filter, load_dataset, rank, station_peaks,
};
use tempfile::NamedTempFile;

const UTF8: &[TextEncoding] = &[TextEncoding::Utf8Sig, TextEncoding::Utf8];

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_crowding.csv")
}

fn temp_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn top(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[test]
fn test_two_slot_scenario() {
    let file = temp_file(
        "operator,line,code,name,direction,5시30분,5시40분\nSeoulMetro,1호선,150,StationA,상행,23,45\n"
            .as_bytes(),
    );
    let dataset = load_dataset(file.path(), UTF8).unwrap();

    let rows: Vec<_> = dataset
        .records()
        .iter()
        .map(|r| (r.time_label.as_str(), r.time_order, r.crowding))
        .collect();
    assert_eq!(rows, vec![("05:30", 330, 23.0), ("05:40", 340, 45.0)]);

    let ranking = rank(&dataset.all(), top(1));
    assert_eq!(ranking.len(), 1);
    assert_eq!(ranking[0].rank, 1);
    assert_eq!(ranking[0].peak, 45.0);
    assert_eq!(ranking[0].avg, 34.0);
    assert_eq!(ranking[0].peak_time, "05:40");
}

#[test]
fn test_fixture_loads_and_counts_drops() {
    let dataset = load_dataset(&fixture(), UTF8).unwrap();
    let stats = dataset.stats();

    assert_eq!(stats.identifier_rows, 7);
    assert_eq!(stats.max_rows(), 49);
    assert_eq!(stats.dropped_missing_crowding, 2);
    assert_eq!(dataset.len(), 47);
    assert_eq!(stats.encoding, Some(TextEncoding::Utf8Sig));
}

#[test]
fn test_fixture_filter_options() {
    let dataset = load_dataset(&fixture(), UTF8).unwrap();
    let options = dataset.options();

    assert_eq!(options.lines, vec!["1호선", "2호선"]);
    assert_eq!(options.directions[0], "all");
    assert_eq!(
        options.time_labels,
        vec!["05:30", "06:00", "07:30", "08:00", "23:30", "00:00", "00:30"]
    );

    let line_two = dataset.options_for_line("2호선");
    assert_eq!(line_two.directions, vec!["all", "내선", "외선"]);
    assert_eq!(line_two.stations, vec!["강남", "시청"]);
}

#[test]
fn test_fixture_ranking_by_line() {
    let dataset = load_dataset(&fixture(), UTF8).unwrap();
    let subset = filter(&dataset, &Filter::new().with_line("2호선"));
    let ranking = rank(&subset, top(2));

    assert_eq!(ranking.len(), 2);
    assert_eq!(
        (ranking[0].rank, ranking[0].station_name.as_str(), ranking[0].direction.as_str()),
        (1, "강남", "내선")
    );
    assert_eq!(ranking[0].peak, 150.2);
    assert_eq!(ranking[0].peak_time, "08:00");

    // 130.0 at both 07:30 and 08:00
    assert_eq!(ranking[1].station_name, "강남");
    assert_eq!(ranking[1].direction, "외선");
    assert_eq!(ranking[1].peak_time, "07:30");
    assert_eq!(ranking[1].station_code, "222");
}

#[test]
fn test_fixture_ranking_with_time_window() {
    let dataset = load_dataset(&fixture(), UTF8).unwrap();
    let f = Filter::new()
        .with_line("1호선")
        .with_direction("상행")
        .with_time_range("07:30", "08:00");
    let subset = filter(&dataset, &f);
    assert_eq!(subset.len(), 4);

    let ranking = rank(&subset, top(10));
    let summary: Vec<_> = ranking
        .iter()
        .map(|e| (e.rank, e.station_name.as_str(), e.peak))
        .collect();
    assert_eq!(summary, vec![(1, "서울역", 88.0), (2, "시청", 72.5)]);
}

#[test]
fn test_fixture_inverted_range_is_no_data() {
    let dataset = load_dataset(&fixture(), UTF8).unwrap();
    let subset = filter(&dataset, &Filter::new().with_time_range("00:30", "05:30"));

    assert!(subset.is_empty());
    assert!(rank(&subset, top(5)).is_empty());
    assert!(station_peaks(&subset).is_empty());
    assert!(summarize(&subset).is_none());
}

#[test]
fn test_fixture_station_peaks_ordering() {
    let dataset = load_dataset(&fixture(), UTF8).unwrap();
    let subset = filter(&dataset, &Filter::new().with_line("1호선"));

    let peaks = order_station_peaks(station_peaks(&subset), StationOrder::PeakDescending, 5);
    let peaks: Vec<_> = peaks
        .iter()
        .map(|p| (p.station_name.as_str(), p.peak_crowding))
        .collect();
    assert_eq!(peaks, vec![("서울역", 95.0), ("시청", 80.1)]);
}

#[test]
fn test_export_ranking_file() {
    let dataset = load_dataset(&fixture(), UTF8).unwrap();
    let ranking = rank(&filter(&dataset, &Filter::new().with_line("1호선")), top(1));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ranking.csv");
    export_ranking(&path, &ranking).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "rank,station_name,station_code,direction,peak,avg,peak_time");
    assert_eq!(lines[1], "1,서울역,150,하행,95.0,32.4,08:00");
}

#[test]
fn test_cp949_source_with_default_encodings() {
    let text = std::fs::read_to_string(fixture()).unwrap();
    let (encoded, _, had_errors) = EUC_KR.encode(&text);
    assert!(!had_errors);
    let file = temp_file(&encoded);

    let dataset = load_dataset(file.path(), subway_crowding::encoding::DEFAULT_ENCODINGS).unwrap();
    assert_eq!(dataset.len(), 47);
    assert_eq!(dataset.stats().encoding, Some(TextEncoding::Cp949));
    assert_eq!(dataset.records()[0].station_name, "서울역");
}

#[test]
fn test_schema_error() {
    let file = temp_file("운영기관,호선,역번호,역명,운행구분\nM,1호선,150,서울역,상행\n".as_bytes());
    let err = load_dataset(file.path(), UTF8).unwrap_err();
    assert!(matches!(err, LoadError::Schema { found: 5 }));
}

#[test]
fn test_all_placeholder_values_is_empty_dataset() {
    let file = temp_file(
        "운영기관,호선,역번호,역명,운행구분,5시30분,6시00분\nM,1호선,150,서울역,상행,-,없음\nM,1호선,151,시청,상행,,N/A\n"
            .as_bytes(),
    );
    let err = load_dataset(file.path(), UTF8).unwrap_err();
    assert!(matches!(err, LoadError::EmptyDataset));
}

#[test]
fn test_missing_file_is_not_found() {
    let err = load_dataset(Path::new("/nonexistent/crowding.csv"), UTF8).unwrap_err();
    assert!(matches!(err, LoadError::NotFound { .. }));
}

#[test]
fn test_undecodable_source() {
    let file = temp_file(&[0xFF; 8]);
    let err = load_dataset(file.path(), subway_crowding::encoding::DEFAULT_ENCODINGS).unwrap_err();
    match err {
        LoadError::Undecodable { attempted, .. } => {
            assert_eq!(attempted, vec!["cp949", "euc-kr", "utf-8-sig", "utf-8"]);
        }
        other => panic!("expected Undecodable, got {other:?}"),
    }
}

#[test]
fn test_cache_shares_dataset() {
    let cache = DatasetCache::new();
    let first = cache.get_or_load(&fixture(), UTF8).unwrap();
    let second = cache.get_or_load(&fixture(), UTF8).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}
