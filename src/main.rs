//! CLI entry point for the subway crowding tool.
//!
//! Loads the wide crowding table once per process, then answers one query:
//! filter options, a peak ranking (optionally exported as CSV), station peaks,
//! station profiles, or a summary of the filtered subset.

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use subway_crowding::{
    CrowdingDataset, DatasetCache, Filter,
    config::Settings,
    encoding, filter,
    output::{export_path_in, export_ranking, print_json},
    query::{
        StationOrder, StationProfile, order_station_peaks, rank, station::MAX_COMPARED_STATIONS,
        station_peaks, station_profile, summarize,
    },
};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "subway_crowding")]
#[command(about = "Normalize and query subway crowding tables", long_about = None)]
struct Cli {
    /// Crowding CSV to load (overrides settings and CROWDING_CSV_PATH)
    #[arg(long, global = true, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// JSON settings file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Candidate encodings tried in order, e.g. "cp949,utf-8"
    #[arg(long, global = true, value_name = "LIST")]
    encoding: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Line to keep, matched exactly (e.g. "2호선")
    #[arg(short, long)]
    line: Option<String>,

    /// Direction to keep, or "all"
    #[arg(short, long)]
    direction: Option<String>,

    /// Start of the time range, inclusive
    #[arg(long, value_name = "HH:MM", requires = "to")]
    from: Option<String>,

    /// End of the time range, inclusive
    #[arg(long, value_name = "HH:MM", requires = "from")]
    to: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> Filter {
        let mut f = Filter::new();
        if let Some(line) = &self.line {
            f = f.with_line(line);
        }
        if let Some(direction) = &self.direction {
            f = f.with_direction(direction);
        }
        if let (Some(from), Some(to)) = (&self.from, &self.to) {
            f = f.with_time_range(from, to);
        }
        f
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    /// By station name
    Name,
    /// By peak crowding, highest first
    Peak,
}

impl From<SortArg> for StationOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Name => StationOrder::Alphabetical,
            SortArg::Peak => StationOrder::PeakDescending,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List lines, directions, stations and time slots available for filtering
    Options {
        /// Restrict directions, stations and time slots to this line
        #[arg(short, long)]
        line: Option<String>,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Rank stations by peak crowding
    Rank {
        #[command(flatten)]
        filter: FilterArgs,

        /// Number of stations to rank (defaults to the configured top_n)
        #[arg(short = 'n', long)]
        top_n: Option<NonZeroUsize>,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write the ranking to this CSV file
        #[arg(short, long, value_name = "FILE", conflicts_with = "export_dir")]
        export: Option<PathBuf>,

        /// Write the ranking to a timestamped CSV file in this directory
        #[arg(long, value_name = "DIR")]
        export_dir: Option<PathBuf>,
    },
    /// Peak crowding per station, ordered for display
    Peaks {
        #[command(flatten)]
        filter: FilterArgs,

        /// Display ordering
        #[arg(short, long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,

        /// Maximum number of stations to show (defaults to the configured max_stations)
        #[arg(short, long)]
        max_stations: Option<NonZeroUsize>,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Peak, average, peak time and time series for up to three stations
    Station {
        #[command(flatten)]
        filter: FilterArgs,

        /// Station name; repeat to compare stations
        #[arg(short = 's', long = "name", required = true)]
        names: Vec<String>,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Row count, station count and crowding range of the filtered subset
    Summary {
        #[command(flatten)]
        filter: FilterArgs,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/subway_crowding.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("subway_crowding.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::resolve(cli.config.as_deref())?;
    if let Some(csv) = cli.csv {
        settings.csv_path = csv;
    }
    if let Some(list) = &cli.encoding {
        settings.encodings = encoding::parse_list(list).map_err(anyhow::Error::msg)?;
        if settings.encodings.is_empty() {
            bail!("--encoding needs at least one encoding");
        }
    }

    let cache = DatasetCache::new();
    let dataset = match cache.get_or_load(&settings.csv_path, &settings.encodings) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!(error = %e, "Failed to load dataset");
            return Err(e.into());
        }
    };

    match cli.command {
        Commands::Options { line, json } => {
            let options = match &line {
                Some(line) => dataset.options_for_line(line),
                None => dataset.options(),
            };
            if json {
                print_json(&options)?;
            } else {
                info!(lines = ?options.lines, "Lines");
                info!(directions = ?options.directions, "Directions");
                info!(count = options.stations.len(), stations = ?options.stations, "Stations");
                info!(
                    count = options.time_labels.len(),
                    first = ?options.time_labels.first(),
                    last = ?options.time_labels.last(),
                    "Time slots"
                );
            }
        }
        Commands::Rank {
            filter: args,
            top_n,
            json,
            export,
            export_dir,
        } => {
            let top_n = match top_n {
                Some(n) => n,
                None => NonZeroUsize::new(settings.top_n).context("top_n must be at least 1")?,
            };
            let subset = filter(&dataset, &args.to_filter());
            let ranking = rank(&subset, top_n);

            if ranking.is_empty() {
                no_data();
            } else if json {
                print_json(&ranking)?;
            } else {
                for entry in &ranking {
                    info!(
                        rank = entry.rank,
                        station = %entry.station_name,
                        code = %entry.station_code,
                        direction = %entry.direction,
                        peak = %format!("{:.1}", entry.peak),
                        avg = %format!("{:.1}", entry.avg),
                        peak_time = %entry.peak_time,
                        "Ranking entry"
                    );
                }
            }

            let export_path = match (export, export_dir) {
                (Some(path), _) => Some(path),
                (None, Some(dir)) => {
                    let line = args.line.as_deref().unwrap_or("all");
                    Some(export_path_in(&dir, line, &Local::now()))
                }
                (None, None) => None,
            };
            if let Some(path) = export_path {
                export_ranking(&path, &ranking)?;
                info!(path = %path.display(), rows = ranking.len(), "Ranking exported");
            }
        }
        Commands::Peaks {
            filter: args,
            sort,
            max_stations,
            json,
        } => {
            let subset = filter(&dataset, &args.to_filter());
            let cap = max_stations.map_or(settings.max_stations, NonZeroUsize::get);
            let peaks = order_station_peaks(station_peaks(&subset), sort.into(), cap);

            if peaks.is_empty() {
                no_data();
            } else if json {
                print_json(&peaks)?;
            } else {
                for peak in &peaks {
                    info!(
                        station = %peak.station_name,
                        peak = %format!("{:.1}", peak.peak_crowding),
                        "Station peak"
                    );
                }
            }
        }
        Commands::Station {
            filter: args,
            names,
            json,
        } => {
            if names.len() > MAX_COMPARED_STATIONS {
                bail!("at most {MAX_COMPARED_STATIONS} stations can be compared");
            }
            let subset = filter(&dataset, &args.to_filter().with_stations(names.iter()));

            for name in &names {
                let Some(profile) = station_profile(&subset, name) else {
                    warn!(station = %name, "No data for station under the selected filters");
                    continue;
                };
                if json {
                    print_json(&profile)?;
                } else {
                    log_station_profile(&profile);
                }
            }
        }
        Commands::Summary { filter: args, json } => {
            let subset = filter(&dataset, &args.to_filter());
            match summarize(&subset) {
                None => no_data(),
                Some(summary) if json => print_json(&summary)?,
                Some(summary) => info!(
                    rows = summary.rows,
                    stations = summary.station_count,
                    max = %format!("{:.1}", summary.max),
                    avg = %format!("{:.1}", summary.avg),
                    min = %format!("{:.1}", summary.min),
                    "Subset summary"
                ),
            }
        }
    }

    log_load_stats(&dataset);
    Ok(())
}

fn no_data() {
    info!("No data matches the selected filters");
}

fn log_station_profile(profile: &StationProfile) {
    info!(
        station = %profile.station_name,
        peak = %format!("{:.1}", profile.peak),
        avg = %format!("{:.1}", profile.avg),
        peak_time = %profile.peak_time,
        samples = profile.samples.len(),
        "Station profile"
    );
    for sample in &profile.samples {
        info!(
            time = %sample.time_label,
            direction = %sample.direction,
            crowding = %format!("{:.1}", sample.crowding),
            "Station sample"
        );
    }
}

fn log_load_stats(dataset: &CrowdingDataset) {
    let stats = dataset.stats();
    tracing::debug!(
        encoding = ?stats.encoding,
        identifier_rows = stats.identifier_rows,
        time_columns = stats.time_columns,
        skipped_time_columns = stats.skipped_time_columns,
        dropped_unparsed_time = stats.dropped_unparsed_time,
        dropped_missing_crowding = stats.dropped_missing_crowding,
        kept_rows = stats.kept_rows,
        "Load statistics"
    );
}
