//! Runtime settings.
//!
//! Built from defaults, then an optional JSON file, then environment
//! variables. Command-line flags are layered on top by the binary.
//!
//! ```json
//! {
//!   "csv_path": "data/crowding.csv",
//!   "encodings": ["cp949", "utf-8"],
//!   "top_n": 10
//! }
//! ```

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::encoding::{self, DEFAULT_ENCODINGS, TextEncoding};
use crate::query::peaks::DEFAULT_MAX_STATIONS;
use crate::query::ranking::DEFAULT_TOP_N;

pub const DEFAULT_CSV_FILE: &str = "서울교통공사_지하철혼잡도정보_20250930.csv";

pub const ENV_CONFIG: &str = "CROWDING_CONFIG";
pub const ENV_CSV_PATH: &str = "CROWDING_CSV_PATH";
pub const ENV_ENCODINGS: &str = "CROWDING_ENCODINGS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub csv_path: PathBuf,
    pub encodings: Vec<TextEncoding>,
    pub top_n: usize,
    pub max_stations: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_FILE),
            encodings: DEFAULT_ENCODINGS.to_vec(),
            top_n: DEFAULT_TOP_N,
            max_stations: DEFAULT_MAX_STATIONS,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file at `path`. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file: {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("invalid settings file: {}", path.display()))?;
        settings.validate()
    }

    /// Defaults, then the file named by `config` (or `CROWDING_CONFIG`), then
    /// `CROWDING_CSV_PATH` and `CROWDING_ENCODINGS`.
    pub fn resolve(config: Option<&Path>) -> Result<Self> {
        let config = config
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from));

        let settings = match config {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        settings.with_env(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, which maps an environment variable
    /// name to its value.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = lookup(ENV_CSV_PATH) {
            self.csv_path = PathBuf::from(path);
        }
        if let Some(list) = lookup(ENV_ENCODINGS) {
            self.encodings = encoding::parse_list(&list)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("invalid {ENV_ENCODINGS}"))?;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.encodings.is_empty() {
            return Err(anyhow!("at least one candidate encoding is required"));
        }
        if self.top_n == 0 {
            return Err(anyhow!("top_n must be at least 1"));
        }
        if self.max_stations == 0 {
            return Err(anyhow!("max_stations must be at least 1"));
        }
        Ok(self)
    }
}
