pub mod cache;
pub mod config;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod query;
pub mod schema;
pub mod stats;
pub mod timeslot;

pub use cache::DatasetCache;
pub use dataset::{ALL_DIRECTIONS, CrowdingDataset, CrowdingRecord, FilterOptions};
pub use encoding::TextEncoding;
pub use error::LoadError;
pub use normalize::{load_dataset, normalize};
pub use query::{Filter, Subset, filter, rank, station_peaks};
