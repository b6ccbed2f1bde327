//! Query engine over the canonical dataset.
//!
//! Every function here is pure: it borrows a dataset or a [`filter::Subset`]
//! and returns a freshly built result. Empty inputs give empty (or `None`)
//! results rather than errors.

pub mod filter;
pub mod peaks;
pub mod ranking;
pub mod station;
pub mod types;
pub mod utility;

pub use filter::{Filter, FilterWarning, Subset, filter};
pub use peaks::{order_station_peaks, station_peaks};
pub use ranking::rank;
pub use station::{station_profile, summarize};
pub use types::{RankingEntry, StationOrder, StationPeak, StationProfile, StationSample, SubsetSummary};
