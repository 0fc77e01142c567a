//! # Server Status
//!
//! Fetching the remote reading and resolving it against the marker-file
//! overrides into the cycle's authoritative status.

pub mod errors;
pub mod fetcher;
pub mod overrides;
pub mod resolver;
pub mod types;

pub use errors::{FetchError, FetchResult};
pub use fetcher::{CfxStatusFetcher, FetcherConfig, FixedSource, StatusSource};
pub use overrides::{MarkerFileStore, OverrideFlags, OverrideStore, StaticOverrides};
pub use resolver::{resolve, DEFAULT_ADMIN_REASON, DEFAULT_MAINTENANCE_REASON};
pub use types::{RawServerReading, ResolvedStatus, StatusMode};
