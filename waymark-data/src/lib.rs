//! Adapters connecting Waymark to the outside world.
//!
//! Responsibilities:
//! - Route through a GraphHopper-compatible directions API.
//! - Load the authoritative country outline from GeoJSON, falling back to the
//!   territory's coarse geometry when the file is missing or unusable.
//! - Geocode place names through an HTTP geocoder.
//! - Memoise routing answers in an optional, persistable leg cache.
//!
//! Boundaries:
//! - Do not encode planning rules (they live in `waymark-core` and
//!   `waymark-planner`).
//! - Keep blocking I/O off async executors; HTTP adapters own a runtime and
//!   block on it behind the synchronous core traits.
//!
//! Invariants:
//! - Thread-safe by default where feasible.
//! - No global mutable state.

#![forbid(unsafe_code)]

mod boundary;
mod cache;
pub mod fs;
mod geocoding;
mod http;
pub mod routing;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use boundary::{BoundaryLoadError, load_boundary, load_boundary_or_fallback};
pub use cache::{CacheError, CacheStats, CachedRouteProvider, DEFAULT_MAX_ENTRIES};
pub use geocoding::{DEFAULT_GEOCODER_URL, GeocoderConfig, HttpGeocoder};
pub use http::ProviderBuildError;
