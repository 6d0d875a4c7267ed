//! Forward and reverse geocoding abstraction.
//!
//! Geocoding turns free-text place names into coordinates and back. The
//! planner never geocodes; outer surfaces such as the CLI resolve names
//! before planning and label results afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::GeoPoint;

/// Best match for a forward geocoding query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    /// Resolved position.
    pub location: GeoPoint,
    /// Full place name as reported by the geocoder.
    pub display_name: String,
}

/// Result of reverse geocoding a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseGeocode {
    /// Full place name as reported by the geocoder.
    pub display_name: String,
    /// Structured address components, passed through untouched.
    #[serde(default)]
    pub address: serde_json::Map<String, serde_json::Value>,
}

/// Errors from [`Geocoder`] calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The query was blank.
    #[error("geocoding query must not be empty")]
    EmptyQuery,
    /// The service did not answer in time.
    #[error("geocoding request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL, without credentials.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Requested URL, without credentials.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The connection failed.
    #[error("network error contacting {url}: {message}")]
    NetworkError {
        /// Requested URL, without credentials.
        url: String,
        /// Transport error detail.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse geocoding response: {message}")]
    ParseError {
        /// Decoder error detail.
        message: String,
    },
}

/// Resolve place names to points and points to place names.
///
/// Both calls return `Ok(None)` when the service has no match.
pub trait Geocoder {
    /// Find the best match for `query`.
    ///
    /// # Errors
    /// Returns [`GeocodeError::EmptyQuery`] for blank input, or a transport
    /// error when the service cannot be reached.
    fn geocode(&self, query: &str) -> Result<Option<GeocodeMatch>, GeocodeError>;

    /// Describe the place at `point`.
    ///
    /// # Errors
    /// Returns a transport error when the service cannot be reached.
    fn reverse_geocode(&self, point: GeoPoint) -> Result<Option<ReverseGeocode>, GeocodeError>;
}
