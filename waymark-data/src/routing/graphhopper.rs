//! GraphHopper Routing API response types.
//!
//! Only the fields Waymark uses are decoded. Coordinates arrive as
//! `[lon, lat]` (or `[lon, lat, elevation]`) because requests set
//! `points_encoded=false`.
//!
//! See: <https://docs.graphhopper.com/#tag/Routing-API>

use serde::Deserialize;

/// Body of a `GET /route` response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Alternative paths, best first. Empty when nothing was found.
    #[serde(default)]
    pub paths: Vec<ResponsePath>,
}

/// One path inside a [`RouteResponse`].
#[derive(Debug, Deserialize)]
pub struct ResponsePath {
    /// Length in metres.
    pub distance: f64,
    /// Travel time in milliseconds.
    pub time: u64,
    /// Decoded geometry; absent when `calc_points=false`.
    pub points: Option<PointList>,
    /// Turn instructions, passed through untouched.
    #[serde(default)]
    pub instructions: Vec<serde_json::Value>,
    /// `[min_lon, min_lat, max_lon, max_lat]`.
    pub bbox: Option<[f64; 4]>,
}

/// GeoJSON-style `LineString` coordinates.
#[derive(Debug, Deserialize)]
pub struct PointList {
    /// `[lon, lat]` pairs, optionally followed by elevation.
    pub coordinates: Vec<Vec<f64>>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason, e.g. "Cannot find point 0".
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "paths": [{
                "distance": 1234.5,
                "time": 98000,
                "bbox": [106.68, 10.76, 106.70, 10.78],
                "points": {"type": "LineString", "coordinates": [[106.70, 10.78], [106.68, 10.76, 4.0]]},
                "instructions": [{"text": "Continue", "distance": 1234.5}]
            }]
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        let path = response.paths.first().expect("one path");
        assert_eq!(path.time, 98_000);
        assert_eq!(path.instructions.len(), 1);
        let points = path.points.as_ref().expect("points requested");
        assert_eq!(points.coordinates.len(), 2);
    }

    #[test]
    fn missing_paths_default_to_empty() {
        let response: RouteResponse =
            serde_json::from_str(r#"{"info": {"took": 3}}"#).expect("should deserialise");
        assert!(response.paths.is_empty());
    }

    #[test]
    fn error_body_carries_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message": "Cannot find point 1", "hints": []}"#)
                .expect("should deserialise");
        assert_eq!(body.message.as_deref(), Some("Cannot find point 1"));
    }
}
