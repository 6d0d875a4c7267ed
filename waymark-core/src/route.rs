//! Routes returned by the routing engine and the candidates built from them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ComplianceReport, GeoPoint, SafetyLabel};

/// One path as answered by the routing engine.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use waymark_core::{GeoPoint, RoutePath};
///
/// let path = RoutePath::new(
///     vec![GeoPoint::new_unchecked(10.0, 106.0), GeoPoint::new_unchecked(10.1, 106.1)],
///     15_000.0,
///     Duration::from_secs(900),
/// );
/// assert_eq!(path.duration(), Duration::from_secs(900));
/// assert!(path.instructions.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    /// Route geometry in travel order.
    pub polyline: Vec<GeoPoint>,
    /// Total length in metres.
    pub distance_m: f64,
    /// Estimated travel time in milliseconds.
    pub duration_ms: u64,
    /// Turn-by-turn instructions passed through untouched.
    #[serde(default)]
    pub instructions: Vec<serde_json::Value>,
    /// `[min_lon, min_lat, max_lon, max_lat]` when the engine supplies it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
}

impl RoutePath {
    /// Build a path without instructions or bounding box.
    #[must_use]
    pub fn new(polyline: Vec<GeoPoint>, distance_m: f64, duration: Duration) -> Self {
        Self {
            polyline,
            distance_m,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            instructions: Vec::new(),
            bbox: None,
        }
    }

    /// Attach pass-through instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: Vec<serde_json::Value>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Attach the engine's bounding box.
    #[must_use]
    pub const fn with_bbox(mut self, bbox: [f64; 4]) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Estimated travel time.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// How a candidate route was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteMethod {
    /// Requested straight between the caller's points.
    Direct,
    /// Requested through backbone waypoints.
    WaypointAugmented,
}

/// A routed path together with how it was requested and how compliant it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCandidate {
    /// The engine's answer.
    pub path: RoutePath,
    /// Every point sent to the engine, waypoints included.
    pub requested_points: Vec<GeoPoint>,
    /// Backbone waypoints inserted by the planner.
    #[serde(default)]
    pub waypoints: Vec<GeoPoint>,
    /// Direct or waypoint-augmented.
    pub method: RouteMethod,
    /// Boundary evaluation of `path.polyline`.
    pub compliance: ComplianceReport,
}

impl RouteCandidate {
    /// A direct candidate with no injected waypoints.
    #[must_use]
    pub const fn direct(
        path: RoutePath,
        requested_points: Vec<GeoPoint>,
        compliance: ComplianceReport,
    ) -> Self {
        Self {
            path,
            requested_points,
            waypoints: Vec::new(),
            method: RouteMethod::Direct,
            compliance,
        }
    }

    /// Mark the candidate as routed through `waypoints`.
    ///
    /// An empty list leaves the candidate direct.
    #[must_use]
    pub fn with_waypoints(mut self, waypoints: Vec<GeoPoint>) -> Self {
        self.method = if waypoints.is_empty() {
            RouteMethod::Direct
        } else {
            RouteMethod::WaypointAugmented
        };
        self.waypoints = waypoints;
        self
    }

    /// Fraction of sampled points outside the territory.
    #[must_use]
    pub const fn fraction_outside(&self) -> f64 {
        self.compliance.fraction_outside
    }

    /// Route length in metres.
    #[must_use]
    pub const fn distance_m(&self) -> f64 {
        self.path.distance_m
    }

    /// Display label for the route.
    #[must_use]
    pub const fn safety(&self) -> SafetyLabel {
        self.compliance.safety()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundaryAccuracy, CompliancePolicy};
    use rstest::rstest;

    fn report(outside: usize) -> ComplianceReport {
        ComplianceReport::from_counts(
            10,
            10,
            outside,
            CompliancePolicy::strict(),
            BoundaryAccuracy::Authoritative,
        )
    }

    #[rstest]
    fn waypoints_switch_method() {
        let path = RoutePath::new(Vec::new(), 1.0, Duration::ZERO);
        let candidate = RouteCandidate::direct(path, Vec::new(), report(0));
        assert_eq!(candidate.method, RouteMethod::Direct);

        let augmented = candidate
            .clone()
            .with_waypoints(vec![GeoPoint::new_unchecked(16.0, 107.0)]);
        assert_eq!(augmented.method, RouteMethod::WaypointAugmented);
        assert_eq!(augmented.waypoints.len(), 1);

        assert_eq!(candidate.with_waypoints(Vec::new()).method, RouteMethod::Direct);
    }

    #[rstest]
    fn method_serialises_kebab_case() {
        let json = serde_json::to_string(&RouteMethod::WaypointAugmented).expect("encode method");
        assert_eq!(json, "\"waypoint-augmented\"");
    }

    #[rstest]
    fn safety_follows_compliance() {
        let path = RoutePath::new(Vec::new(), 1.0, Duration::ZERO);
        let candidate = RouteCandidate::direct(path, Vec::new(), report(5));
        assert_eq!(candidate.safety(), SafetyLabel::Danger);
        assert!((candidate.fraction_outside() - 0.5).abs() < 1e-12);
    }
}
