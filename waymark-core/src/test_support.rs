//! Deterministic doubles for route providers and boundary oracles.
//!
//! Available to this crate's tests and, through the `test-support` feature,
//! to downstream crates' tests.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use geo::{Distance, Haversine};

use crate::{
    BoundaryAccuracy, BoundaryOracle, GeoPoint, RouteError, RoutePath, RouteProvider,
    VehicleProfile,
};

/// Provider that "drives" in straight lines between the requested points.
///
/// The polyline is the request itself and the distance is the haversine
/// length of that polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightLineRouteProvider {
    /// Constant travel speed in metres per second.
    pub speed_mps: f64,
}

impl Default for StraightLineRouteProvider {
    fn default() -> Self {
        Self { speed_mps: 15.0 }
    }
}

impl RouteProvider for StraightLineRouteProvider {
    #[expect(clippy::float_arithmetic, reason = "travel time from distance and speed")]
    fn request_route(
        &self,
        points: &[GeoPoint],
        _profile: VehicleProfile,
    ) -> Result<RoutePath, RouteError> {
        if points.len() < 2 {
            return Err(RouteError::InvalidInput {
                message: format!("at least two points are required, got {}", points.len()),
            });
        }
        let distance_m = polyline_length_m(points);
        let seconds = if self.speed_mps > 0.0 {
            distance_m / self.speed_mps
        } else {
            0.0
        };
        Ok(RoutePath::new(
            points.to_vec(),
            distance_m,
            Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO),
        ))
    }
}

/// Haversine length of a polyline in metres.
#[must_use]
pub fn polyline_length_m(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .filter_map(|pair| match pair {
            [from, to] => Some(Haversine.distance(geo::Point::from(*from), geo::Point::from(*to))),
            _ => None,
        })
        .sum()
}

type ScriptFn = dyn Fn(&[GeoPoint], VehicleProfile) -> Result<RoutePath, RouteError> + Send + Sync;

enum Script {
    Queue(Mutex<VecDeque<Result<RoutePath, RouteError>>>),
    Function(Box<ScriptFn>),
}

/// Provider that answers from a script and records every request.
///
/// # Examples
/// ```
/// use waymark_core::test_support::ScriptedRouteProvider;
/// use waymark_core::{GeoPoint, RouteError, RouteProvider, VehicleProfile};
///
/// let provider = ScriptedRouteProvider::with_responses(vec![Err(RouteError::NoPaths)]);
/// let points = [GeoPoint::new_unchecked(10.0, 106.0), GeoPoint::new_unchecked(11.0, 106.0)];
/// assert_eq!(provider.request_route(&points, VehicleProfile::Car), Err(RouteError::NoPaths));
/// assert_eq!(provider.calls(), vec![points.to_vec()]);
/// ```
pub struct ScriptedRouteProvider {
    script: Script,
    calls: Mutex<Vec<Vec<GeoPoint>>>,
}

impl fmt::Debug for ScriptedRouteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedRouteProvider")
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

impl ScriptedRouteProvider {
    /// Answer each request with the next queued response.
    ///
    /// Requests beyond the end of the queue fail with a network error.
    #[must_use]
    pub fn with_responses(responses: Vec<Result<RoutePath, RouteError>>) -> Self {
        Self {
            script: Script::Queue(Mutex::new(responses.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer each request by calling `respond`.
    #[must_use]
    pub fn with_fn<F>(respond: F) -> Self
    where
        F: Fn(&[GeoPoint], VehicleProfile) -> Result<RoutePath, RouteError> + Send + Sync + 'static,
    {
        Self {
            script: Script::Function(Box::new(respond)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<GeoPoint>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl RouteProvider for ScriptedRouteProvider {
    fn request_route(
        &self,
        points: &[GeoPoint],
        profile: VehicleProfile,
    ) -> Result<RoutePath, RouteError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(points.to_vec());
        match &self.script {
            Script::Queue(queue) => queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| {
                    Err(RouteError::NetworkError {
                        url: "scripted://route".to_owned(),
                        message: "script exhausted".to_owned(),
                    })
                }),
            Script::Function(respond) => respond(points, profile),
        }
    }
}

/// Oracle treating everything east of a meridian as inside.
///
/// Handy for building polylines with a known fraction outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeridianBoundary {
    /// Westernmost longitude that is still inside.
    pub west_limit: f64,
}

impl BoundaryOracle for MeridianBoundary {
    fn is_inside(&self, point: GeoPoint) -> bool {
        point.lon >= self.west_limit
    }

    fn accuracy(&self) -> BoundaryAccuracy {
        BoundaryAccuracy::Authoritative
    }
}

/// Build a polyline of `total` points of which the first `outside` lie at
/// `outside_lon` and the rest at `inside_lon`, all at latitude `lat`.
#[must_use]
pub fn polyline_with_outside(
    total: usize,
    outside: usize,
    lat: f64,
    inside_lon: f64,
    outside_lon: f64,
) -> Vec<GeoPoint> {
    (0..total)
        .map(|index| {
            let lon = if index < outside { outside_lon } else { inside_lon };
            GeoPoint::new_unchecked(lat, lon)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn straight_line_distance_matches_haversine() {
        let points = [
            GeoPoint::new_unchecked(0.0, 0.0),
            GeoPoint::new_unchecked(0.0, 1.0),
        ];
        let path = StraightLineRouteProvider::default()
            .request_route(&points, VehicleProfile::Car)
            .expect("route");
        // One degree of longitude on the equator is roughly 111 km.
        assert!((path.distance_m - 111_195.0).abs() < 500.0);
        assert!(path.duration() > Duration::from_secs(7_000));
    }

    #[rstest]
    fn exhausted_script_reports_network_error() {
        let provider = ScriptedRouteProvider::with_responses(Vec::new());
        let points = [
            GeoPoint::new_unchecked(0.0, 0.0),
            GeoPoint::new_unchecked(0.0, 1.0),
        ];
        let err = provider
            .request_route(&points, VehicleProfile::Foot)
            .expect_err("empty script");
        assert!(matches!(err, RouteError::NetworkError { .. }));
        assert_eq!(provider.call_count(), 1);
    }

    #[rstest]
    fn polyline_helper_counts_outside_points() {
        let boundary = MeridianBoundary { west_limit: 105.0 };
        let polyline = polyline_with_outside(10, 3, 16.0, 106.0, 104.0);
        let outside = polyline
            .iter()
            .filter(|point| !boundary.is_inside(**point))
            .count();
        assert_eq!(outside, 3);
    }
}
