//! Planner trait, trip plans and planning errors.

use serde::Serialize;
use thiserror::Error;

use crate::{
    Destination, GeoPoint, GeoPointError, RouteCandidate, RouteError, SafetyLabel, VehicleProfile,
};

/// Largest number of destinations a trip may visit.
pub const MAX_DESTINATIONS: usize = 4;

/// A planned multi-stop trip.
///
/// The route is always reported with its true compliance; a `danger` route
/// is returned as such rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPlan {
    /// The winning route through every destination.
    pub route: RouteCandidate,
    /// Indices into the caller's destination list, in visit order.
    pub visit_order: Vec<usize>,
    /// The destinations rearranged into visit order.
    pub ordered_destinations: Vec<Destination>,
    /// Display label for the winning route.
    pub safety: SafetyLabel,
    /// Orders that were sent to the routing engine.
    pub permutations_evaluated: usize,
    /// Orders skipped because they needed too many request points.
    pub permutations_skipped: usize,
}

/// Errors returned by [`RoutePlanner`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// The request was rejected before any network call.
    #[error("invalid planning request: {message}")]
    InvalidInput {
        /// What was wrong with the request.
        message: String,
    },
    /// A coordinate was malformed.
    #[error("malformed coordinates: {0}")]
    InvalidPoint(#[from] GeoPointError),
    /// The routing engine failed and no fallback was available.
    #[error("routing engine failed: {0}")]
    Upstream(#[from] RouteError),
    /// Every visiting order needed more request points than allowed.
    #[error("no visiting order fits the request limit ({skipped} skipped)")]
    NoValidOrder {
        /// Orders skipped for exceeding the limit.
        skipped: usize,
    },
    /// Every routed order failed upstream.
    #[error("all {attempts} routing attempts failed ({skipped} skipped): {last_error}")]
    AllAttemptsFailed {
        /// Orders sent to the engine.
        attempts: usize,
        /// Orders skipped for exceeding the limit.
        skipped: usize,
        /// Failure of the final attempt.
        #[source]
        last_error: RouteError,
    },
}

impl PlanError {
    /// True for errors raised before contacting the routing engine.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::InvalidPoint(_))
    }
}

/// Plan border-compliant routes.
///
/// Implementations must validate input before making any provider call and
/// must never relabel a route's compliance.
pub trait RoutePlanner {
    /// Route from `start` to `end`, adding backbone waypoints when the
    /// direct route leaves the territory.
    ///
    /// # Errors
    /// Returns [`PlanError::InvalidPoint`] for malformed coordinates and
    /// [`PlanError::Upstream`] when no route could be obtained.
    fn plan_segment(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        profile: VehicleProfile,
    ) -> Result<RouteCandidate, PlanError>;

    /// Visit every destination from `start` in the best order.
    ///
    /// # Errors
    /// Returns [`PlanError::InvalidInput`] unless there are between one and
    /// [`MAX_DESTINATIONS`] destinations, and [`PlanError::NoValidOrder`] or
    /// [`PlanError::AllAttemptsFailed`] when no order could be routed.
    fn plan_trip(
        &self,
        start: GeoPoint,
        destinations: &[Destination],
        profile: VehicleProfile,
    ) -> Result<TripPlan, PlanError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn input_errors_are_flagged() {
        let count = PlanError::InvalidInput {
            message: "too many destinations".to_owned(),
        };
        let point = PlanError::from(GeoPointError::LatitudeOutOfRange { lat: 95.0 });
        assert!(count.is_input_error());
        assert!(point.is_input_error());
        assert!(!PlanError::NoValidOrder { skipped: 2 }.is_input_error());
    }

    #[rstest]
    fn exhausted_attempts_keep_last_error() {
        let err = PlanError::AllAttemptsFailed {
            attempts: 2,
            skipped: 0,
            last_error: RouteError::NoPaths,
        };
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("routing engine returned no paths"));
    }
}
