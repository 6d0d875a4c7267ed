//! Tuning knobs for [`BorderAwarePlanner`](crate::BorderAwarePlanner).

use serde::Serialize;
use waymark_core::CompliancePolicy;

/// Configuration for [`BorderAwarePlanner`](crate::BorderAwarePlanner).
///
/// # Examples
/// ```
/// use waymark_planner::PlannerConfig;
///
/// let config = PlannerConfig::default().with_max_request_points(10);
/// assert_eq!(config.max_request_points, 10);
/// assert_eq!(config.segment_waypoints, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlannerConfig {
    /// Policy used to accept or retry a single segment.
    pub segment_policy: CompliancePolicy,
    /// Policy used while comparing visiting orders.
    pub search_policy: CompliancePolicy,
    /// Waypoints injected into a retried segment.
    pub segment_waypoints: usize,
    /// Waypoints injected into each crossing leg of a trip.
    pub leg_waypoints: usize,
    /// Orders needing more request points than this are skipped.
    pub max_request_points: usize,
    /// Minimum drop in fraction outside for a waypoint route to replace the
    /// direct one.
    pub improvement_margin: f64,
    /// Width of the compliance buckets; routes in one bucket compare on distance.
    pub comparable_band: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            segment_policy: CompliancePolicy::strict(),
            search_policy: CompliancePolicy::search(),
            segment_waypoints: 3,
            leg_waypoints: 2,
            max_request_points: 15,
            improvement_margin: 0.01,
            comparable_band: 0.01,
        }
    }
}

impl PlannerConfig {
    /// Set the single-segment acceptance policy.
    #[must_use]
    pub const fn with_segment_policy(mut self, policy: CompliancePolicy) -> Self {
        self.segment_policy = policy;
        self
    }

    /// Set the multi-stop search policy.
    #[must_use]
    pub const fn with_search_policy(mut self, policy: CompliancePolicy) -> Self {
        self.search_policy = policy;
        self
    }

    /// Set how many waypoints a retried segment may use.
    #[must_use]
    pub const fn with_segment_waypoints(mut self, count: usize) -> Self {
        self.segment_waypoints = count;
        self
    }

    /// Set how many waypoints each crossing trip leg may use.
    #[must_use]
    pub const fn with_leg_waypoints(mut self, count: usize) -> Self {
        self.leg_waypoints = count;
        self
    }

    /// Set the per-request point cap.
    #[must_use]
    pub const fn with_max_request_points(mut self, limit: usize) -> Self {
        self.max_request_points = limit;
        self
    }

    /// Set the improvement margin for waypoint routes.
    #[must_use]
    pub const fn with_improvement_margin(mut self, margin: f64) -> Self {
        self.improvement_margin = margin;
        self
    }

    /// Set the comparable band for order scoring.
    #[must_use]
    pub const fn with_comparable_band(mut self, band: f64) -> Self {
        self.comparable_band = band;
        self
    }
}
