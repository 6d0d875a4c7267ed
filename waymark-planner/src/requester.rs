//! One routing request plus its boundary evaluation.

use waymark_core::{
    BoundaryOracle, CompliancePolicy, GeoPoint, RouteCandidate, RouteError, RouteProvider,
    SamplingPolicy, VehicleProfile,
};

/// Sends a point sequence to the routing engine and scores the answer.
///
/// Each call makes exactly one provider request and never retries.
///
/// # Examples
/// ```
/// use waymark_core::test_support::StraightLineRouteProvider;
/// use waymark_core::{
///     CompliancePolicy, CountryBoundary, GeoPoint, RouteMethod, TerritoryConfig, VehicleProfile,
/// };
/// use waymark_planner::RouteRequester;
///
/// let territory = TerritoryConfig::vietnam();
/// let boundary = CountryBoundary::fallback(&territory);
/// let provider = StraightLineRouteProvider::default();
/// let requester = RouteRequester::new(&provider, &boundary, territory.sampling);
///
/// let points = [GeoPoint::new_unchecked(10.7769, 106.7009), GeoPoint::new_unchecked(10.7624, 106.6822)];
/// let candidate = requester.request_route(&points, VehicleProfile::Car, CompliancePolicy::strict())?;
/// assert_eq!(candidate.method, RouteMethod::Direct);
/// assert!(candidate.compliance.is_valid);
/// # Ok::<(), waymark_core::RouteError>(())
/// ```
#[derive(Debug)]
pub struct RouteRequester<'a, P: ?Sized, O: ?Sized> {
    provider: &'a P,
    oracle: &'a O,
    sampling: SamplingPolicy,
}

impl<'a, P, O> RouteRequester<'a, P, O>
where
    P: RouteProvider + ?Sized,
    O: BoundaryOracle + ?Sized,
{
    /// Pair a provider with the oracle that scores its answers.
    #[must_use]
    pub const fn new(provider: &'a P, oracle: &'a O, sampling: SamplingPolicy) -> Self {
        Self {
            provider,
            oracle,
            sampling,
        }
    }

    /// Route through `points` and evaluate the result under `policy`.
    ///
    /// The candidate is tagged [`waymark_core::RouteMethod::Direct`]; callers
    /// that injected waypoints retag it.
    ///
    /// # Errors
    /// Returns [`RouteError::InvalidInput`] for fewer than two points without
    /// contacting the provider, otherwise whatever the provider reports.
    pub fn request_route(
        &self,
        points: &[GeoPoint],
        profile: VehicleProfile,
        policy: CompliancePolicy,
    ) -> Result<RouteCandidate, RouteError> {
        if points.len() < 2 {
            return Err(RouteError::InvalidInput {
                message: format!("at least two points are required, got {}", points.len()),
            });
        }
        let path = self.provider.request_route(points, profile)?;
        let compliance = self
            .oracle
            .evaluate_route(&path.polyline, &self.sampling, policy);
        log::debug!(
            "routed {} points: {:.0} m, {:.1}% outside ({} accuracy)",
            points.len(),
            path.distance_m,
            compliance.percentage_outside(),
            compliance.accuracy
        );
        Ok(RouteCandidate::direct(path, points.to_vec(), compliance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use waymark_core::test_support::{MeridianBoundary, ScriptedRouteProvider, polyline_with_outside};
    use waymark_core::RoutePath;
    use std::time::Duration;

    #[rstest]
    fn single_point_never_reaches_provider() {
        let provider = ScriptedRouteProvider::with_responses(Vec::new());
        let oracle = MeridianBoundary { west_limit: 0.0 };
        let requester = RouteRequester::new(&provider, &oracle, SamplingPolicy::default());
        let err = requester
            .request_route(
                &[GeoPoint::new_unchecked(1.0, 1.0)],
                VehicleProfile::Car,
                CompliancePolicy::strict(),
            )
            .expect_err("one point is not a route");
        assert!(matches!(err, RouteError::InvalidInput { .. }));
        assert_eq!(provider.call_count(), 0);
    }

    #[rstest]
    fn evaluates_returned_polyline() {
        let polyline = polyline_with_outside(20, 1, 16.0, 106.0, 104.0);
        let provider = ScriptedRouteProvider::with_responses(vec![Ok(RoutePath::new(
            polyline,
            1_000.0,
            Duration::from_secs(60),
        ))]);
        let oracle = MeridianBoundary { west_limit: 105.0 };
        let requester = RouteRequester::new(&provider, &oracle, SamplingPolicy::default());
        let points = [
            GeoPoint::new_unchecked(16.0, 106.0),
            GeoPoint::new_unchecked(16.5, 106.0),
        ];

        let strict = requester
            .request_route(&points, VehicleProfile::Car, CompliancePolicy::strict())
            .expect("route");
        assert_eq!(strict.compliance.outside_points, 1);
        assert!(!strict.compliance.is_valid, "5% fails the strict policy");
        assert_eq!(strict.requested_points, points.to_vec());
        assert_eq!(provider.call_count(), 1);
    }

    #[rstest]
    fn provider_errors_pass_through() {
        let provider = ScriptedRouteProvider::with_responses(vec![Err(RouteError::NoPaths)]);
        let oracle = MeridianBoundary { west_limit: 0.0 };
        let requester = RouteRequester::new(&provider, &oracle, SamplingPolicy::default());
        let points = [
            GeoPoint::new_unchecked(1.0, 1.0),
            GeoPoint::new_unchecked(2.0, 2.0),
        ];
        let result = requester.request_route(&points, VehicleProfile::Bike, CompliancePolicy::search());
        assert_eq!(result, Err(RouteError::NoPaths));
    }
}
