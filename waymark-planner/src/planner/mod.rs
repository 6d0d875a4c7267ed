//! `BorderAwarePlanner`: waypoint-augmented segment planning and multi-stop
//! order search over any [`RouteProvider`] and [`BoundaryOracle`].

mod segment;
mod trip;

use waymark_core::{
    BoundaryOracle, Destination, GeoPoint, PlanError, RouteCandidate, RoutePlanner, RouteProvider,
    TerritoryConfig, TripPlan, VehicleProfile, WaypointSelector,
};

use crate::{PlannerConfig, RouteRequester};

/// Planner that keeps routes inside the territory by injecting backbone
/// waypoints.
///
/// The planner is generic over the engine boundaries: a routing provider and
/// a boundary oracle. It is `Send + Sync` whenever both are.
///
/// # Examples
/// ```
/// use waymark_core::test_support::StraightLineRouteProvider;
/// use waymark_core::{CountryBoundary, GeoPoint, RouteMethod, RoutePlanner, TerritoryConfig, VehicleProfile};
/// use waymark_planner::BorderAwarePlanner;
///
/// let territory = TerritoryConfig::vietnam();
/// let boundary = CountryBoundary::fallback(&territory);
/// let planner = BorderAwarePlanner::new(StraightLineRouteProvider::default(), boundary, territory);
///
/// let start = GeoPoint::new_unchecked(10.7769, 106.7009);
/// let market = GeoPoint::new_unchecked(10.7624, 106.6822);
/// let route = planner.plan_segment(start, market, VehicleProfile::Car)?;
/// assert_eq!(route.method, RouteMethod::Direct);
/// # Ok::<(), waymark_core::PlanError>(())
/// ```
#[derive(Debug)]
pub struct BorderAwarePlanner<P, O> {
    provider: P,
    oracle: O,
    territory: TerritoryConfig,
    config: PlannerConfig,
}

impl<P, O> BorderAwarePlanner<P, O>
where
    P: RouteProvider,
    O: BoundaryOracle,
{
    /// Construct a planner using default configuration.
    #[must_use]
    pub fn new(provider: P, oracle: O, territory: TerritoryConfig) -> Self {
        Self::with_config(provider, oracle, territory, PlannerConfig::default())
    }

    /// Construct a planner with explicit configuration.
    #[must_use]
    pub const fn with_config(
        provider: P,
        oracle: O,
        territory: TerritoryConfig,
        config: PlannerConfig,
    ) -> Self {
        Self {
            provider,
            oracle,
            territory,
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Territory the planner keeps routes inside.
    #[must_use]
    pub const fn territory(&self) -> &TerritoryConfig {
        &self.territory
    }

    /// Underlying routing provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Underlying boundary oracle.
    #[must_use]
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    const fn requester(&self) -> RouteRequester<'_, P, O> {
        RouteRequester::new(&self.provider, &self.oracle, self.territory.sampling)
    }

    const fn selector(&self) -> WaypointSelector<'_> {
        WaypointSelector::new(&self.territory)
    }
}

impl<P, O> RoutePlanner for BorderAwarePlanner<P, O>
where
    P: RouteProvider,
    O: BoundaryOracle,
{
    fn plan_segment(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        profile: VehicleProfile,
    ) -> Result<RouteCandidate, PlanError> {
        start.validate()?;
        end.validate()?;
        self.segment(start, end, profile)
    }

    fn plan_trip(
        &self,
        start: GeoPoint,
        destinations: &[Destination],
        profile: VehicleProfile,
    ) -> Result<TripPlan, PlanError> {
        self.trip(start, destinations, profile)
    }
}

#[cfg(test)]
mod tests;
