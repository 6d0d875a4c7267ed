//! Single-segment planning with backbone fallback.

use waymark_core::{
    BoundaryOracle, GeoPoint, PlanError, RouteCandidate, RouteError, RouteProvider, VehicleProfile,
};

use super::BorderAwarePlanner;

impl<P, O> BorderAwarePlanner<P, O>
where
    P: RouteProvider,
    O: BoundaryOracle,
{
    /// Plan one segment. At most two provider calls are made.
    pub(super) fn segment(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        profile: VehicleProfile,
    ) -> Result<RouteCandidate, PlanError> {
        let requester = self.requester();
        let policy = self.config.segment_policy;
        let direct = requester.request_route(&[start, end], profile, policy);

        if let Ok(candidate) = &direct
            && candidate.compliance.is_valid
        {
            log::info!(
                "direct route {start} -> {end} accepted ({:.1}% outside)",
                candidate.compliance.percentage_outside()
            );
            return direct.map_err(PlanError::from);
        }
        if let Err(err) = &direct {
            log::warn!("direct route {start} -> {end} failed: {err}");
        }

        let selector = self.selector();
        if !selector.is_route_likely_crossing_border(start, end) {
            log::debug!("{start} -> {end} is not a likely border crossing; keeping direct result");
            return direct.map_err(PlanError::from);
        }
        let waypoints = selector.select_waypoints(start, end, self.config.segment_waypoints);
        if waypoints.is_empty() {
            log::debug!("no backbone waypoints between {start} and {end}");
            return direct.map_err(PlanError::from);
        }

        let mut points = Vec::with_capacity(waypoints.len().saturating_add(2));
        points.push(start);
        points.extend_from_slice(&waypoints);
        points.push(end);
        let augmented = requester
            .request_route(&points, profile, policy)
            .map(|candidate| candidate.with_waypoints(waypoints));

        self.choose_segment(direct, augmented)
    }

    fn choose_segment(
        &self,
        direct: Result<RouteCandidate, RouteError>,
        augmented: Result<RouteCandidate, RouteError>,
    ) -> Result<RouteCandidate, PlanError> {
        match (direct, augmented) {
            (Ok(direct_route), Ok(augmented_route)) => {
                if improves_by(
                    &augmented_route,
                    &direct_route,
                    self.config.improvement_margin,
                ) {
                    log::info!(
                        "waypoint route chosen: {:.1}% outside vs {:.1}% direct",
                        augmented_route.compliance.percentage_outside(),
                        direct_route.compliance.percentage_outside()
                    );
                    Ok(augmented_route)
                } else {
                    log::info!(
                        "direct route kept: waypoints gave {:.1}% outside vs {:.1}% direct",
                        augmented_route.compliance.percentage_outside(),
                        direct_route.compliance.percentage_outside()
                    );
                    Ok(direct_route)
                }
            }
            (Err(_), Ok(augmented_route)) => {
                log::info!(
                    "waypoint route chosen after direct failure ({:.1}% outside)",
                    augmented_route.compliance.percentage_outside()
                );
                Ok(augmented_route)
            }
            (Ok(direct_route), Err(err)) => {
                log::warn!("waypoint route failed, keeping direct route: {err}");
                Ok(direct_route)
            }
            (Err(_), Err(err)) => Err(PlanError::Upstream(err)),
        }
    }
}

/// Whether `candidate` is outside the territory less than `incumbent` by at
/// least `margin`.
#[expect(clippy::float_arithmetic, reason = "compares compliance fractions")]
const fn improves_by(candidate: &RouteCandidate, incumbent: &RouteCandidate, margin: f64) -> bool {
    incumbent.fraction_outside() - candidate.fraction_outside() >= margin
}
