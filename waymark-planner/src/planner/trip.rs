//! Multi-stop order search.

use waymark_core::{
    BoundaryOracle, Destination, GeoPoint, MAX_DESTINATIONS, PlanError, RouteCandidate,
    RouteError, RouteProvider, TripPlan, VehicleProfile,
};

use super::BorderAwarePlanner;
use crate::Permutations;

/// The best order found so far.
struct Incumbent {
    order: Vec<usize>,
    candidate: RouteCandidate,
}

/// Running totals across the permutation search.
#[derive(Default)]
struct SearchTally {
    attempts: usize,
    skipped: usize,
    last_error: Option<RouteError>,
}

impl<P, O> BorderAwarePlanner<P, O>
where
    P: RouteProvider,
    O: BoundaryOracle,
{
    pub(super) fn trip(
        &self,
        start: GeoPoint,
        destinations: &[Destination],
        profile: VehicleProfile,
    ) -> Result<TripPlan, PlanError> {
        validate_trip(start, destinations)?;

        if let [only] = destinations {
            let candidate = self.segment(start, only.location, profile)?;
            return Ok(TripPlan {
                safety: candidate.safety(),
                route: candidate,
                visit_order: vec![0],
                ordered_destinations: vec![only.clone()],
                permutations_evaluated: 1,
                permutations_skipped: 0,
            });
        }

        let mut tally = SearchTally::default();
        let mut best: Option<Incumbent> = None;
        for order in Permutations::new(destinations.len()) {
            let Some((points, waypoints)) = self.order_points(start, destinations, &order) else {
                tally.skipped = tally.skipped.saturating_add(1);
                log::warn!(
                    "skipping order {order:?}: more than {} request points",
                    self.config.max_request_points
                );
                continue;
            };
            tally.attempts = tally.attempts.saturating_add(1);
            match self
                .requester()
                .request_route(&points, profile, self.config.search_policy)
            {
                Ok(routed) => {
                    let candidate = routed.with_waypoints(waypoints);
                    log::debug!(
                        "order {order:?}: {:.0} m, {:.1}% outside",
                        candidate.distance_m(),
                        candidate.compliance.percentage_outside()
                    );
                    let replace = best.as_ref().is_none_or(|incumbent| {
                        is_better(&candidate, &incumbent.candidate, self.config.comparable_band)
                    });
                    if replace {
                        best = Some(Incumbent { order, candidate });
                    }
                }
                Err(err) => {
                    log::warn!("order {order:?} failed: {err}");
                    tally.last_error = Some(err);
                }
            }
        }

        let Some(winner) = best else {
            return Err(exhausted(tally));
        };
        log::info!(
            "best order {:?} of {} evaluated ({} skipped): {:.0} m, {:.1}% outside",
            winner.order,
            tally.attempts,
            tally.skipped,
            winner.candidate.distance_m(),
            winner.candidate.compliance.percentage_outside()
        );
        let ordered_destinations = winner
            .order
            .iter()
            .filter_map(|index| destinations.get(*index).cloned())
            .collect();
        Ok(TripPlan {
            safety: winner.candidate.safety(),
            route: winner.candidate,
            visit_order: winner.order,
            ordered_destinations,
            permutations_evaluated: tally.attempts,
            permutations_skipped: tally.skipped,
        })
    }

    /// Request points for one visiting order, with waypoints on crossing legs.
    ///
    /// Returns `None` when the order needs more points than allowed.
    fn order_points(
        &self,
        start: GeoPoint,
        destinations: &[Destination],
        order: &[usize],
    ) -> Option<(Vec<GeoPoint>, Vec<GeoPoint>)> {
        let selector = self.selector();
        let stops: Vec<GeoPoint> = std::iter::once(start)
            .chain(
                order
                    .iter()
                    .filter_map(|index| destinations.get(*index).map(|d| d.location)),
            )
            .collect();
        let mut points = Vec::with_capacity(stops.len());
        let mut waypoints = Vec::new();
        for leg in stops.windows(2) {
            let [from, to] = leg else { continue };
            points.push(*from);
            if selector.is_route_likely_crossing_border(*from, *to) {
                let leg_waypoints =
                    selector.select_waypoints(*from, *to, self.config.leg_waypoints);
                points.extend_from_slice(&leg_waypoints);
                waypoints.extend(leg_waypoints);
            }
        }
        points.extend(stops.last().copied());
        (points.len() <= self.config.max_request_points).then_some((points, waypoints))
    }
}

fn validate_trip(start: GeoPoint, destinations: &[Destination]) -> Result<(), PlanError> {
    if destinations.is_empty() || destinations.len() > MAX_DESTINATIONS {
        return Err(PlanError::InvalidInput {
            message: format!(
                "expected 1 to {MAX_DESTINATIONS} destinations, got {}",
                destinations.len()
            ),
        });
    }
    start.validate()?;
    for destination in destinations {
        destination.location.validate()?;
    }
    Ok(())
}

fn exhausted(tally: SearchTally) -> PlanError {
    match tally.last_error {
        Some(last_error) => PlanError::AllAttemptsFailed {
            attempts: tally.attempts,
            skipped: tally.skipped,
            last_error,
        },
        None => PlanError::NoValidOrder {
            skipped: tally.skipped,
        },
    }
}

/// Compliance bucket of `fraction` for a `band`-wide grid.
///
/// Buckets are fixed rather than relative so that scoring stays transitive.
#[expect(clippy::float_arithmetic, reason = "buckets compliance fractions")]
const fn compliance_bucket(fraction: f64, band: f64) -> f64 {
    if band > 0.0 {
        (fraction / band).floor()
    } else {
        fraction
    }
}

/// Whether `candidate` should replace `incumbent`.
///
/// Routes rank by compliance bucket first and distance second. Exact ties
/// keep the incumbent.
pub(crate) const fn is_better(
    candidate: &RouteCandidate,
    incumbent: &RouteCandidate,
    band: f64,
) -> bool {
    let candidate_bucket = compliance_bucket(candidate.fraction_outside(), band);
    let incumbent_bucket = compliance_bucket(incumbent.fraction_outside(), band);
    if candidate_bucket < incumbent_bucket {
        true
    } else if candidate_bucket > incumbent_bucket {
        false
    } else {
        candidate.distance_m() < incumbent.distance_m()
    }
}
