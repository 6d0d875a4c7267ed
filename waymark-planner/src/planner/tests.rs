//! Tests for `BorderAwarePlanner`.

use std::time::Duration;

use rstest::{fixture, rstest};
use waymark_core::test_support::{
    MeridianBoundary, ScriptedRouteProvider, StraightLineRouteProvider, polyline_length_m,
};
use waymark_core::{
    BoundaryAccuracy, ComplianceReport, CompliancePolicy, CountryBoundary, Destination, GeoPoint,
    PlanError, RouteCandidate, RouteError, RouteMethod, RoutePath, RoutePlanner, RouteProvider,
    SafetyLabel, SamplingPolicy, TerritoryConfig, VehicleProfile,
};

use super::BorderAwarePlanner;
use super::trip::is_better;
use crate::PlannerConfig;

const HANOI: GeoPoint = GeoPoint::new_unchecked(21.0285, 105.8542);
const SAIGON: GeoPoint = GeoPoint::new_unchecked(10.7769, 106.7009);
const BEN_THANH: GeoPoint = GeoPoint::new_unchecked(10.7624, 106.6822);
const CAN_THO: GeoPoint = GeoPoint::new_unchecked(10.0452, 105.7469);
const VINH: GeoPoint = GeoPoint::new_unchecked(18.6761, 105.6815);
const VIENTIANE: GeoPoint = GeoPoint::new_unchecked(17.9757, 102.6331);

/// Everything west of 104E counts as abroad.
const WEST_OF_104: MeridianBoundary = MeridianBoundary { west_limit: 104.0 };

#[fixture]
fn territory() -> TerritoryConfig {
    TerritoryConfig::vietnam()
}

/// Provider whose two-point answers detour through Vientiane and whose
/// multi-point answers follow the requested points.
fn detouring_provider() -> ScriptedRouteProvider {
    ScriptedRouteProvider::with_fn(|points, _profile| {
        let polyline = match points {
            [from, to] => vec![*from, VIENTIANE, VIENTIANE, *to],
            _ => points.to_vec(),
        };
        let distance = polyline_length_m(&polyline);
        Ok(RoutePath::new(polyline, distance, Duration::from_secs(3_600)))
    })
}

/// Straight-line answers with every request recorded.
fn counting_straight_lines() -> ScriptedRouteProvider {
    ScriptedRouteProvider::with_fn(|points, profile| {
        StraightLineRouteProvider::default().request_route(points, profile)
    })
}

fn failing_direct_provider(error: RouteError) -> ScriptedRouteProvider {
    ScriptedRouteProvider::with_fn(move |points, _profile| match points {
        [_, _] => Err(error.clone()),
        _ => Ok(RoutePath::new(
            points.to_vec(),
            polyline_length_m(points),
            Duration::from_secs(60),
        )),
    })
}

fn candidate(fraction_outside: f64, distance_m: f64) -> RouteCandidate {
    let mut compliance = ComplianceReport::from_counts(
        0,
        0,
        0,
        CompliancePolicy::search(),
        BoundaryAccuracy::Authoritative,
    );
    compliance.fraction_outside = fraction_outside;
    RouteCandidate::direct(
        RoutePath::new(Vec::new(), distance_m, Duration::ZERO),
        Vec::new(),
        compliance,
    )
}

#[rstest]
fn inland_segment_is_routed_directly(territory: TerritoryConfig) {
    let boundary = CountryBoundary::fallback(&territory);
    let provider = counting_straight_lines();
    let planner = BorderAwarePlanner::new(&provider, boundary, territory);

    let route = planner
        .plan_segment(SAIGON, BEN_THANH, VehicleProfile::Car)
        .expect("inland segment should route");

    assert_eq!(route.method, RouteMethod::Direct);
    assert!(route.fraction_outside() < 0.01);
    assert!(route.distance_m() > 2_000.0 && route.distance_m() < 5_000.0);
    assert_eq!(route.compliance.accuracy, BoundaryAccuracy::CoarsePolygon);
    assert_eq!(provider.call_count(), 1);
}

#[rstest]
fn crossing_segment_switches_to_backbone(territory: TerritoryConfig) {
    let provider = detouring_provider();
    let planner = BorderAwarePlanner::new(&provider, WEST_OF_104, territory);

    let route = planner
        .plan_segment(HANOI, SAIGON, VehicleProfile::Car)
        .expect("segment should route");

    assert_eq!(route.method, RouteMethod::WaypointAugmented);
    assert!(!route.waypoints.is_empty() && route.waypoints.len() <= 3);
    assert!(route.compliance.is_valid);
    let calls = provider.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls.first().map(Vec::len), Some(2));
    assert_eq!(calls.get(1).and_then(|c| c.first()).copied(), Some(HANOI));
    assert_eq!(calls.get(1).and_then(|c| c.last()).copied(), Some(SAIGON));
}

#[rstest]
fn territory_sampling_reaches_the_compliance_check(territory: TerritoryConfig) {
    let provider = detouring_provider();
    // A stride of three over four points only looks at the two endpoints.
    let sparse = territory.with_sampling(SamplingPolicy {
        long_route_threshold: 3,
        stride: 3,
    });
    let planner = BorderAwarePlanner::new(&provider, WEST_OF_104, sparse);

    let route = planner
        .plan_segment(HANOI, SAIGON, VehicleProfile::Car)
        .expect("segment should route");

    assert_eq!(route.method, RouteMethod::Direct);
    assert!(route.compliance.is_valid);
    assert_eq!(provider.call_count(), 1);
}

#[rstest]
fn non_crossing_segment_keeps_failing_direct_route(territory: TerritoryConfig) {
    let provider = detouring_provider();
    let planner = BorderAwarePlanner::new(&provider, WEST_OF_104, territory);

    // Hanoi to Vinh spans under three degrees of latitude.
    let route = planner
        .plan_segment(HANOI, VINH, VehicleProfile::Car)
        .expect("direct route is returned as best effort");

    assert_eq!(route.method, RouteMethod::Direct);
    assert!(!route.compliance.is_valid);
    assert_eq!(route.safety(), SafetyLabel::Danger);
    assert_eq!(provider.call_count(), 1);
}

#[rstest]
fn non_crossing_upstream_failure_is_reported(territory: TerritoryConfig) {
    let provider = failing_direct_provider(RouteError::NoPaths);
    let planner = BorderAwarePlanner::new(&provider, WEST_OF_104, territory);

    let err = planner
        .plan_segment(SAIGON, CAN_THO, VehicleProfile::Car)
        .expect_err("nothing to fall back to");

    assert_eq!(err, PlanError::Upstream(RouteError::NoPaths));
    assert_eq!(provider.call_count(), 1);
}

#[rstest]
fn crossing_segment_recovers_from_direct_failure(territory: TerritoryConfig) {
    let provider = failing_direct_provider(RouteError::Timeout {
        url: "http://localhost:8989/route".to_owned(),
        timeout_secs: 20,
    });
    let planner = BorderAwarePlanner::new(&provider, WEST_OF_104, territory);

    let route = planner
        .plan_segment(HANOI, SAIGON, VehicleProfile::Car)
        .expect("waypoint route should succeed");

    assert_eq!(route.method, RouteMethod::WaypointAugmented);
    assert_eq!(provider.call_count(), 2);
}

#[rstest]
fn marginal_improvement_keeps_direct_route(territory: TerritoryConfig) {
    let provider = detouring_provider();
    let config = PlannerConfig::default().with_improvement_margin(0.9);
    let planner = BorderAwarePlanner::with_config(&provider, WEST_OF_104, territory, config);

    let route = planner
        .plan_segment(HANOI, SAIGON, VehicleProfile::Car)
        .expect("direct route is kept");

    // Direct is 50% outside, waypoints 0%: not a 90 point improvement.
    assert_eq!(route.method, RouteMethod::Direct);
    assert_eq!(provider.call_count(), 2);
}

#[rstest]
fn both_failures_surface_upstream_error(territory: TerritoryConfig) {
    let provider = ScriptedRouteProvider::with_fn(|_, _| Err(RouteError::NoPaths));
    let planner = BorderAwarePlanner::new(&provider, WEST_OF_104, territory);

    let err = planner
        .plan_segment(HANOI, SAIGON, VehicleProfile::Car)
        .expect_err("both requests fail");

    assert_eq!(err, PlanError::Upstream(RouteError::NoPaths));
    assert_eq!(provider.call_count(), 2);
}

#[rstest]
fn malformed_segment_point_is_rejected_before_routing(territory: TerritoryConfig) {
    let provider = detouring_provider();
    let planner = BorderAwarePlanner::new(&provider, WEST_OF_104, territory);

    let err = planner
        .plan_segment(GeoPoint::new_unchecked(f64::NAN, 0.0), SAIGON, VehicleProfile::Car)
        .expect_err("NaN latitude");

    assert!(err.is_input_error());
    assert_eq!(provider.call_count(), 0);
}

#[rstest]
fn nearby_stops_pick_shortest_order(territory: TerritoryConfig) {
    let boundary = CountryBoundary::fallback(&territory);
    let provider = counting_straight_lines();
    let planner = BorderAwarePlanner::new(&provider, boundary, territory);
    let destinations = [
        Destination::named(GeoPoint::new_unchecked(10.7769, 106.7309), "far"),
        Destination::named(GeoPoint::new_unchecked(10.7769, 106.7109), "near"),
        Destination::named(GeoPoint::new_unchecked(10.7769, 106.7209), "middle"),
    ];

    let plan = planner
        .plan_trip(SAIGON, &destinations, VehicleProfile::Car)
        .expect("trip should plan");

    assert_eq!(plan.permutations_evaluated, 6);
    assert_eq!(plan.permutations_skipped, 0);
    assert_eq!(plan.visit_order, vec![1, 2, 0]);
    let names: Vec<_> = plan
        .ordered_destinations
        .iter()
        .filter_map(|d| d.name.as_deref())
        .collect();
    assert_eq!(names, vec!["near", "middle", "far"]);
    assert_eq!(plan.safety, SafetyLabel::Safe);
    assert_eq!(provider.call_count(), 6);
}

#[rstest]
#[case(0)]
#[case(5)]
fn destination_count_is_checked_before_routing(
    territory: TerritoryConfig,
    #[case] count: usize,
) {
    let provider = detouring_provider();
    let planner = BorderAwarePlanner::new(&provider, WEST_OF_104, territory);
    let destinations = vec![Destination::new(BEN_THANH); count];

    let err = planner
        .plan_trip(SAIGON, &destinations, VehicleProfile::Car)
        .expect_err("count out of range");

    assert!(matches!(err, PlanError::InvalidInput { .. }));
    assert_eq!(provider.call_count(), 0);
}

#[rstest]
fn single_destination_delegates_to_segment(territory: TerritoryConfig) {
    let provider = detouring_provider();
    let planner = BorderAwarePlanner::new(&provider, WEST_OF_104, territory);

    let plan = planner
        .plan_trip(HANOI, &[Destination::named(SAIGON, "Saigon")], VehicleProfile::Car)
        .expect("single leg trip");

    assert_eq!(plan.visit_order, vec![0]);
    assert_eq!(plan.route.method, RouteMethod::WaypointAugmented);
    assert_eq!(plan.permutations_evaluated, 1);
}

#[rstest]
fn crossing_legs_receive_waypoints(territory: TerritoryConfig) {
    let provider = detouring_provider();
    let planner = BorderAwarePlanner::new(&provider, WEST_OF_104, territory);
    let destinations = [Destination::new(SAIGON), Destination::new(CAN_THO)];

    let plan = planner
        .plan_trip(HANOI, &destinations, VehicleProfile::Car)
        .expect("trip should plan");

    assert_eq!(plan.permutations_evaluated, 2);
    assert_eq!(plan.route.method, RouteMethod::WaypointAugmented);
    assert!(plan.route.waypoints.len() <= 2);
    assert!(provider.calls().iter().all(|call| call.len() == 5));
}

#[rstest]
fn oversized_orders_are_skipped(territory: TerritoryConfig) {
    let provider = detouring_provider();
    let config = PlannerConfig::default().with_max_request_points(2);
    let planner = BorderAwarePlanner::with_config(&provider, WEST_OF_104, territory, config);
    let destinations = [Destination::new(BEN_THANH), Destination::new(CAN_THO)];

    let err = planner
        .plan_trip(SAIGON, &destinations, VehicleProfile::Car)
        .expect_err("every order needs three points");

    assert_eq!(err, PlanError::NoValidOrder { skipped: 2 });
    assert_eq!(provider.call_count(), 0);
}

#[rstest]
fn failing_orders_report_last_error(territory: TerritoryConfig) {
    let provider = ScriptedRouteProvider::with_fn(|_, _| Err(RouteError::NoPaths));
    let planner = BorderAwarePlanner::new(&provider, WEST_OF_104, territory);
    let destinations = [Destination::new(BEN_THANH), Destination::new(CAN_THO)];

    let err = planner
        .plan_trip(SAIGON, &destinations, VehicleProfile::Car)
        .expect_err("engine never answers");

    assert_eq!(
        err,
        PlanError::AllAttemptsFailed {
            attempts: 2,
            skipped: 0,
            last_error: RouteError::NoPaths,
        }
    );
}

#[rstest]
#[case(candidate(0.0, 900.0), candidate(0.005, 1_000.0), true)]
#[case(candidate(0.005, 900.0), candidate(0.0, 1_000.0), true)]
#[case(candidate(0.0, 1_100.0), candidate(0.0, 1_000.0), false)]
#[case(candidate(0.0, 1_000.0), candidate(0.0, 1_000.0), false)]
#[case(candidate(0.02, 500.0), candidate(0.0, 1_000.0), false)]
#[case(candidate(0.0, 5_000.0), candidate(0.04, 1_000.0), true)]
fn scoring_prefers_compliance_then_distance(
    #[case] challenger: RouteCandidate,
    #[case] incumbent: RouteCandidate,
    #[case] expected: bool,
) {
    assert_eq!(is_better(&challenger, &incumbent, 0.01), expected);
}

#[rstest]
fn scoring_is_transitive_across_chained_fractions() {
    // Each neighbour is within one band of the next, the ends are not.
    let routes = [
        candidate(0.0, 100.0),
        candidate(0.009, 90.0),
        candidate(0.018, 80.0),
    ];
    let [first, second, third] = &routes;

    assert!(is_better(second, first, 0.01));
    assert!(is_better(first, third, 0.01));
    assert!(is_better(second, third, 0.01));
    assert!(!is_better(third, second, 0.01));

    for order in crate::Permutations::new(routes.len()) {
        let mut best: Option<&RouteCandidate> = None;
        for &index in &order {
            let route = routes.get(index).expect("permutation index in range");
            if best.is_none_or(|incumbent| is_better(route, incumbent, 0.01)) {
                best = Some(route);
            }
        }
        let winner = best.expect("three routes compared");
        assert_eq!(winner, second, "order {order:?}");
    }
}
