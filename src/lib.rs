//! Facade crate for the Waymark border-aware route planner.
//!
//! This crate re-exports the core domain types and the default planner, and
//! exposes the HTTP adapters for GraphHopper-compatible routing and
//! geocoding behind the `http` feature.

#![forbid(unsafe_code)]

pub use waymark_core::{
    BoundaryAccuracy, BoundaryOracle, ComplianceReport, CompliancePolicy, CountryBoundary,
    Destination, GeoPoint, GeoPointError, GeocodeError, GeocodeMatch, Geocoder, LatLonBounds,
    MAX_DESTINATIONS, PlanError, ReverseGeocode, RouteCandidate, RouteError, RouteMethod,
    RoutePath, RoutePlanner, RouteProvider, SafetyLabel, SamplingPolicy, TerritoryConfig,
    TerritoryError, TripPlan, VehicleProfile, WaypointSelector,
};
pub use waymark_planner::{BorderAwarePlanner, PlannerConfig};

#[cfg(feature = "http")]
pub use waymark_data::{
    BoundaryLoadError, CachedRouteProvider, GeocoderConfig, HttpGeocoder, ProviderBuildError,
    load_boundary, load_boundary_or_fallback,
    routing::{GraphHopperConfig, GraphHopperRouteProvider},
};
