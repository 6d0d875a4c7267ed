//! Core domain types for the Waymark route planner.
//!
//! Waymark plans drivable routes that stay inside one country's borders.
//! This crate holds the pieces every other crate shares:
//!
//! - [`GeoPoint`], [`Destination`] and [`VehicleProfile`] describe requests.
//! - [`CountryBoundary`] and the [`BoundaryOracle`] trait decide whether
//!   points and polylines stay inside the territory, producing a
//!   [`ComplianceReport`] under a [`CompliancePolicy`].
//! - [`TerritoryConfig`] carries country-specific heuristics and
//!   [`WaypointSelector`] uses them to pick backbone waypoints.
//! - [`RouteProvider`] abstracts the routing engine and [`RoutePlanner`]
//!   abstracts the planner built on top of it.
//! - [`Geocoder`] abstracts place-name lookup for outer surfaces.
//!
//! Constructors validate input and return `Result` so malformed requests
//! fail before any network call.

#![forbid(unsafe_code)]

mod boundary;
mod compliance;
mod geocoder;
mod planner;
mod point;
mod route;
pub mod routing;
mod territory;
mod waypoints;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use boundary::{BoundaryAccuracy, BoundaryOracle, CountryBoundary};
pub use compliance::{
    ComplianceReport, CompliancePolicy, CompliancePolicyError, DANGER_FRACTION_LIMIT,
    SAFE_FRACTION_LIMIT, SafetyLabel, SamplingPolicy,
};
pub use geocoder::{GeocodeError, GeocodeMatch, Geocoder, ReverseGeocode};
pub use planner::{MAX_DESTINATIONS, PlanError, RoutePlanner, TripPlan};
pub use point::{Destination, GeoPoint, GeoPointError, ParseVehicleProfileError, VehicleProfile};
pub use route::{RouteCandidate, RouteMethod, RoutePath};
pub use routing::{RouteError, RouteProvider};
pub use territory::{LatLonBounds, TerritoryConfig, TerritoryError};
pub use waypoints::WaypointSelector;
