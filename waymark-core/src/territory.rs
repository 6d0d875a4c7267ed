//! Country-specific configuration: backbone cities, danger zone and fallback
//! boundary geometry.
//!
//! A [`TerritoryConfig`] holds everything the planner knows about one
//! country apart from the authoritative boundary file. The built-in preset is
//! [`TerritoryConfig::vietnam`]; other countries can be described in JSON and
//! deserialised, with missing fields taken from the preset.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GeoPoint, GeoPointError, SamplingPolicy};

/// An axis-aligned latitude/longitude rectangle, inclusive on every edge.
///
/// # Examples
/// ```
/// use waymark_core::{GeoPoint, LatLonBounds};
///
/// let bounds = LatLonBounds::new(14.0, 18.0, 105.0, 107.0);
/// assert!(bounds.contains(GeoPoint::new_unchecked(14.0, 106.0)));
/// assert!(!bounds.contains(GeoPoint::new_unchecked(13.9, 106.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonBounds {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lon: f64,
    /// Eastern edge.
    pub max_lon: f64,
}

impl LatLonBounds {
    /// Create a rectangle from its edges.
    #[must_use]
    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Whether `point` lies inside or on the edge of the rectangle.
    #[must_use]
    pub const fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lon >= self.min_lon
            && point.lon <= self.max_lon
    }

    fn is_well_formed(&self) -> bool {
        [self.min_lat, self.max_lat, self.min_lon, self.max_lon]
            .iter()
            .all(|edge| edge.is_finite())
            && self.min_lat <= self.max_lat
            && self.min_lon <= self.max_lon
    }
}

/// Errors returned by [`TerritoryConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerritoryError {
    /// The backbone contained no points.
    #[error("territory backbone must contain at least one point")]
    EmptyBackbone,
    /// A backbone or polygon vertex was malformed.
    #[error("invalid territory point at index {index}: {source}")]
    InvalidPoint {
        /// Position of the point in its list.
        index: usize,
        /// Underlying coordinate error.
        #[source]
        source: GeoPointError,
    },
    /// A rectangle had non-finite or inverted edges.
    #[error("{field} has non-finite or inverted edges")]
    InvalidBounds {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A distance threshold was negative or not finite.
    #[error("{field} must be a finite, non-negative number of degrees")]
    InvalidThreshold {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Country-specific routing heuristics and fallback geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerritoryConfig {
    /// Display name of the territory.
    pub name: String,
    /// Safe inland or coastal cities ordered along the country's main axis.
    pub backbone: Vec<GeoPoint>,
    /// Region where direct routes tend to leave the country.
    pub danger_zone: LatLonBounds,
    /// Minimum latitude span (degrees) for a route to count as crossing.
    pub min_lat_span: f64,
    /// Routes shorter than this (degrees) never get waypoints.
    pub short_route_threshold: f64,
    /// Backbone points this close (degrees) to an endpoint are dropped.
    pub endpoint_clearance: f64,
    /// Bounding box used by the fallback boundary tiers.
    pub bounds: LatLonBounds,
    /// Hand-authored coarse outline used when no boundary file is available.
    pub coarse_polygon: Vec<GeoPoint>,
    /// How densely route polylines are sampled.
    pub sampling: SamplingPolicy,
}

const VIETNAM_BACKBONE: [GeoPoint; 7] = [
    GeoPoint::new_unchecked(21.0285, 105.8542), // Hanoi
    GeoPoint::new_unchecked(18.6761, 105.6815), // Vinh
    GeoPoint::new_unchecked(16.4637, 107.5909), // Hue
    GeoPoint::new_unchecked(15.1205, 108.8048), // Quang Ngai
    GeoPoint::new_unchecked(12.2388, 109.1967), // Nha Trang
    GeoPoint::new_unchecked(10.7769, 106.7009), // Ho Chi Minh City
    GeoPoint::new_unchecked(10.0452, 105.7469), // Can Tho
];

const VIETNAM_COARSE_POLYGON: [GeoPoint; 32] = [
    GeoPoint::new_unchecked(21.5, 108.0),
    GeoPoint::new_unchecked(20.8, 106.8),
    GeoPoint::new_unchecked(20.0, 106.0),
    GeoPoint::new_unchecked(19.0, 105.5),
    GeoPoint::new_unchecked(17.5, 106.5),
    GeoPoint::new_unchecked(16.5, 107.5),
    GeoPoint::new_unchecked(16.0, 108.2),
    GeoPoint::new_unchecked(15.0, 109.0),
    GeoPoint::new_unchecked(13.0, 109.5),
    GeoPoint::new_unchecked(11.5, 109.0),
    GeoPoint::new_unchecked(10.5, 107.5),
    GeoPoint::new_unchecked(10.3, 107.0),
    GeoPoint::new_unchecked(8.5, 104.5),
    GeoPoint::new_unchecked(10.0, 104.0),
    GeoPoint::new_unchecked(10.5, 104.5),
    GeoPoint::new_unchecked(10.9, 105.0),
    GeoPoint::new_unchecked(11.0, 106.0),
    GeoPoint::new_unchecked(11.5, 106.5),
    GeoPoint::new_unchecked(12.0, 107.0),
    GeoPoint::new_unchecked(13.0, 107.5),
    GeoPoint::new_unchecked(14.0, 107.5),
    GeoPoint::new_unchecked(15.0, 107.5),
    GeoPoint::new_unchecked(16.0, 107.0),
    GeoPoint::new_unchecked(17.0, 106.0),
    GeoPoint::new_unchecked(18.0, 105.0),
    GeoPoint::new_unchecked(19.0, 104.0),
    GeoPoint::new_unchecked(20.0, 103.5),
    GeoPoint::new_unchecked(21.0, 103.0),
    GeoPoint::new_unchecked(22.5, 102.5),
    GeoPoint::new_unchecked(23.4, 105.0),
    GeoPoint::new_unchecked(23.0, 106.0),
    GeoPoint::new_unchecked(22.0, 107.0),
];

impl TerritoryConfig {
    /// Built-in preset for Vietnam.
    ///
    /// The backbone runs Hanoi, Vinh, Hue, Quang Ngai, Nha Trang,
    /// Ho Chi Minh City and Can Tho. The danger zone covers the narrow central
    /// provinces bordering Laos.
    #[must_use]
    pub fn vietnam() -> Self {
        Self {
            name: "Vietnam".to_owned(),
            backbone: VIETNAM_BACKBONE.to_vec(),
            danger_zone: LatLonBounds::new(14.0, 18.0, 105.0, 107.0),
            min_lat_span: 3.0,
            short_route_threshold: 2.0,
            endpoint_clearance: 0.3,
            bounds: LatLonBounds::new(8.0, 23.5, 102.0, 110.0),
            coarse_polygon: VIETNAM_COARSE_POLYGON.to_vec(),
            sampling: SamplingPolicy::default(),
        }
    }

    /// Replace the backbone.
    #[must_use]
    pub fn with_backbone(mut self, backbone: Vec<GeoPoint>) -> Self {
        self.backbone = backbone;
        self
    }

    /// Replace the danger zone and its latitude-span threshold.
    #[must_use]
    pub const fn with_danger_zone(mut self, zone: LatLonBounds, min_lat_span: f64) -> Self {
        self.danger_zone = zone;
        self.min_lat_span = min_lat_span;
        self
    }

    /// Replace the sampling policy.
    #[must_use]
    pub const fn with_sampling(mut self, sampling: SamplingPolicy) -> Self {
        self.sampling = sampling;
        self
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    /// Returns [`TerritoryError`] for an empty backbone, malformed points,
    /// inverted rectangles or negative thresholds.
    pub fn validate(&self) -> Result<(), TerritoryError> {
        if self.backbone.is_empty() {
            return Err(TerritoryError::EmptyBackbone);
        }
        for (index, point) in self.backbone.iter().chain(&self.coarse_polygon).enumerate() {
            point
                .validate()
                .map_err(|source| TerritoryError::InvalidPoint { index, source })?;
        }
        if !self.danger_zone.is_well_formed() {
            return Err(TerritoryError::InvalidBounds {
                field: "danger_zone",
            });
        }
        if !self.bounds.is_well_formed() {
            return Err(TerritoryError::InvalidBounds { field: "bounds" });
        }
        for (field, value) in [
            ("min_lat_span", self.min_lat_span),
            ("short_route_threshold", self.short_route_threshold),
            ("endpoint_clearance", self.endpoint_clearance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TerritoryError::InvalidThreshold { field });
            }
        }
        Ok(())
    }
}

impl Default for TerritoryConfig {
    fn default() -> Self {
        Self::vietnam()
    }
}
