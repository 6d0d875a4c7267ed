//! Country boundary tiers and the point-in-territory oracle.

use std::fmt;

use geo::{Contains, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use crate::{
    ComplianceReport, CompliancePolicy, GeoPoint, LatLonBounds, SamplingPolicy, TerritoryConfig,
};

/// How precise the active boundary is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryAccuracy {
    /// Official outline loaded from a boundary file.
    Authoritative,
    /// Bounding box pre-check plus a hand-authored coarse polygon.
    CoarsePolygon,
    /// Bounding box only.
    BoundingBox,
}

impl BoundaryAccuracy {
    /// True for every tier other than [`BoundaryAccuracy::Authoritative`].
    #[must_use]
    pub const fn is_degraded(self) -> bool {
        !matches!(self, Self::Authoritative)
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authoritative => "authoritative",
            Self::CoarsePolygon => "coarse_polygon",
            Self::BoundingBox => "bounding_box",
        }
    }
}

impl fmt::Display for BoundaryAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers whether points and routes stay inside the territory.
///
/// Implementations must be deterministic: the same point always yields the
/// same answer.
///
/// # Examples
/// ```
/// use waymark_core::{
///     BoundaryAccuracy, BoundaryOracle, CompliancePolicy, GeoPoint, SamplingPolicy,
/// };
///
/// struct NorthernHemisphere;
///
/// impl BoundaryOracle for NorthernHemisphere {
///     fn is_inside(&self, point: GeoPoint) -> bool {
///         point.lat >= 0.0
///     }
///
///     fn accuracy(&self) -> BoundaryAccuracy {
///         BoundaryAccuracy::BoundingBox
///     }
/// }
///
/// let route = [GeoPoint::new_unchecked(1.0, 0.0), GeoPoint::new_unchecked(-1.0, 0.0)];
/// let report = NorthernHemisphere.evaluate_route(
///     &route,
///     &SamplingPolicy::default(),
///     CompliancePolicy::strict(),
/// );
/// assert_eq!(report.outside_points, 1);
/// assert!(!report.is_valid);
/// ```
pub trait BoundaryOracle {
    /// Whether `point` lies inside the territory.
    fn is_inside(&self, point: GeoPoint) -> bool;

    /// Accuracy tier of this oracle.
    fn accuracy(&self) -> BoundaryAccuracy;

    /// Sample `polyline` and measure the fraction of points outside.
    ///
    /// Long polylines are sampled every `sampling.stride` points starting at
    /// the first. An empty polyline reports nothing outside and is valid.
    fn evaluate_route(
        &self,
        polyline: &[GeoPoint],
        sampling: &SamplingPolicy,
        policy: CompliancePolicy,
    ) -> ComplianceReport {
        let step = sampling.step_for(polyline.len());
        let (sampled, outside) = polyline
            .iter()
            .step_by(step)
            .fold((0_usize, 0_usize), |(sampled, outside), point| {
                (sampled + 1, outside + usize::from(!self.is_inside(*point)))
            });
        ComplianceReport::from_counts(polyline.len(), sampled, outside, policy, self.accuracy())
    }
}

impl<T: BoundaryOracle + ?Sized> BoundaryOracle for &T {
    fn is_inside(&self, point: GeoPoint) -> bool {
        (**self).is_inside(point)
    }

    fn accuracy(&self) -> BoundaryAccuracy {
        (**self).accuracy()
    }
}

impl<T: BoundaryOracle + ?Sized> BoundaryOracle for std::sync::Arc<T> {
    fn is_inside(&self, point: GeoPoint) -> bool {
        (**self).is_inside(point)
    }

    fn accuracy(&self) -> BoundaryAccuracy {
        (**self).accuracy()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Authoritative(MultiPolygon<f64>),
    Coarse {
        bounds: LatLonBounds,
        polygon: Polygon<f64>,
    },
    Bounds(LatLonBounds),
}

/// The territory outline at one of three accuracy tiers.
///
/// Built once at startup and shared read-only; it is `Send + Sync`.
///
/// # Examples
/// ```
/// use waymark_core::{BoundaryAccuracy, BoundaryOracle, CountryBoundary, GeoPoint, TerritoryConfig};
///
/// let boundary = CountryBoundary::fallback(&TerritoryConfig::vietnam());
/// assert_eq!(boundary.accuracy(), BoundaryAccuracy::CoarsePolygon);
/// assert!(boundary.is_inside(GeoPoint::new_unchecked(21.0285, 105.8542)));
/// assert!(!boundary.is_inside(GeoPoint::new_unchecked(17.9757, 102.6331)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CountryBoundary {
    shape: Shape,
}

impl CountryBoundary {
    /// Wrap an official outline. Islands are supported as extra polygons.
    #[must_use]
    pub fn authoritative(outline: MultiPolygon<f64>) -> Self {
        log::info!(
            "country boundary ready: authoritative outline with {} polygon(s)",
            outline.0.len()
        );
        Self {
            shape: Shape::Authoritative(outline),
        }
    }

    /// Coarse tier: `bounds` pre-check followed by `ring` point-in-polygon.
    ///
    /// The ring need not be closed.
    #[must_use]
    pub fn coarse(bounds: LatLonBounds, ring: &[GeoPoint]) -> Self {
        let exterior: LineString<f64> = ring.iter().map(|point| point.to_coord()).collect();
        log::info!(
            "country boundary ready: coarse polygon with {} vertices",
            ring.len()
        );
        Self {
            shape: Shape::Coarse {
                bounds,
                polygon: Polygon::new(exterior, Vec::new()),
            },
        }
    }

    /// Bounding-box tier.
    #[must_use]
    pub fn bounding_box(bounds: LatLonBounds) -> Self {
        log::info!("country boundary ready: bounding box only");
        Self {
            shape: Shape::Bounds(bounds),
        }
    }

    /// Best boundary available without a boundary file.
    ///
    /// Uses the territory's coarse polygon, or its bounding box when the
    /// polygon has fewer than three vertices.
    #[must_use]
    pub fn fallback(territory: &TerritoryConfig) -> Self {
        if territory.coarse_polygon.len() >= 3 {
            Self::coarse(territory.bounds, &territory.coarse_polygon)
        } else {
            log::warn!(
                "{} has no usable coarse polygon; falling back to its bounding box",
                territory.name
            );
            Self::bounding_box(territory.bounds)
        }
    }
}

impl BoundaryOracle for CountryBoundary {
    fn is_inside(&self, point: GeoPoint) -> bool {
        let candidate = geo::Point::from(point);
        match &self.shape {
            Shape::Authoritative(outline) => outline.contains(&candidate),
            Shape::Coarse { bounds, polygon } => {
                bounds.contains(point) && polygon.contains(&candidate)
            }
            Shape::Bounds(bounds) => bounds.contains(point),
        }
    }

    fn accuracy(&self) -> BoundaryAccuracy {
        match self.shape {
            Shape::Authoritative(_) => BoundaryAccuracy::Authoritative,
            Shape::Coarse { .. } => BoundaryAccuracy::CoarsePolygon,
            Shape::Bounds(_) => BoundaryAccuracy::BoundingBox,
        }
    }
}
