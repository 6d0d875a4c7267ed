//! Geographic points, named destinations and vehicle profiles.

use std::fmt;
use std::str::FromStr;

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A WGS84 position in decimal degrees.
///
/// Latitude comes first, matching the `lat,lon` ordering used by routing
/// engines for request points. Conversions to [`geo::Coord`] map longitude to
/// `x` and latitude to `y`.
///
/// # Examples
/// ```
/// use waymark_core::GeoPoint;
///
/// # fn main() -> Result<(), waymark_core::GeoPointError> {
/// let hanoi = GeoPoint::new(21.0285, 105.8542)?;
/// assert_eq!(hanoi.lat, 21.0285);
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

/// Errors returned by [`GeoPoint::new`] and [`GeoPoint::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoPointError {
    /// One of the components was NaN or infinite.
    #[error("coordinates ({lat}, {lon}) must be finite")]
    NonFinite {
        /// Supplied latitude.
        lat: f64,
        /// Supplied longitude.
        lon: f64,
    },
    /// Latitude fell outside `-90..=90`.
    #[error("latitude {lat} is outside -90..=90")]
    LatitudeOutOfRange {
        /// Supplied latitude.
        lat: f64,
    },
    /// Longitude fell outside `-180..=180`.
    #[error("longitude {lon} is outside -180..=180")]
    LongitudeOutOfRange {
        /// Supplied longitude.
        lon: f64,
    },
}

impl GeoPoint {
    /// Validate and construct a point.
    ///
    /// # Errors
    /// Returns [`GeoPointError`] for non-finite or out-of-range components.
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeoPointError> {
        let point = Self { lat, lon };
        point.validate()?;
        Ok(point)
    }

    /// Construct a point without validation.
    ///
    /// Intended for compile-time constants such as backbone presets.
    #[must_use]
    pub const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check that both components are finite and in range.
    ///
    /// # Errors
    /// Returns [`GeoPointError`] describing the first offending component.
    pub fn validate(&self) -> Result<(), GeoPointError> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(GeoPointError::NonFinite {
                lat: self.lat,
                lon: self.lon,
            });
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(GeoPointError::LatitudeOutOfRange { lat: self.lat });
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(GeoPointError::LongitudeOutOfRange { lon: self.lon });
        }
        Ok(())
    }

    /// Planar distance in degrees.
    ///
    /// This is the cheap Euclidean metric used for waypoint heuristics, not a
    /// geodesic distance.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "degree distance is a floating-point heuristic"
    )]
    pub fn degree_distance(&self, other: &Self) -> f64 {
        (self.lat - other.lat).hypot(self.lon - other.lon)
    }

    /// Convert into a `geo` coordinate (`x = lon`, `y = lat`).
    #[must_use]
    pub const fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }

    /// Build a point from a GeoJSON-style `[lon, lat]` pair.
    #[must_use]
    pub const fn from_lon_lat(pair: [f64; 2]) -> Self {
        let [lon, lat] = pair;
        Self { lat, lon }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(coord: Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lon: coord.x,
        }
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        point.to_coord()
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Self(point.to_coord())
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// A stop the caller wants to visit, optionally labelled for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Where the stop is.
    pub location: GeoPoint,
    /// Human-readable label, e.g. "Ben Thanh Market".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Destination {
    /// Create an unnamed destination.
    #[must_use]
    pub const fn new(location: GeoPoint) -> Self {
        Self {
            location,
            name: None,
        }
    }

    /// Create a labelled destination.
    #[must_use]
    pub fn named(location: GeoPoint, name: impl Into<String>) -> Self {
        Self {
            location,
            name: Some(name.into()),
        }
    }
}

/// Vehicle profile forwarded to the routing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleProfile {
    /// Motor car.
    #[default]
    Car,
    /// Bicycle.
    Bike,
    /// Walking.
    Foot,
}

impl VehicleProfile {
    /// Profile name understood by the routing engine.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Bike => "bike",
            Self::Foot => "foot",
        }
    }
}

impl fmt::Display for VehicleProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown vehicle profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown vehicle profile {0:?} (expected car, bike or foot)")]
pub struct ParseVehicleProfileError(
    /// The rejected input.
    pub String,
);

impl FromStr for VehicleProfile {
    type Err = ParseVehicleProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(Self::Car),
            "bike" => Ok(Self::Bike),
            "foot" => Ok(Self::Foot),
            _ => Err(ParseVehicleProfileError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn rejects_non_finite(#[case] lat: f64, #[case] lon: f64) {
        assert!(matches!(
            GeoPoint::new(lat, lon),
            Err(GeoPointError::NonFinite { .. })
        ));
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(-91.0, 0.0)]
    fn rejects_latitude_out_of_range(#[case] lat: f64, #[case] lon: f64) {
        assert!(matches!(
            GeoPoint::new(lat, lon),
            Err(GeoPointError::LatitudeOutOfRange { .. })
        ));
    }

    #[rstest]
    fn rejects_longitude_out_of_range() {
        assert!(matches!(
            GeoPoint::new(10.0, 180.5),
            Err(GeoPointError::LongitudeOutOfRange { .. })
        ));
    }

    #[rstest]
    fn degree_distance_is_euclidean() {
        let a = GeoPoint::new_unchecked(0.0, 0.0);
        let b = GeoPoint::new_unchecked(3.0, 4.0);
        assert!((a.degree_distance(&b) - 5.0).abs() < 1e-12);
    }

    #[rstest]
    fn lon_lat_pairs_are_swapped() {
        let point = GeoPoint::from_lon_lat([106.7009, 10.7769]);
        assert_eq!(point, GeoPoint::new_unchecked(10.7769, 106.7009));
        assert_eq!(point.to_coord(), Coord { x: 106.7009, y: 10.7769 });
    }

    #[rstest]
    #[case("car", VehicleProfile::Car)]
    #[case(" Bike ", VehicleProfile::Bike)]
    #[case("FOOT", VehicleProfile::Foot)]
    fn parses_vehicle_profiles(#[case] raw: &str, #[case] expected: VehicleProfile) {
        assert_eq!(raw.parse::<VehicleProfile>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_vehicle_profile() {
        assert!("truck".parse::<VehicleProfile>().is_err());
    }

    #[rstest]
    fn destination_name_is_optional_in_json() {
        let json = r#"{"location":{"lat":10.0,"lon":106.0}}"#;
        let destination: Destination = serde_json::from_str(json).expect("decode destination");
        assert_eq!(destination, Destination::new(GeoPoint::new_unchecked(10.0, 106.0)));
    }
}
