//! Loading the authoritative country outline from GeoJSON.
//!
//! The file may hold a `FeatureCollection` (the first feature with a
//! geometry is used), a single `Feature` or a bare `Geometry`. Polygons and
//! multi-polygons are accepted; islands are kept as extra polygons.

use camino::{Utf8Path, Utf8PathBuf};
use geo::{MultiPolygon, Polygon};
use geojson::{GeoJson, Value};
use thiserror::Error;
use waymark_core::{CountryBoundary, TerritoryConfig};

use crate::fs::read_utf8;

/// Errors raised while loading a boundary file.
#[derive(Debug, Error)]
pub enum BoundaryLoadError {
    /// The file could not be read.
    #[error("failed to read boundary file {path}: {source}")]
    Read {
        /// Boundary file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid GeoJSON, or its coordinates are malformed.
    #[error("failed to decode GeoJSON in {path}: {source}")]
    Decode {
        /// Boundary file path.
        path: Utf8PathBuf,
        /// Underlying GeoJSON error.
        #[source]
        source: Box<geojson::Error>,
    },
    /// The file holds no geometry, or only empty polygons.
    #[error("{path} contains no boundary geometry")]
    Empty {
        /// Boundary file path.
        path: Utf8PathBuf,
    },
    /// The geometry is not a polygon.
    #[error("{path} holds a {kind}; expected Polygon or MultiPolygon")]
    UnsupportedGeometry {
        /// Boundary file path.
        path: Utf8PathBuf,
        /// GeoJSON type that was found.
        kind: &'static str,
    },
}

/// Load an authoritative [`CountryBoundary`] from a GeoJSON file.
///
/// # Errors
/// Returns [`BoundaryLoadError`] when the file is unreadable, undecodable,
/// empty or holds a non-polygon geometry.
pub fn load_boundary(path: &Utf8Path) -> Result<CountryBoundary, BoundaryLoadError> {
    let text = read_utf8(path).map_err(|source| BoundaryLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decode = |source: geojson::Error| BoundaryLoadError::Decode {
        path: path.to_path_buf(),
        source: Box::new(source),
    };
    let geojson: GeoJson = text.parse().map_err(decode)?;
    let value = first_geometry(geojson).ok_or_else(|| BoundaryLoadError::Empty {
        path: path.to_path_buf(),
    })?;
    let outline = match value {
        polygon @ Value::Polygon(_) => MultiPolygon::new(vec![
            Polygon::<f64>::try_from(polygon).map_err(decode)?,
        ]),
        multi @ Value::MultiPolygon(_) => MultiPolygon::<f64>::try_from(multi).map_err(decode)?,
        other => {
            return Err(BoundaryLoadError::UnsupportedGeometry {
                path: path.to_path_buf(),
                kind: geometry_kind(&other),
            });
        }
    };
    if outline.0.iter().all(|polygon| polygon.exterior().0.is_empty()) {
        return Err(BoundaryLoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(CountryBoundary::authoritative(outline))
}

/// Load the boundary at `path`, or fall back to the territory's own geometry.
///
/// A missing path, an unreadable file or an unusable file never fails: the
/// problem is logged and the coarse (or bounding-box) tier is returned.
#[must_use]
pub fn load_boundary_or_fallback(
    path: Option<&Utf8Path>,
    territory: &TerritoryConfig,
) -> CountryBoundary {
    let Some(path) = path else {
        log::warn!(
            "no boundary file configured; using the {} fallback boundary",
            territory.name
        );
        return CountryBoundary::fallback(territory);
    };
    load_boundary(path).unwrap_or_else(|err| {
        log::warn!("{err}; using the {} fallback boundary", territory.name);
        CountryBoundary::fallback(territory)
    })
}

fn first_geometry(geojson: GeoJson) -> Option<Value> {
    match geojson {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .find_map(|feature| feature.geometry),
        GeoJson::Feature(feature) => feature.geometry,
        GeoJson::Geometry(geometry) => Some(geometry),
    }
    .map(|geometry| geometry.value)
}

const fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
