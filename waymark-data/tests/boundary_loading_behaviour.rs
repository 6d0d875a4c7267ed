//! Behavioural tests for loading the boundary file with fallback.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use waymark_core::{BoundaryOracle, CompliancePolicy, CountryBoundary, GeoPoint, TerritoryConfig};
use waymark_data::fs::write_atomic;
use waymark_data::load_boundary_or_fallback;

struct LoaderWorld {
    dir: TempDir,
    path: RefCell<Option<Utf8PathBuf>>,
    boundary: RefCell<Option<CountryBoundary>>,
}

impl LoaderWorld {
    #[expect(clippy::expect_used, reason = "behaviour tests use expect for readable failures")]
    fn root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf()).expect("utf-8 tempdir")
    }

    #[expect(clippy::expect_used, reason = "behaviour tests use expect for readable failures")]
    fn write_boundary(&self, body: &str) {
        let path = self.root().join("boundary.geojson");
        write_atomic(&path, body.as_bytes()).expect("write boundary file");
        *self.path.borrow_mut() = Some(path);
    }

    #[expect(clippy::expect_used, reason = "behaviour tests use expect for readable failures")]
    fn with_boundary<T>(&self, check: impl FnOnce(&CountryBoundary) -> T) -> T {
        let guard = self.boundary.borrow();
        check(guard.as_ref().expect("boundary must be loaded"))
    }
}

#[fixture]
#[expect(clippy::expect_used, reason = "behaviour tests use expect for readable failures")]
fn world() -> LoaderWorld {
    LoaderWorld {
        dir: TempDir::new().expect("tempdir"),
        path: RefCell::new(None),
        boundary: RefCell::new(None),
    }
}

#[given("a boundary file holding a square from 100E 0N to 110E 10N")]
fn square_file(world: &LoaderWorld) {
    world.write_boundary(
        r#"{"type": "Feature", "properties": {"name": "square"}, "geometry": {"type": "Polygon",
            "coordinates": [[[100.0, 0.0], [110.0, 0.0], [110.0, 10.0], [100.0, 10.0], [100.0, 0.0]]]}}"#,
    );
}

#[given("a boundary file holding a line")]
fn line_file(world: &LoaderWorld) {
    world.write_boundary(
        r#"{"type": "LineString", "coordinates": [[105.0, 16.0], [106.0, 17.0]]}"#,
    );
}

#[given("a boundary path that does not exist")]
fn missing_file(world: &LoaderWorld) {
    *world.path.borrow_mut() = Some(world.root().join("absent").join("boundary.geojson"));
}

#[when("the boundary is loaded")]
fn load(world: &LoaderWorld) {
    let path = world.path.borrow().clone();
    let boundary = load_boundary_or_fallback(path.as_deref(), &TerritoryConfig::vietnam());
    *world.boundary.borrow_mut() = Some(boundary);
}

#[then("the boundary is authoritative")]
fn is_authoritative(world: &LoaderWorld) {
    world.with_boundary(|boundary| assert!(!boundary.accuracy().is_degraded()));
}

#[then("the boundary is degraded")]
fn is_degraded(world: &LoaderWorld) {
    world.with_boundary(|boundary| assert!(boundary.accuracy().is_degraded()));
}

#[then("the point {lat}, {lon} is inside")]
fn point_inside(world: &LoaderWorld, lat: f64, lon: f64) {
    world.with_boundary(|boundary| {
        assert!(boundary.is_inside(GeoPoint::new_unchecked(lat, lon)));
    });
}

#[then("the point {lat}, {lon} is outside")]
fn point_outside(world: &LoaderWorld, lat: f64, lon: f64) {
    world.with_boundary(|boundary| {
        assert!(!boundary.is_inside(GeoPoint::new_unchecked(lat, lon)));
    });
}

#[then("a route from {from_lat}, {from_lon} to {to_lat}, {to_lon} is reported as degraded")]
fn route_degraded(world: &LoaderWorld, from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64) {
    let polyline = [
        GeoPoint::new_unchecked(from_lat, from_lon),
        GeoPoint::new_unchecked(to_lat, to_lon),
    ];
    let report = world.with_boundary(|boundary| {
        boundary.evaluate_route(
            &polyline,
            &TerritoryConfig::vietnam().sampling,
            CompliancePolicy::strict(),
        )
    });
    assert!(report.is_valid);
    assert!(report.is_degraded());
}

#[scenario(path = "tests/features/boundary_loading.feature", index = 0)]
fn official_outline(world: LoaderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/boundary_loading.feature", index = 1)]
fn missing_file_falls_back(world: LoaderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/boundary_loading.feature", index = 2)]
fn unusable_file_falls_back(world: LoaderWorld) {
    let _ = world;
}
