//! Unit tests for the `check` command.

use super::helpers::{workspace, write_utf8};
use super::*;
use rstest::rstest;
use serde_json::Value;

use crate::check::{CheckArgs, config_from_layers_for_test, run_check_with};

const SQUARE_GEOJSON: &str = r#"{
  "type": "Feature",
  "properties": {},
  "geometry": {
    "type": "Polygon",
    "coordinates": [[[100.0, 5.0], [112.0, 5.0], [112.0, 25.0], [100.0, 25.0], [100.0, 5.0]]]
  }
}"#;

#[expect(clippy::expect_used, reason = "test setup should fail loudly")]
fn check(args: CheckArgs) -> Value {
    let mut stdout = Vec::new();
    run_check_with(args, &mut stdout).expect("check should succeed");
    serde_json::from_slice(&stdout).expect("stdout is JSON")
}

#[rstest]
#[case::hanoi(21.0285, 105.8542, true)]
#[case::vientiane(17.9757, 102.6331, false)]
#[case::phnom_penh(11.5564, 104.9282, false)]
fn fallback_boundary_classifies_points(#[case] lat: f64, #[case] lon: f64, #[case] inside: bool) {
    let output = check(CheckArgs {
        lat: Some(lat),
        lon: Some(lon),
        ..CheckArgs::default()
    });
    assert_eq!(output["inside"], Value::Bool(inside));
    assert_eq!(output["accuracy"], "coarse_polygon");
    assert_eq!(output["degraded"], Value::Bool(true));
    assert_eq!(output["territory"], "Vietnam");
}

#[rstest]
fn boundary_file_makes_answers_authoritative() {
    let (_tmp, root) = workspace();
    let boundary = root.join("square.geojson");
    write_utf8(&boundary, SQUARE_GEOJSON.as_bytes());

    let output = check(CheckArgs {
        lat: Some(17.9757),
        lon: Some(102.6331),
        boundary: Some(boundary),
        ..CheckArgs::default()
    });
    assert_eq!(output["inside"], Value::Bool(true));
    assert_eq!(output["accuracy"], "authoritative");
    assert_eq!(output["degraded"], Value::Bool(false));
}

#[rstest]
fn missing_longitude_names_its_variable() {
    let err = config_from_layers_for_test({
        let mut composer = ortho_config::MergeComposer::new();
        composer.push_cli(serde_json::json!({ "lat": 21.0 }));
        composer.layers()
    })
    .expect_err("longitude is required");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_LON);
            assert_eq!(env, ENV_CHECK_LON);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn out_of_range_latitude_is_rejected() {
    let mut stdout = Vec::new();
    let err = run_check_with(
        CheckArgs {
            lat: Some(91.0),
            lon: Some(105.0),
            ..CheckArgs::default()
        },
        &mut stdout,
    )
    .expect_err("latitude above 90 should fail");
    assert!(matches!(err, CliError::InvalidPoint(_)));
    assert!(stdout.is_empty());
}

#[rstest]
fn invalid_territory_file_is_reported() {
    let (_tmp, root) = workspace();
    let territory = root.join("territory.json");
    write_utf8(&territory, br#"{"name":"Nowhere","backbone":[]}"#);

    let mut stdout = Vec::new();
    let err = run_check_with(
        CheckArgs {
            lat: Some(21.0),
            lon: Some(105.0),
            territory: Some(territory.clone()),
            ..CheckArgs::default()
        },
        &mut stdout,
    )
    .expect_err("empty backbone should fail validation");
    match err {
        CliError::InvalidTerritory { path, source } => {
            assert_eq!(path, territory);
            assert_eq!(source, waymark_core::TerritoryError::EmptyBackbone);
        }
        other => panic!("expected InvalidTerritory, found {other:?}"),
    }
}

#[rstest]
fn custom_territory_name_is_echoed() {
    let (_tmp, root) = workspace();
    let territory = root.join("territory.json");
    write_utf8(&territory, br#"{"name":"Vietnam (north)"}"#);

    let output = check(CheckArgs {
        lat: Some(21.0285),
        lon: Some(105.8542),
        territory: Some(territory),
        ..CheckArgs::default()
    });
    assert_eq!(output["territory"], "Vietnam (north)");
}
