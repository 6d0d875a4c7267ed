//! `check` command: test one point against the territory boundary.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use waymark_core::{BoundaryAccuracy, BoundaryOracle, GeoPoint};
use waymark_data::load_boundary_or_fallback;

use crate::territory::load_territory;
use crate::{
    ARG_BOUNDARY, ARG_LAT, ARG_LON, ARG_TERRITORY, CliError, ENV_CHECK_LAT, ENV_CHECK_LON,
    require_existing, write_json,
};

#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Report whether a point lies inside the territory")]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct CheckArgs {
    /// Latitude in decimal degrees.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude in decimal degrees.
    #[arg(long = ARG_LON, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// JSON territory description; defaults to the Vietnam preset.
    #[arg(long = ARG_TERRITORY, value_name = "path")]
    #[serde(default)]
    pub(crate) territory: Option<Utf8PathBuf>,
    /// GeoJSON country outline.
    #[arg(long = ARG_BOUNDARY, value_name = "path")]
    #[serde(default)]
    pub(crate) boundary: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CheckConfig {
    pub(crate) point: GeoPoint,
    pub(crate) territory: Option<Utf8PathBuf>,
    pub(crate) boundary: Option<Utf8PathBuf>,
}

impl CheckArgs {
    fn into_config(self) -> Result<CheckConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CheckConfig::try_from(merged)
    }
}

impl TryFrom<CheckArgs> for CheckConfig {
    type Error = CliError;

    fn try_from(args: CheckArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_CHECK_LAT,
        })?;
        let lon = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_LON,
            env: ENV_CHECK_LON,
        })?;
        let point = GeoPoint::new(lat, lon).map_err(CliError::InvalidPoint)?;
        Ok(Self {
            point,
            territory: args.territory,
            boundary: args.boundary,
        })
    }
}

#[derive(Debug, Serialize)]
struct CheckReport {
    lat: f64,
    lon: f64,
    inside: bool,
    accuracy: BoundaryAccuracy,
    degraded: bool,
    territory: String,
}

pub(crate) fn run_check_with(args: CheckArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    if let Some(path) = &config.territory {
        require_existing(path, ARG_TERRITORY)?;
    }
    let territory = load_territory(config.territory.as_deref())?;
    let boundary = load_boundary_or_fallback(config.boundary.as_deref(), &territory);
    let accuracy = boundary.accuracy();
    write_json(
        writer,
        &CheckReport {
            lat: config.point.lat,
            lon: config.point.lon,
            inside: boundary.is_inside(config.point),
            accuracy,
            degraded: accuracy.is_degraded(),
            territory: territory.name,
        },
    )
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<CheckConfig, CliError> {
    let merged = CheckArgs::merge_from_layers(layers).map_err(CliError::from)?;
    CheckConfig::try_from(merged)
}
