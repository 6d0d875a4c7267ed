//! Command-line interface for the Waymark border-aware route planner.
//!
//! `waymark route` and `waymark trip` read a JSON request, plan it against a
//! GraphHopper-compatible engine and print a JSON envelope. `waymark check`
//! tests a single point against the territory and `waymark geocode` resolves
//! place names. Settings layer from flags, `WAYMARK_*` environment variables
//! and configuration files.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use serde::Serialize;

mod check;
mod error;
mod geocode;
mod plan;
mod territory;

pub use error::CliError;

use check::CheckArgs;
use geocode::{DefaultGeocoderBuilder, GeocodeArgs};
use plan::{DefaultPlannerBuilder, PlanArgs};

const ARG_REQUEST: &str = "request";
const ARG_TERRITORY: &str = "territory";
const ARG_BOUNDARY: &str = "boundary";
const ARG_GRAPHHOPPER_URL: &str = "graphhopper-url";
const ARG_GRAPHHOPPER_KEY: &str = "graphhopper-key";
const ARG_LOCALE: &str = "locale";
const ARG_CACHE: &str = "cache";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_LAT: &str = "lat";
const ARG_LON: &str = "lon";
const ARG_QUERY: &str = "query";
const ARG_GEOCODER_URL: &str = "geocoder-url";
const ARG_GEOCODER_KEY: &str = "geocoder-key";
const ARG_COUNTRY_HINT: &str = "country-hint";
const ENV_PLAN_REQUEST: &str = "WAYMARK_CMDS_PLAN_REQUEST_PATH";
const ENV_CHECK_LAT: &str = "WAYMARK_CMDS_CHECK_LAT";
const ENV_CHECK_LON: &str = "WAYMARK_CMDS_CHECK_LON";
const ENV_GEOCODE_QUERY: &str = "WAYMARK_CMDS_GEOCODE_QUERY";

/// Run the Waymark CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration or inputs are invalid,
/// or when planning or geocoding fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Route(args) => plan::run_route_with(args, &DefaultPlannerBuilder, writer),
        Command::Trip(args) => plan::run_trip_with(args, &DefaultPlannerBuilder, writer),
        Command::Check(args) => check::run_check_with(args, writer),
        Command::Geocode(args) => {
            geocode::run_geocode_with(args, &DefaultGeocoderBuilder, writer)
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "waymark",
    about = "Plan road routes that stay inside a country's borders",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a single segment from a JSON request.
    Route(PlanArgs),
    /// Plan a multi-stop trip from a JSON request.
    Trip(PlanArgs),
    /// Report whether a point lies inside the territory.
    Check(CheckArgs),
    /// Resolve a place name, or describe a point.
    Geocode(GeocodeArgs),
}

/// Fail unless `path` names an existing regular file.
fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match waymark_data::fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Read and decode a JSON file.
fn read_json<T: serde::de::DeserializeOwned>(path: &Utf8Path) -> Result<T, CliError> {
    let text = waymark_data::fs::read_utf8(path).map_err(|source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print `value` as JSON followed by a newline.
fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
