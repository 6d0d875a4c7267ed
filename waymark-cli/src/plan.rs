//! `route` and `trip` command implementation.

use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use waymark_core::{Destination, GeoPoint, PlanError, RoutePlanner, SafetyLabel, VehicleProfile};
use waymark_data::routing::{GraphHopperConfig, GraphHopperRouteProvider};
use waymark_data::{CachedRouteProvider, load_boundary_or_fallback};
use waymark_planner::BorderAwarePlanner;

use crate::territory::load_territory;
use crate::{
    ARG_BOUNDARY, ARG_CACHE, ARG_GRAPHHOPPER_KEY, ARG_GRAPHHOPPER_URL, ARG_LOCALE, ARG_REQUEST,
    ARG_TERRITORY, ARG_TIMEOUT_SECS, CliError, ENV_PLAN_REQUEST, read_json, require_existing,
    write_json,
};

/// CLI arguments shared by the `route` and `trip` subcommands.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan a route from a JSON request and print a JSON envelope. \
                 Routes are requested from a GraphHopper-compatible engine and \
                 rerouted through backbone cities when they stray across the \
                 border.",
    about = "Plan border-compliant routes"
)]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct PlanArgs {
    /// Path to a JSON planning request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// JSON territory description; defaults to the Vietnam preset.
    #[arg(long = ARG_TERRITORY, value_name = "path")]
    #[serde(default)]
    pub(crate) territory: Option<Utf8PathBuf>,
    /// GeoJSON country outline; the coarse fallback is used without it.
    #[arg(long = ARG_BOUNDARY, value_name = "path")]
    #[serde(default)]
    pub(crate) boundary: Option<Utf8PathBuf>,
    /// Base URL of the routing API (e.g. "http://localhost:8989").
    #[arg(long = ARG_GRAPHHOPPER_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) graphhopper_url: Option<String>,
    /// API key for the routing API.
    #[arg(long = ARG_GRAPHHOPPER_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) graphhopper_key: Option<String>,
    /// Locale for turn-by-turn instructions.
    #[arg(long = ARG_LOCALE, value_name = "locale")]
    #[serde(default)]
    pub(crate) locale: Option<String>,
    /// Routing request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// JSON file memoising routed legs between runs.
    #[arg(long = ARG_CACHE, value_name = "path")]
    #[serde(default)]
    pub(crate) cache: Option<Utf8PathBuf>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved planning configuration.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct PlanConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) territory: Option<Utf8PathBuf>,
    pub(crate) boundary: Option<Utf8PathBuf>,
    pub(crate) graphhopper_url: String,
    pub(crate) graphhopper_key: Option<String>,
    pub(crate) locale: String,
    pub(crate) timeout: Duration,
    pub(crate) cache: Option<Utf8PathBuf>,
}

impl std::fmt::Debug for PlanConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanConfig")
            .field("request_path", &self.request_path)
            .field("territory", &self.territory)
            .field("boundary", &self.boundary)
            .field("graphhopper_url", &self.graphhopper_url)
            .field(
                "graphhopper_key",
                &self.graphhopper_key.as_ref().map(|_| "<redacted>"),
            )
            .field("locale", &self.locale)
            .field("timeout", &self.timeout)
            .field("cache", &self.cache)
            .finish()
    }
}

impl PlanConfig {
    /// The request must exist; a missing boundary file only degrades accuracy.
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_REQUEST)?;
        if let Some(territory) = &self.territory {
            require_existing(territory, ARG_TERRITORY)?;
        }
        Ok(())
    }

    fn graphhopper(&self) -> GraphHopperConfig {
        let mut config = GraphHopperConfig::new(self.graphhopper_url.clone())
            .with_locale(self.locale.clone())
            .with_timeout(self.timeout);
        if let Some(key) = &self.graphhopper_key {
            config = config.with_api_key(key.clone());
        }
        config
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_PLAN_REQUEST,
        })?;
        let defaults = GraphHopperConfig::default();
        Ok(Self {
            request_path,
            territory: args.territory,
            boundary: args.boundary,
            graphhopper_url: args.graphhopper_url.unwrap_or(defaults.base_url),
            graphhopper_key: args.graphhopper_key,
            locale: args.locale.unwrap_or(defaults.locale),
            timeout: args
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            cache: args.cache,
        })
    }
}

/// Request body for `waymark route`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SegmentRequest {
    pub(crate) start_lat: f64,
    pub(crate) start_lon: f64,
    pub(crate) end_lat: f64,
    pub(crate) end_lon: f64,
    #[serde(default)]
    pub(crate) vehicle: VehicleProfile,
}

impl SegmentRequest {
    fn endpoints(&self) -> Result<(GeoPoint, GeoPoint), PlanError> {
        Ok((
            GeoPoint::new(self.start_lat, self.start_lon)?,
            GeoPoint::new(self.end_lat, self.end_lon)?,
        ))
    }
}

/// One stop in a [`TripRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct DestinationRequest {
    pub(crate) lat: f64,
    pub(crate) lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
}

/// Request body for `waymark trip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TripRequest {
    pub(crate) start_lat: f64,
    pub(crate) start_lon: f64,
    pub(crate) destinations: Vec<DestinationRequest>,
    #[serde(default)]
    pub(crate) vehicle: VehicleProfile,
}

impl TripRequest {
    fn stops(&self) -> Result<(GeoPoint, Vec<Destination>), PlanError> {
        let start = GeoPoint::new(self.start_lat, self.start_lon)?;
        let destinations = self
            .destinations
            .iter()
            .map(|stop| {
                Ok(Destination {
                    location: GeoPoint::new(stop.lat, stop.lon)?,
                    name: stop.name.clone(),
                })
            })
            .collect::<Result<Vec<_>, PlanError>>()?;
        Ok((start, destinations))
    }
}

/// JSON envelope printed by the planning commands.
#[derive(Debug, Serialize)]
struct PlanResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    safety: Option<SafetyLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Builds a planner for the current invocation.
pub(crate) trait PlannerBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn RoutePlanner>, CliError>;
}

pub(crate) struct DefaultPlannerBuilder;

impl PlannerBuilder for DefaultPlannerBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn RoutePlanner>, CliError> {
        let territory = load_territory(config.territory.as_deref())?;
        let boundary = load_boundary_or_fallback(config.boundary.as_deref(), &territory);
        let provider =
            GraphHopperRouteProvider::with_config(config.graphhopper()).map_err(|source| {
                CliError::BuildClient {
                    base_url: config.graphhopper_url.clone(),
                    source,
                }
            })?;
        let Some(cache_path) = &config.cache else {
            return Ok(Box::new(BorderAwarePlanner::new(provider, boundary, territory)));
        };
        Ok(Box::new(BorderAwarePlanner::new(
            CachedRouteProvider::with_persistence(provider, cache_path.clone()),
            boundary,
            territory,
        )))
    }
}

pub(crate) fn run_route_with(
    args: PlanArgs,
    builder: &dyn PlannerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_plan_config(args)?;
    let request: SegmentRequest = read_json(&config.request_path)?;
    let outcome = match request.endpoints() {
        Ok((start, end)) => builder
            .build(&config)?
            .plan_segment(start, end, request.vehicle)
            .map(|candidate| {
                let safety = candidate.safety();
                (candidate, safety)
            }),
        Err(err) => Err(err),
    };
    write_outcome(writer, outcome)
}

pub(crate) fn run_trip_with(
    args: PlanArgs,
    builder: &dyn PlannerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_plan_config(args)?;
    let request: TripRequest = read_json(&config.request_path)?;
    let outcome = match request.stops() {
        Ok((start, destinations)) => builder
            .build(&config)?
            .plan_trip(start, &destinations, request.vehicle)
            .map(|plan| {
                let safety = plan.safety;
                (plan, safety)
            }),
        Err(err) => Err(err),
    };
    write_outcome(writer, outcome)
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Print the envelope; planning failures are printed and then returned.
fn write_outcome<T: Serialize>(
    writer: &mut dyn Write,
    outcome: Result<(T, SafetyLabel), PlanError>,
) -> Result<(), CliError> {
    match outcome {
        Ok((route, safety)) => write_json(
            writer,
            &PlanResponse {
                success: true,
                route: Some(route),
                safety: Some(safety),
                error: None,
            },
        ),
        Err(err) => {
            log::warn!("planning failed: {err}");
            write_json(
                writer,
                &PlanResponse::<T> {
                    success: false,
                    route: None,
                    safety: None,
                    error: Some(err.to_string()),
                },
            )?;
            Err(CliError::Plan(err))
        }
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
