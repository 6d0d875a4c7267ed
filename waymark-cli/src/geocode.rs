//! `geocode` command: forward lookup of a place name, or reverse lookup of a
//! point.

use std::io::Write;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use waymark_core::{GeoPoint, Geocoder};
use waymark_data::{GeocoderConfig, HttpGeocoder};

use crate::{
    ARG_COUNTRY_HINT, ARG_GEOCODER_KEY, ARG_GEOCODER_URL, ARG_LAT, ARG_LON, ARG_QUERY, CliError,
    ENV_GEOCODE_QUERY, write_json,
};

#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Resolve a place name to coordinates, or pass --lat and --lon \
                 to describe a point instead.",
    about = "Resolve a place name, or describe a point"
)]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct GeocodeArgs {
    /// Free-text place name, e.g. "Hoi An".
    #[arg(value_name = ARG_QUERY)]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Latitude for a reverse lookup.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude for a reverse lookup.
    #[arg(long = ARG_LON, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Base URL of the geocoding service.
    #[arg(long = ARG_GEOCODER_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_url: Option<String>,
    /// API key for the geocoding service.
    #[arg(long = ARG_GEOCODER_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) geocoder_key: Option<String>,
    /// Country appended to queries that do not name it; empty disables.
    #[arg(long = ARG_COUNTRY_HINT, value_name = "country")]
    #[serde(default)]
    pub(crate) country_hint: Option<String>,
}

/// What to look up.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Lookup {
    Forward(String),
    Reverse(GeoPoint),
}

#[derive(Debug, Clone)]
pub(crate) struct GeocodeConfig {
    pub(crate) lookup: Lookup,
    pub(crate) service: GeocoderConfig,
}

impl GeocodeArgs {
    fn into_config(self) -> Result<GeocodeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        GeocodeConfig::try_from(merged)
    }
}

impl TryFrom<GeocodeArgs> for GeocodeConfig {
    type Error = CliError;

    fn try_from(args: GeocodeArgs) -> Result<Self, Self::Error> {
        let lookup = match (args.query, args.lat, args.lon) {
            (Some(query), _, _) => Lookup::Forward(query),
            (None, Some(lat), Some(lon)) => {
                Lookup::Reverse(GeoPoint::new(lat, lon).map_err(CliError::InvalidPoint)?)
            }
            (None, _, _) => {
                return Err(CliError::MissingArgument {
                    field: ARG_QUERY,
                    env: ENV_GEOCODE_QUERY,
                });
            }
        };
        let mut service = args
            .geocoder_url
            .map_or_else(GeocoderConfig::default, GeocoderConfig::new);
        if let Some(key) = args.geocoder_key {
            service = service.with_api_key(key);
        }
        if let Some(hint) = args.country_hint {
            let trimmed = hint.trim();
            service =
                service.with_country_hint((!trimmed.is_empty()).then(|| trimmed.to_owned()));
        }
        Ok(Self { lookup, service })
    }
}

/// Builds a geocoder for the current invocation.
pub(crate) trait GeocoderBuilder {
    fn build(&self, config: &GeocoderConfig) -> Result<Box<dyn Geocoder>, CliError>;
}

pub(crate) struct DefaultGeocoderBuilder;

impl GeocoderBuilder for DefaultGeocoderBuilder {
    fn build(&self, config: &GeocoderConfig) -> Result<Box<dyn Geocoder>, CliError> {
        let geocoder = HttpGeocoder::with_config(config.clone()).map_err(|source| {
            CliError::BuildClient {
                base_url: config.base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(geocoder))
    }
}

#[derive(Debug, Serialize)]
struct GeocodeResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    result: Option<T>,
}

pub(crate) fn run_geocode_with(
    args: GeocodeArgs,
    builder: &dyn GeocoderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let geocoder = builder.build(&config.service)?;
    match config.lookup {
        Lookup::Forward(query) => write_lookup(writer, geocoder.geocode(&query)),
        Lookup::Reverse(point) => write_lookup(writer, geocoder.reverse_geocode(point)),
    }
}

fn write_lookup<T: Serialize>(
    writer: &mut dyn Write,
    outcome: Result<Option<T>, waymark_core::GeocodeError>,
) -> Result<(), CliError> {
    match outcome {
        Ok(result) => write_json(
            writer,
            &GeocodeResponse {
                success: true,
                error: None,
                result,
            },
        ),
        Err(err) => {
            write_json(
                writer,
                &GeocodeResponse::<T> {
                    success: false,
                    error: Some(err.to_string()),
                    result: None,
                },
            )?;
            Err(CliError::Geocode(err))
        }
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<GeocodeConfig, CliError> {
    let merged = GeocodeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    GeocodeConfig::try_from(merged)
}
