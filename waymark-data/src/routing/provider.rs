//! `RouteProvider` backed by a GraphHopper-compatible Routing API.
//!
//! The [`RouteProvider`] trait is synchronous to keep the planner embeddable
//! in synchronous contexts. This provider bridges to async `reqwest` calls by
//! blocking on a Tokio runtime internally.

use std::time::Duration;

use reqwest::{Client, Response};
use waymark_core::{GeoPoint, RouteError, RoutePath, RouteProvider, VehicleProfile};

use super::graphhopper::{ErrorBody, ResponsePath, RouteResponse};
use crate::http::{BlockingRuntime, ProviderBuildError, build_client};

/// Default user agent for routing requests.
pub const DEFAULT_USER_AGENT: &str = "waymark-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Configuration for [`GraphHopperRouteProvider`].
#[derive(Clone)]
pub struct GraphHopperConfig {
    /// Base URL of the service; `/route` is appended.
    pub base_url: String,
    /// API key sent as `key`, if the service requires one.
    pub api_key: Option<String>,
    /// Language for turn instructions.
    pub locale: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl std::fmt::Debug for GraphHopperConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphHopperConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("locale", &self.locale)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for GraphHopperConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8989".to_owned(),
            api_key: None,
            locale: "vi".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl GraphHopperConfig {
    /// Create a configuration for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the instruction locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP route provider for the GraphHopper Routing API.
///
/// Each call is a single `GET {base_url}/route` with one `point` parameter
/// per requested point, in order. Nothing is retried.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the provider blocks on its own stored runtime.
/// Inside a multi-threaded runtime it uses that runtime's handle with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it falls
/// back to its own runtime, blocking the caller's executor meanwhile.
///
/// # Examples
/// ```no_run
/// use std::time::Duration;
/// use waymark_core::{GeoPoint, RouteProvider, VehicleProfile};
/// use waymark_data::routing::{GraphHopperConfig, GraphHopperRouteProvider};
///
/// let config = GraphHopperConfig::new("https://graphhopper.com/api/1")
///     .with_api_key("my-key")
///     .with_timeout(Duration::from_secs(15));
/// let provider = GraphHopperRouteProvider::with_config(config)?;
///
/// let points = [GeoPoint::new(21.0285, 105.8542)?, GeoPoint::new(20.8449, 106.6881)?];
/// let path = provider.request_route(&points, VehicleProfile::Car)?;
/// assert!(path.distance_m > 0.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct GraphHopperRouteProvider {
    client: Client,
    config: GraphHopperConfig,
    runtime: BlockingRuntime,
}

impl std::fmt::Debug for GraphHopperRouteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphHopperRouteProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &self.runtime)
            .finish()
    }
}

impl GraphHopperRouteProvider {
    /// Create a provider with default configuration for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(GraphHopperConfig::new(base_url))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: GraphHopperConfig) -> Result<Self, ProviderBuildError> {
        let client = build_client(&config.user_agent, config.timeout)?;
        let runtime = BlockingRuntime::new()?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GraphHopperConfig {
        &self.config
    }

    /// Endpoint URL, without query parameters or credentials.
    fn route_url(&self) -> String {
        format!("{}/route", self.config.base_url.trim_end_matches('/'))
    }

    /// Query parameters for one request.
    fn query_params(
        &self,
        points: &[GeoPoint],
        profile: VehicleProfile,
    ) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = points
            .iter()
            .map(|point| ("point", format!("{},{}", point.lat, point.lon)))
            .collect();
        params.extend([
            ("vehicle", profile.as_str().to_owned()),
            ("locale", self.config.locale.clone()),
            ("instructions", "true".to_owned()),
            ("calc_points", "true".to_owned()),
            ("points_encoded", "false".to_owned()),
        ]);
        if let Some(key) = &self.config.api_key {
            params.push(("key", key.clone()));
        }
        params
    }

    async fn fetch_route_async(
        &self,
        points: &[GeoPoint],
        profile: VehicleProfile,
    ) -> Result<RoutePath, RouteError> {
        let url = self.route_url();
        let response = self
            .client
            .get(&url)
            .query(&self.query_params(points, profile))
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let body: RouteResponse = check_status(response, &url)
            .await?
            .json()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    self.convert_reqwest_error(&err, &url)
                } else {
                    RouteError::ParseError {
                        message: err.to_string(),
                    }
                }
            })?;
        Self::convert_response(body)
    }

    /// Convert a reqwest error to a `RouteError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> RouteError {
        if error.is_timeout() {
            return RouteError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return RouteError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        RouteError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Convert the first path of a response to a `RoutePath`.
    fn convert_response(response: RouteResponse) -> Result<RoutePath, RouteError> {
        let path = response.paths.into_iter().next().ok_or(RouteError::NoPaths)?;
        convert_path(path)
    }
}

fn convert_path(path: ResponsePath) -> Result<RoutePath, RouteError> {
    let coordinates = path
        .points
        .ok_or_else(|| RouteError::ParseError {
            message: "response path has no points".to_owned(),
        })?
        .coordinates;
    let polyline = coordinates
        .iter()
        .map(|coordinate| match coordinate.as_slice() {
            [lon, lat, ..] => Ok(GeoPoint::new_unchecked(*lat, *lon)),
            _ => Err(RouteError::ParseError {
                message: format!("coordinate {coordinate:?} needs longitude and latitude"),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let route = RoutePath::new(polyline, path.distance, Duration::from_millis(path.time))
        .with_instructions(path.instructions);
    Ok(match path.bbox {
        Some(bbox) => route.with_bbox(bbox),
        None => route,
    })
}

/// Turn non-success statuses into `HttpError`, keeping the service's reason.
async fn check_status(response: Response, url: &str) -> Result<Response, RouteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|error| error.message)
        .unwrap_or_else(|| status.to_string());
    Err(RouteError::HttpError {
        url: url.to_owned(),
        status: status.as_u16(),
        message,
    })
}

impl RouteProvider for GraphHopperRouteProvider {
    fn request_route(
        &self,
        points: &[GeoPoint],
        profile: VehicleProfile,
    ) -> Result<RoutePath, RouteError> {
        if points.len() < 2 {
            return Err(RouteError::InvalidInput {
                message: format!("at least two points are required, got {}", points.len()),
            });
        }
        log::debug!("requesting {profile} route through {} points", points.len());
        self.runtime.block_on(self.fetch_route_async(points, profile))
    }
}
