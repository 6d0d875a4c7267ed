//! HTTP geocoder for a Nominatim-style search API.
//!
//! Forward lookups call `GET {base_url}/search?q=...` and take the first hit;
//! reverse lookups call `GET {base_url}/reverse?lat=...&lon=...`. Requests
//! are spaced at least `min_interval` apart to respect free-tier rate limits.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::{Client, Response};
use serde::Deserialize;
use waymark_core::{GeoPoint, GeocodeError, GeocodeMatch, Geocoder, ReverseGeocode};

use crate::http::{BlockingRuntime, ProviderBuildError, build_client};

/// Default geocoding service.
pub const DEFAULT_GEOCODER_URL: &str = "https://geocode.maps.co";

const DEFAULT_USER_AGENT: &str = "waymark-geocoding/0.1";

/// Configuration for [`HttpGeocoder`].
#[derive(Clone)]
pub struct GeocoderConfig {
    /// Base URL; `/search` and `/reverse` are appended.
    pub base_url: String,
    /// API key sent as `api_key`, if the service requires one.
    pub api_key: Option<String>,
    /// Appended as `", {hint}"` to forward queries that do not mention it.
    pub country_hint: Option<String>,
    /// Minimum spacing between consecutive requests.
    pub min_interval: Duration,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl std::fmt::Debug for GeocoderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocoderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("country_hint", &self.country_hint)
            .field("min_interval", &self.min_interval)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_owned(),
            api_key: None,
            country_hint: Some("Vietnam".to_owned()),
            min_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl GeocoderConfig {
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

    /// Set or clear the country hint.
    #[must_use]
    pub fn with_country_hint(mut self, hint: Option<String>) -> Self {
        self.country_hint = hint;
        self
    }

    /// Set the minimum spacing between requests.
    #[must_use]
    pub const fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Text(String),
    Number(f64),
}

impl Coordinate {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Text(text) => text.trim().parse().ok(),
            Self::Number(number) => Some(*number),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: Coordinate,
    lon: Coordinate,
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseBody {
    display_name: Option<String>,
    #[serde(default)]
    address: serde_json::Map<String, serde_json::Value>,
}

/// Blocking [`Geocoder`] over HTTP.
///
/// # Examples
/// ```no_run
/// use waymark_core::Geocoder;
/// use waymark_data::{GeocoderConfig, HttpGeocoder};
///
/// let geocoder = HttpGeocoder::with_config(GeocoderConfig::default().with_api_key("my-key"))?;
/// if let Some(found) = geocoder.geocode("Hoi An")? {
///     println!("{} at {}", found.display_name, found.location);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct HttpGeocoder {
    client: Client,
    config: GeocoderConfig,
    runtime: BlockingRuntime,
    last_request: Mutex<Option<Instant>>,
}

impl std::fmt::Debug for HttpGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGeocoder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpGeocoder {
    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: GeocoderConfig) -> Result<Self, ProviderBuildError> {
        let client = build_client(&config.user_agent, config.timeout)?;
        let runtime = BlockingRuntime::new()?;
        Ok(Self {
            client,
            config,
            runtime,
            last_request: Mutex::new(None),
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn hinted_query(&self, query: &str) -> String {
        match &self.config.country_hint {
            Some(hint) if !query.to_lowercase().contains(&hint.to_lowercase()) => {
                format!("{query}, {hint}")
            }
            _ => query.to_owned(),
        }
    }

    /// Sleep until `min_interval` has passed since the previous request.
    fn throttle(&self) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(previous) = *last {
            let wait = self.config.min_interval.saturating_sub(previous.elapsed());
            if !wait.is_zero() {
                log::debug!("geocoder throttled for {wait:?}");
                std::thread::sleep(wait);
            }
        }
        *last = Some(Instant::now());
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<T, GeocodeError> {
        if let Some(key) = &self.config.api_key {
            params.push(("api_key", key.clone()));
        }
        let response = self
            .client
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        check_status(response, url)
            .await?
            .json()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    self.convert_reqwest_error(&err, url)
                } else {
                    GeocodeError::ParseError {
                        message: err.to_string(),
                    }
                }
            })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> GeocodeError {
        if error.is_timeout() {
            return GeocodeError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return GeocodeError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        GeocodeError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

impl Geocoder for HttpGeocoder {
    fn geocode(&self, query: &str) -> Result<Option<GeocodeMatch>, GeocodeError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }
        let hinted = self.hinted_query(trimmed);
        let url = self.endpoint("search");
        log::debug!("geocoding {hinted:?}");
        self.throttle();
        let hits: Vec<SearchHit> = self
            .runtime
            .block_on(self.get_json(&url, vec![("q", hinted)]))?;
        hits.into_iter().next().map(convert_hit).transpose()
    }

    fn reverse_geocode(&self, point: GeoPoint) -> Result<Option<ReverseGeocode>, GeocodeError> {
        let url = self.endpoint("reverse");
        log::debug!("reverse geocoding {point}");
        self.throttle();
        let params = vec![("lat", point.lat.to_string()), ("lon", point.lon.to_string())];
        let body: ReverseBody = self.runtime.block_on(self.get_json(&url, params))?;
        Ok(body.display_name.map(|display_name| ReverseGeocode {
            display_name,
            address: body.address,
        }))
    }
}

fn convert_hit(hit: SearchHit) -> Result<GeocodeMatch, GeocodeError> {
    let (Some(lat), Some(lon)) = (hit.lat.value(), hit.lon.value()) else {
        return Err(GeocodeError::ParseError {
            message: "search hit has non-numeric coordinates".to_owned(),
        });
    };
    let location = GeoPoint::new(lat, lon).map_err(|err| GeocodeError::ParseError {
        message: err.to_string(),
    })?;
    Ok(GeocodeMatch {
        location,
        display_name: hit.display_name,
    })
}

async fn check_status(response: Response, url: &str) -> Result<Response, GeocodeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .ok()
        .filter(|body| !body.trim().is_empty())
        .unwrap_or_else(|| status.to_string());
    Err(GeocodeError::HttpError {
        url: url.to_owned(),
        status: status.as_u16(),
        message,
    })
}
