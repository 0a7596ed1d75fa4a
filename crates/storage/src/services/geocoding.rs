use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::models::{Coordinates, Geocodable};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Geocoding request timed out")]
    Timeout,

    #[error("Geocoding service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),

    #[error("Geocoding request rejected: {0}")]
    Client(String),
}

impl GeocodeError {
    /// Failures that say nothing about the address itself and may succeed on
    /// a later save.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Unavailable(_))
    }

    fn from_status(status: StatusCode) -> Self {
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Self::Unavailable(format!("service responded with {}", status))
        } else {
            Self::Client(format!("service responded with {}", status))
        }
    }
}

impl From<reqwest::Error> for GeocodeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() || error.is_request() {
            Self::Unavailable(error.to_string())
        } else if error.is_decode() {
            Self::InvalidResponse(error.to_string())
        } else if let Some(status) = error.status() {
            Self::from_status(status)
        } else {
            Self::Client(error.to_string())
        }
    }
}

/// Resolves a free-text address to coordinates. `Ok(None)` means the service
/// found no match.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("racemanager/{}", env!("CARGO_PKG_VERSION")),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for a Nominatim compatible search API
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeocodeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        debug!("Geocoding '{}' via {}", query, url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::from_status(status));
        }

        let body = response.text().await?;
        parse_search_results(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// Reads the first hit of a Nominatim `format=json` search response.
fn parse_search_results(body: &str) -> Result<Option<Coordinates>, GeocodeError> {
    let results: Vec<SearchResult> =
        serde_json::from_str(body).map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

    let Some(first) = results.into_iter().next() else {
        return Ok(None);
    };

    let parse = |value: &str, name: &str| {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| GeocodeError::InvalidResponse(format!("bad {}: '{}'", name, value)))
    };

    Ok(Some(Coordinates {
        latitude: parse(&first.lat, "latitude")?,
        longitude: parse(&first.lon, "longitude")?,
    }))
}

/// What happened when a location was run through the geocoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeocodeOutcome {
    AlreadyGeocoded,
    Resolved(Coordinates),
    NoMatch,
    Failed,
}

/// Fills in the coordinates of `location` when it has none yet.
///
/// Never fails: a missing match or any service failure is logged and leaves
/// the location without coordinates, so the next save retries the lookup.
pub async fn geocode_location<G, L>(geocoder: &G, location: &mut L) -> GeocodeOutcome
where
    G: Geocoder + ?Sized,
    L: Geocodable + Send,
{
    if location.has_coordinates() {
        return GeocodeOutcome::AlreadyGeocoded;
    }

    let query = location.geocode_query();

    match geocoder.lookup(&query).await {
        Ok(Some(coordinates)) => {
            info!(
                "Geocoded '{}' to ({}, {})",
                query, coordinates.latitude, coordinates.longitude
            );
            location.set_coordinates(coordinates);
            GeocodeOutcome::Resolved(coordinates)
        }
        Ok(None) => {
            info!("No geocoding match for '{}'", query);
            GeocodeOutcome::NoMatch
        }
        Err(e) if e.is_transient() => {
            warn!("Geocoding '{}' failed, saving without coordinates: {}", query, e);
            GeocodeOutcome::Failed
        }
        Err(e) => {
            error!(
                "Geocoding service rejected '{}', saving without coordinates: {}",
                query, e
            );
            GeocodeOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewLocation;
    use std::sync::Mutex;

    struct Scripted {
        reply: Mutex<Option<Result<Option<Coordinates>, GeocodeError>>>,
        queries: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(reply: Result<Option<Coordinates>, GeocodeError>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Geocoder for Scripted {
        async fn lookup(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.reply
                .lock()
                .unwrap()
                .take()
                .expect("geocoder called more than once")
        }
    }

    fn location() -> NewLocation {
        NewLocation {
            city: "Nowhere".to_string(),
            state: "NC".to_string(),
            zip_code: 45321,
            address: "111 Main Street".to_string(),
            description: None,
            latitude: None,
            longitude: None,
        }
    }

    const RALEIGH: Coordinates = Coordinates {
        latitude: 35.7796,
        longitude: -78.6382,
    };

    #[test]
    fn test_parse_first_hit() {
        let body = r#"[
            {"place_id": 1, "lat": "35.7796", "lon": "-78.6382", "display_name": "Raleigh"},
            {"place_id": 2, "lat": "0", "lon": "0", "display_name": "Elsewhere"}
        ]"#;
        assert_eq!(parse_search_results(body).unwrap(), Some(RALEIGH));
    }

    #[test]
    fn test_parse_no_match() {
        assert_eq!(parse_search_results("[]").unwrap(), None);
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_search_results("<html>").unwrap_err();
        assert!(!err.is_transient());

        let err = parse_search_results(r#"[{"lat": "north", "lon": "1.0"}]"#).unwrap_err();
        assert!(matches!(err, GeocodeError::InvalidResponse(_)));
    }

    #[test]
    fn test_status_classification() {
        assert!(GeocodeError::from_status(StatusCode::SERVICE_UNAVAILABLE).is_transient());
        assert!(GeocodeError::from_status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(!GeocodeError::from_status(StatusCode::FORBIDDEN).is_transient());
    }

    #[tokio::test]
    async fn test_resolves_coordinates() {
        let geocoder = Scripted::new(Ok(Some(RALEIGH)));
        let mut loc = location();

        let outcome = geocode_location(&geocoder, &mut loc).await;

        assert_eq!(outcome, GeocodeOutcome::Resolved(RALEIGH));
        assert_eq!(loc.coordinates(), Some(RALEIGH));
        assert_eq!(geocoder.queries(), vec!["111 Main Street 45321".to_string()]);
    }

    #[tokio::test]
    async fn test_no_match_leaves_coordinates_empty() {
        let geocoder = Scripted::new(Ok(None));
        let mut loc = location();

        let outcome = geocode_location(&geocoder, &mut loc).await;

        assert_eq!(outcome, GeocodeOutcome::NoMatch);
        assert!(!loc.has_coordinates());
    }

    #[tokio::test]
    async fn test_transient_failure_is_absorbed() {
        let geocoder = Scripted::new(Err(GeocodeError::Timeout));
        let mut loc = location();

        let outcome = geocode_location(&geocoder, &mut loc).await;

        assert_eq!(outcome, GeocodeOutcome::Failed);
        assert_eq!(loc.latitude, None);
        assert_eq!(loc.longitude, None);
    }

    #[tokio::test]
    async fn test_rejected_request_is_absorbed() {
        let geocoder = Scripted::new(Err(GeocodeError::from_status(StatusCode::FORBIDDEN)));
        let mut loc = location();

        let outcome = geocode_location(&geocoder, &mut loc).await;

        assert_eq!(outcome, GeocodeOutcome::Failed);
        assert!(!loc.has_coordinates());
    }

    #[tokio::test]
    async fn test_unreadable_response_is_absorbed() {
        let geocoder = Scripted::new(Err(GeocodeError::InvalidResponse("bad".to_string())));
        let mut loc = location();

        let outcome = geocode_location(&geocoder, &mut loc).await;

        assert_eq!(outcome, GeocodeOutcome::Failed);
        assert!(!loc.has_coordinates());
    }

    #[tokio::test]
    async fn test_existing_coordinates_skip_lookup() {
        let geocoder = Scripted::new(Ok(Some(RALEIGH)));
        let mut loc = location();
        loc.latitude = Some(36.0);
        loc.longitude = Some(-79.0);

        let outcome = geocode_location(&geocoder, &mut loc).await;

        assert_eq!(outcome, GeocodeOutcome::AlreadyGeocoded);
        assert!(geocoder.queries().is_empty());
        assert_eq!(loc.latitude, Some(36.0));
        assert_eq!(loc.longitude, Some(-79.0));
    }
}
