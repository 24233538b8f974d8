//! One-shot resolution of the user's current coordinates.
//!
//! There is no browser-style permission prompt in a terminal; the default
//! implementation asks a free IP-geolocation service instead. The trait seam
//! exists so the dashboard can run without any location capability (the
//! "unsupported" case) and so tests can substitute canned locators.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "http://ip-api.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Geolocation is not supported in this environment.")]
    Unsupported,

    #[error("Permission denied for geolocation.")]
    Denied,

    #[error("Error resolving your location: {0}")]
    Failed(String),
}

#[async_trait]
pub trait Locator: Send + Sync + std::fmt::Debug {
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Coordinate lookup from the caller's public IP address.
#[derive(Debug, Clone)]
pub struct IpLocator {
    http: Client,
    base_url: String,
}

impl IpLocator {
    pub fn new() -> Result<Self, LocationError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, LocationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LocationError::Failed(e.to_string()))?;

        Ok(Self { http, base_url: base_url.into() })
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

#[async_trait]
impl Locator for IpLocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let url = format!("{}/json?fields=status,message,lat,lon", self.base_url);

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| LocationError::Failed(e.without_url().to_string()))?;

        let status = res.status();
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LocationError::Denied);
        }
        if !status.is_success() {
            return Err(LocationError::Failed(format!("lookup returned status {status}")));
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| LocationError::Failed(e.without_url().to_string()))?;

        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| "lookup refused".to_string());
            return Err(LocationError::Failed(reason));
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates { latitude, longitude }),
            _ => Err(LocationError::Failed("lookup returned no coordinates".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn locate_parses_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "lat": 51.5074,
                "lon": -0.1278,
            })))
            .mount(&server)
            .await;

        let locator = IpLocator::with_base_url(server.uri()).unwrap();
        let coords = locator.locate().await.unwrap();
        assert_eq!(coords.latitude, 51.5074);
        assert_eq!(coords.longitude, -0.1278);
    }

    #[tokio::test]
    async fn lookup_refusal_carries_the_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail",
                "message": "private range",
            })))
            .mount(&server)
            .await;

        let locator = IpLocator::with_base_url(server.uri()).unwrap();
        let err = locator.locate().await.unwrap_err();
        assert!(matches!(err, LocationError::Failed(ref m) if m.contains("private range")));
    }

    #[tokio::test]
    async fn throttled_lookup_maps_to_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let locator = IpLocator::with_base_url(server.uri()).unwrap();
        let err = locator.locate().await.unwrap_err();
        assert!(matches!(err, LocationError::Denied));
    }
}
