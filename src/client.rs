//! Directions provider client
//!
//! Fetches raw directions from the Google Directions API and hands them to
//! the normalizer. Request options are enumerated explicitly on
//! [`DirectionsRequest`] with defaults matching the service's metro-area
//! deployment (region "in", English responses, bus/rail/subway submodes).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::MapsConfig;
use crate::error::DirectionsError;
use crate::geo::Coordinate;
use crate::normalize;
use crate::route::Route;

/// Trait for directions clients
#[async_trait]
pub trait DirectionsClient: Send + Sync {
    /// Fetch transit routes between two coordinates, fastest first
    async fn transit_routes(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        departure: Option<DateTime<Utc>>,
    ) -> Result<Vec<Route>, DirectionsError>;

    /// Fetch a single walking route between two coordinates
    async fn walking_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Route, DirectionsError>;

    /// Check if the directions service is reachable
    async fn is_healthy(&self) -> bool;
}

/// Requested travel mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    /// Public transit
    Transit,
    /// Walking
    Walking,
}

impl TravelMode {
    /// Wire value for the `mode` query parameter
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Transit => "transit",
            Self::Walking => "walking",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_param())
    }
}

/// Requested departure time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartureTime {
    /// Depart as soon as possible
    Now,
    /// Depart at a specific instant
    At(DateTime<Utc>),
}

impl DepartureTime {
    /// Wire value for the `departure_time` query parameter
    #[must_use]
    pub fn as_param(self) -> String {
        match self {
            Self::Now => String::from("now"),
            Self::At(instant) => instant.timestamp().to_string(),
        }
    }
}

/// One directions request with every recognized option spelled out
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    /// Route origin
    pub origin: Coordinate,
    /// Route destination
    pub destination: Coordinate,
    /// Travel mode
    pub mode: TravelMode,
    /// Request alternative routes
    pub alternatives: bool,
    /// Region bias (ccTLD)
    pub region: String,
    /// Response language
    pub language: String,
    /// Transit submodes to consider (empty for non-transit requests)
    pub transit_modes: Vec<String>,
    /// Departure time (transit only)
    pub departure: Option<DepartureTime>,
}

impl DirectionsRequest {
    /// Build a transit request with the configured defaults
    #[must_use]
    pub fn transit(
        origin: Coordinate,
        destination: Coordinate,
        departure: Option<DateTime<Utc>>,
        config: &MapsConfig,
    ) -> Self {
        let mut transit_modes = Vec::new();
        if config.transit_bus {
            transit_modes.push("bus".to_string());
        }
        if config.transit_rail {
            transit_modes.push("rail".to_string());
        }
        if config.transit_subway {
            transit_modes.push("subway".to_string());
        }

        Self {
            origin,
            destination,
            mode: TravelMode::Transit,
            alternatives: config.alternatives,
            region: config.region.clone(),
            language: config.language.clone(),
            transit_modes,
            departure: Some(departure.map_or(DepartureTime::Now, DepartureTime::At)),
        }
    }

    /// Build a walking request with the configured defaults
    #[must_use]
    pub fn walking(origin: Coordinate, destination: Coordinate, config: &MapsConfig) -> Self {
        Self {
            origin,
            destination,
            mode: TravelMode::Walking,
            alternatives: false,
            region: config.region.clone(),
            language: config.language.clone(),
            transit_modes: Vec::new(),
            departure: None,
        }
    }

    /// Render the request as query parameters
    #[must_use]
    pub fn query_params(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("origin", self.origin.to_string()),
            ("destination", self.destination.to_string()),
            ("key", api_key.to_string()),
            ("mode", self.mode.as_param().to_string()),
            ("region", self.region.clone()),
            ("language", self.language.clone()),
        ];

        if self.alternatives {
            params.push(("alternatives", "true".to_string()));
        }
        if !self.transit_modes.is_empty() {
            params.push(("transit_mode", self.transit_modes.join("|")));
        }
        if let Some(departure) = self.departure {
            params.push(("departure_time", departure.as_param()));
        }

        params
    }
}

/// Directions client backed by the Google Directions API
#[derive(Debug)]
pub struct GoogleDirectionsClient {
    client: Client,
    config: MapsConfig,
}

impl GoogleDirectionsClient {
    /// Create a new directions client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &MapsConfig) -> Result<Self, DirectionsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("metro-directions/0.1")
            .build()
            .map_err(|e| DirectionsError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Send one directions request and parse the raw response
    async fn fetch(
        &self,
        request: &DirectionsRequest,
    ) -> Result<normalize::RawDirectionsResponse, DirectionsError> {
        let url = format!("{}/directions/json", self.config.base_url);
        let params = request.query_params(&self.config.api_key);

        debug!(?url, mode = %request.mode, "Requesting directions");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DirectionsError::Timeout {
                        timeout_secs: self.config.timeout_secs,
                    }
                } else {
                    DirectionsError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DirectionsError::RateLimitExceeded {
                retry_after_secs: response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok()),
            });
        }

        if !status.is_success() {
            return Err(DirectionsError::RequestFailed(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DirectionsError::ParseError(e.to_string()))?;

        normalize::parse_response(&body)
    }
}

#[async_trait]
impl DirectionsClient for GoogleDirectionsClient {
    #[instrument(skip(self), fields(origin = %origin, destination = %destination))]
    async fn transit_routes(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        departure: Option<DateTime<Utc>>,
    ) -> Result<Vec<Route>, DirectionsError> {
        let request = DirectionsRequest::transit(origin, destination, departure, &self.config);
        let raw = self.fetch(&request).await?;
        let routes = normalize::normalize_transit(raw, self.config.transfer_policy)?;

        debug!(count = routes.len(), "Transit routes normalized");
        Ok(routes)
    }

    #[instrument(skip(self), fields(origin = %origin, destination = %destination))]
    async fn walking_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Route, DirectionsError> {
        let request = DirectionsRequest::walking(origin, destination, &self.config);
        let raw = self.fetch(&request).await?;
        normalize::normalize_walking(raw)
    }

    async fn is_healthy(&self) -> bool {
        let url = format!("{}/directions/json", self.config.base_url);
        self.client.get(&url).send().await.is_ok()
    }
}
