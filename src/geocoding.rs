//! Geocoding and places facade
//!
//! Thin request/response mapping around the provider's geocode,
//! reverse-geocode, place-autocomplete, and place-details endpoints.
//! Results are biased towards the configured metro area; geocoded hits far
//! outside it are logged as a relevance warning, never rejected.
//!
//! Geocode lookups are cached (TTL from config) since addresses rarely
//! move.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::MapsConfig;
use crate::geo::{Coordinate, distance_meters};

/// Errors that can occur during geocoding and place lookups
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// Connection to the geocoding service failed
    #[error("Geocoding connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the geocoding service failed
    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the geocoding response
    #[error("Geocoding parse error: {0}")]
    ParseError(String),

    /// Address could not be resolved to coordinates
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// Empty or unusable query input
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Rate limit exceeded
    #[error("Geocoding rate limit exceeded")]
    RateLimitExceeded,

    /// Request timeout
    #[error("Geocoding request timed out")]
    Timeout,
}

/// A resolved address: formatted label plus coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAddress {
    /// Human-readable formatted address
    pub formatted: String,
    /// Geographic location
    pub coordinates: Coordinate,
}

/// One place-autocomplete suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacePrediction {
    /// Full suggestion text
    pub description: String,
    /// Provider place identifier, resolvable via place details
    pub place_id: String,
    /// Primary text (usually the place name)
    pub main_text: String,
    /// Secondary text (usually the locality)
    pub secondary_text: String,
}

/// Trait for geocoding clients
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Resolve a free-form address to coordinates and a formatted label
    async fn geocode(&self, address: &str) -> Result<ResolvedAddress, GeocodingError>;

    /// Resolve coordinates to a formatted address
    async fn reverse_geocode(&self, location: Coordinate)
    -> Result<ResolvedAddress, GeocodingError>;

    /// Suggest places matching a partial input
    async fn place_autocomplete(&self, input: &str)
    -> Result<Vec<PlacePrediction>, GeocodingError>;

    /// Resolve a place identifier to an address
    async fn place_details(&self, place_id: &str) -> Result<ResolvedAddress, GeocodingError>;
}

/// Geocoding client backed by the Google geocoding and places APIs
#[derive(Debug)]
pub struct GoogleGeocodingClient {
    client: Client,
    config: MapsConfig,
    cache: Cache<String, ResolvedAddress>,
}

impl GoogleGeocodingClient {
    /// Create a new geocoding client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &MapsConfig) -> Result<Self, GeocodingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("metro-directions/0.1")
            .build()
            .map_err(|e| GeocodingError::ConnectionFailed(e.to_string()))?;

        let cache_ttl = if config.geocode_caching_enabled() {
            Duration::from_secs(config.geocode_cache_ttl_hours * 3600)
        } else {
            Duration::from_secs(1) // Minimal TTL when "disabled"
        };

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(cache_ttl)
            .build();

        Ok(Self {
            client,
            config: config.clone(),
            cache,
        })
    }

    fn transport_error(&self, e: &reqwest::Error) -> GeocodingError {
        if e.is_timeout() {
            GeocodingError::Timeout
        } else {
            GeocodingError::ConnectionFailed(e.to_string())
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, GeocodingError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodingError::RateLimitExceeded);
        }
        if !status.is_success() {
            return Err(GeocodingError::RequestFailed(format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| GeocodingError::ParseError(e.to_string()))
    }

    /// Log a warning when a result lands far outside the metro area
    fn check_relevance(&self, query: &str, location: Coordinate) {
        let distance = distance_meters(self.config.bias_center(), location);
        if distance > self.config.relevance_warn_meters {
            warn!(
                %query,
                distance_km = format!("{:.1}", distance / 1000.0),
                "Geocoded result is far from the configured metro area"
            );
        }
    }
}

#[async_trait]
impl GeocodingClient for GoogleGeocodingClient {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<ResolvedAddress, GeocodingError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodingError::InvalidQuery(
                "Address must not be empty".to_string(),
            ));
        }

        let cache_key = address.to_lowercase();
        if let Some(resolved) = self.cache.get(&cache_key).await {
            debug!(%address, "Geocoding cache hit");
            return Ok(resolved);
        }

        let url = format!("{}/geocode/json", self.config.base_url);
        let params = [
            ("address", address.to_string()),
            ("key", self.config.api_key.clone()),
            (
                "components",
                format!("country:{}", self.config.region.to_uppercase()),
            ),
            ("region", self.config.region.clone()),
        ];

        debug!(%address, "Geocoding address");

        let raw: RawGeocodeResponse = self.get_json(&url, &params).await?;
        let place = first_result(raw, address)?;

        let resolved = ResolvedAddress {
            formatted: place.formatted_address,
            coordinates: place.geometry.location,
        };

        self.check_relevance(address, resolved.coordinates);
        self.cache.insert(cache_key, resolved.clone()).await;
        debug!(%address, location = %resolved.coordinates, "Geocoded address");

        Ok(resolved)
    }

    #[instrument(skip(self))]
    async fn reverse_geocode(
        &self,
        location: Coordinate,
    ) -> Result<ResolvedAddress, GeocodingError> {
        let url = format!("{}/geocode/json", self.config.base_url);
        let params = [
            ("latlng", location.to_string()),
            ("key", self.config.api_key.clone()),
            ("language", self.config.language.clone()),
        ];

        debug!(%location, "Reverse geocoding");

        let raw: RawGeocodeResponse = self.get_json(&url, &params).await?;
        let place = first_result(raw, &location.to_string())?;

        // The caller asked about this exact point, so keep its coordinates
        // rather than the matched feature's centroid.
        Ok(ResolvedAddress {
            formatted: place.formatted_address,
            coordinates: location,
        })
    }

    #[instrument(skip(self))]
    async fn place_autocomplete(
        &self,
        input: &str,
    ) -> Result<Vec<PlacePrediction>, GeocodingError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(GeocodingError::InvalidQuery(
                "Search input must not be empty".to_string(),
            ));
        }

        let url = format!("{}/place/autocomplete/json", self.config.base_url);
        let params = [
            ("input", input.to_string()),
            ("key", self.config.api_key.clone()),
            ("location", self.config.bias_center().to_string()),
            ("radius", self.config.bias_radius_meters.to_string()),
            ("components", format!("country:{}", self.config.region)),
        ];

        debug!(%input, "Fetching place suggestions");

        let raw: RawAutocompleteResponse = self.get_json(&url, &params).await?;
        match raw.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(raw
                .predictions
                .into_iter()
                .map(|p| PlacePrediction {
                    description: p.description,
                    place_id: p.place_id,
                    main_text: p.structured_formatting.main_text,
                    secondary_text: p.structured_formatting.secondary_text,
                })
                .collect()),
            "OVER_QUERY_LIMIT" => Err(GeocodingError::RateLimitExceeded),
            status => Err(GeocodingError::RequestFailed(provider_status(
                status,
                raw.error_message,
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn place_details(&self, place_id: &str) -> Result<ResolvedAddress, GeocodingError> {
        let url = format!("{}/place/details/json", self.config.base_url);
        let params = [
            ("place_id", place_id.to_string()),
            ("key", self.config.api_key.clone()),
            ("fields", "formatted_address,geometry".to_string()),
        ];

        debug!(%place_id, "Fetching place details");

        let raw: RawPlaceDetailsResponse = self.get_json(&url, &params).await?;
        match raw.status.as_str() {
            "OK" => {
                let place = raw
                    .result
                    .ok_or_else(|| GeocodingError::AddressNotFound(place_id.to_string()))?;
                Ok(ResolvedAddress {
                    formatted: place.formatted_address,
                    coordinates: place.geometry.location,
                })
            }
            "ZERO_RESULTS" | "NOT_FOUND" => {
                Err(GeocodingError::AddressNotFound(place_id.to_string()))
            }
            "OVER_QUERY_LIMIT" => Err(GeocodingError::RateLimitExceeded),
            status => Err(GeocodingError::RequestFailed(provider_status(
                status,
                raw.error_message,
            ))),
        }
    }
}

/// Pick the first geocode result, mapping provider statuses to errors
fn first_result(raw: RawGeocodeResponse, query: &str) -> Result<RawPlace, GeocodingError> {
    match raw.status.as_str() {
        "OK" | "ZERO_RESULTS" => raw
            .results
            .into_iter()
            .next()
            .ok_or_else(|| GeocodingError::AddressNotFound(query.to_string())),
        "OVER_QUERY_LIMIT" => Err(GeocodingError::RateLimitExceeded),
        status => Err(GeocodingError::RequestFailed(provider_status(
            status,
            raw.error_message,
        ))),
    }
}

fn provider_status(status: &str, message: Option<String>) -> String {
    message.map_or_else(|| status.to_string(), |m| format!("{status}: {m}"))
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
struct RawGeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawPlace>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    #[serde(default)]
    formatted_address: String,
    geometry: RawGeometry,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    location: Coordinate,
}

#[derive(Debug, Deserialize)]
struct RawAutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<RawPrediction>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    description: String,
    place_id: String,
    structured_formatting: RawStructuredFormatting,
}

#[derive(Debug, Deserialize)]
struct RawStructuredFormatting {
    main_text: String,
    #[serde(default)]
    secondary_text: String,
}

#[derive(Debug, Deserialize)]
struct RawPlaceDetailsResponse {
    status: String,
    result: Option<RawPlace>,
    error_message: Option<String>,
}
