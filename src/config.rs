//! Maps service configuration

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::normalize::TransferPolicy;

/// Configuration shared by the directions and geocoding clients
///
/// Search bias and relevance defaults target the Hyderabad metro area; the
/// provider API key is the only field without a usable default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    /// Base URL for the provider's web service APIs
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Provider API key
    #[serde(default)]
    pub api_key: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Region code used to bias results (ccTLD, e.g. "in")
    #[serde(default = "default_region")]
    pub region: String,

    /// Response language
    #[serde(default = "default_language")]
    pub language: String,

    /// Request alternative transit routes
    #[serde(default = "default_true")]
    pub alternatives: bool,

    /// Include bus connections
    #[serde(default = "default_true")]
    pub transit_bus: bool,

    /// Include rail connections
    #[serde(default = "default_true")]
    pub transit_rail: bool,

    /// Include subway connections
    #[serde(default = "default_true")]
    pub transit_subway: bool,

    /// Latitude of the city center used to bias place searches
    #[serde(default = "default_bias_lat")]
    pub bias_lat: f64,

    /// Longitude of the city center used to bias place searches
    #[serde(default = "default_bias_lng")]
    pub bias_lng: f64,

    /// Radius around the city center for place search bias, in meters
    #[serde(default = "default_bias_radius_meters")]
    pub bias_radius_meters: u32,

    /// Geocode results farther than this from the city center log a warning
    #[serde(default = "default_relevance_warn_meters")]
    pub relevance_warn_meters: f64,

    /// Geocode cache TTL in hours (0 to disable)
    #[serde(default = "default_cache_ttl_hours")]
    pub geocode_cache_ttl_hours: u64,

    /// How transfer counting treats walk steps between transit rides
    #[serde(default)]
    pub transfer_policy: TransferPolicy,
}

fn default_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_region() -> String {
    "in".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_bias_lat() -> f64 {
    17.3850
}

const fn default_bias_lng() -> f64 {
    78.4867
}

const fn default_bias_radius_meters() -> u32 {
    50_000
}

const fn default_relevance_warn_meters() -> f64 {
    100_000.0
}

const fn default_cache_ttl_hours() -> u64 {
    24
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            region: default_region(),
            language: default_language(),
            alternatives: true,
            transit_bus: true,
            transit_rail: true,
            transit_subway: true,
            bias_lat: default_bias_lat(),
            bias_lng: default_bias_lng(),
            bias_radius_meters: default_bias_radius_meters(),
            relevance_warn_meters: default_relevance_warn_meters(),
            geocode_cache_ttl_hours: default_cache_ttl_hours(),
            transfer_policy: TransferPolicy::default(),
        }
    }
}

impl MapsConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_key: "test-key".to_string(),
            timeout_secs: 5,
            geocode_cache_ttl_hours: 0,
            ..Default::default()
        }
    }

    /// The city center used for place search bias and relevance checks
    #[must_use]
    pub const fn bias_center(&self) -> Coordinate {
        Coordinate {
            lat: self.bias_lat,
            lng: self.bias_lng,
        }
    }

    /// Check if geocode caching is enabled
    #[must_use]
    pub const fn geocode_caching_enabled(&self) -> bool {
        self.geocode_cache_ttl_hours > 0
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if self.api_key.is_empty() {
            return Err("api_key must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if !self.transit_bus && !self.transit_rail && !self.transit_subway {
            return Err("at least one transit mode must be enabled".to_string());
        }

        Ok(())
    }
}
