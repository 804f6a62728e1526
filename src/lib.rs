//! Transit and walking directions for a single metro area
//!
//! Wraps the Google Maps web services (directions, geocoding, places) and
//! reshapes their raw responses into a compact, UI-ready route model:
//! typed walk/bus/metro steps, derived transfer counts and walking
//! distance, and a fastest-first route ordering. Route computation itself
//! belongs entirely to the provider; this crate only consumes and
//! normalizes it.
//!
//! # Architecture
//!
//! The crate follows a client-trait pattern: [`DirectionsClient`] defines
//! the directions interface, implemented by [`GoogleDirectionsClient`];
//! [`GeocodingClient`] covers address resolution and place lookups via
//! [`GoogleGeocodingClient`]. The normalization core ([`normalize`],
//! [`polyline`], [`geo`]) is pure and synchronous and can be used on
//! already-fetched response bodies without any HTTP client.
//!
//! # Example
//!
//! ```rust,ignore
//! use metro_directions::{Coordinate, DirectionsClient, GoogleDirectionsClient, MapsConfig};
//!
//! let config = MapsConfig { api_key: key, ..MapsConfig::default() };
//! let client = GoogleDirectionsClient::new(&config)?;
//!
//! let routes = client.transit_routes(
//!     Coordinate::new(17.3616, 78.4747)?, // Charminar
//!     Coordinate::new(17.4435, 78.3772)?, // Hitech City
//!     None,                               // depart now
//! ).await?;
//! ```

mod client;
mod config;
mod error;
pub mod geo;
mod geocoding;
pub mod normalize;
pub mod polyline;
mod route;

pub use client::{
    DepartureTime, DirectionsClient, DirectionsRequest, GoogleDirectionsClient, TravelMode,
};
pub use config::MapsConfig;
pub use error::DirectionsError;
pub use geo::{Coordinate, GeoError, distance_meters};
pub use geocoding::{
    GeocodingClient, GeocodingError, GoogleGeocodingClient, PlacePrediction, ResolvedAddress,
};
pub use normalize::TransferPolicy;
pub use polyline::PolylineError;
pub use route::{Route, RouteStep, StepKind, TransitDetails, format_distance, format_duration};
