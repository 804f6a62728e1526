//! Normalized route models
//!
//! UI-ready representations of a directions result: typed steps, transit
//! detail, and per-route aggregates derived during normalization. Values
//! are constructed once by the normalizer and never mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::polyline::{self, PolylineError};

/// Classification of a single route step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Walking segment
    Walk,
    /// Bus ride
    Bus,
    /// Any rail-bound transit (metro, suburban rail, tram)
    Metro,
}

impl StepKind {
    /// Whether this step rides a transit vehicle
    #[must_use]
    pub const fn is_transit(self) -> bool {
        !matches!(self, Self::Walk)
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Walk => "Walk",
            Self::Bus => "Bus",
            Self::Metro => "Metro",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Line, stop, and schedule detail carried only by transit steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitDetails {
    /// Short line name, falling back to the full name (e.g. "10H", "Red Line")
    pub line_label: String,
    /// Full line name
    pub line_name: String,
    /// Name of the boarding stop
    pub departure_stop: String,
    /// Name of the alighting stop
    pub arrival_stop: String,
    /// Scheduled departure as display text
    pub departure_time_text: String,
    /// Scheduled arrival as display text
    pub arrival_time_text: String,
    /// Number of stops ridden
    pub num_stops: u32,
}

/// One atomic segment of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    /// Step classification
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Instruction text with HTML markup stripped
    pub instruction: String,
    /// Display distance (e.g. "1.2 km")
    pub distance: String,
    /// Display duration (e.g. "4 mins")
    pub duration: String,
    /// Distance in meters
    pub distance_meters: f64,
    /// Duration in seconds
    pub duration_seconds: u32,
    /// Encoded polyline for this step's geometry
    pub encoded_path: String,
    /// Present if and only if the step is a transit ride
    #[serde(flatten)]
    pub transit: Option<TransitDetails>,
}

impl RouteStep {
    /// Decode this step's path geometry
    ///
    /// Decoding happens lazily; the encoded form is what travels with the
    /// step.
    ///
    /// # Errors
    ///
    /// Returns [`PolylineError`] if the stored polyline is malformed.
    pub fn path(&self) -> Result<Vec<Coordinate>, PolylineError> {
        polyline::decode(&self.encoded_path)
    }
}

/// A normalized route: ordered steps plus derived aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Provider's route summary (e.g. the main road or line used)
    pub summary: String,
    /// Display duration
    pub duration: String,
    /// Total duration in seconds
    pub duration_seconds: u32,
    /// Display distance
    pub distance: String,
    /// Total distance in meters
    pub distance_meters: f64,
    /// Ordered steps of the route
    pub steps: Vec<RouteStep>,
    /// Encoded polyline covering the whole route
    pub overview_encoded_path: String,
    /// Departure time as display text (transit only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time_text: Option<String>,
    /// Arrival time as display text (transit only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time_text: Option<String>,
    /// Number of vehicle-to-vehicle changes
    pub transfer_count: u32,
    /// Total walking distance as display text (e.g. "450m", "1.2km")
    pub walking_distance_text: String,
}

impl Route {
    /// Decode the overview path geometry
    ///
    /// # Errors
    ///
    /// Returns [`PolylineError`] if the stored polyline is malformed.
    pub fn path(&self) -> Result<Vec<Coordinate>, PolylineError> {
        polyline::decode(&self.overview_encoded_path)
    }

    /// Format as a compact one-line summary
    #[must_use]
    pub fn format_summary(&self) -> String {
        let transfers = match self.transfer_count {
            0 => String::from("direct"),
            1 => String::from("1 transfer"),
            n => format!("{n} transfers"),
        };
        format!(
            "{} · {transfers} · {} walking",
            self.duration, self.walking_distance_text
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}

/// Format a distance in meters as display text
///
/// Values under 1000 m render as whole meters, everything else as
/// kilometers with one decimal.
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round() as i64)
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

/// Format a duration in seconds as display text ("1h 5m" / "12m")
#[must_use]
pub fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
