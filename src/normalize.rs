//! Route normalization
//!
//! Reshapes a raw multimodal directions response into the UI-ready
//! [`Route`] model: classifies each step as walk/bus/metro, strips HTML
//! from instructions, derives the transfer count and cumulative walking
//! distance, and orders candidate routes fastest first.
//!
//! Everything here is a pure, synchronous transformation over an
//! already-fetched response; the HTTP side lives in [`crate::client`].

use serde::{Deserialize, Serialize};

use crate::client::TravelMode;
use crate::error::DirectionsError;
use crate::route::{Route, RouteStep, StepKind, TransitDetails, format_distance};

/// How transfer counting treats walk steps between two transit rides
///
/// The provider separates most vehicle changes with a short walk step.
/// Under [`CarryAcrossWalks`](Self::CarryAcrossWalks) the previous transit
/// ride stays "adjacent" across any number of intervening walks, so
/// bus → walk → metro counts one transfer. [`ResetOnWalk`](Self::ResetOnWalk)
/// closes the window instead, counting only back-to-back vehicle changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPolicy {
    /// A walk step leaves the last transit ride in scope (default)
    #[default]
    CarryAcrossWalks,
    /// A walk step closes the transfer adjacency window
    ResetOnWalk,
}

/// Fold state for transfer counting, threaded through the step pass
#[derive(Debug, Default)]
struct TransferTally {
    transfers: u32,
    last_transit: Option<StepKind>,
}

impl TransferTally {
    fn observe(&mut self, kind: StepKind, policy: TransferPolicy) {
        if kind.is_transit() {
            if self.last_transit.is_some() {
                self.transfers += 1;
            }
            self.last_transit = Some(kind);
        } else if policy == TransferPolicy::ResetOnWalk {
            self.last_transit = None;
        }
    }
}

/// Normalize all candidate routes of a transit response
///
/// Routes come back sorted ascending by duration; candidates with equal
/// duration keep the provider's order.
///
/// # Errors
///
/// Returns [`DirectionsError::NoRoutesFound`] if the response holds zero
/// candidates, and [`DirectionsError::ParseError`] for a candidate with no
/// legs.
pub(crate) fn normalize_transit(
    raw: RawDirectionsResponse,
    policy: TransferPolicy,
) -> Result<Vec<Route>, DirectionsError> {
    if raw.routes.is_empty() {
        return Err(DirectionsError::NoRoutesFound {
            mode: TravelMode::Transit,
        });
    }

    let mut routes = raw
        .routes
        .into_iter()
        .map(|route| normalize_route(route, policy))
        .collect::<Result<Vec<_>, _>>()?;

    routes.sort_by_key(|route| route.duration_seconds);
    Ok(routes)
}

/// Normalize the single candidate of a walking response
///
/// Every step is a walk step by construction, so the transfer count is zero
/// and the walking distance is the leg's total distance.
///
/// # Errors
///
/// Returns [`DirectionsError::NoRoutesFound`] if the response holds zero
/// candidates.
pub(crate) fn normalize_walking(raw: RawDirectionsResponse) -> Result<Route, DirectionsError> {
    let route = raw
        .routes
        .into_iter()
        .next()
        .ok_or(DirectionsError::NoRoutesFound {
            mode: TravelMode::Walking,
        })?;

    let mut normalized = normalize_route(route, TransferPolicy::default())?;
    normalized.summary = String::from("Walking route");
    normalized.walking_distance_text = normalized.distance.clone();
    Ok(normalized)
}

/// Normalize an already-fetched transit response body
///
/// Offline entry point for callers that fetched the provider response
/// themselves.
///
/// # Errors
///
/// Returns [`DirectionsError::ParseError`] on malformed JSON,
/// [`DirectionsError::ApiError`] on a non-OK provider status, and the same
/// errors as the client path for the normalization itself.
pub fn transit_routes_from_json(
    body: &str,
    policy: TransferPolicy,
) -> Result<Vec<Route>, DirectionsError> {
    normalize_transit(parse_response(body)?, policy)
}

/// Normalize an already-fetched walking response body
///
/// # Errors
///
/// See [`transit_routes_from_json`].
pub fn walking_route_from_json(body: &str) -> Result<Route, DirectionsError> {
    normalize_walking(parse_response(body)?)
}

/// Parse a provider response body and check its status field
///
/// `ZERO_RESULTS` passes through as an empty candidate list so the
/// normalizers can surface the no-routes failure with the right mode.
pub(crate) fn parse_response(body: &str) -> Result<RawDirectionsResponse, DirectionsError> {
    let raw: RawDirectionsResponse =
        serde_json::from_str(body).map_err(|e| DirectionsError::ParseError(e.to_string()))?;

    match raw.status.as_str() {
        "OK" | "ZERO_RESULTS" => Ok(raw),
        status => Err(DirectionsError::ApiError {
            status: status.to_string(),
            message: raw.error_message,
        }),
    }
}

/// Normalize one candidate route (first leg only)
fn normalize_route(raw: RawRoute, policy: TransferPolicy) -> Result<Route, DirectionsError> {
    let leg = raw
        .legs
        .into_iter()
        .next()
        .ok_or_else(|| DirectionsError::ParseError("route without legs".to_string()))?;

    let mut tally = TransferTally::default();
    let mut walk_meters = 0.0;
    let mut steps = Vec::with_capacity(leg.steps.len());

    for raw_step in leg.steps {
        let kind = classify(&raw_step);
        tally.observe(kind, policy);
        if kind == StepKind::Walk {
            walk_meters += raw_step.distance.value;
        }
        steps.push(convert_step(raw_step, kind));
    }

    Ok(Route {
        summary: raw.summary,
        duration: leg.duration.text,
        duration_seconds: leg.duration.value,
        distance: leg.distance.text,
        distance_meters: leg.distance.value,
        steps,
        overview_encoded_path: raw.overview_polyline.points,
        departure_time_text: leg.departure_time.map(|t| t.text),
        arrival_time_text: leg.arrival_time.map(|t| t.text),
        transfer_count: tally.transfers,
        walking_distance_text: format_distance(walk_meters),
    })
}

/// Classify a raw step as walk, bus, or metro
///
/// Any non-bus transit vehicle (rail, subway, tram) normalizes to metro;
/// unrecognized travel modes fall through to walk.
fn classify(step: &RawStep) -> StepKind {
    if step.travel_mode != "TRANSIT" {
        return StepKind::Walk;
    }
    match step.transit_details.as_ref() {
        Some(details) if details.line.vehicle.kind == "BUS" => StepKind::Bus,
        Some(_) => StepKind::Metro,
        None => StepKind::Walk,
    }
}

/// Convert one raw step into the normalized model
fn convert_step(raw: RawStep, kind: StepKind) -> RouteStep {
    let transit = if kind.is_transit() {
        raw.transit_details.map(convert_transit)
    } else {
        None
    };

    RouteStep {
        kind,
        instruction: strip_html(&raw.html_instructions),
        distance: raw.distance.text,
        duration: raw.duration.text,
        distance_meters: raw.distance.value,
        duration_seconds: raw.duration.value,
        encoded_path: raw.polyline.points,
        transit,
    }
}

fn convert_transit(raw: RawTransitDetails) -> TransitDetails {
    let line_name = raw.line.name.unwrap_or_default();
    let line_label = raw.line.short_name.unwrap_or_else(|| line_name.clone());

    TransitDetails {
        line_label,
        line_name,
        departure_stop: raw.departure_stop.name,
        arrival_stop: raw.arrival_stop.name,
        departure_time_text: raw.departure_time.text,
        arrival_time_text: raw.arrival_time.text,
        num_stops: raw.num_stops,
    }
}

/// Remove angle-bracket tag spans from provider instruction markup
fn strip_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

// --- Raw provider response types for deserialization ---

#[derive(Debug, Deserialize)]
pub(crate) struct RawDirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub routes: Vec<RawRoute>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRoute {
    #[serde(default)]
    pub summary: String,
    pub legs: Vec<RawLeg>,
    pub overview_polyline: RawPolyline,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLeg {
    pub duration: RawDuration,
    pub distance: RawDistance,
    pub departure_time: Option<RawTimeText>,
    pub arrival_time: Option<RawTimeText>,
    pub steps: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawStep {
    pub travel_mode: String,
    #[serde(default)]
    pub html_instructions: String,
    pub distance: RawDistance,
    pub duration: RawDuration,
    pub polyline: RawPolyline,
    pub transit_details: Option<RawTransitDetails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDistance {
    pub text: String,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDuration {
    pub text: String,
    pub value: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTimeText {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPolyline {
    pub points: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTransitDetails {
    pub line: RawLine,
    pub departure_stop: RawStop,
    pub arrival_stop: RawStop,
    pub departure_time: RawTimeText,
    pub arrival_time: RawTimeText,
    pub num_stops: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLine {
    pub short_name: Option<String>,
    pub name: Option<String>,
    pub vehicle: RawVehicle,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawVehicle {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawStop {
    pub name: String,
}
