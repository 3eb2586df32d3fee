//! Transit feed payloads: fetching, JSON(P) unwrapping, and best-effort
//! extraction of route geometry and stop records.
//!
//! # Payload shape
//!
//! The feed is loosely structured.  Routes are found under the first of
//! `Routes`, `routes`, `data` that holds an array (or the payload itself if
//! it is an array).  Each route carries its geometry under one of several
//! polyline keys, either as an encoded string or as a pre-decoded point
//! list; routes without usable geometry fall back to their `Stops`
//! coordinates.

use std::time::Duration;

use serde_json::Value;

use evac_core::{FeedConfig, GeoPoint};

use crate::{TransitError, TransitResult, decode_polyline};

const ROUTE_LIST_KEYS: [&str; 3] = ["Routes", "routes", "data"];
const POLYLINE_KEYS: [&str; 5] =
    ["EncodedPolyline", "EncodedLine", "encodedLine", "Polyline", "polyline"];
const STOP_NAME_KEYS: [&str; 3] = ["Name", "StopName", "Description"];

// ── Sources ───────────────────────────────────────────────────────────────────

/// External transit-feed collaborator.
pub trait FeedSource {
    /// Fetch the raw payload at `url`, giving up after `timeout`.
    fn fetch(&self, url: &str, timeout: Duration) -> TransitResult<String>;
}

/// Blocking HTTP source.
#[cfg(feature = "http")]
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpFeedSource;

#[cfg(feature = "http")]
impl FeedSource for HttpFeedSource {
    fn fetch(&self, url: &str, timeout: Duration) -> TransitResult<String> {
        let fetch_err = |e: reqwest::Error| TransitError::Fetch(e.to_string());
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(fetch_err)?;
        client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(fetch_err)
    }
}

/// A source that always returns the same body (or the same failure).
/// Used for offline runs and tests.
#[derive(Clone, Debug)]
pub struct StaticFeedSource(pub Option<String>);

impl FeedSource for StaticFeedSource {
    fn fetch(&self, _url: &str, _timeout: Duration) -> TransitResult<String> {
        self.0
            .clone()
            .ok_or_else(|| TransitError::Fetch("no payload available offline".into()))
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse a JSON or JSONP body.
///
/// A body that does not start with `{` or `[` is treated as wrapped
/// (`callback({...})`): the text from the first `{` to the last `}` is
/// parsed.
pub fn parse_payload(raw: &str) -> TransitResult<Value> {
    let raw = raw.trim();
    if raw.starts_with('{') || raw.starts_with('[') {
        return Ok(serde_json::from_str(raw)?);
    }
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(serde_json::from_str(&raw[start..=end])?),
        _ => Err(TransitError::NoJson),
    }
}

/// A stop record from the feed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedStop {
    pub position: GeoPoint,
    pub name:     String,
}

fn route_list(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(routes) => routes.as_slice(),
        Value::Object(map) => ROUTE_LIST_KEYS
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

fn number(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `Latitude`/`Longitude` of a stop object.
fn stop_point(stop: &Value) -> Option<GeoPoint> {
    Some(GeoPoint::new(number(stop.get("Latitude"))?, number(stop.get("Longitude"))?))
}

fn route_stops(route: &Value) -> &[Value] {
    route.get("Stops").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}

/// A pre-decoded point: `[lat, lon]` or an object with `lat`/`lon`
/// (or `Latitude`/`Longitude`).
fn decoded_point(v: &Value) -> Option<GeoPoint> {
    match v {
        Value::Array(pair) if pair.len() >= 2 => {
            Some(GeoPoint::new(number(pair.first())?, number(pair.get(1))?))
        }
        Value::Object(_) => stop_point(v)
            .or_else(|| Some(GeoPoint::new(number(v.get("lat"))?, number(v.get("lon"))?))),
        _ => None,
    }
}

/// Geometry from the first truthy polyline key, if it decodes.
fn route_geometry(route: &Value) -> Option<Vec<GeoPoint>> {
    let value = POLYLINE_KEYS.iter().filter_map(|k| route.get(*k)).find(|v| is_truthy(v))?;
    match value {
        Value::String(enc) => match decode_polyline(enc) {
            Ok(points) => Some(points),
            Err(e) => {
                tracing::debug!("undecodable route polyline: {e}");
                None
            }
        },
        Value::Array(items) => items.iter().map(decoded_point).collect(),
        _ => None,
    }
}

/// Every route's geometry as a point list.
///
/// Routes with no decodable polyline use their stop coordinates instead;
/// routes with neither are skipped.
pub fn extract_routes(payload: &Value) -> Vec<Vec<GeoPoint>> {
    route_list(payload)
        .iter()
        .filter(|r| r.is_object())
        .filter_map(|r| {
            route_geometry(r).or_else(|| {
                let pts: Vec<GeoPoint> = route_stops(r).iter().filter_map(stop_point).collect();
                (!pts.is_empty()).then_some(pts)
            })
        })
        .collect()
}

/// Every stop record of every route, in feed order.
pub fn extract_stops(payload: &Value) -> Vec<FeedStop> {
    route_list(payload)
        .iter()
        .flat_map(route_stops)
        .filter_map(|s| {
            let position = stop_point(s)?;
            let name = STOP_NAME_KEYS
                .iter()
                .filter_map(|k| s.get(*k).and_then(Value::as_str))
                .find(|n| !n.is_empty())
                .unwrap_or_default()
                .to_owned();
            Some(FeedStop { position, name })
        })
        .collect()
}

// ── FeedData ──────────────────────────────────────────────────────────────────

/// Route geometry and stop records from one feed fetch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedData {
    pub polylines: Vec<Vec<GeoPoint>>,
    pub stops:     Vec<FeedStop>,
}

impl FeedData {
    /// Parse an already fetched body.
    pub fn from_body(raw: &str) -> TransitResult<FeedData> {
        let payload = parse_payload(raw)?;
        Ok(FeedData { polylines: extract_routes(&payload), stops: extract_stops(&payload) })
    }

    /// Fetch and parse the configured feed.  Never fails: a missing URL, a
    /// fetch error, or a malformed payload all yield empty data.
    pub fn load(source: &dyn FeedSource, config: &FeedConfig) -> FeedData {
        let Some(url) = config.url.as_deref() else {
            tracing::info!("no transit feed configured");
            return FeedData::default();
        };
        let data = source
            .fetch(url, Duration::from_secs(config.timeout_secs))
            .and_then(|body| FeedData::from_body(&body));
        match data {
            Ok(data) => {
                tracing::info!(
                    routes = data.polylines.len(),
                    stops  = data.stops.len(),
                    "transit feed loaded"
                );
                data
            }
            Err(e) => {
                tracing::warn!("transit feed unavailable, shuttles use synthetic loops: {e}");
                FeedData::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty() && self.stops.is_empty()
    }
}

/// Stop records within `radius_m` of `center`, for display.
///
/// Fetches the feed at `config.url`; any failure gives an empty list.
pub fn fetch_shuttle_stops(
    source:   &dyn FeedSource,
    config:   &FeedConfig,
    center:   GeoPoint,
    radius_m: f64,
) -> Vec<FeedStop> {
    FeedData::load(source, config)
        .stops
        .into_iter()
        .filter(|s| s.position.within_radius(center, radius_m))
        .collect()
}
