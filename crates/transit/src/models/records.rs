//! On-disk records of the static dataset and their conversion into models.
//!
//! The dataset is a handful of JSON files produced by the compiler:
//! `routes_index.json`, `stops_with_routes.json`, `routes_to_stops.json`
//! and `route_frequencies.json`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::identifiers::*;
use crate::models::types::*;

pub const ROUTES_INDEX_FILE: &str = "routes_index.json";
pub const STOPS_FILE: &str = "stops_with_routes.json";
pub const ROUTES_TO_STOPS_FILE: &str = "routes_to_stops.json";
pub const FREQUENCIES_FILE: &str = "route_frequencies.json";
pub const ALL_ROUTES_FILE: &str = "all_routes.geojson";
pub const STOPS_GEOJSON_FILE: &str = "stops.geojson";

/// File name of the per-route shape collection
pub fn route_geometry_file(route_id: &RouteIdentifier) -> String {
    format!("{}.json", sanitize_route_id(route_id.as_str()))
}

/// One entry of `stops_with_routes.json`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopRecord {
    pub stop_id: StopIdentifier,
    #[serde(default)]
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    #[serde(default)]
    pub stop_code: String,
    #[serde(default)]
    pub routes: Vec<RouteMeta>,
    #[serde(default)]
    pub route_count: usize,
}

impl From<StopRecord> for Stop {
    fn from(record: StopRecord) -> Self {
        Stop {
            id: record.stop_id,
            code: record.stop_code.trim().into(),
            name: record.stop_name.into(),
            location: Point::new(record.stop_lon, record.stop_lat),
            route_ids: record.routes.into_iter().map(|r| r.id).collect(),
        }
    }
}

/// One entry of `routes_to_stops.json`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteStopsRecord {
    pub route_id: RouteIdentifier,
    pub route_short_name: Arc<str>,
    pub route_long_name: Arc<str>,
    pub stop_ids: Vec<StopIdentifier>,
}

pub fn parse_routes(bytes: &[u8]) -> Result<Vec<RouteMeta>> {
    serde_json::from_slice(bytes).map_err(|e| TransitError::SerializationError(e.to_string()))
}

pub fn parse_stops(bytes: &[u8]) -> Result<Vec<Stop>> {
    let records: Vec<StopRecord> = serde_json::from_slice(bytes)
        .map_err(|e| TransitError::SerializationError(e.to_string()))?;

    Ok(records.into_iter().map(Stop::from).collect())
}

pub fn parse_frequencies(bytes: &[u8]) -> Result<HashMap<RouteIdentifier, FrequencyProfile>> {
    let profiles: BTreeMap<String, FrequencyProfile> = serde_json::from_slice(bytes)
        .map_err(|e| TransitError::SerializationError(e.to_string()))?;

    Ok(profiles
        .into_values()
        .map(|profile| (profile.route_id.clone(), profile))
        .collect())
}
