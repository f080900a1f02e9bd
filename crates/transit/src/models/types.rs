//! Core data types for the static transit catalog.

use std::collections::BTreeSet;
use std::sync::Arc;

use geo::Point;

use crate::identifiers::*;

// ============================================================================
// Data Structures
// ============================================================================

/// Catalog entry for one route (a GTFS `routes.txt` row as shipped in the dataset)
///
/// Colors are stored exactly as published, which usually means six hex digits
/// without the leading `#`. Use [`RouteMeta::display_color`] for a CSS-ready value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteMeta {
    #[cfg_attr(feature = "serde", serde(rename = "route_id"))]
    pub id: RouteIdentifier,
    #[cfg_attr(feature = "serde", serde(rename = "route_short_name"))]
    pub short_name: Arc<str>,
    #[cfg_attr(feature = "serde", serde(rename = "route_long_name", default))]
    pub long_name: Arc<str>,
    #[cfg_attr(feature = "serde", serde(rename = "route_color", default = "default_route_color"))]
    pub color: Arc<str>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "route_text_color", default = "default_route_text_color")
    )]
    pub text_color: Arc<str>,
}

#[cfg(feature = "serde")]
fn default_route_color() -> Arc<str> {
    DEFAULT_ROUTE_COLOR.into()
}

#[cfg(feature = "serde")]
fn default_route_text_color() -> Arc<str> {
    DEFAULT_ROUTE_TEXT_COLOR.into()
}

pub const DEFAULT_ROUTE_COLOR: &str = "000000";
pub const DEFAULT_ROUTE_TEXT_COLOR: &str = "FFFFFF";

impl RouteMeta {
    pub fn new(
        id: impl AsRef<str>,
        short_name: impl AsRef<str>,
        long_name: impl AsRef<str>,
        color: impl AsRef<str>,
        text_color: impl AsRef<str>,
    ) -> Self {
        Self {
            id: RouteIdentifier::new(id),
            short_name: short_name.as_ref().into(),
            long_name: long_name.as_ref().into(),
            color: color.as_ref().into(),
            text_color: text_color.as_ref().into(),
        }
    }

    /// Native route color with a guaranteed leading `#`
    pub fn display_color(&self) -> String {
        with_hash_prefix(&self.color)
    }

    /// Native text color with a guaranteed leading `#`
    pub fn display_text_color(&self) -> String {
        with_hash_prefix(&self.text_color)
    }
}

/// A boarding location and the routes that serve it
///
/// `code` is the rider-facing identifier painted on the stop sign. It is not
/// guaranteed unique and is matched case-insensitively.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id: StopIdentifier,
    pub code: Arc<str>,
    pub name: Arc<str>,
    pub location: Point,
    pub route_ids: BTreeSet<RouteIdentifier>,
}

impl Stop {
    pub fn has_code(&self) -> bool {
        !self.code.trim().is_empty()
    }
}

/// Weekday service level for one hour of the day
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HourlyFrequency {
    pub hour: u8,
    pub trips: u32,
    pub avg_headway_minutes: f64,
    pub buses_per_hour: f64,
}

/// Planned weekday frequency summary for a route
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyProfile {
    pub route_id: RouteIdentifier,
    pub num_trips: u32,
    /// `HH:MM:SS`, may exceed 24h for service past midnight
    pub first_departure: String,
    pub last_departure: String,
    pub avg_headway_minutes: f64,
    pub min_headway_minutes: f64,
    pub max_headway_minutes: f64,
    pub hourly_profile: Vec<HourlyFrequency>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Strip everything but `[A-Za-z0-9_-]` so a route id is safe as a file name
pub fn sanitize_route_id(route_id: &str) -> String {
    route_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

pub(crate) fn with_hash_prefix(color: &str) -> String {
    if color.starts_with('#') {
        color.to_string()
    } else {
        format!("#{color}")
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Route not found: {0}")]
    RouteNotFound(RouteIdentifier),

    #[error("Stop not found: {0}")]
    StopNotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, TransitError>;
