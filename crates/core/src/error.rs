use sitp_transit::{RouteIdentifier, TransitError};
use strum::Display;

/// Which catalog file failed to load
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CatalogResource {
    Routes,
    Stops,
    Frequencies,
}

/// A catalog could not be fetched or parsed; the engine carries on with an empty one
#[derive(Debug, thiserror::Error)]
#[error("failed to load {resource} catalog: {source}")]
pub struct CatalogLoadError {
    pub resource: CatalogResource,
    #[source]
    pub source: TransitError,
}

/// Shape fetch for a single route failed; the viewport simply does not move
#[derive(Debug, thiserror::Error)]
#[error("failed to fetch geometry for route {route_id}: {source}")]
pub struct GeometryFetchError {
    pub route_id: RouteIdentifier,
    #[source]
    pub source: TransitError,
}

/// A deep link referenced a stop code that is not in the catalog
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("no stop with code {code}")]
pub struct StopNotFoundError {
    pub code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid palette color {color:?}: {reason}")]
    PaletteColor { color: String, reason: String },

    #[error("selection palette is empty")]
    EmptyPalette,

    #[error("draw order keys must strictly decrease from spotlight to ambient")]
    SortOrder,
}

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("invalid stored value {value:?} for preference {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("preference storage failed: {0}")]
    Storage(String),
}
