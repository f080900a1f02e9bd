//! Focus & highlight engine for the transit route map.
//!
//! Every interaction (map click, pointer hover, list selection, search, a
//! deep-linked stop) mutates one [`FocusState`](focus::FocusState). A pure
//! [`StyleResolver`](style::StyleResolver) projects that state onto the route
//! layer of a [`MapSurface`](surface::MapSurface), and the hover index keeps the
//! surface's per-feature hover flags in sync with the minimal number of calls.

pub mod catalog;
pub mod config;
pub mod deep_link;
pub mod engine;
pub mod error;
pub mod focus;
pub mod ordering;
pub mod preferences;
pub mod search;
pub mod style;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the catalog crate
pub use sitp_transit as transit;

pub mod prelude {
    pub use crate::catalog::{CatalogClient, CatalogLoad, ReqwestFetcher};
    pub use crate::config::{EngineConfig, MapConfig, StyleLevels};
    pub use crate::deep_link::{DeepLinkOutcome, History};
    pub use crate::engine::{ClickOutcome, FocusEngine, GeometryRequest};
    pub use crate::error::*;
    pub use crate::focus::{FocusMode, FocusState};
    pub use crate::preferences::{Language, PreferenceStorage, Preferences, Theme};
    pub use crate::style::{StyleOutput, StyleResolver};
    pub use crate::surface::{LayerProperty, MapSurface, RenderedFeature, ScreenBox, ScreenPoint};
}
