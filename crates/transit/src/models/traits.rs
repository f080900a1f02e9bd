//! Read-only access to the loaded catalog.
//!
//! The engine only ever reads the catalog; implementations can be in-memory
//! (see [`StaticCatalog`](crate::provider::static_provider::StaticCatalog)) or
//! backed by something else entirely.

use std::sync::Arc;

use crate::identifiers::*;
use crate::models::types::*;

/// Provider of all catalog data with lookup methods
pub trait CatalogProvider: Send + Sync {
    // ---- Lookups ----
    fn get_route(&self, id: &RouteIdentifier) -> Option<Arc<RouteMeta>>;
    fn get_stop(&self, id: &StopIdentifier) -> Option<Arc<Stop>>;

    /// Find a stop by its rider-facing code, ignoring case and surrounding whitespace
    fn stop_by_code(&self, code: &str) -> Option<Arc<Stop>>;

    /// Weekday frequency summary, if the route has enough trips to compute one
    fn frequency(&self, id: &RouteIdentifier) -> Option<&FrequencyProfile>;

    // ---- Collections ----
    fn all_routes(&self) -> &[Arc<RouteMeta>];
    fn all_stops(&self) -> &[Arc<Stop>];

    /// Catalog entries for every route serving `stop`, skipping ids missing from the catalog
    fn routes_serving(&self, stop: &Stop) -> Vec<Arc<RouteMeta>> {
        stop.route_ids
            .iter()
            .filter_map(|id| self.get_route(id))
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.all_routes().is_empty() && self.all_stops().is_empty()
    }
}
