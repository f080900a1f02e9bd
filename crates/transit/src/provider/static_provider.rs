//! In-memory catalog built once from the static dataset.
//!
//! All data is stored behind `Arc`s and never mutated after construction.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::identifiers::*;
use crate::models::{traits::*, types::*};

// ============================================================================
// Static Catalog
// ============================================================================

/// In-memory catalog with lookup maps
///
/// This type is cheap to clone since all data is stored in `Arc`s.
#[derive(Clone, Default)]
pub struct StaticCatalog {
    // Core data
    routes: Vec<Arc<RouteMeta>>,
    stops: Vec<Arc<Stop>>,

    // Lookup maps
    route_map: HashMap<RouteIdentifier, Arc<RouteMeta>>,
    stop_map: HashMap<StopIdentifier, Arc<Stop>>,
    stop_code_map: HashMap<String, Arc<Stop>>,
    frequencies: Arc<HashMap<RouteIdentifier, FrequencyProfile>>,
}

impl StaticCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build catalog from loaded data
    pub fn from_data(
        routes: Vec<RouteMeta>,
        stops: Vec<Stop>,
        frequencies: HashMap<RouteIdentifier, FrequencyProfile>,
    ) -> Self {
        let routes: Vec<Arc<RouteMeta>> = routes.into_iter().map(Arc::new).collect();
        let stops: Vec<Arc<Stop>> = stops.into_iter().map(Arc::new).collect();

        // Build lookup maps
        let route_map: HashMap<_, _> = routes
            .iter()
            .map(|r| (r.id.clone(), r.clone()))
            .collect();

        let stop_map: HashMap<_, _> = stops
            .iter()
            .map(|s| (s.id.clone(), s.clone()))
            .collect();

        // Stop codes are not unique in every feed; the first stop listed keeps the code
        let mut stop_code_map: HashMap<String, Arc<Stop>> = HashMap::new();
        for stop in stops.iter().filter(|s| s.has_code()) {
            let key = normalize_code(&stop.code);
            if let Some(existing) = stop_code_map.get(&key) {
                debug!(
                    "stop code {} shared by {} and {}; keeping {}",
                    stop.code, existing.id, stop.id, existing.id
                );
                continue;
            }
            stop_code_map.insert(key, stop.clone());
        }

        Self {
            routes,
            stops,
            route_map,
            stop_map,
            stop_code_map,
            frequencies: Arc::new(frequencies),
        }
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl CatalogProvider for StaticCatalog {
    fn get_route(&self, id: &RouteIdentifier) -> Option<Arc<RouteMeta>> {
        self.route_map.get(id).cloned()
    }

    fn get_stop(&self, id: &StopIdentifier) -> Option<Arc<Stop>> {
        self.stop_map.get(id).cloned()
    }

    fn stop_by_code(&self, code: &str) -> Option<Arc<Stop>> {
        let key = normalize_code(code);
        if key.is_empty() {
            return None;
        }
        self.stop_code_map.get(&key).cloned()
    }

    fn frequency(&self, id: &RouteIdentifier) -> Option<&FrequencyProfile> {
        self.frequencies.get(id)
    }

    fn all_routes(&self) -> &[Arc<RouteMeta>] {
        &self.routes
    }

    fn all_stops(&self) -> &[Arc<Stop>] {
        &self.stops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn stop(id: &str, code: &str, routes: &[&str]) -> Stop {
        Stop {
            id: StopIdentifier::new(id),
            code: code.into(),
            name: format!("Stop {id}").into(),
            location: Point::new(-74.07, 4.71),
            route_ids: routes.iter().map(|r| RouteIdentifier::new(r)).collect(),
        }
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = StaticCatalog::new();
        assert_eq!(catalog.all_stops().len(), 0);
        assert_eq!(catalog.all_routes().len(), 0);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_catalog_lookups() {
        let catalog = StaticCatalog::from_data(
            vec![RouteMeta::new("r1", "1", "Uno", "E41A1C", "FFFFFF")],
            vec![stop("s1", "ab12", &["r1", "missing"])],
            HashMap::new(),
        );

        assert!(catalog.get_route(&RouteIdentifier::new("r1")).is_some());
        assert!(catalog.get_stop(&StopIdentifier::new("s1")).is_some());

        let by_code = catalog.stop_by_code("  AB12 ").unwrap();
        assert_eq!(by_code.id.as_str(), "s1");

        // Routes missing from the index are skipped
        let serving = catalog.routes_serving(&by_code);
        assert_eq!(serving.len(), 1);
        assert_eq!(serving[0].short_name.as_ref(), "1");
    }

    #[test]
    fn test_duplicate_stop_code_keeps_first() {
        let catalog = StaticCatalog::from_data(
            vec![],
            vec![stop("s1", "X1", &[]), stop("s2", "x1", &[])],
            HashMap::new(),
        );

        assert_eq!(catalog.stop_by_code("x1").unwrap().id.as_str(), "s1");
    }

    #[test]
    fn test_empty_code_never_matches() {
        let catalog = StaticCatalog::from_data(vec![], vec![stop("s1", "", &[])], HashMap::new());

        assert!(catalog.stop_by_code("").is_none());
        assert!(catalog.stop_by_code("   ").is_none());
    }
}
