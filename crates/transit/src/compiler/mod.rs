//! GTFS → static dataset compiler.
//!
//! Reads a GTFS feed (zip or directory) with `gtfs-structures` and produces the
//! records the viewer ships: the route index with per-route shapes, stops with
//! the routes serving them, and weekday frequency profiles.

pub mod frequencies;
pub mod shapes;
pub mod stops;

use std::collections::BTreeMap;
use std::path::Path;

use gtfs_structures::Gtfs;
use tracing::info;

use crate::identifiers::*;
use crate::models::records::{RouteStopsRecord, StopRecord};
use crate::models::types::*;

pub use frequencies::{compile_frequencies, route_frequency};
pub use shapes::{compile_route_shapes, RouteShapes};
pub use stops::compile_stops;

/// Everything the viewer needs, ready to be written out
#[derive(Clone, Debug, Default)]
pub struct CompiledDataset {
    pub routes: Vec<RouteShapes>,
    pub stops: Vec<StopRecord>,
    pub route_stops: Vec<RouteStopsRecord>,
    pub frequencies: BTreeMap<RouteIdentifier, FrequencyProfile>,
}

impl CompiledDataset {
    /// Catalog entries in route id order, as written to `routes_index.json`
    pub fn route_index(&self) -> Vec<RouteMeta> {
        self.routes.iter().map(|r| r.route.clone()).collect()
    }

    pub fn shape_count(&self) -> usize {
        self.routes.iter().map(|r| r.shapes.len()).sum()
    }
}

/// Read a GTFS feed from a zip archive or an extracted directory
pub fn load_gtfs(path: &Path) -> Result<Gtfs> {
    let path_str = path
        .to_str()
        .ok_or_else(|| TransitError::InvalidData(format!("non UTF-8 path: {}", path.display())))?;

    Gtfs::new(path_str).map_err(|e| TransitError::InvalidData(e.to_string()))
}

pub fn compile(gtfs: &Gtfs) -> CompiledDataset {
    info!(
        "compiling {} routes, {} trips, {} stops",
        gtfs.routes.len(),
        gtfs.trips.len(),
        gtfs.stops.len()
    );

    let routes = compile_route_shapes(gtfs);
    let (stops, route_stops) = compile_stops(gtfs);
    let frequencies = compile_frequencies(gtfs);

    CompiledDataset {
        routes,
        stops,
        route_stops,
        frequencies,
    }
}

/// Catalog entry for a GTFS route, colors as bare upper-case hex
pub(crate) fn route_meta(route: &gtfs_structures::Route) -> RouteMeta {
    RouteMeta::new(
        &route.id,
        route.short_name.as_deref().unwrap_or_default(),
        route.long_name.as_deref().unwrap_or_default(),
        bare_hex(route.color.r, route.color.g, route.color.b),
        bare_hex(route.text_color.r, route.text_color.g, route.text_color.b),
    )
}

/// `RRGGBB`, upper case, no `#`
fn bare_hex(r: u8, g: u8, b: u8) -> String {
    format!("{r:02X}{g:02X}{b:02X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_hex_colors() {
        assert_eq!(bare_hex(0xe4, 0x1a, 0x1c), "E41A1C");
        assert_eq!(bare_hex(0, 0, 0), "000000");
        assert_eq!(bare_hex(255, 255, 255), "FFFFFF");
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = CompiledDataset::default();
        assert!(dataset.route_index().is_empty());
        assert_eq!(dataset.shape_count(), 0);
    }
}
