//! Route → shape geometry.

use std::collections::{BTreeMap, BTreeSet};

use geo::{Coord, LineString};
use gtfs_structures::Gtfs;
use tracing::{debug, warn};

use crate::identifiers::*;
use crate::models::types::*;

/// A route with every distinct shape its trips follow
#[derive(Clone, Debug)]
pub struct RouteShapes {
    pub route: RouteMeta,
    pub shapes: Vec<(FeatureIdentifier, LineString)>,
}

pub fn compile_route_shapes(gtfs: &Gtfs) -> Vec<RouteShapes> {
    let route_shape_ids = route_shape_pairs(
        gtfs.trips
            .values()
            .map(|trip| (trip.route_id.as_str(), trip.shape_id.as_deref())),
    );

    let mut compiled = Vec::with_capacity(route_shape_ids.len());
    for (route_id, shape_ids) in route_shape_ids {
        let Some(route) = gtfs.routes.get(route_id) else {
            warn!("trips reference unknown route {route_id}");
            continue;
        };

        let shapes: Vec<(FeatureIdentifier, LineString)> = shape_ids
            .into_iter()
            .filter_map(|shape_id| {
                let points = gtfs.shapes.get(shape_id)?;
                let line = shape_line(
                    points
                        .iter()
                        .map(|p| (p.sequence, Coord { x: p.longitude, y: p.latitude })),
                )?;
                Some((FeatureIdentifier::new(shape_id), line))
            })
            .collect();
        if shapes.is_empty() {
            debug!("route {route_id} has no usable shape");
            continue;
        }

        compiled.push(RouteShapes {
            route: super::route_meta(route),
            shapes,
        });
    }

    compiled
}

/// Distinct shape ids per route from `(route_id, shape_id)` trip pairs
fn route_shape_pairs<'a>(
    trips: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> BTreeMap<&'a str, BTreeSet<&'a str>> {
    let mut pairs: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (route_id, shape_id) in trips {
        if let Some(shape_id) = shape_id {
            pairs.entry(route_id).or_default().insert(shape_id);
        }
    }
    pairs
}

/// Shape points ordered by sequence; `None` when fewer than two points
fn shape_line<S: Ord>(points: impl IntoIterator<Item = (S, Coord)>) -> Option<LineString> {
    let mut ordered: Vec<(S, Coord)> = points.into_iter().collect();
    if ordered.len() < 2 {
        return None;
    }
    ordered.sort_by(|a, b| a.0.cmp(&b.0));

    Some(ordered.into_iter().map(|(_, coord)| coord).collect())
}
