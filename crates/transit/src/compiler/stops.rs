//! Stop → serving routes, and the reverse index.

use std::collections::{BTreeMap, BTreeSet};

use gtfs_structures::Gtfs;
use tracing::debug;

use crate::identifiers::*;
use crate::models::records::{RouteStopsRecord, StopRecord};
use crate::models::types::*;

/// Stops sorted by id with the routes serving them, plus route → stop ids
pub fn compile_stops(gtfs: &Gtfs) -> (Vec<StopRecord>, Vec<RouteStopsRecord>) {
    let stop_routes = stop_route_pairs(gtfs.trips.values().flat_map(|trip| {
        trip.stop_times
            .iter()
            .map(move |stop_time| (stop_time.stop.id.as_str(), trip.route_id.as_str()))
    }));

    let mut records = Vec::with_capacity(stop_routes.len());
    for (stop_id, route_ids) in stop_routes {
        let Some(stop) = gtfs.stops.get(stop_id) else {
            continue;
        };
        let (Some(lat), Some(lon)) = (stop.latitude, stop.longitude) else {
            debug!("stop {stop_id} has no coordinates, skipping");
            continue;
        };

        let routes: Vec<RouteMeta> = route_ids
            .into_iter()
            .filter_map(|id| gtfs.routes.get(id))
            .map(super::route_meta)
            .collect();

        records.push(StopRecord {
            stop_id: StopIdentifier::new(stop_id),
            stop_name: stop.name.clone().unwrap_or_default(),
            stop_lat: lat,
            stop_lon: lon,
            stop_code: stop.code.clone().unwrap_or_default(),
            route_count: routes.len(),
            routes,
        });
    }

    let route_stops = reverse_index(&records);
    (records, route_stops)
}

/// Distinct routes per stop, in stop id order, from `(stop_id, route_id)` stop time pairs
fn stop_route_pairs<'a>(
    stop_times: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> BTreeMap<&'a str, BTreeSet<&'a str>> {
    let mut pairs: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (stop_id, route_id) in stop_times {
        pairs.entry(stop_id).or_default().insert(route_id);
    }
    pairs
}

/// Route → stops served, in route id order; stop ids keep the input order
pub fn reverse_index(stops: &[StopRecord]) -> Vec<RouteStopsRecord> {
    let mut by_route: BTreeMap<RouteIdentifier, RouteStopsRecord> = BTreeMap::new();
    for stop in stops {
        for route in &stop.routes {
            by_route
                .entry(route.id.clone())
                .or_insert_with(|| RouteStopsRecord {
                    route_id: route.id.clone(),
                    route_short_name: route.short_name.clone(),
                    route_long_name: route.long_name.clone(),
                    stop_ids: Vec::new(),
                })
                .stop_ids
                .push(stop.stop_id.clone());
        }
    }

    by_route.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(stop_id: &str, routes: &[&str]) -> StopRecord {
        let routes: Vec<RouteMeta> = routes
            .iter()
            .map(|r| RouteMeta::new(r, r, "", "000000", "FFFFFF"))
            .collect();
        StopRecord {
            stop_id: StopIdentifier::new(stop_id),
            stop_name: String::new(),
            stop_lat: 4.7,
            stop_lon: -74.1,
            stop_code: String::new(),
            route_count: routes.len(),
            routes,
        }
    }

    #[test]
    fn test_stop_route_pairs_are_unique_and_sorted() {
        let pairs = stop_route_pairs([
            ("s2", "r1"),
            ("s1", "r2"),
            ("s1", "r1"),
            ("s2", "r1"),
            ("s1", "r2"),
        ]);

        let stops: Vec<&str> = pairs.keys().copied().collect();
        assert_eq!(stops, vec!["s1", "s2"]);
        assert_eq!(pairs["s1"].iter().copied().collect::<Vec<_>>(), vec!["r1", "r2"]);
        assert_eq!(pairs["s2"].len(), 1);
    }

    #[test]
    fn test_reverse_index() {
        let stops = vec![record("s1", &["b", "a"]), record("s2", &["a"])];
        let index = reverse_index(&stops);

        assert_eq!(index.len(), 2);
        assert_eq!(index[0].route_id.as_str(), "a");
        assert_eq!(
            index[0].stop_ids,
            vec![StopIdentifier::new("s1"), StopIdentifier::new("s2")]
        );
        assert_eq!(index[1].stop_ids, vec![StopIdentifier::new("s1")]);
    }
}
