//! Planned weekday headways per route.
//!
//! Only services running every day Monday through Friday are considered. A
//! trip's departure is the departure time at its first stop.

use std::collections::{BTreeMap, HashSet};

use gtfs_structures::Gtfs;
use tracing::debug;

use crate::identifiers::*;
use crate::models::types::*;

/// First and last hour (exclusive) of the hourly profile
const PROFILE_HOURS: std::ops::Range<u8> = 4..24;

pub fn compile_frequencies(gtfs: &Gtfs) -> BTreeMap<RouteIdentifier, FrequencyProfile> {
    let weekday_services = weekday_service_ids(gtfs.calendar.values().map(|c| {
        (
            c.id.as_str(),
            [c.monday, c.tuesday, c.wednesday, c.thursday, c.friday, c.saturday, c.sunday],
        )
    }));
    debug!("found {} weekday service patterns", weekday_services.len());

    let departures = departures_by_route(
        gtfs.trips.values().map(|trip| {
            let departure = first_departure(
                trip.stop_times
                    .iter()
                    .map(|st| (st.stop_sequence, st.departure_time, st.arrival_time)),
            );
            (trip.route_id.as_str(), trip.service_id.as_str(), departure)
        }),
        &weekday_services,
    );

    let mut profiles = BTreeMap::new();
    let mut skipped = 0usize;
    for (route_id, route_departures) in departures {
        let route_id = RouteIdentifier::new(route_id);
        match route_frequency(route_id.clone(), route_departures) {
            Some(profile) => {
                profiles.insert(route_id, profile);
            }
            None => skipped += 1,
        }
    }
    debug!("computed {} frequency profiles, skipped {skipped}", profiles.len());

    profiles
}

/// Services running every day Monday through Friday, from `(service_id, [monday..=sunday])`
fn weekday_service_ids<'a>(calendars: impl IntoIterator<Item = (&'a str, [bool; 7])>) -> HashSet<&'a str> {
    calendars
        .into_iter()
        .filter(|(_, days)| days[..5].iter().all(|runs| *runs))
        .map(|(id, _)| id)
        .collect()
}

/// Departure at the lowest stop sequence, from `(stop_sequence, departure, arrival)`
///
/// Falls back to the arrival time when the first stop has no departure.
fn first_departure<S: Ord>(stop_times: impl IntoIterator<Item = (S, Option<u32>, Option<u32>)>) -> Option<u32> {
    stop_times
        .into_iter()
        .min_by(|a, b| a.0.cmp(&b.0))
        .and_then(|(_, departure, arrival)| departure.or(arrival))
}

/// First-stop departures per route, keeping only trips of `services`
fn departures_by_route<'a>(
    trips: impl IntoIterator<Item = (&'a str, &'a str, Option<u32>)>,
    services: &HashSet<&str>,
) -> BTreeMap<&'a str, Vec<u32>> {
    let mut departures: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for (route_id, service_id, departure) in trips {
        if !services.contains(service_id) {
            continue;
        }
        if let Some(seconds) = departure {
            departures.entry(route_id).or_default().push(seconds);
        }
    }
    departures
}

/// Headway statistics from first-stop departure times (seconds since service day start)
///
/// Returns `None` when fewer than two departures exist or every headway is zero.
pub fn route_frequency(route_id: RouteIdentifier, mut departures: Vec<u32>) -> Option<FrequencyProfile> {
    if departures.len() < 2 {
        return None;
    }
    departures.sort_unstable();

    let minutes: Vec<f64> = departures.iter().map(|s| *s as f64 / 60.0).collect();
    let headways = positive_headways(&minutes);
    if headways.is_empty() {
        return None;
    }

    let avg = headways.iter().sum::<f64>() / headways.len() as f64;
    let min = headways.iter().copied().fold(f64::INFINITY, f64::min);
    let max = headways.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let hourly_profile = PROFILE_HOURS
        .map(|hour| hourly_frequency(hour, &minutes))
        .collect();

    Some(FrequencyProfile {
        route_id,
        num_trips: departures.len() as u32,
        first_departure: format_time(departures[0]),
        last_departure: format_time(departures[departures.len() - 1]),
        avg_headway_minutes: round1(avg),
        min_headway_minutes: round1(min),
        max_headway_minutes: round1(max),
        hourly_profile,
    })
}

fn hourly_frequency(hour: u8, sorted_minutes: &[f64]) -> HourlyFrequency {
    let start = hour as f64 * 60.0;
    let end = start + 60.0;
    let in_hour: Vec<f64> = sorted_minutes
        .iter()
        .copied()
        .filter(|m| *m >= start && *m < end)
        .collect();

    let headways = if in_hour.len() > 1 {
        positive_headways(&in_hour)
    } else {
        Vec::new()
    };

    if headways.is_empty() {
        return HourlyFrequency {
            hour,
            trips: in_hour.len() as u32,
            avg_headway_minutes: 0.0,
            buses_per_hour: 0.0,
        };
    }

    let avg = headways.iter().sum::<f64>() / headways.len() as f64;
    HourlyFrequency {
        hour,
        trips: in_hour.len() as u32,
        avg_headway_minutes: round1(avg),
        buses_per_hour: round1(60.0 / avg),
    }
}

// Zero headways come from overlapping service patterns and are dropped
fn positive_headways(sorted_minutes: &[f64]) -> Vec<f64> {
    sorted_minutes
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|h| *h > 0.0)
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `HH:MM:SS`; hours are not wrapped at 24
fn format_time(seconds: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn at(h: u32, m: u32) -> u32 {
        h * 3600 + m * 60
    }

    #[test]
    fn test_route_frequency_summary() {
        let departures = vec![at(5, 20), at(5, 0), at(5, 10), at(5, 10), at(6, 0)];
        let profile = route_frequency(RouteIdentifier::new("r1"), departures).unwrap();

        assert_eq!(profile.num_trips, 5);
        assert_eq!(profile.first_departure, "05:00:00");
        assert_eq!(profile.last_departure, "06:00:00");
        // Headways 10, 0 (dropped), 10, 40
        assert_relative_eq!(profile.avg_headway_minutes, 20.0);
        assert_relative_eq!(profile.min_headway_minutes, 10.0);
        assert_relative_eq!(profile.max_headway_minutes, 40.0);
        assert_eq!(profile.hourly_profile.len(), 20);
    }

    #[test]
    fn test_hourly_profile() {
        let departures = vec![at(5, 0), at(5, 15), at(5, 30), at(5, 45), at(7, 0)];
        let profile = route_frequency(RouteIdentifier::new("r1"), departures).unwrap();

        let five = &profile.hourly_profile[1];
        assert_eq!(five.hour, 5);
        assert_eq!(five.trips, 4);
        assert_relative_eq!(five.avg_headway_minutes, 15.0);
        assert_relative_eq!(five.buses_per_hour, 4.0);

        // A single trip in the hour has no headway
        let seven = &profile.hourly_profile[3];
        assert_eq!(seven.trips, 1);
        assert_relative_eq!(seven.buses_per_hour, 0.0);
    }

    #[test]
    fn test_not_enough_departures() {
        assert!(route_frequency(RouteIdentifier::new("r1"), vec![at(5, 0)]).is_none());
        assert!(route_frequency(RouteIdentifier::new("r1"), vec![at(5, 0), at(5, 0)]).is_none());
    }

    #[test]
    fn test_weekday_services_only() {
        let weekdays = [true, true, true, true, true, false, false];
        let every_day = [true; 7];
        let saturday = [false, false, false, false, false, true, false];
        let no_friday = [true, true, true, true, false, false, false];

        let services = weekday_service_ids([
            ("WK", weekdays),
            ("ALL", every_day),
            ("SAT", saturday),
            ("MTWT", no_friday),
        ]);
        assert_eq!(services, HashSet::from(["WK", "ALL"]));
    }

    #[test]
    fn test_first_stop_departure() {
        // Unordered stop times; sequence 1 wins
        let stop_times = vec![
            (3, Some(at(6, 20)), Some(at(6, 20))),
            (1, Some(at(6, 0)), Some(at(5, 59))),
            (2, Some(at(6, 10)), None),
        ];
        assert_eq!(first_departure(stop_times), Some(at(6, 0)));

        // Lowest sequence when numbering does not start at 1
        assert_eq!(first_departure(vec![(7, None, Some(at(7, 5))), (9, Some(at(7, 30)), None)]), Some(at(7, 5)));
        assert_eq!(first_departure(Vec::<(u32, Option<u32>, Option<u32>)>::new()), None);
    }

    #[test]
    fn test_departures_skip_other_services() {
        let services = HashSet::from(["WK"]);
        let trips = vec![
            ("r1", "WK", Some(at(6, 0))),
            ("r1", "SAT", Some(at(6, 5))),
            ("r1", "WK", Some(at(6, 10))),
            ("r2", "WK", None),
            ("r3", "SUN", Some(at(8, 0))),
        ];
        let departures = departures_by_route(trips, &services);

        assert_eq!(departures.len(), 1);
        assert_eq!(departures["r1"], vec![at(6, 0), at(6, 10)]);
    }

    #[test]
    fn test_format_time_past_midnight() {
        assert_eq!(format_time(91800), "25:30:00");
    }
}
