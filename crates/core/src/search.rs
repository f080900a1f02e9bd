//! Debounced route and stop search.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sitp_transit::{RouteMeta, Stop};

use crate::ordering::sort_routes;

/// Holds back the latest value until input has been quiet for `delay`
///
/// Time is passed in explicitly; the owner polls whenever its event loop
/// wakes. Every [`push`](Debouncer::push) supersedes the pending value and
/// restarts the window, so intermediate values are never released.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Release the pending value once its window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// When the pending value becomes ready
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

/// Routes whose short name, long name or id contains `query`, ignoring case
///
/// An empty query keeps every route. Results come back in display order.
pub fn filter_routes(routes: &[Arc<RouteMeta>], query: &str) -> Vec<Arc<RouteMeta>> {
    let needle = query.to_lowercase();
    let mut matches: Vec<Arc<RouteMeta>> = routes
        .iter()
        .filter(|route| {
            route.short_name.to_lowercase().contains(&needle)
                || route.long_name.to_lowercase().contains(&needle)
                || route.id.as_str().to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    sort_routes(&mut matches);
    matches
}

/// First `limit` stops whose code contains `query`, ignoring case
///
/// A blank query matches nothing.
pub fn filter_stops(stops: &[Arc<Stop>], query: &str, limit: usize) -> Vec<Arc<Stop>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    stops
        .iter()
        .filter(|stop| stop.has_code() && stop.code.to_lowercase().contains(&needle))
        .take(limit)
        .cloned()
        .collect()
}
