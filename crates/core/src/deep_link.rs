//! The `stop` query parameter.
//!
//! A stop code in the page URL reproduces a stop focus on load. It is read
//! once: after the first restore, the engine only ever writes the parameter
//! (on stop selection) or removes it (on any other interaction).

use std::sync::Arc;

use reqwest::Url;
use sitp_transit::{CatalogProvider, Stop};
use tracing::{debug, warn};

use crate::error::StopNotFoundError;

pub const STOP_PARAM: &str = "stop";

/// Browser-style navigation history
pub trait History {
    fn current(&self) -> Url;

    /// Record a new entry without reloading
    fn push(&mut self, url: Url);
}

/// Trimmed stop code, if the parameter is present and not blank
pub fn read_stop_code(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == STOP_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|code| !code.is_empty())
}

/// Set the parameter to the uppercased code, keeping every other parameter
pub fn write_stop_code(url: &mut Url, code: &str) {
    let mut pairs = other_pairs(url);
    pairs.push((STOP_PARAM.to_string(), code.trim().to_uppercase()));
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

/// Remove the parameter; drops the `?` entirely when nothing else is left
///
/// Returns whether the parameter was present.
pub fn clear_stop_code(url: &mut Url) -> bool {
    let had_param = url.query_pairs().any(|(key, _)| key == STOP_PARAM);
    if !had_param {
        return false;
    }

    let pairs = other_pairs(url);
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    true
}

fn other_pairs(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .filter(|(key, _)| key != STOP_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeepLinkOutcome {
    /// No stop in the URL
    Absent,
    /// The stop was found and should be focused
    Applied(Arc<Stop>),
    /// The code matches no stop; the link is ignored
    NotFound(StopNotFoundError),
    /// The link was already restored during this page load
    AlreadyConsumed,
    /// The stop catalog is not loaded yet; retry once it is
    Deferred,
    /// The stop catalog failed to load; the link with this code is dropped
    Unavailable(String),
}

/// Tracks whether this page load's deep link has been restored
#[derive(Clone, Debug, Default)]
pub struct DeepLinkSync {
    consumed: bool,
}

impl DeepLinkSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Resolve the URL's stop code against the catalog, at most once
    pub fn restore(&mut self, url: &Url, catalog: &dyn CatalogProvider) -> DeepLinkOutcome {
        if self.consumed {
            return DeepLinkOutcome::AlreadyConsumed;
        }

        let Some(code) = read_stop_code(url) else {
            self.consumed = true;
            return DeepLinkOutcome::Absent;
        };

        if catalog.all_stops().is_empty() {
            debug!("deferring deep link to stop {code}: stops not loaded");
            return DeepLinkOutcome::Deferred;
        }

        self.consumed = true;
        match catalog.stop_by_code(&code) {
            Some(stop) => {
                debug!("restoring deep link to stop {} ({})", stop.code, stop.id);
                DeepLinkOutcome::Applied(stop)
            }
            None => {
                let err = StopNotFoundError { code };
                warn!("ignoring deep link: {err}");
                DeepLinkOutcome::NotFound(err)
            }
        }
    }

    /// Consume a pending link that can never resolve because stops failed to load
    pub fn abandon(&mut self, url: &Url) -> DeepLinkOutcome {
        if self.consumed {
            return DeepLinkOutcome::AlreadyConsumed;
        }
        self.consumed = true;

        match read_stop_code(url) {
            Some(code) => {
                warn!("dropping deep link to stop {code}: stop catalog failed to load");
                DeepLinkOutcome::Unavailable(code)
            }
            None => DeepLinkOutcome::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;
    use sitp_transit::{RouteIdentifier, StaticCatalog, StopIdentifier};
    use std::collections::HashMap;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn catalog() -> StaticCatalog {
        let stop = Stop {
            id: StopIdentifier::new("s1"),
            code: "123A".into(),
            name: "Calle 100".into(),
            location: Point::new(-74.05, 4.68),
            route_ids: [RouteIdentifier::new("r1")].into(),
        };
        StaticCatalog::from_data(vec![], vec![stop], HashMap::new())
    }

    #[test]
    fn test_read_trims() {
        assert_eq!(read_stop_code(&url("https://map.test/?stop=%20123a%20")), Some("123a".into()));
        assert_eq!(read_stop_code(&url("https://map.test/?stop=")), None);
        assert_eq!(read_stop_code(&url("https://map.test/?lang=en")), None);
    }

    #[test]
    fn test_write_uppercases_and_keeps_other_params() {
        let mut link = url("https://map.test/app/?lang=en&stop=old");
        write_stop_code(&mut link, "123a");

        assert_eq!(link.as_str(), "https://map.test/app/?lang=en&stop=123A");
        assert_eq!(read_stop_code(&link).map(|c| c.to_lowercase()), Some("123a".into()));
    }

    #[test]
    fn test_clear_removes_parameter_entirely() {
        let mut link = url("https://map.test/?stop=123A");
        assert!(clear_stop_code(&mut link));
        assert_eq!(link.as_str(), "https://map.test/");
        assert_eq!(read_stop_code(&link), None);
        assert!(!clear_stop_code(&mut link));

        let mut link = url("https://map.test/?stop=123A&lang=en");
        clear_stop_code(&mut link);
        assert_eq!(link.query(), Some("lang=en"));
    }

    #[test]
    fn test_restore_once() {
        let catalog = catalog();
        let link = url("https://map.test/?stop=123a");
        let mut sync = DeepLinkSync::new();

        match sync.restore(&link, &catalog) {
            DeepLinkOutcome::Applied(stop) => assert_eq!(stop.id, StopIdentifier::new("s1")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(sync.restore(&link, &catalog), DeepLinkOutcome::AlreadyConsumed);
    }

    #[test]
    fn test_restore_unknown_code_is_consumed() {
        let mut sync = DeepLinkSync::new();
        let outcome = sync.restore(&url("https://map.test/?stop=zzz"), &catalog());

        assert_eq!(
            outcome,
            DeepLinkOutcome::NotFound(StopNotFoundError { code: "zzz".into() })
        );
        assert!(sync.is_consumed());
    }

    #[test]
    fn test_abandon_consumes_pending_link() {
        let link = url("https://map.test/?stop=123a");
        let mut sync = DeepLinkSync::new();

        let empty = StaticCatalog::new();
        assert_eq!(sync.restore(&link, &empty), DeepLinkOutcome::Deferred);
        assert!(!sync.is_consumed());

        assert_eq!(sync.abandon(&link), DeepLinkOutcome::Unavailable("123a".into()));
        assert!(sync.is_consumed());
        assert_eq!(sync.restore(&link, &catalog()), DeepLinkOutcome::AlreadyConsumed);
    }

    #[test]
    fn test_restore_waits_for_stops() {
        let mut sync = DeepLinkSync::new();
        let link = url("https://map.test/?stop=123a");

        assert_eq!(sync.restore(&link, &StaticCatalog::new()), DeepLinkOutcome::Deferred);
        assert!(!sync.is_consumed());
        assert!(matches!(sync.restore(&link, &catalog()), DeepLinkOutcome::Applied(_)));
    }
}
