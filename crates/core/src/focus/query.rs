//! Spatial query adapter: which route features are under the pointer.

use std::collections::BTreeSet;

use sitp_transit::{FeatureIdentifier, RouteIdentifier};

use crate::surface::{MapSurface, RenderedFeature, ScreenBox, ScreenPoint};

/// Deduplicated features found around a point; empty is a normal result
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryResult {
    hits: BTreeSet<RenderedFeature>,
}

impl QueryResult {
    pub fn from_features(features: impl IntoIterator<Item = RenderedFeature>) -> Self {
        Self {
            hits: features.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn hits(&self) -> &BTreeSet<RenderedFeature> {
        &self.hits
    }

    pub fn feature_ids(&self) -> BTreeSet<FeatureIdentifier> {
        self.hits.iter().filter_map(|h| h.feature_id.clone()).collect()
    }

    pub fn route_ids(&self) -> BTreeSet<RouteIdentifier> {
        self.hits.iter().filter_map(|h| h.route_id.clone()).collect()
    }

    /// Keep only features belonging to one of `routes`
    pub fn restricted_to(self, routes: &BTreeSet<RouteIdentifier>) -> Self {
        Self {
            hits: self
                .hits
                .into_iter()
                .filter(|h| h.route_id.as_ref().is_some_and(|r| routes.contains(r)))
                .collect(),
        }
    }
}

/// Query the route layer in a square of half-side `buffer` around `point`
///
/// A layer that is not ready yet yields an empty result.
pub fn features_around<S: MapSurface + ?Sized>(
    surface: &S,
    point: ScreenPoint,
    buffer: f64,
    layer: &str,
) -> QueryResult {
    let bbox = ScreenBox::around(point, buffer);
    match surface.query_rendered_features(bbox, layer) {
        Some(features) => QueryResult::from_features(features),
        None => QueryResult::default(),
    }
}
