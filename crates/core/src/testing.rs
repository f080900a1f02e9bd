//! Test doubles for the rendering surface and browser history.

use std::cell::Cell;
use std::collections::HashMap;

use geo::{Point, Rect};
use reqwest::Url;
use serde_json::Value;
use sitp_transit::FeatureIdentifier;

use crate::deep_link::History;
use crate::surface::{LayerProperty, MapSurface, RenderedFeature, ScreenBox};

#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceCall {
    Hover(FeatureIdentifier, bool),
    Property(LayerProperty),
    FitBounds(Rect, f64),
    CenterOn(Point),
    Marker(Option<Point>),
    Style(String),
}

/// Records every call; queries return whatever `features` holds
#[derive(Debug)]
pub struct RecordingSurface {
    pub features: Vec<RenderedFeature>,
    pub layer_ready: bool,
    pub calls: Vec<SurfaceCall>,
    pub properties: HashMap<LayerProperty, Value>,
    last_query: Cell<Option<ScreenBox>>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            features: Vec::new(),
            layer_ready: true,
            calls: Vec::new(),
            properties: HashMap::new(),
            last_query: Cell::new(None),
        }
    }
}

impl RecordingSurface {
    pub fn with_features(features: Vec<RenderedFeature>) -> Self {
        Self {
            features,
            ..Self::default()
        }
    }

    pub fn last_query(&self) -> Option<ScreenBox> {
        self.last_query.get()
    }

    pub fn hover_calls(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, SurfaceCall::Hover(..))).count()
    }

    pub fn property_calls(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, SurfaceCall::Property(_))).count()
    }

    pub fn fits(&self) -> Vec<(Rect, f64)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SurfaceCall::FitBounds(rect, padding) => Some((*rect, *padding)),
                _ => None,
            })
            .collect()
    }

    pub fn marker(&self) -> Option<Point> {
        self.calls.iter().rev().find_map(|c| match c {
            SurfaceCall::Marker(marker) => Some(*marker),
            _ => None,
        })?
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl MapSurface for RecordingSurface {
    fn query_rendered_features(&self, bbox: ScreenBox, _layer: &str) -> Option<Vec<RenderedFeature>> {
        self.last_query.set(Some(bbox));
        self.layer_ready.then(|| self.features.clone())
    }

    fn set_feature_hover(&mut self, _source: &str, feature: &FeatureIdentifier, hovered: bool) {
        self.calls.push(SurfaceCall::Hover(feature.clone(), hovered));
    }

    fn set_layer_property(&mut self, _layer: &str, property: LayerProperty, value: Value) {
        self.calls.push(SurfaceCall::Property(property));
        self.properties.insert(property, value);
    }

    fn fit_bounds(&mut self, bounds: Rect, padding: f64) {
        self.calls.push(SurfaceCall::FitBounds(bounds, padding));
    }

    fn center_on(&mut self, location: Point) {
        self.calls.push(SurfaceCall::CenterOn(location));
    }

    fn set_marker(&mut self, location: Option<Point>) {
        self.calls.push(SurfaceCall::Marker(location));
    }

    fn set_style(&mut self, style_url: &str) {
        self.calls.push(SurfaceCall::Style(style_url.to_string()));
    }
}

#[derive(Debug)]
pub struct RecordingHistory {
    pub entries: Vec<Url>,
}

impl RecordingHistory {
    pub fn at(url: &str) -> Self {
        Self {
            entries: vec![Url::parse(url).unwrap()],
        }
    }
}

impl History for RecordingHistory {
    fn current(&self) -> Url {
        self.entries.last().cloned().unwrap()
    }

    fn push(&mut self, url: Url) {
        self.entries.push(url);
    }
}
