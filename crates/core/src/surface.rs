//! Contract with the map rendering surface.
//!
//! The engine never talks to a concrete renderer. It reads rendered features
//! through [`MapSurface::query_rendered_features`] and writes style expressions,
//! per-feature hover flags and viewport commands back.

use geo::{Point, Rect};
use sitp_transit::{FeatureIdentifier, RouteIdentifier};
use strum::{AsRefStr, Display, EnumCount, EnumIter};

/// Pixel position on the map canvas
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned pixel box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenBox {
    pub min: ScreenPoint,
    pub max: ScreenPoint,
}

impl ScreenBox {
    /// Square of side `2 * buffer` centered on `point`
    pub fn around(point: ScreenPoint, buffer: f64) -> Self {
        Self {
            min: ScreenPoint::new(point.x - buffer, point.y - buffer),
            max: ScreenPoint::new(point.x + buffer, point.y + buffer),
        }
    }
}

/// One feature returned by a rendered-features query
///
/// Either half can be missing when the renderer hands back a feature without
/// a promoted id or without a `route_id` property.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderedFeature {
    pub feature_id: Option<FeatureIdentifier>,
    pub route_id: Option<RouteIdentifier>,
}

impl RenderedFeature {
    pub fn new(feature_id: impl AsRef<str>, route_id: impl AsRef<str>) -> Self {
        Self {
            feature_id: Some(FeatureIdentifier::new(feature_id)),
            route_id: Some(RouteIdentifier::new(route_id)),
        }
    }
}

/// Route layer properties driven by the style resolver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumCount, EnumIter)]
pub enum LayerProperty {
    #[strum(serialize = "line-opacity")]
    LineOpacity,
    #[strum(serialize = "line-width")]
    LineWidth,
    #[strum(serialize = "line-color")]
    LineColor,
    #[strum(serialize = "line-sort-key")]
    LineSortKey,
}

impl LayerProperty {
    /// Sort keys are layout properties; everything else is paint
    pub fn is_layout(self) -> bool {
        matches!(self, LayerProperty::LineSortKey)
    }
}

pub trait MapSurface {
    /// Features of `layer` rendered inside `bbox`
    ///
    /// Returns `None` while the layer does not exist yet (style still loading).
    fn query_rendered_features(&self, bbox: ScreenBox, layer: &str) -> Option<Vec<RenderedFeature>>;

    /// Set or clear the boolean `hover` feature state of one feature
    fn set_feature_hover(&mut self, source: &str, feature: &FeatureIdentifier, hovered: bool);

    /// Replace a paint or layout property with a style expression
    fn set_layer_property(&mut self, layer: &str, property: LayerProperty, value: serde_json::Value);

    fn fit_bounds(&mut self, bounds: Rect, padding: f64);

    fn center_on(&mut self, location: Point);

    /// Show the point-focus marker at `location`, or remove it
    fn set_marker(&mut self, location: Option<Point>);

    /// Swap the base map style; the surface reports completion through the engine's `on_style_loaded`
    fn set_style(&mut self, style_url: &str);
}
