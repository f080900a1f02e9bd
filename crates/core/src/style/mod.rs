//! Projection of the focus state onto the route layer.
//!
//! [`StyleResolver::resolve`] is a pure function of the focus state and the
//! route catalog. Its [`StyleOutput`] can be rendered two ways: as MapLibre
//! expressions for the whole layer, or evaluated for a single feature. Both
//! follow the same precedence:
//!
//! | mode | opacity |
//! |---|---|
//! | spotlight on R | R: spotlight, other selected: dimmed, rest: hidden |
//! | focused | hovered or selected: focused, rest: hidden |
//! | ambient | everything: ambient |

pub mod color;
pub mod expression;

use serde_json::{Value, json};
use sitp_transit::{CatalogProvider, RouteIdentifier};
use strum::IntoEnumIterator;

use self::color::{GroupColors, Palette, assign_group_colors};
use self::expression as expr;
use crate::config::StyleLevels;
use crate::focus::{FocusMode, FocusState};
use crate::surface::LayerProperty;

/// Visual attributes of one feature
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureStyle {
    pub opacity: f64,
    pub width: f64,
    /// `#rrggbb`
    pub color: String,
    pub sort_key: f64,
}

#[derive(Clone, Debug)]
pub struct StyleResolver {
    levels: StyleLevels,
    palette: Palette,
}

impl StyleResolver {
    pub fn new(levels: StyleLevels, palette: Palette) -> Self {
        Self { levels, palette }
    }

    pub fn levels(&self) -> &StyleLevels {
        &self.levels
    }

    pub fn resolve(&self, state: &FocusState, catalog: &dyn CatalogProvider) -> StyleOutput {
        let selected: Vec<RouteIdentifier> = state.selected().iter().cloned().collect();
        let metas: Vec<_> = selected.iter().filter_map(|id| catalog.get_route(id)).collect();
        let colors = assign_group_colors(metas.iter().map(|r| r.as_ref()), &self.palette);

        StyleOutput {
            mode: state.mode(),
            focused: state.is_focused(),
            selected,
            colors,
            levels: self.levels,
        }
    }
}

/// Resolved style of the route layer
///
/// Equality means the layer would look identical, so the engine only pushes
/// properties to the surface when the output actually changed.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleOutput {
    mode: FocusMode,
    focused: bool,
    /// Sorted by route id
    selected: Vec<RouteIdentifier>,
    colors: GroupColors,
    levels: StyleLevels,
}

impl StyleOutput {
    pub fn mode(&self) -> &FocusMode {
        &self.mode
    }

    pub fn colors(&self) -> &GroupColors {
        &self.colors
    }

    fn is_selected(&self, route: &RouteIdentifier) -> bool {
        self.selected.binary_search(route).is_ok()
    }

    /// Style of a feature of `route`; `native_color` may lack the leading `#`
    pub fn feature_style(&self, route: &RouteIdentifier, hovered: bool, native_color: &str) -> FeatureStyle {
        let levels = &self.levels;
        let selected = self.is_selected(route);

        let opacity = match &self.mode {
            FocusMode::Spotlight(spot) if spot == route => levels.spotlight_opacity,
            FocusMode::Spotlight(_) if selected => levels.dimmed_opacity,
            FocusMode::Spotlight(_) => levels.hidden_opacity,
            _ if hovered || selected => levels.focused_opacity,
            FocusMode::Focused => levels.hidden_opacity,
            FocusMode::Ambient => levels.ambient_opacity,
        };

        let width = if hovered || selected {
            levels.wide_width
        } else {
            levels.default_width
        };

        let sort_key = match &self.mode {
            FocusMode::Spotlight(spot) if spot == route => levels.spotlight_sort_key,
            _ if hovered => levels.hover_sort_key,
            _ if selected => levels.selected_sort_key,
            _ => levels.ambient_sort_key,
        };

        let color = match self.colors.color_of(route) {
            Some(group) => group.to_string(),
            None if native_color.starts_with('#') => native_color.to_string(),
            None => format!("#{native_color}"),
        };

        FeatureStyle {
            opacity,
            width,
            color,
            sort_key,
        }
    }

    pub fn opacity_expression(&self) -> Value {
        let levels = &self.levels;
        match &self.mode {
            FocusMode::Spotlight(spot) => expr::case(
                vec![
                    (expr::route_is(spot), json!(levels.spotlight_opacity)),
                    (expr::route_in(&self.selected), json!(levels.dimmed_opacity)),
                ],
                json!(levels.hidden_opacity),
            ),
            _ => {
                let fallback = if self.focused {
                    levels.hidden_opacity
                } else {
                    levels.ambient_opacity
                };
                expr::case(
                    vec![
                        (expr::is_hovered(), json!(levels.focused_opacity)),
                        (expr::route_in(&self.selected), json!(levels.focused_opacity)),
                    ],
                    json!(fallback),
                )
            }
        }
    }

    pub fn width_expression(&self) -> Value {
        expr::case(
            vec![
                (expr::is_hovered(), json!(self.levels.wide_width)),
                (expr::route_in(&self.selected), json!(self.levels.wide_width)),
            ],
            json!(self.levels.default_width),
        )
    }

    pub fn color_expression(&self) -> Value {
        expr::match_route(
            self.colors.by_route.iter().map(|(id, color)| (id, color.as_str())),
            expr::get(expr::ROUTE_COLOR_PROPERTY),
        )
    }

    pub fn sort_key_expression(&self) -> Value {
        let levels = &self.levels;
        let mut arms = Vec::with_capacity(3);
        if let FocusMode::Spotlight(spot) = &self.mode {
            arms.push((expr::route_is(spot), json!(levels.spotlight_sort_key)));
        }
        arms.push((expr::is_hovered(), json!(levels.hover_sort_key)));
        arms.push((expr::route_in(&self.selected), json!(levels.selected_sort_key)));

        expr::case(arms, json!(levels.ambient_sort_key))
    }

    pub fn expression(&self, property: LayerProperty) -> Value {
        match property {
            LayerProperty::LineOpacity => self.opacity_expression(),
            LayerProperty::LineWidth => self.width_expression(),
            LayerProperty::LineColor => self.color_expression(),
            LayerProperty::LineSortKey => self.sort_key_expression(),
        }
    }

    /// Every driven property with its expression
    pub fn layer_properties(&self) -> Vec<(LayerProperty, Value)> {
        LayerProperty::iter().map(|p| (p, self.expression(p))).collect()
    }
}
