//! The merged interaction state and its focus modes.
//!
//! [`FocusState`] is the only mutable state the engine owns. Selection has a
//! single origin at a time: a point focus (map click or deep-linked stop) or an
//! explicit list pick. Switching origin replaces the selected set outright.

pub mod hover;
pub mod query;

use std::collections::BTreeSet;

use geo::Point;
use sitp_transit::{FeatureIdentifier, RouteIdentifier, Stop, StopIdentifier};

use self::hover::{HoverIndex, HoverUpdate};

/// Where the current selection came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionOrigin {
    Marker,
    List,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MarkerOrigin {
    Click,
    Stop(StopIdentifier),
}

/// A live point focus
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub location: Point,
    pub origin: MarkerOrigin,
}

/// The dominant signal, in precedence order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FocusMode {
    /// A route is hovered in the sidebar list
    Spotlight(RouteIdentifier),
    /// Marker, selection or pointer hover is live
    Focused,
    /// Nothing is focused anywhere
    Ambient,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FocusState {
    selected: BTreeSet<RouteIdentifier>,
    origin: Option<SelectionOrigin>,
    hover: HoverIndex<FeatureIdentifier>,
    sidebar_hover: Option<RouteIdentifier>,
    marker: Option<Marker>,
    route_query: String,
    stop_query: String,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> FocusMode {
        if let Some(route) = &self.sidebar_hover {
            FocusMode::Spotlight(route.clone())
        } else if self.is_focused() {
            FocusMode::Focused
        } else {
            FocusMode::Ambient
        }
    }

    /// Anything at all is emphasized, ignoring the sidebar
    pub fn is_focused(&self) -> bool {
        self.marker.is_some() || !self.selected.is_empty() || self.hover.is_hovering()
    }

    pub fn selected(&self) -> &BTreeSet<RouteIdentifier> {
        &self.selected
    }

    pub fn is_selected(&self, route: &RouteIdentifier) -> bool {
        self.selected.contains(route)
    }

    /// The selected route if exactly one is selected
    pub fn single_selection(&self) -> Option<&RouteIdentifier> {
        match self.selected.len() {
            1 => self.selected.first(),
            _ => None,
        }
    }

    pub fn origin(&self) -> Option<SelectionOrigin> {
        self.origin
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    pub fn has_marker(&self) -> bool {
        self.marker.is_some()
    }

    pub fn sidebar_hover(&self) -> Option<&RouteIdentifier> {
        self.sidebar_hover.as_ref()
    }

    pub fn hovered(&self) -> &BTreeSet<FeatureIdentifier> {
        self.hover.current()
    }

    pub fn is_hovering(&self) -> bool {
        self.hover.is_hovering()
    }

    pub fn route_query(&self) -> &str {
        &self.route_query
    }

    pub fn stop_query(&self) -> &str {
        &self.stop_query
    }

    /// Point focus at a clicked location; the routes under it become the selection
    pub fn focus_point(&mut self, location: Point, routes: BTreeSet<RouteIdentifier>) {
        self.marker = Some(Marker {
            location,
            origin: MarkerOrigin::Click,
        });
        self.replace_selection(routes, SelectionOrigin::Marker);
    }

    /// Point focus on a stop; the routes serving it become the selection
    pub fn focus_stop(&mut self, stop: &Stop) {
        self.marker = Some(Marker {
            location: stop.location,
            origin: MarkerOrigin::Stop(stop.id.clone()),
        });
        self.replace_selection(stop.route_ids.clone(), SelectionOrigin::Marker);
    }

    /// Pick a route from the list
    ///
    /// Picking the only selected route deselects it; anything else makes that
    /// route the whole selection. Returns whether `route` ends up selected.
    pub fn select_from_list(&mut self, route: RouteIdentifier) -> bool {
        self.marker = None;
        self.sidebar_hover = None;

        if self.single_selection() == Some(&route) {
            self.selected.clear();
            self.origin = None;
            false
        } else {
            self.replace_selection(BTreeSet::from([route]), SelectionOrigin::List);
            true
        }
    }

    /// Drop selection, marker and sidebar hover; pointer hover and filters survive
    pub fn clear(&mut self) {
        self.selected.clear();
        self.origin = None;
        self.marker = None;
        self.sidebar_hover = None;
    }

    /// Remove the marker, leaving the selection it produced in place
    pub fn clear_marker(&mut self) -> bool {
        self.marker.take().is_some()
    }

    /// Returns whether the value changed
    pub fn set_sidebar_hover(&mut self, route: Option<RouteIdentifier>) -> bool {
        if self.sidebar_hover == route {
            return false;
        }
        self.sidebar_hover = route;
        true
    }

    pub fn update_hover(&mut self, features: BTreeSet<FeatureIdentifier>) -> HoverUpdate<FeatureIdentifier> {
        self.hover.update(features)
    }

    pub fn clear_hover(&mut self) -> HoverUpdate<FeatureIdentifier> {
        self.hover.clear()
    }

    /// The renderer lost all feature state; forget ours without emitting
    pub fn reset_hover(&mut self) -> bool {
        self.hover.reset()
    }

    /// Returns whether the applied filter changed
    pub fn set_route_query(&mut self, query: String) -> bool {
        if self.route_query == query {
            return false;
        }
        self.route_query = query;
        true
    }

    pub fn set_stop_query(&mut self, query: String) -> bool {
        if self.stop_query == query {
            return false;
        }
        self.stop_query = query;
        true
    }

    fn replace_selection(&mut self, routes: BTreeSet<RouteIdentifier>, origin: SelectionOrigin) {
        self.origin = if routes.is_empty() { None } else { Some(origin) };
        self.selected = routes;
    }
}
