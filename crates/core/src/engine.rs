//! Event handlers tying the focus state to the map surface.
//!
//! The host's event loop owns a [`FocusEngine`] and calls one handler per
//! event. Each handler mutates the [`FocusState`], pushes any resulting
//! style change to the surface, and returns. Nothing here blocks: timers are
//! driven by [`FocusEngine::tick`], and route geometry is requested through
//! [`FocusEngine::take_geometry_request`] and delivered back through
//! [`FocusEngine::on_route_geometry`].

use std::sync::Arc;
use std::time::Instant;

use geo::{BoundingRect, LineString, MultiLineString, Point};
use sitp_transit::{CatalogProvider, FeatureIdentifier, RouteIdentifier, RouteMeta, StaticCatalog, Stop};
use tracing::{debug, info, warn};

use crate::catalog::CatalogLoad;
use crate::config::{EngineConfig, MapConfig};
use crate::deep_link::{self, DeepLinkOutcome, DeepLinkSync, History};
use crate::error::{CatalogResource, ConfigError, GeometryFetchError, StopNotFoundError};
use crate::focus::hover::HoverUpdate;
use crate::focus::query::features_around;
use crate::focus::FocusState;
use crate::ordering::sort_routes;
use crate::preferences::Theme;
use crate::search::{self, Debouncer};
use crate::style::color::LegendEntry;
use crate::style::{StyleOutput, StyleResolver};
use crate::surface::{MapSurface, ScreenPoint};

/// What a map click found
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// This many routes are now selected
    Routes(usize),
    /// Nothing under the click; a notice is up until it expires
    NothingHere,
}

/// A route shape fetch the host should perform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeometryRequest {
    pub ticket: u64,
    pub route_id: RouteIdentifier,
}

pub struct FocusEngine<S: MapSurface, H: History> {
    config: EngineConfig,
    map: MapConfig,
    surface: S,
    history: H,
    catalog: Arc<dyn CatalogProvider>,
    resolver: StyleResolver,

    state: FocusState,
    /// Last style pushed to the surface
    applied_style: Option<StyleOutput>,

    route_search: Debouncer<String>,
    stop_search: Debouncer<String>,
    filtered_routes: Vec<Arc<RouteMeta>>,
    stop_results: Vec<Arc<Stop>>,

    deep_link: DeepLinkSync,

    /// Route the viewport should fit to, if any
    fit_target: Option<RouteIdentifier>,
    next_ticket: u64,
    latest_request: Option<GeometryRequest>,
    outbox: Option<GeometryRequest>,

    notice_expires: Option<Instant>,
    theme: Theme,
}

impl<S: MapSurface, H: History> FocusEngine<S, H> {
    pub fn new(config: EngineConfig, map: MapConfig, surface: S, history: H) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolver = StyleResolver::new(config.levels, config.palette()?);

        Ok(Self {
            route_search: Debouncer::new(config.search_debounce()),
            stop_search: Debouncer::new(config.search_debounce()),
            config,
            map,
            surface,
            history,
            catalog: Arc::new(StaticCatalog::new()),
            resolver,
            state: FocusState::new(),
            applied_style: None,
            filtered_routes: Vec::new(),
            stop_results: Vec::new(),
            deep_link: DeepLinkSync::new(),
            fit_target: None,
            next_ticket: 0,
            latest_request: None,
            outbox: None,
            notice_expires: None,
            theme: Theme::default(),
        })
    }

    // ---- Accessors ----

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn catalog(&self) -> &dyn CatalogProvider {
        self.catalog.as_ref()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Style currently applied to the route layer
    pub fn style(&self) -> Option<&StyleOutput> {
        self.applied_style.as_ref()
    }

    /// Route list under the active search filter, in display order
    pub fn filtered_routes(&self) -> &[Arc<RouteMeta>] {
        &self.filtered_routes
    }

    pub fn stop_results(&self) -> &[Arc<Stop>] {
        &self.stop_results
    }

    /// Selected routes in display order, matching the legend
    pub fn selected_routes(&self) -> Vec<Arc<RouteMeta>> {
        let mut routes: Vec<_> = self
            .state
            .selected()
            .iter()
            .filter_map(|id| self.catalog.get_route(id))
            .collect();
        sort_routes(&mut routes);
        routes
    }

    pub fn legend(&self) -> &[LegendEntry] {
        match &self.applied_style {
            Some(style) => style.colors().legend.as_slice(),
            None => &[],
        }
    }

    pub fn notice_visible(&self) -> bool {
        self.notice_expires.is_some()
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.route_search.deadline(),
            self.stop_search.deadline(),
            self.notice_expires,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    // ---- Catalog ----

    /// Swap in a freshly loaded catalog
    pub fn set_catalog(&mut self, catalog: Arc<dyn CatalogProvider>) {
        info!(
            "catalog ready: {} routes, {} stops",
            catalog.all_routes().len(),
            catalog.all_stops().len()
        );
        self.catalog = catalog;
        self.refilter_routes();
        self.refilter_stops();
        self.refresh_style();
    }

    /// Install the result of [`CatalogClient::load_catalog`](crate::catalog::CatalogClient::load_catalog) and restore the deep link
    ///
    /// When the stop catalog failed, a pending link can never resolve and is dropped.
    pub fn on_catalog_loaded(&mut self, load: CatalogLoad) -> DeepLinkOutcome {
        let stops_failed = load
            .errors
            .iter()
            .any(|err| err.resource == CatalogResource::Stops);

        self.set_catalog(Arc::new(load.catalog));
        if stops_failed {
            self.deep_link.abandon(&self.history.current())
        } else {
            self.restore_deep_link()
        }
    }

    // ---- Pointer ----

    pub fn on_pointer_move(&mut self, point: ScreenPoint) {
        let mut found = features_around(
            &self.surface,
            point,
            self.config.buffer_pixels,
            &self.config.route_layer,
        );
        if self.state.has_marker() {
            found = found.restricted_to(self.state.selected());
        }

        let update = self.state.update_hover(found.feature_ids());
        self.apply_hover(update);
    }

    pub fn on_pointer_leave(&mut self) {
        let update = self.state.clear_hover();
        self.apply_hover(update);
    }

    /// Point focus at `location`; the routes under `point` become the selection
    pub fn on_click(&mut self, point: ScreenPoint, location: Point, now: Instant) -> ClickOutcome {
        let found = features_around(
            &self.surface,
            point,
            self.config.buffer_pixels,
            &self.config.route_layer,
        );
        let routes = found.route_ids();
        let count = routes.len();

        self.state.focus_point(location, routes);
        self.surface.set_marker(Some(location));
        self.clear_deep_link();

        let outcome = if count == 0 {
            debug!("no routes near click at {:?}", location);
            self.notice_expires = Some(now + self.config.empty_click_notice());
            ClickOutcome::NothingHere
        } else {
            self.notice_expires = None;
            ClickOutcome::Routes(count)
        };

        self.selection_changed();
        outcome
    }

    // ---- Sidebar ----

    pub fn on_sidebar_hover(&mut self, route: Option<RouteIdentifier>) {
        if self.state.set_sidebar_hover(route) {
            self.refresh_style();
        }
    }

    /// Pick a route from the list; returns whether it ends up selected
    pub fn select_route(&mut self, route: RouteIdentifier) -> bool {
        let had_marker = self.state.has_marker();
        let selected = self.state.select_from_list(route);

        if had_marker {
            self.surface.set_marker(None);
        }
        self.notice_expires = None;
        self.clear_deep_link();
        self.selection_changed();
        selected
    }

    /// Focus the stop with this code and record it in the URL
    pub fn select_stop(&mut self, code: &str) -> Result<Arc<Stop>, StopNotFoundError> {
        let stop = self.catalog.stop_by_code(code).ok_or_else(|| StopNotFoundError {
            code: code.trim().to_string(),
        })?;

        self.focus_stop(&stop);

        let mut url = self.history.current();
        deep_link::write_stop_code(&mut url, &stop.code);
        self.history.push(url);
        Ok(stop)
    }

    pub fn clear_selection(&mut self) {
        let had_marker = self.state.has_marker();
        self.state.clear();

        if had_marker {
            self.surface.set_marker(None);
        }
        self.notice_expires = None;
        self.clear_deep_link();
        self.selection_changed();
    }

    // ---- Search ----

    pub fn set_route_query(&mut self, query: impl Into<String>, now: Instant) {
        self.route_search.push(query.into(), now);
    }

    pub fn set_stop_query(&mut self, query: impl Into<String>, now: Instant) {
        self.stop_search.push(query.into(), now);
    }

    // ---- Timers ----

    /// Fire every timer due at `now`; returns whether anything changed
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if let Some(query) = self.route_search.poll(now) {
            if self.state.set_route_query(query) {
                self.refilter_routes();
                changed = true;
            }
        }

        if let Some(query) = self.stop_search.poll(now) {
            if self.state.set_stop_query(query) {
                self.refilter_stops();
                changed = true;
            }
        }

        if self.notice_expires.is_some_and(|expires| now >= expires) {
            self.notice_expires = None;
            if self.state.clear_marker() {
                self.surface.set_marker(None);
                self.selection_changed();
            }
            changed = true;
        }

        changed
    }

    // ---- Deep link ----

    /// Apply the stop code in the current URL, once per page load
    ///
    /// Call after each catalog load; a link seen before stops are available
    /// stays pending.
    pub fn restore_deep_link(&mut self) -> DeepLinkOutcome {
        let url = self.history.current();
        let outcome = self.deep_link.restore(&url, self.catalog.as_ref());
        if let DeepLinkOutcome::Applied(stop) = &outcome {
            self.focus_stop(stop);
        }
        outcome
    }

    // ---- Route geometry ----

    /// Geometry the host should fetch, if a new one is needed
    pub fn take_geometry_request(&mut self) -> Option<GeometryRequest> {
        self.outbox.take()
    }

    /// Deliver a geometry fetch result; returns whether the viewport moved
    ///
    /// Results for anything but the latest request, or arriving after the
    /// selection moved on, are dropped.
    pub fn on_route_geometry(
        &mut self,
        request: &GeometryRequest,
        result: Result<Vec<LineString>, GeometryFetchError>,
    ) -> bool {
        let is_latest = self.latest_request.as_ref() == Some(request);
        let still_wanted = self.fit_target.as_ref() == Some(&request.route_id);
        if !is_latest || !still_wanted {
            debug!(
                "discarding stale geometry for route {} (ticket {})",
                request.route_id, request.ticket
            );
            return false;
        }
        self.latest_request = None;

        let lines = match result {
            Ok(lines) => lines,
            Err(err) => {
                warn!("{err}");
                return false;
            }
        };

        match MultiLineString::new(lines).bounding_rect() {
            Some(bounds) => {
                self.surface.fit_bounds(bounds, self.config.fit_padding_px);
                true
            }
            None => {
                debug!("route {} has no geometry to fit", request.route_id);
                false
            }
        }
    }

    // ---- Theme ----

    /// Swap the base map for `theme`; the route layer is restyled once the surface reports the new style loaded
    pub fn apply_theme(&mut self, theme: Theme) {
        if self.theme == theme {
            return;
        }
        self.theme = theme;
        self.surface.set_style(self.map.style_url(theme));
    }

    /// The surface finished (re)loading its style and the route layer exists again
    pub fn on_style_loaded(&mut self) {
        // A fresh style carries no feature state
        self.state.reset_hover();
        self.applied_style = None;
        self.refresh_style();
    }

    // ---- Internals ----

    fn focus_stop(&mut self, stop: &Stop) {
        self.state.focus_stop(stop);
        self.surface.set_marker(Some(stop.location));
        self.surface.center_on(stop.location);
        self.notice_expires = None;
        self.selection_changed();
    }

    fn apply_hover(&mut self, update: HoverUpdate<FeatureIdentifier>) {
        let source = &self.config.route_source;
        for feature in &update.delta.removed {
            self.surface.set_feature_hover(source, feature, false);
        }
        for feature in &update.delta.added {
            self.surface.set_feature_hover(source, feature, true);
        }

        if update.hovering_changed {
            self.refresh_style();
        }
    }

    fn selection_changed(&mut self) {
        self.refresh_style();
        self.update_fit_target();
    }

    fn refresh_style(&mut self) {
        let output = self.resolver.resolve(&self.state, self.catalog.as_ref());
        if self.applied_style.as_ref() == Some(&output) {
            return;
        }

        for (property, value) in output.layer_properties() {
            self.surface
                .set_layer_property(&self.config.route_layer, property, value);
        }
        self.applied_style = Some(output);
    }

    /// Request geometry when the selection settles on one route with no marker
    fn update_fit_target(&mut self) {
        let target = if self.state.has_marker() {
            None
        } else {
            self.state.single_selection().cloned()
        };

        if target == self.fit_target {
            return;
        }
        self.fit_target = target.clone();

        let request = target.map(|route_id| {
            self.next_ticket += 1;
            GeometryRequest {
                ticket: self.next_ticket,
                route_id,
            }
        });
        self.latest_request = request.clone();
        self.outbox = request;
    }

    fn clear_deep_link(&mut self) {
        let mut url = self.history.current();
        if deep_link::clear_stop_code(&mut url) {
            self.history.push(url);
        }
    }

    fn refilter_routes(&mut self) {
        self.filtered_routes =
            search::filter_routes(self.catalog.all_routes(), self.state.route_query());
    }

    fn refilter_stops(&mut self) {
        self.stop_results = search::filter_stops(
            self.catalog.all_stops(),
            self.state.stop_query(),
            self.config.stop_result_limit,
        );
    }
}
