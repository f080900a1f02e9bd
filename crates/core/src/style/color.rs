//! Group colors for selected routes.
//!
//! Routes are grouped by short name: every route sharing a short name gets the
//! same palette color. Groups are numbered in canonical name order, so the
//! assignment depends only on which routes are selected, never on the order
//! they were selected in.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use itertools::Itertools;
use palette::Srgb;
use sitp_transit::{RouteIdentifier, RouteMeta};

use crate::error::ConfigError;
use crate::ordering::canonical_cmp;

/// Parse `#rrggbb` or `rrggbb`
pub fn parse_hex(color: &str) -> Result<Srgb<u8>, ConfigError> {
    Srgb::<u8>::from_str(color.trim()).map_err(|err| ConfigError::PaletteColor {
        color: color.to_string(),
        reason: err.to_string(),
    })
}

/// Lowercase `#rrggbb`
pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Non-empty, cyclic list of selection colors
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Srgb<u8>>,
}

impl Palette {
    pub fn parse(colors: &[String]) -> Result<Self, ConfigError> {
        if colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        let colors = colors.iter().map(|c| parse_hex(c)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color of the `index`-th group, wrapping around
    pub fn get(&self, index: usize) -> Srgb<u8> {
        self.colors[index % self.colors.len()]
    }
}

/// One row of the selection legend
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub short_name: Arc<str>,
    /// `#rrggbb`
    pub color: String,
    pub routes: Vec<RouteIdentifier>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupColors {
    pub by_route: BTreeMap<RouteIdentifier, String>,
    /// Groups in canonical short name order
    pub legend: Vec<LegendEntry>,
}

impl GroupColors {
    pub fn color_of(&self, route: &RouteIdentifier) -> Option<&str> {
        self.by_route.get(route).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_route.is_empty()
    }
}

/// Color every selected route by its short name group
pub fn assign_group_colors<'a>(
    selected: impl IntoIterator<Item = &'a RouteMeta>,
    palette: &Palette,
) -> GroupColors {
    let groups = selected
        .into_iter()
        .map(|route| (route.short_name.clone(), route.id.clone()))
        .into_group_map();

    let legend: Vec<LegendEntry> = groups
        .into_iter()
        .sorted_by(|(a, _), (b, _)| canonical_cmp(a, b))
        .enumerate()
        .map(|(index, (short_name, routes))| LegendEntry {
            short_name,
            color: to_hex(palette.get(index)),
            routes: routes.into_iter().sorted().dedup().collect(),
        })
        .collect();

    let by_route = legend
        .iter()
        .flat_map(|entry| entry.routes.iter().map(|id| (id.clone(), entry.color.clone())))
        .collect();

    GroupColors { by_route, legend }
}
