//! Engine and map configuration.
//!
//! Every field has a default matching the production viewer, so an empty JSON
//! object (or no config at all) yields a working engine.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::preferences::Theme;
use crate::style::color::Palette;

pub const DEFAULT_SELECTION_PALETTE: [&str; 9] = [
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf",
    "#999999",
];

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Half the side of the square queried around the pointer, in pixels
    pub buffer_pixels: f64,
    pub route_layer: String,
    pub route_source: String,
    pub search_debounce_ms: u64,
    pub stop_result_limit: usize,
    /// How long the "no routes here" notice stays up before the marker clears
    pub empty_click_notice_ms: u64,
    pub fit_padding_px: f64,
    pub selection_palette: Vec<String>,
    pub levels: StyleLevels,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_pixels: 5.0,
            route_layer: "routes-layer".into(),
            route_source: "all-routes".into(),
            search_debounce_ms: 300,
            stop_result_limit: 10,
            empty_click_notice_ms: 3000,
            fit_padding_px: 50.0,
            selection_palette: DEFAULT_SELECTION_PALETTE.iter().map(|c| c.to_string()).collect(),
            levels: StyleLevels::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.levels.validate()?;
        self.palette().map(|_| ())
    }

    pub fn palette(&self) -> Result<Palette, ConfigError> {
        Palette::parse(&self.selection_palette)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn empty_click_notice(&self) -> Duration {
        Duration::from_millis(self.empty_click_notice_ms)
    }
}

/// Opacity, stroke width and draw-order levels used by the style resolver
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleLevels {
    pub spotlight_opacity: f64,
    /// Selected routes other than the spotlighted one
    pub dimmed_opacity: f64,
    pub focused_opacity: f64,
    pub ambient_opacity: f64,
    pub hidden_opacity: f64,

    pub wide_width: f64,
    pub default_width: f64,

    pub spotlight_sort_key: f64,
    pub hover_sort_key: f64,
    pub selected_sort_key: f64,
    pub ambient_sort_key: f64,
}

impl Default for StyleLevels {
    fn default() -> Self {
        Self {
            spotlight_opacity: 1.0,
            dimmed_opacity: 0.1,
            focused_opacity: 0.7,
            ambient_opacity: 0.3,
            hidden_opacity: 0.0,
            wide_width: 4.0,
            default_width: 2.0,
            spotlight_sort_key: 1000.0,
            hover_sort_key: 900.0,
            selected_sort_key: 500.0,
            ambient_sort_key: 0.0,
        }
    }
}

impl StyleLevels {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.spotlight_sort_key > self.hover_sort_key
            && self.hover_sort_key > self.selected_sort_key
            && self.selected_sort_key > self.ambient_sort_key;

        if ordered { Ok(()) } else { Err(ConfigError::SortOrder) }
    }
}

/// Base map setup for the city
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// `[[west, south], [east, north]]`
    pub bounds: [[f64; 2]; 2],
    /// `[lon, lat]`
    pub center: [f64; 2],
    pub default_zoom: f64,
    pub min_zoom: f64,
    pub light_style_url: String,
    pub dark_style_url: String,
    /// Location of the dataset files, relative to the app root or absolute
    pub data_base_path: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            bounds: [[-74.45, 4.2], [-73.7, 4.9]],
            center: [-74.0721, 4.7110],
            default_zoom: 11.0,
            min_zoom: 10.0,
            light_style_url: "https://basemaps.cartocdn.com/gl/positron-gl-style/style.json".into(),
            dark_style_url: "https://basemaps.cartocdn.com/gl/dark-matter-gl-style/style.json"
                .into(),
            data_base_path: "routes_data/".into(),
        }
    }
}

impl MapConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn style_url(&self, theme: Theme) -> &str {
        match theme {
            Theme::Light => &self.light_style_url,
            Theme::Dark => &self.dark_style_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.palette().unwrap().len(), 9);
    }

    #[test]
    fn test_partial_override() {
        let config =
            EngineConfig::from_json_str(r#"{"stop_result_limit": 25, "levels": {"ambient_opacity": 0.5}}"#)
                .unwrap();

        assert_eq!(config.stop_result_limit, 25);
        assert_eq!(config.levels.ambient_opacity, 0.5);
        assert_eq!(config.levels.focused_opacity, 0.7);
        assert_eq!(config.buffer_pixels, 5.0);
    }

    #[test]
    fn test_rejects_bad_palette() {
        let err = EngineConfig::from_json_str(r##"{"selection_palette": ["#e41a1c", "nope"]}"##)
            .unwrap_err();
        assert!(matches!(err, ConfigError::PaletteColor { .. }));

        let err = EngineConfig::from_json_str(r#"{"selection_palette": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPalette));
    }

    #[test]
    fn test_rejects_unordered_sort_keys() {
        let err = EngineConfig::from_json_str(r#"{"levels": {"hover_sort_key": 2000}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::SortOrder));
    }

    #[test]
    fn test_style_url_per_theme() {
        let map = MapConfig::default();
        assert!(map.style_url(Theme::Light).contains("positron"));
        assert!(map.style_url(Theme::Dark).contains("dark-matter"));
    }
}
