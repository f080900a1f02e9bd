use anyhow::{Context, Result};
use geo::{LineString, Point};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value, feature::Id};
use serde::Serialize;
use serde_json::{Map, json};
use sitp_transit::compiler::{CompiledDataset, RouteShapes};
use sitp_transit::models::records::{
    route_geometry_file, StopRecord, ALL_ROUTES_FILE, FREQUENCIES_FILE, ROUTES_INDEX_FILE,
    ROUTES_TO_STOPS_FILE, STOPS_FILE, STOPS_GEOJSON_FILE,
};
use std::path::Path;

/// Counts reported after a build
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputStats {
    pub route_files: usize,
    pub shape_features: usize,
    pub stops: usize,
    pub frequency_profiles: usize,
}

impl OutputStats {
    pub fn log_summary(&self) {
        log::info!("=== Summary ===");
        log::info!("  Route files:        {}", self.route_files);
        log::info!("  Shape features:     {}", self.shape_features);
        log::info!("  Stops:              {}", self.stops);
        log::info!("  Frequency profiles: {}", self.frequency_profiles);
    }
}

fn line_to_geojson(line: &LineString) -> Value {
    Value::LineString(line.0.iter().map(|c| vec![c.x, c.y]).collect())
}

fn point_to_geojson(point: &Point) -> Value {
    Value::Point(vec![point.x(), point.y()])
}

/// One feature per shape, keyed by shape id so the map can promote it for hover state
fn shape_features(route: &RouteShapes) -> Vec<Feature> {
    let meta = &route.route;

    route
        .shapes
        .iter()
        .map(|(shape_id, line)| {
            let mut properties = Map::new();
            properties.insert("route_id".to_string(), json!(meta.id.as_str()));
            properties.insert("route_short_name".to_string(), json!(meta.short_name.as_ref()));
            properties.insert("route_long_name".to_string(), json!(meta.long_name.as_ref()));
            properties.insert("route_color".to_string(), json!(meta.display_color()));
            properties.insert("route_text_color".to_string(), json!(meta.display_text_color()));
            properties.insert("shape_id".to_string(), json!(shape_id.as_str()));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(line_to_geojson(line))),
                id: Some(Id::String(shape_id.to_string())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect()
}

fn stop_feature(stop: &StopRecord) -> Feature {
    let route_ids: Vec<&str> = stop.routes.iter().map(|r| r.id.as_str()).collect();
    let route_names: Vec<&str> = stop.routes.iter().map(|r| r.short_name.as_ref()).collect();

    let mut properties = Map::new();
    properties.insert("stop_id".to_string(), json!(stop.stop_id.as_str()));
    properties.insert("stop_name".to_string(), json!(stop.stop_name));
    properties.insert("stop_code".to_string(), json!(stop.stop_code));
    properties.insert("route_count".to_string(), json!(stop.route_count));
    properties.insert("route_ids".to_string(), json!(route_ids));
    properties.insert("route_names".to_string(), json!(route_names));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(point_to_geojson(&Point::new(stop.stop_lon, stop.stop_lat)))),
        id: Some(Id::String(stop.stop_id.to_string())),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn write_feature_collection(features: Vec<Feature>, output_path: &Path) -> Result<()> {
    let feature_collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };

    let geojson = GeoJson::from(feature_collection);
    let json_string = serde_json::to_string(&geojson).context("Failed to serialize GeoJSON")?;

    std::fs::write(output_path, json_string)
        .with_context(|| format!("Failed to write GeoJSON to {}", output_path.display()))?;

    Ok(())
}

fn write_json<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", output_path.display()))?;

    std::fs::write(output_path, json_string)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    Ok(())
}

/// Per-route shape files, `all_routes.geojson` and `routes_index.json`
pub fn write_routes(dataset: &CompiledDataset, output_dir: &Path) -> Result<OutputStats> {
    let mut stats = OutputStats::default();
    let mut all_features = Vec::new();

    for route in &dataset.routes {
        let features = shape_features(route);
        stats.shape_features += features.len();
        all_features.extend(features.iter().cloned());

        let path = output_dir.join(route_geometry_file(&route.route.id));
        write_feature_collection(features, &path)?;
        stats.route_files += 1;
    }
    log::info!("  Wrote {} route files", stats.route_files);

    write_feature_collection(all_features, &output_dir.join(ALL_ROUTES_FILE))?;
    log::info!("  Wrote {} with {} features", ALL_ROUTES_FILE, stats.shape_features);

    write_json(&dataset.route_index(), &output_dir.join(ROUTES_INDEX_FILE))?;
    log::info!("  Wrote {}", ROUTES_INDEX_FILE);

    Ok(stats)
}

/// `stops_with_routes.json`, `stops.geojson` and `routes_to_stops.json`
pub fn write_stops(dataset: &CompiledDataset, output_dir: &Path) -> Result<usize> {
    write_json(&dataset.stops, &output_dir.join(STOPS_FILE))?;

    let features = dataset.stops.iter().map(stop_feature).collect();
    write_feature_collection(features, &output_dir.join(STOPS_GEOJSON_FILE))?;

    write_json(&dataset.route_stops, &output_dir.join(ROUTES_TO_STOPS_FILE))?;

    log::info!(
        "  Wrote {} stops and {} route stop lists",
        dataset.stops.len(),
        dataset.route_stops.len()
    );
    Ok(dataset.stops.len())
}

pub fn write_frequencies(dataset: &CompiledDataset, output_dir: &Path) -> Result<usize> {
    write_json(&dataset.frequencies, &output_dir.join(FREQUENCIES_FILE))?;
    log::info!("  Wrote {} frequency profiles", dataset.frequencies.len());
    Ok(dataset.frequencies.len())
}

/// Write every dataset file into `output_dir`, creating it if needed
pub fn write_dataset(dataset: &CompiledDataset, output_dir: &Path) -> Result<OutputStats> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut stats = write_routes(dataset, output_dir)?;
    stats.stops = write_stops(dataset, output_dir)?;
    stats.frequency_profiles = write_frequencies(dataset, output_dir)?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitp_transit::models::records;
    use sitp_transit::{FeatureIdentifier, RouteMeta, StopIdentifier};

    fn dataset() -> CompiledDataset {
        let route = RouteMeta::new("TM/1", "1", "Portal Norte", "E41A1C", "FFFFFF");
        let line = LineString::from(vec![(-74.1, 4.6), (-74.0, 4.7)]);

        CompiledDataset {
            routes: vec![RouteShapes {
                route: route.clone(),
                shapes: vec![(FeatureIdentifier::new("shape_1"), line)],
            }],
            stops: vec![StopRecord {
                stop_id: StopIdentifier::new("s1"),
                stop_name: "Calle 100".into(),
                stop_lat: 4.68,
                stop_lon: -74.05,
                stop_code: "123A".into(),
                routes: vec![route],
                route_count: 1,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_shape_feature_properties() {
        let features = shape_features(&dataset().routes[0]);
        assert_eq!(features.len(), 1);

        let feature = &features[0];
        assert_eq!(feature.id, Some(Id::String("shape_1".into())));
        let properties = feature.properties.as_ref().unwrap();
        assert_eq!(properties["route_id"], json!("TM/1"));
        assert_eq!(properties["route_color"], json!("#E41A1C"));
    }

    #[test]
    fn test_write_dataset_round_trips_through_catalog_parsers() {
        let dir = tempfile::tempdir().unwrap();
        let stats = write_dataset(&dataset(), dir.path()).unwrap();

        assert_eq!(stats.route_files, 1);
        assert_eq!(stats.shape_features, 1);
        assert_eq!(stats.stops, 1);

        // Sanitized per-route file name
        assert!(dir.path().join("TM1.json").exists());
        assert!(dir.path().join(STOPS_GEOJSON_FILE).exists());
        assert!(dir.path().join(ROUTES_TO_STOPS_FILE).exists());

        let routes = records::parse_routes(&std::fs::read(dir.path().join(ROUTES_INDEX_FILE)).unwrap()).unwrap();
        assert_eq!(routes[0].short_name.as_ref(), "1");

        let stops = records::parse_stops(&std::fs::read(dir.path().join(STOPS_FILE)).unwrap()).unwrap();
        assert_eq!(stops[0].code.as_ref(), "123A");

        let frequencies =
            records::parse_frequencies(&std::fs::read(dir.path().join(FREQUENCIES_FILE)).unwrap()).unwrap();
        assert!(frequencies.is_empty());
    }
}
