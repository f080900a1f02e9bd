use anyhow::{bail, Context, Result};
use geojson::{GeoJson, Value};
use sitp_transit::models::records::{
    FREQUENCIES_FILE, ROUTES_INDEX_FILE, ROUTES_TO_STOPS_FILE, STOPS_FILE,
};
use std::path::{Path, PathBuf};

/// Dataset files that share the `.json` extension but are not route shapes
const INDEX_FILES: [&str; 4] = [ROUTES_INDEX_FILE, STOPS_FILE, ROUTES_TO_STOPS_FILE, FREQUENCIES_FILE];

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub files_checked: usize,
    pub features_checked: usize,
    pub empty_files: Vec<PathBuf>,
    pub problems: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Every per-route `.json` file in `dir`, sorted by name
pub fn route_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(".json") && !INDEX_FILES.contains(&name) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Check one route file; returns the number of features, or the problems found
fn check_route_file(path: &Path) -> Result<std::result::Result<usize, Vec<String>>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path.display();

    let collection = match text.parse::<GeoJson>() {
        Ok(GeoJson::FeatureCollection(collection)) => collection,
        Ok(_) => return Ok(Err(vec![format!("{name}: not a FeatureCollection")])),
        Err(err) => return Ok(Err(vec![format!("{name}: invalid GeoJSON: {err}")])),
    };

    let mut problems = Vec::new();
    for (index, feature) in collection.features.iter().enumerate() {
        if !feature.contains_property("route_id") {
            problems.push(format!("{name}: feature {index} has no route_id"));
        }

        match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::LineString(_)) | Some(Value::MultiLineString(_)) => {}
            Some(other) => problems.push(format!(
                "{name}: feature {index} has unexpected geometry {}",
                geometry_type(other)
            )),
            None => problems.push(format!("{name}: feature {index} has no geometry")),
        }
    }

    if problems.is_empty() {
        Ok(Ok(collection.features.len()))
    } else {
        Ok(Err(problems))
    }
}

pub fn validate_dir(dir: &Path) -> Result<ValidationReport> {
    if !dir.is_dir() {
        bail!("Dataset directory does not exist: {}", dir.display());
    }

    let files = route_files(dir)?;
    if files.is_empty() {
        bail!("No route files found in {}", dir.display());
    }
    log::info!("Found {} route files", files.len());

    let mut report = ValidationReport::default();
    for path in files {
        report.files_checked += 1;
        match check_route_file(&path)? {
            Ok(0) => {
                log::warn!("  {} has no features", path.display());
                report.empty_files.push(path);
            }
            Ok(count) => {
                log::debug!("  {} ok ({} features)", path.display(), count);
                report.features_checked += count;
            }
            Err(problems) => report.problems.extend(problems),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    const GOOD: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "id": "shape_1", "properties": {"route_id": "TM-1"},
         "geometry": {"type": "LineString", "coordinates": [[-74.1, 4.6], [-74.0, 4.7]]}}
    ]}"#;

    #[test]
    fn test_valid_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "TM-1.json", GOOD);
        write(dir.path(), "routes_index.json", "[]");
        write(dir.path(), "route_frequencies.json", "{}");

        let report = validate_dir(dir.path()).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.files_checked, 1);
        assert_eq!(report.features_checked, 1);
    }

    #[test]
    fn test_reports_bad_features() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "TM-1.json", GOOD);
        write(
            dir.path(),
            "K23.json",
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [-74.1, 4.6]}}
            ]}"#,
        );
        write(dir.path(), "B74.json", r#"{"type": "Point", "coordinates": [-74.1, 4.6]}"#);

        let report = validate_dir(dir.path()).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.files_checked, 3);
        assert_eq!(report.problems.len(), 3);
        assert!(report.problems[0].contains("not a FeatureCollection"));
    }

    #[test]
    fn test_empty_route_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "TM-9.json", r#"{"type": "FeatureCollection", "features": []}"#);

        let report = validate_dir(dir.path()).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.empty_files.len(), 1);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_dir(&dir.path().join("nope")).is_err());
        assert!(validate_dir(dir.path()).is_err());
    }
}
