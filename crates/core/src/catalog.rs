//! Async loading of the static dataset.
//!
//! Catalog failures never abort startup: whatever fails to load is replaced
//! by an empty collection and reported once in [`CatalogLoad::errors`].

use std::collections::HashMap;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use geo::{Coord, LineString};
use geojson::GeoJson;
use sitp_transit::models::records::{self, FREQUENCIES_FILE, ROUTES_INDEX_FILE, STOPS_FILE};
use sitp_transit::{
    DataFetcher, FrequencyProfile, RouteIdentifier, RouteMeta, StaticCatalog, Stop, TransitError,
};
use tracing::{debug, info, warn};

use crate::error::{CatalogLoadError, CatalogResource, GeometryFetchError};

/// [`DataFetcher`] over HTTP
#[derive(Clone, Debug, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl DataFetcher for ReqwestFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, sitp_transit::Result<Vec<u8>>> {
        async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|err| TransitError::Network(format!("request to {url} failed: {err}")))?;

            if !response.status().is_success() {
                return Err(TransitError::Network(format!("{url} responded with {}", response.status())));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|err| TransitError::Network(format!("failed to read {url}: {err}")))?;
            Ok(bytes.to_vec())
        }
        .boxed()
    }
}

/// Result of loading all three catalogs
pub struct CatalogLoad {
    pub catalog: StaticCatalog,
    pub errors: Vec<CatalogLoadError>,
}

impl CatalogLoad {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Fetches dataset files relative to a base path
pub struct CatalogClient<F: DataFetcher> {
    fetcher: F,
    base_path: String,
}

impl<F: DataFetcher> CatalogClient<F> {
    pub fn new(fetcher: F, base_path: impl Into<String>) -> Self {
        let mut base_path = base_path.into();
        if !base_path.is_empty() && !base_path.ends_with('/') {
            base_path.push('/');
        }
        Self { fetcher, base_path }
    }

    pub fn url_for(&self, file: &str) -> String {
        format!("{}{}", self.base_path, file)
    }

    pub async fn fetch_routes(&self) -> sitp_transit::Result<Vec<RouteMeta>> {
        let bytes = self.fetcher.fetch(&self.url_for(ROUTES_INDEX_FILE)).await?;
        records::parse_routes(&bytes)
    }

    pub async fn fetch_stops(&self) -> sitp_transit::Result<Vec<Stop>> {
        let bytes = self.fetcher.fetch(&self.url_for(STOPS_FILE)).await?;
        records::parse_stops(&bytes)
    }

    pub async fn fetch_frequencies(&self) -> sitp_transit::Result<HashMap<RouteIdentifier, FrequencyProfile>> {
        let bytes = self.fetcher.fetch(&self.url_for(FREQUENCIES_FILE)).await?;
        records::parse_frequencies(&bytes)
    }

    /// Shapes of one route from its per-route file
    pub async fn fetch_route_geometry(
        &self,
        route_id: &RouteIdentifier,
    ) -> Result<Vec<LineString>, GeometryFetchError> {
        let url = self.url_for(&records::route_geometry_file(route_id));
        let result = match self.fetcher.fetch(&url).await {
            Ok(bytes) => parse_route_geometry(&bytes),
            Err(err) => Err(err),
        };

        result.map_err(|source| GeometryFetchError {
            route_id: route_id.clone(),
            source,
        })
    }

    /// Fetch routes, stops and frequencies concurrently
    pub async fn load_catalog(&self) -> CatalogLoad {
        let (routes, stops, frequencies) =
            tokio::join!(self.fetch_routes(), self.fetch_stops(), self.fetch_frequencies());

        let mut errors = Vec::new();
        let routes = degrade(routes, CatalogResource::Routes, &mut errors);
        let stops = degrade(stops, CatalogResource::Stops, &mut errors);
        let frequencies = degrade(frequencies, CatalogResource::Frequencies, &mut errors);

        info!(
            "loaded catalog: {} routes, {} stops, {} frequency profiles ({} failed)",
            routes.len(),
            stops.len(),
            frequencies.len(),
            errors.len()
        );

        CatalogLoad {
            catalog: StaticCatalog::from_data(routes, stops, frequencies),
            errors,
        }
    }
}

fn degrade<T: Default>(
    result: sitp_transit::Result<T>,
    resource: CatalogResource,
    errors: &mut Vec<CatalogLoadError>,
) -> T {
    result.unwrap_or_else(|source| {
        let err = CatalogLoadError { resource, source };
        warn!("{err}");
        errors.push(err);
        T::default()
    })
}

/// Line geometries of a GeoJSON document
///
/// Features whose geometry is neither a LineString nor a MultiLineString are skipped.
pub fn parse_route_geometry(bytes: &[u8]) -> sitp_transit::Result<Vec<LineString>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| TransitError::SerializationError(format!("route geometry is not UTF-8: {err}")))?;
    let geojson: GeoJson = text
        .parse()
        .map_err(|err: geojson::Error| TransitError::SerializationError(err.to_string()))?;

    let geometries: Vec<geojson::Geometry> = match geojson {
        GeoJson::FeatureCollection(collection) => {
            collection.features.into_iter().filter_map(|f| f.geometry).collect()
        }
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::Geometry(geometry) => vec![geometry],
    };

    let mut lines = Vec::new();
    for geometry in geometries {
        match geometry.value {
            geojson::Value::LineString(positions) => lines.push(to_line_string(&positions)),
            geojson::Value::MultiLineString(parts) => {
                lines.extend(parts.iter().map(|positions| to_line_string(positions)))
            }
            _ => debug!("skipping non-line geometry in route file"),
        }
    }

    Ok(lines)
}

fn to_line_string(positions: &[Vec<f64>]) -> LineString {
    positions
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitp_transit::CatalogProvider;

    #[derive(Default)]
    struct MapFetcher {
        files: HashMap<String, Vec<u8>>,
    }

    impl MapFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.files.insert(url.to_string(), body.as_bytes().to_vec());
            self
        }
    }

    impl DataFetcher for MapFetcher {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, sitp_transit::Result<Vec<u8>>> {
            let result = self
                .files
                .get(url)
                .cloned()
                .ok_or_else(|| TransitError::Network(format!("404 {url}")));
            async move { result }.boxed()
        }
    }

    const ROUTES: &str = r#"[
        {"route_id": "TM-1", "route_short_name": "1", "route_long_name": "Portal Norte", "route_color": "E41A1C", "route_text_color": "FFFFFF"},
        {"route_id": "K23", "route_short_name": "K23", "route_long_name": "Suba"}
    ]"#;

    const STOPS: &str = r#"[
        {"stop_id": "s1", "stop_name": "Calle 100", "stop_lat": 4.68, "stop_lon": -74.05, "stop_code": "123a",
         "routes": [{"route_id": "TM-1", "route_short_name": "1", "route_long_name": "Portal Norte"}], "route_count": 1}
    ]"#;

    const GEOMETRY: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"route_id": "TM-1"},
         "geometry": {"type": "LineString", "coordinates": [[-74.1, 4.6], [-74.0, 4.7]]}},
        {"type": "Feature", "properties": {"route_id": "TM-1"},
         "geometry": {"type": "MultiLineString", "coordinates": [[[-74.2, 4.5], [-74.1, 4.6]], [[-74.0, 4.7], [-73.9, 4.8]]]}},
        {"type": "Feature", "properties": {},
         "geometry": {"type": "Point", "coordinates": [-74.0, 4.7]}}
    ]}"#;

    #[test]
    fn test_url_for_adds_separator() {
        let client = CatalogClient::new(MapFetcher::default(), "routes_data");
        assert_eq!(client.url_for("routes_index.json"), "routes_data/routes_index.json");

        let client = CatalogClient::new(MapFetcher::default(), "https://map.test/data/");
        assert_eq!(client.url_for("a.json"), "https://map.test/data/a.json");
    }

    #[test]
    fn test_parse_route_geometry() {
        let lines = parse_route_geometry(GEOMETRY.as_bytes()).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].0[1], Coord { x: -74.0, y: 4.7 });

        assert!(parse_route_geometry(b"not json").is_err());
    }

    #[tokio::test]
    async fn test_load_catalog() {
        let fetcher = MapFetcher::default()
            .with("routes_data/routes_index.json", ROUTES)
            .with("routes_data/stops_with_routes.json", STOPS)
            .with("routes_data/route_frequencies.json", "{}");
        let client = CatalogClient::new(fetcher, "routes_data/");

        let load = client.load_catalog().await;
        assert!(load.is_complete());
        assert_eq!(load.catalog.all_routes().len(), 2);
        let stop = load.catalog.stop_by_code("123A").unwrap();
        assert_eq!(load.catalog.routes_serving(&stop)[0].short_name.as_ref(), "1");
    }

    #[tokio::test]
    async fn test_load_catalog_degrades_per_resource() {
        let fetcher = MapFetcher::default()
            .with("routes_data/routes_index.json", ROUTES)
            .with("routes_data/stops_with_routes.json", "{ broken");
        let client = CatalogClient::new(fetcher, "routes_data/");

        let load = client.load_catalog().await;
        assert_eq!(load.catalog.all_routes().len(), 2);
        assert!(load.catalog.all_stops().is_empty());

        let failed: Vec<CatalogResource> = load.errors.iter().map(|e| e.resource).collect();
        assert_eq!(failed, vec![CatalogResource::Stops, CatalogResource::Frequencies]);
    }

    #[tokio::test]
    async fn test_fetch_route_geometry_uses_sanitized_name() {
        let fetcher = MapFetcher::default().with("routes_data/TM-1.json", GEOMETRY);
        let client = CatalogClient::new(fetcher, "routes_data/");

        let lines = client.fetch_route_geometry(&RouteIdentifier::new("TM-1")).await.unwrap();
        assert_eq!(lines.len(), 3);

        let err = client
            .fetch_route_geometry(&RouteIdentifier::new("TM/2"))
            .await
            .unwrap_err();
        assert_eq!(err.route_id, RouteIdentifier::new("TM/2"));
        assert!(matches!(err.source, TransitError::Network(_)));
    }
}
