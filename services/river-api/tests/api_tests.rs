//! Router tests driven through `tower::ServiceExt::oneshot`.
//!
//! Granule search and download are served by an in-memory fetcher, and
//! downloaded "granules" are columnar JSON decoded by `AnyPixelCloud`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use bytes::Bytes;
use granule_catalog::{CatalogError, CatalogResult, GranuleFeed, GranuleFetcher, GranuleQuery};
use pixc_reader::AnyPixelCloud;
use river_api::build_router;
use river_api::config::ApiConfig;
use river_api::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

const GRANULE_URL: &str = "https://archive.podaac.earthdata.nasa.gov/SWOT_L2_HR_PIXC_001.nc";

/// North-south reach along 3E, about 1.1 km long, in UTM zone 31N.
fn centerline() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {"type": "LineString", "coordinates": [[3.0, 45.0], [3.0, 45.01]]}
        }]
    })
}

/// Two points near the line and one ~157 m east of it.
fn point_cloud() -> Value {
    json!({
        "latitude": [45.001, 45.005, 45.005],
        "longitude": [3.0, 3.0003, 3.002],
        "height": [101.5, 102.0, 99.0],
        "water_frac": [0.95, 0.9, 0.2],
        "coherent_power": [150.0, 140.0, 20.0],
        "classification": [4, 4, 1],
        "missed_detection_rate": [0.0, 0.01, 0.3],
        "geolocation_qual": [0, 0, 8]
    })
}

#[derive(Default)]
struct FakeFetcher {
    searches: Mutex<Vec<GranuleQuery>>,
    downloads: Mutex<Vec<String>>,
}

#[async_trait]
impl GranuleFetcher for FakeFetcher {
    async fn search(&self, query: &GranuleQuery) -> CatalogResult<GranuleFeed> {
        query.validate()?;
        self.searches.lock().unwrap().push(query.clone());
        Ok(GranuleFeed::from_entries(vec![json!({
            "id": "G1",
            "links": [{"href": GRANULE_URL}]
        })]))
    }

    async fn download(&self, url: &str) -> CatalogResult<Bytes> {
        self.downloads.lock().unwrap().push(url.to_string());
        if url.ends_with("missing.nc") {
            return Err(CatalogError::Status {
                status: 404,
                url: url.to_string(),
            });
        }
        Ok(Bytes::from(point_cloud().to_string()))
    }
}

fn app_with(config: ApiConfig) -> (Router, Arc<FakeFetcher>) {
    let fetcher = Arc::new(FakeFetcher::default());
    let state = AppState::new(config, fetcher.clone(), Arc::new(AnyPixelCloud));
    (build_router(Arc::new(state)), fetcher)
}

fn app() -> (Router, Arc<FakeFetcher>) {
    let mut config = ApiConfig::default();
    config.download.allowed_hosts = vec!["archive.podaac.earthdata.nasa.gov".to_string()];
    app_with(config)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_reach_records(body: &Value) {
    assert_eq!(body["crs"], "EPSG:32631");
    assert_eq!(body["input_count"], 3);
    assert_eq!(body["clipped_count"], 2);
    assert_eq!(body["station_count"], 12);

    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0]["height"], 101.5);
    assert_eq!(records[0]["nearest_station_index"], 1);
    assert!((records[0]["cumulative_distance"].as_f64().unwrap() - 100.0).abs() < 1e-6);
    assert!(records[0]["distance_to_nearest"].as_f64().unwrap() < 15.0);

    assert_eq!(records[1]["height"], 102.0);
    assert_eq!(records[1]["nearest_station_index"], 6);
    assert!((records[1]["cumulative_distance"].as_f64().unwrap() - 600.0).abs() < 1e-6);
    let d = records[1]["distance_to_nearest"].as_f64().unwrap();
    assert!(d > 40.0 && d < 60.0, "distance_to_nearest = {}", d);
}

// ============================================================================
// POST /process
// ============================================================================

#[tokio::test]
async fn test_process_projects_points_in_corridor() {
    let (app, _) = app();
    let request = json!({
        "point_cloud": point_cloud(),
        "centerline": centerline(),
        "buffer_distance": 50.0,
        "spacing": 100.0
    });

    let response = app.oneshot(post_json("/process", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["request_id"].as_str().is_some());
    assert_reach_records(&body);
}

#[tokio::test]
async fn test_process_uses_configured_defaults() {
    let mut config = ApiConfig::default();
    config.processing.default_buffer_distance = 50.0;
    config.processing.default_spacing = 100.0;
    let (app, _) = app_with(config);
    let request = json!({"point_cloud": point_cloud(), "centerline": centerline()});

    let response = app.oneshot(post_json("/process", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_reach_records(&body_json(response).await);
}

#[tokio::test]
async fn test_process_zero_buffer_returns_no_records() {
    let (app, _) = app();
    let request = json!({
        "point_cloud": point_cloud(),
        "centerline": centerline(),
        "buffer_distance": 0.0
    });

    let response = app.oneshot(post_json("/process", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["clipped_count"], 0);
    assert_eq!(body["records"], json!([]));
}

#[tokio::test]
async fn test_process_missing_field() {
    let (app, _) = app();
    let mut cloud = point_cloud();
    cloud.as_object_mut().unwrap().remove("height");
    let request = json!({"point_cloud": cloud, "centerline": centerline()});

    let response = app.oneshot(post_json("/process", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "InputSchemaError");
    assert!(body["message"].as_str().unwrap().contains("height"));
}

#[tokio::test]
async fn test_process_length_mismatch() {
    let (app, _) = app();
    let mut cloud = point_cloud();
    cloud["coherent_power"] = json!([1.0, 2.0]);
    let request = json!({"point_cloud": cloud, "centerline": centerline()});

    let response = app.oneshot(post_json("/process", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "InputSchemaError");
    assert!(body["message"].as_str().unwrap().contains("coherent_power"));
}

#[tokio::test]
async fn test_process_malformed_body() {
    let (app, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/process")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"point_cloud\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "InputSchemaError");
}

#[tokio::test]
async fn test_process_invalid_parameter() {
    let (app, _) = app();
    let request = json!({
        "point_cloud": point_cloud(),
        "centerline": centerline(),
        "spacing": 0.0
    });

    let response = app.oneshot(post_json("/process", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "ParameterError");
}

#[tokio::test]
async fn test_process_rejects_polygon_centerline() {
    let (app, _) = app();
    let request = json!({
        "point_cloud": point_cloud(),
        "centerline": {"type": "Polygon", "coordinates": [[[3.0, 45.0], [3.1, 45.0], [3.0, 45.1], [3.0, 45.0]]]}
    });

    let response = app.oneshot(post_json("/process", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "GeometryError");
}

#[tokio::test]
async fn test_process_unresolvable_crs() {
    let (app, _) = app();
    let mut cloud = point_cloud();
    cloud["latitude"] = json!([45.001, 45.005, 400.0]);
    let request = json!({"point_cloud": cloud, "centerline": centerline()});

    let response = app.oneshot(post_json("/process", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "ProjectionError");
}

// ============================================================================
// POST /query
// ============================================================================

#[tokio::test]
async fn test_query_returns_feed() {
    let (app, fetcher) = app();
    let request = json!({
        "min_lat": 44.9, "max_lat": 45.1, "min_lng": 2.9, "max_lng": 3.1,
        "start_date": "2024-03-01T00:00:00Z", "end_date": "2024-03-02T00:00:00Z"
    });

    let response = app.oneshot(post_json("/query", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["feed"]["entry"][0]["id"], "G1");
    assert_eq!(fetcher.searches.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_query_invalid_dates() {
    let (app, fetcher) = app();
    let request = json!({
        "min_lat": 44.9, "max_lat": 45.1, "min_lng": 2.9, "max_lng": 3.1,
        "start_date": "2024-03-02T00:00:00Z", "end_date": "2024-03-01T00:00:00Z"
    });

    let response = app.oneshot(post_json("/query", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(fetcher.searches.lock().unwrap().is_empty());
}

// ============================================================================
// GET /download
// ============================================================================

#[tokio::test]
async fn test_download_without_url() {
    let (app, fetcher) = app();
    let response = app.oneshot(get("/download")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "No URL provided");
    assert!(fetcher.downloads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_download_sets_attachment_headers() {
    let (app, fetcher) = app();
    let uri = format!("/download?url={}", GRANULE_URL);
    let response = app.oneshot(get(&uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/x-netcdf"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"SWOT_data.nc\""
    );
    assert_eq!(fetcher.downloads.lock().unwrap().as_slice(), [GRANULE_URL]);
}

#[tokio::test]
async fn test_download_rejects_foreign_host() {
    let (app, fetcher) = app();
    let response = app
        .oneshot(get("/download?url=https://example.com/granule.nc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "InvalidUrl");
    assert!(fetcher.downloads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_download_rejects_non_http_scheme() {
    let (app, _) = app();
    let response = app
        .oneshot(get("/download?url=file:///etc/passwd"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_upstream_status_passes_through() {
    let (app, _) = app();
    let uri = "/download?url=https://archive.podaac.earthdata.nasa.gov/missing.nc";
    let response = app.oneshot(get(uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// POST /download-and-process
// ============================================================================

#[tokio::test]
async fn test_download_and_process() {
    let (app, fetcher) = app();
    let request = json!({
        "url": GRANULE_URL,
        "centerline": centerline(),
        "buffer_distance": 50.0,
        "spacing": 100.0
    });

    let response = app
        .oneshot(post_json("/download-and-process", &request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_reach_records(&body_json(response).await);
    assert_eq!(fetcher.downloads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_download_and_process_bad_centerline_skips_download() {
    let (app, fetcher) = app();
    let request = json!({
        "url": GRANULE_URL,
        "centerline": {"type": "FeatureCollection", "features": []}
    });

    let response = app
        .oneshot(post_json("/download-and-process", &request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(fetcher.downloads.lock().unwrap().is_empty());
}

// ============================================================================
// Health and metrics
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "river-api");
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let (app, _) = app();
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
