//! API integration tests for tile retrieval and request validation.
//!
//! Tests verify:
//! - Successful tile responses and their headers
//! - Malformed and out-of-range paths are rejected before any query runs
//! - Empty tiles under both policies
//! - Health endpoint

use std::time::Duration;

use axum::http::StatusCode;
use bytes::Bytes;

use mvt_tile_server::tile::{EmptyTilePolicy, TileService, MAX_ZOOM};
use mvt_tile_server::query::TileQueryBuilder;
use mvt_tile_server::{create_router, RouterConfig};

use super::test_utils::{
    body_bytes, body_json, get, router_with, router_with_policy, test_source, MockBehavior,
    MockTileStore,
};

const TILE: &[u8] = b"\x1a\x0b\x0a\x05layer\x28\x80\x20\x78\x02";

// =============================================================================
// Tile Retrieval
// =============================================================================

#[tokio::test]
async fn test_tile_retrieval_success() {
    let store = MockTileStore::with_tile(TILE);
    let response = get(router_with(store.clone()), "/0/0/0.pbf").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/vnd.mapbox-vector-tile"
    );
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    assert!(!response.headers().contains_key("cache-control"));

    // Payload is passed through byte for byte
    let body = body_bytes(response).await;
    assert_eq!(body, Bytes::from_static(TILE));
    assert_eq!(store.query_count(), 1);
}

#[tokio::test]
async fn test_mvt_extension_accepted() {
    let store = MockTileStore::with_tile(TILE);
    let response = get(router_with(store), "/1/1/0.mvt").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_deep_tile_retrieval() {
    let store = MockTileStore::with_tile(TILE);
    let response = get(router_with(store.clone()), "/14/8191/16383.pbf").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.query_count(), 1);
}

#[tokio::test]
async fn test_query_string_ignored() {
    let store = MockTileStore::with_tile(TILE);
    let response = get(router_with(store), "/2/1/1.pbf?v=3").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cache_control_when_configured() {
    let store = MockTileStore::with_tile(TILE);
    let service = TileService::new(store, TileQueryBuilder::new(test_source()));
    let router = create_router(service, RouterConfig::default().with_cache_max_age(600));

    let response = get(router, "/0/0/0.pbf").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=600"
    );
}

// =============================================================================
// Invalid Requests
// =============================================================================

#[tokio::test]
async fn test_malformed_path_rejected() {
    let store = MockTileStore::with_tile(TILE);
    let response = get(router_with(store.clone()), "/abc/def.pbf").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert_eq!(error["error"], "invalid_tile_path");
    assert_eq!(error["message"], "Invalid tile path: /abc/def.pbf");
    assert_eq!(error["status"], 400);
    assert_eq!(store.query_count(), 0);
}

#[tokio::test]
async fn test_out_of_range_tile_rejected() {
    let store = MockTileStore::with_tile(TILE);
    let response = get(router_with(store.clone()), "/1/5/0.pbf").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert_eq!(error["message"], "Invalid tile path: /1/5/0.pbf");
    assert_eq!(store.query_count(), 0);
}

#[tokio::test]
async fn test_invalid_paths_never_query() {
    let store = MockTileStore::with_tile(TILE);
    let router = router_with(store.clone());

    for uri in [
        "/0/1/0.pbf",
        "/0/0/1.pbf",
        "/3/8/0.mvt",
        "/3/0/8.mvt",
        "/1/0/0.png",
        "/1/0/0",
        "/1/0.pbf",
        "/tiles/1/0/0.pbf",
        "/1/-1/0.pbf",
        "/32/0/0.pbf",
        "/60/0/0.pbf",
    ] {
        let response = get(router.clone(), uri).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "expected 400 for {}",
            uri
        );
    }
    assert_eq!(store.query_count(), 0);
}

#[tokio::test]
async fn test_deepest_zoom_served() {
    let store = MockTileStore::with_tile(TILE);
    let last = (1i64 << MAX_ZOOM) - 1;
    let uri = format!("/{}/{}/{}.pbf", MAX_ZOOM, last, last);
    let response = get(router_with(store.clone()), &uri).await;

    assert_eq!(response.status(), StatusCode::OK);
    let params = store.queries()[0].params;
    assert!(params.xmin < params.xmax);
    assert!(params.ymin < params.ymax);
    assert!(params.segment_length > 0.0);
}

#[tokio::test]
async fn test_non_get_method_rejected() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let store = MockTileStore::with_tile(TILE);
    let request = Request::builder()
        .method("POST")
        .uri("/0/0/0.pbf")
        .body(Body::empty())
        .unwrap();
    let response = router_with(store.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(store.query_count(), 0);
}

// =============================================================================
// Empty Tiles
// =============================================================================

#[tokio::test]
async fn test_empty_tile_served_as_ok() {
    let store = MockTileStore::with_tile(b"");
    let response = get(router_with(store), "/5/3/4.pbf").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/vnd.mapbox-vector-tile"
    );
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_empty_tile_not_found_policy() {
    let store = MockTileStore::with_tile(b"");
    let router = router_with_policy(store.clone(), EmptyTilePolicy::NotFound);
    let response = get(router, "/5/3/4.pbf").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = body_json(response).await;
    assert_eq!(error["error"], "empty_tile");
    assert_eq!(error["message"], "No features in tile 5/3/4");
    assert_eq!(store.query_count(), 1);
}

#[tokio::test]
async fn test_not_found_policy_serves_features() {
    let store = MockTileStore::with_tile(TILE);
    let router = router_with_policy(store, EmptyTilePolicy::NotFound);
    let response = get(router, "/5/3/4.pbf").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_concurrent_requests_share_store() {
    let store = MockTileStore::new(MockBehavior::Slow(
        Duration::from_millis(50),
        Bytes::from_static(TILE),
    ));
    let router = router_with(store.clone());

    let handles: Vec<_> = (0..8)
        .map(|x| {
            let router = router.clone();
            tokio::spawn(async move { get(router, &format!("/3/{}/0.pbf", x)).await.status() })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(store.query_count(), 8);
    // Each fetch sleeps, so sequential handling would never exceed one
    assert!(store.max_in_flight() > 1, "fetches did not overlap");
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let store = MockTileStore::with_tile(TILE);
    let response = get(router_with(store.clone()), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(store.query_count(), 0);
}
