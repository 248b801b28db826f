//! Data store failure integration tests.
//!
//! Tests verify that each store failure maps to its own status code, that
//! client errors and backend errors stay distinguishable, and that internal
//! details never reach the response body.

use std::time::Duration;

use axum::http::StatusCode;

use mvt_tile_server::error::StoreError;
use mvt_tile_server::query::TileQueryBuilder;
use mvt_tile_server::store::{ConnectionParams, PoolOptions, PostGisStore};
use mvt_tile_server::tile::TileService;
use mvt_tile_server::{create_router, RouterConfig};

use super::test_utils::{body_bytes, body_json, get, router_with, test_source, MockTileStore};

#[tokio::test]
async fn test_store_unreachable_returns_500() {
    let store = MockTileStore::failing(StoreError::Unreachable(
        "connection refused: postgres://topodata@db:5432/topodata".to_string(),
    ));
    let response = get(router_with(store), "/0/0/0.pbf").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(response).await;
    assert_eq!(error["error"], "store_unreachable");
    assert!(!error["message"].as_str().unwrap().contains("topodata"));
}

#[tokio::test]
async fn test_query_failure_returns_502() {
    let store = MockTileStore::failing(StoreError::QueryFailed {
        reason: "relation \"data.topography_object\" does not exist".to_string(),
    });
    let response = get(router_with(store), "/0/0/0.pbf").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_bytes(response).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("query_failed"));
    assert!(!text.contains("topography_object"));
    assert!(!text.contains("ST_AsMVT"));
}

#[tokio::test]
async fn test_store_busy_returns_503() {
    let store = MockTileStore::failing(StoreError::Busy { waited_ms: 5000 });
    let response = get(router_with(store), "/0/0/0.pbf").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["error"], "store_busy");
}

#[tokio::test]
async fn test_store_timeout_returns_504() {
    let store = MockTileStore::failing(StoreError::Timeout { limit_ms: 30000 });
    let response = get(router_with(store), "/0/0/0.pbf").await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let error = body_json(response).await;
    assert_eq!(error["error"], "store_timeout");
    assert_eq!(error["message"], "Tile query exceeded 30000ms");
}

#[tokio::test]
async fn test_error_response_has_no_tile_headers() {
    let store = MockTileStore::failing(StoreError::Busy { waited_ms: 1 });
    let response = get(router_with(store), "/0/0/0.pbf").await;

    assert_ne!(
        response.headers().get("content-type").unwrap(),
        "application/vnd.mapbox-vector-tile"
    );
}

#[tokio::test]
async fn test_client_error_wins_over_store_error() {
    // An invalid path is rejected before the failing store is consulted
    let store = MockTileStore::failing(StoreError::Unreachable("down".to_string()));
    let response = get(router_with(store.clone()), "/1/5/0.pbf").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.query_count(), 0);
}

#[tokio::test]
async fn test_unreachable_postgis_returns_500() {
    let params = ConnectionParams {
        host: "127.0.0.1".to_string(),
        // Nothing listens on port 1
        port: 1,
        user: "topodata".to_string(),
        password: "secret".to_string(),
        database: "topodata".to_string(),
    };
    let options = PoolOptions {
        max_connections: 2,
        acquire_timeout: Duration::from_millis(300),
        query_timeout: Duration::from_secs(1),
    };
    let store = PostGisStore::new(params, options);
    let service = TileService::new(store, TileQueryBuilder::new(test_source()));
    let router = create_router(service, RouterConfig::default().with_tracing(false));

    let response = get(router, "/0/0/0.pbf").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_bytes(response).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(!text.contains("secret"));
}
