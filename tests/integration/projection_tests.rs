//! Projection integration tests.
//!
//! Tests verify the envelope that reaches the data store for a request path,
//! through the full HTTP stack.

use axum::http::StatusCode;

use mvt_tile_server::query::TileQueryParams;

use super::test_utils::{get, router_with, MockTileStore};

const EPSILON: f64 = 1e-6;

async fn params_for(uri: &str) -> TileQueryParams {
    let store = MockTileStore::with_tile(b"tile");
    let response = get(router_with(store.clone()), uri).await;
    assert_eq!(response.status(), StatusCode::OK, "request for {}", uri);

    let queries = store.queries();
    assert_eq!(queries.len(), 1);
    queries[0].params
}

#[tokio::test]
async fn test_world_tile_envelope() {
    let params = params_for("/0/0/0.pbf").await;
    assert_eq!(params.xmin, -285401.92);
    assert_eq!(params.xmax, 595401.92);
    assert_eq!(params.ymin, 22598.08);
    assert_eq!(params.ymax, 903401.92);
    assert_eq!(params.source_srid, 28992);
}

#[tokio::test]
async fn test_zoom_one_tile_envelope() {
    // Tile width at zoom 1 is 440401.92; column 1 is the east half and
    // row 0 the south half
    let params = params_for("/1/1/0.mvt").await;
    assert!((params.xmin - 155000.0).abs() < EPSILON);
    assert_eq!(params.xmax, 595401.92);
    assert_eq!(params.ymin, 22598.08);
    assert!((params.ymax - 463000.0).abs() < EPSILON);
    assert!((params.segment_length - 440401.92 / 4.0).abs() < EPSILON);
}

#[tokio::test]
async fn test_rows_count_upward() {
    let bottom = params_for("/2/0/0.pbf").await;
    let above = params_for("/2/0/1.pbf").await;

    assert_eq!(bottom.ymin, 22598.08);
    assert!(above.ymin > bottom.ymin);
    assert_eq!(above.ymin, bottom.ymax);
}

#[tokio::test]
async fn test_top_row_reaches_north_edge() {
    let params = params_for("/2/1/3.pbf").await;
    assert!((params.xmin - -65200.96).abs() < EPSILON);
    assert!((params.ymin - 683200.96).abs() < EPSILON);
    assert_eq!(params.ymax, 903401.92);
}

#[tokio::test]
async fn test_columns_count_rightward() {
    let left = params_for("/2/0/0.pbf").await;
    let right = params_for("/2/1/0.pbf").await;

    assert!(right.xmin > left.xmin);
    assert_eq!(right.xmin, left.xmax);
}

#[tokio::test]
async fn test_formats_produce_same_query() {
    let pbf = params_for("/6/20/40.pbf").await;
    let mvt = params_for("/6/20/40.mvt").await;
    assert_eq!(pbf, mvt);
}

#[tokio::test]
async fn test_query_text_for_request() {
    let store = MockTileStore::with_tile(b"tile");
    get(router_with(store.clone()), "/3/2/5.pbf").await;

    let sql = &store.queries()[0].sql;
    assert!(sql.contains("FROM \"data\".\"topography_object\" t, bounds"));
    assert!(sql.contains("ST_Intersects(t.\"geometry\", ST_Transform(bounds.geom, $6::int4))"));
    assert!(sql.contains("t.\"id\""));
    assert!(sql.contains("t.\"level\""));
    assert!(sql.contains("ST_AsMVT(mvtgeom.*)"));
}
