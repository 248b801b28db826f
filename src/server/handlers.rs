//! HTTP request handlers for the tile API.
//!
//! # Endpoints
//!
//! - `GET /{zoom}/{x}/{y}.{format}` - Serve a vector tile
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{StoreError, TileError};
use crate::store::TileStore;
use crate::tile::{TileService, MVT_CONTENT_TYPE};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the tile service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: TileStore> {
    /// The tile service for processing tile requests
    pub tile_service: Arc<TileService<S>>,

    /// Cache-Control max-age in seconds sent with tiles (0 = no header)
    pub cache_max_age: u32,
}

impl<S: TileStore> AppState<S> {
    /// Create a new application state with the given tile service.
    pub fn new(tile_service: TileService<S>) -> Self {
        Self::with_cache_max_age(tile_service, 0)
    }

    /// Create a new application state with a Cache-Control max-age.
    pub fn with_cache_max_age(tile_service: TileService<S>, cache_max_age: u32) -> Self {
        Self {
            tile_service: Arc::new(tile_service),
            cache_max_age,
        }
    }
}

impl<S: TileStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            tile_service: Arc::clone(&self.tile_service),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "invalid_tile_path", "query_failed")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Map a pipeline error to its HTTP status, error type and client message.
///
/// Store messages stay generic: connection details and SQL are only logged.
fn error_parts(err: &TileError) -> (StatusCode, &'static str, String) {
    match err {
        TileError::InvalidTilePath { path } => (
            StatusCode::BAD_REQUEST,
            "invalid_tile_path",
            format!("Invalid tile path: {}", path),
        ),
        TileError::EmptyTile { zoom, x, y } => (
            StatusCode::NOT_FOUND,
            "empty_tile",
            format!("No features in tile {}/{}/{}", zoom, x, y),
        ),
        TileError::Store(StoreError::Unreachable(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_unreachable",
            "Cannot connect to the data store".to_string(),
        ),
        TileError::Store(StoreError::QueryFailed { .. }) => (
            StatusCode::BAD_GATEWAY,
            "query_failed",
            "Tile query failed".to_string(),
        ),
        TileError::Store(StoreError::Busy { .. }) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "store_busy",
            "All data store connections are busy".to_string(),
        ),
        TileError::Store(StoreError::Timeout { limit_ms }) => (
            StatusCode::GATEWAY_TIMEOUT,
            "store_timeout",
            format!("Tile query exceeded {}ms", limit_ms),
        ),
    }
}

/// Convert TileError to HTTP response.
///
/// This implementation logs errors appropriately based on their severity:
/// - 4xx errors are logged at WARN level (404 at DEBUG)
/// - 5xx errors are logged at ERROR level, with the full internal error
impl IntoResponse for TileError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = error_parts(&self);

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                self
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Tile not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle tile requests.
///
/// # Endpoint
///
/// `GET /{zoom}/{x}/{y}.{format}` where `format` is `pbf` or `mvt`
///
/// # Response
///
/// - `200 OK`: MVT payload (possibly empty)
/// - `400 Bad Request`: Malformed path or coordinates outside the pyramid
/// - `404 Not Found`: Empty tile, when empty tiles are reported as missing
/// - `500 Internal Server Error`: Data store unreachable
/// - `502 Bad Gateway`: Tile query failed
/// - `503 Service Unavailable`: No free data store connection
/// - `504 Gateway Timeout`: Tile query took too long
///
/// # Headers
///
/// - `Content-Type: application/vnd.mapbox-vector-tile`
/// - `Access-Control-Allow-Origin: *`
/// - `Cache-Control: public, max-age={cache_max_age}` (when configured)
pub async fn tile_handler<S: TileStore>(
    State(state): State<AppState<S>>,
    uri: Uri,
) -> Result<Response, TileError> {
    let tile = state.tile_service.get_tile(uri.path()).await?;

    let mut response = Response::new(Body::from(tile.data));
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(MVT_CONTENT_TYPE),
    );
    if state.cache_max_age > 0 {
        let cache_control = format!("public, max-age={}", state.cache_max_age);
        if let Ok(value) = HeaderValue::from_str(&cache_control) {
            headers.insert(header::CACHE_CONTROL, value);
        }
    }

    Ok(response)
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
