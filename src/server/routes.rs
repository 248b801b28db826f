//! Router configuration for the tile server.
//!
//! # Route Structure
//!
//! ```text
//! /health                      - Health check
//! /{zoom}/{x}/{y}.{format}     - Tile endpoint
//! ```
//!
//! Every other path is handed to the tile handler as well, which answers it
//! with `400 Bad Request`.
//!
//! # Example
//!
//! ```ignore
//! use mvt_tile_server::server::{create_router, RouterConfig};
//!
//! let router = create_router(tile_service, RouterConfig::default().with_cache_max_age(60));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8081").await?;
//! axum::serve(listener, router).await?;
//! ```

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, tile_handler, AppState};
use crate::store::TileStore;
use crate::tile::TileService;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Cache-Control max-age in seconds (0 = no Cache-Control header)
    pub cache_max_age: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    /// No Cache-Control header, tracing enabled.
    fn default() -> Self {
        Self {
            cache_max_age: 0,
            enable_tracing: true,
        }
    }
}

impl RouterConfig {
    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
pub fn create_router<S>(tile_service: TileService<S>, config: RouterConfig) -> Router
where
    S: TileStore + 'static,
{
    let app_state = AppState::with_cache_max_age(tile_service, config.cache_max_age);

    // The catch-all hands the raw path to the tile parser, so malformed tile
    // paths get a 400 rather than the router's 404
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/{*tile_path}", get(tile_handler::<S>))
        .with_state(app_state);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

// =============================================================================
// Tests
// =============================================================================
