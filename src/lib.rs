//! # MVT Tile Server
//!
//! A Mapbox Vector Tile server backed by PostGIS.
//!
//! Each request for `/{zoom}/{x}/{y}.{pbf|mvt}` is mapped onto a fixed tile
//! grid in Amersfoort / RD New (EPSG:28992). The tile's envelope is turned
//! into a single PostGIS query that selects the intersecting features of one
//! table, clips them to the tile and encodes them with `ST_AsMVT`. The
//! resulting blob is streamed back unchanged.
//!
//! ## Architecture
//!
//! - [`tile`] - Tile path parsing, validation, envelope projection and the request pipeline
//! - [`query`] - Source table description and tile query construction
//! - [`store`] - Data store trait and the pooled PostGIS implementation
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use mvt_tile_server::{
//!     create_router, ConnectionParams, PoolOptions, PostGisStore, RouterConfig, SourceTable,
//!     TileQueryBuilder, TileService,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = SourceTable::new("data.topography_object", 28992, "geometry", "id, level")?;
//!     let store = PostGisStore::new(
//!         ConnectionParams {
//!             host: "localhost".to_string(),
//!             port: 5432,
//!             user: "topodata".to_string(),
//!             password: "secret".to_string(),
//!             database: "topodata".to_string(),
//!         },
//!         PoolOptions::default(),
//!     );
//!
//!     let service = TileService::new(store, TileQueryBuilder::new(source));
//!     let router = create_router(service, RouterConfig::default());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8081").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod query;
pub mod server;
pub mod store;
pub mod tile;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, DatabaseConfig, ServeConfig, SourceConfig};
pub use error::{ConfigError, StoreError, TileError};
pub use query::{Identifier, SourceTable, TileQuery, TileQueryBuilder, TileQueryParams};
pub use server::{
    create_router, health_handler, tile_handler, AppState, ErrorResponse, HealthResponse,
    RouterConfig,
};
pub use store::{ConnectionParams, PoolOptions, PostGisStore, TileStore};
pub use tile::{
    is_valid_tile, validate_tile, EmptyTilePolicy, Envelope, TileCoordinate, TileGrid,
    TileResponse, TileService, MVT_CONTENT_TYPE,
};
