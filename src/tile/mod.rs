//! Tile addressing and the tile request pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │ request path
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              Tile Service               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │TileCoordinate│  │    TileGrid     │  │
//! │  │ (parse and   │  │  (tile → bbox   │  │
//! │  │  validate)   │  │   projection)   │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │ TileQuery
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               TileStore                 │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileCoordinate`]: `(zoom, x, y, format)` parsed from `/{z}/{x}/{y}.{format}`
//! - [`is_valid_tile`]: checks format and that `x`/`y` lie in `[0, 2^zoom)`
//! - [`TileGrid`] / [`Envelope`]: projection of a tile onto the RD New grid
//! - [`TileService`]: runs the whole pipeline for one request
//!
//! # Example
//!
//! ```
//! use mvt_tile_server::tile::{is_valid_tile, Envelope, TileCoordinate};
//!
//! let tile = TileCoordinate::from_path("/0/0/0.pbf");
//! assert!(is_valid_tile(tile.as_ref()));
//!
//! let env = Envelope::from_tile(&tile.unwrap());
//! assert_eq!(env.xmin, -285401.92);
//! assert_eq!(env.ymax, 903401.92);
//! ```

mod coord;
mod envelope;
mod service;

pub use coord::{
    is_accepted_format, is_valid_tile, tiles_per_axis, validate_tile, TileCoordinate,
    ACCEPTED_FORMATS, MAX_ZOOM,
};
pub use envelope::{Envelope, TileGrid, RD_NEW_GRID, RD_NEW_SRID};
pub use service::{EmptyTilePolicy, TileResponse, TileService};

/// MIME type of Mapbox Vector Tiles.
pub const MVT_CONTENT_TYPE: &str = "application/vnd.mapbox-vector-tile";
