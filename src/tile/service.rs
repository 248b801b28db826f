//! Tile Service for orchestrating tile requests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         TileService                             │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                    get_tile()                           │    │
//! │  │  1. Parse path        4. Build query                    │    │
//! │  │  2. Validate tile     5. Fetch from store               │    │
//! │  │  3. Project envelope  6. Apply empty-tile policy        │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │           │                    │                    │           │
//! │           ▼                    ▼                    ▼           │
//! │    ┌────────────┐    ┌──────────────────┐    ┌─────────────┐    │
//! │    │  TileGrid  │    │ TileQueryBuilder │    │  TileStore  │    │
//! │    └────────────┘    └──────────────────┘    └─────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage before the store is pure and synchronous; the store round trip
//! is the only await point.

use std::sync::Arc;

use bytes::Bytes;
use clap::ValueEnum;
use tracing::debug;

use crate::error::TileError;
use crate::query::{TileQuery, TileQueryBuilder};
use crate::store::TileStore;

use super::coord::{validate_tile, TileCoordinate};
use super::envelope::Envelope;

// =============================================================================
// Empty Tile Policy
// =============================================================================

/// What to answer when no feature intersects the requested tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EmptyTilePolicy {
    /// Return the empty tile with status 200
    #[default]
    Serve,

    /// Report the tile as missing (404)
    NotFound,
}

// =============================================================================
// Tile Response
// =============================================================================

/// A rendered tile together with the coordinates that produced it.
#[derive(Debug, Clone)]
pub struct TileResponse {
    /// The validated tile coordinate
    pub tile: TileCoordinate,

    /// The tile's envelope in grid coordinates
    pub envelope: Envelope,

    /// Encoded MVT payload, exactly as returned by the store
    pub data: Bytes,
}

// =============================================================================
// Tile Service
// =============================================================================

/// Service that turns request paths into encoded tiles.
///
/// # Type Parameters
///
/// * `S` - The data store the queries run against
///
/// # Example
///
/// ```ignore
/// use mvt_tile_server::query::{SourceTable, TileQueryBuilder};
/// use mvt_tile_server::tile::TileService;
///
/// let source = SourceTable::new("data.roads", 28992, "geom", "id, name")?;
/// let service = TileService::new(store, TileQueryBuilder::new(source));
///
/// let response = service.get_tile("/3/4/2.pbf").await?;
/// println!("{} bytes", response.data.len());
/// ```
pub struct TileService<S: TileStore> {
    store: Arc<S>,
    builder: TileQueryBuilder,
    empty_tiles: EmptyTilePolicy,
}

impl<S: TileStore> TileService<S> {
    /// Create a service that serves empty tiles as-is.
    pub fn new(store: S, builder: TileQueryBuilder) -> Self {
        Self::with_shared_store(Arc::new(store), builder)
    }

    /// Create a service over a store that is shared with other components.
    pub fn with_shared_store(store: Arc<S>, builder: TileQueryBuilder) -> Self {
        Self {
            store,
            builder,
            empty_tiles: EmptyTilePolicy::default(),
        }
    }

    /// Set how tiles without features are answered.
    pub fn with_empty_tile_policy(mut self, policy: EmptyTilePolicy) -> Self {
        self.empty_tiles = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn builder(&self) -> &TileQueryBuilder {
        &self.builder
    }

    pub fn empty_tile_policy(&self) -> EmptyTilePolicy {
        self.empty_tiles
    }

    /// Resolve a request path to a tile query without running it.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::InvalidTilePath`] if the path is not a tile path
    /// or the coordinate lies outside the pyramid.
    pub fn plan(&self, path: &str) -> Result<(TileCoordinate, Envelope, TileQuery), TileError> {
        let tile = validate_tile(path)?;
        let envelope = self.builder.grid().envelope(&tile);
        let query = self.builder.build(&envelope);
        Ok((tile, envelope, query))
    }

    /// Get the tile addressed by a request path such as `/3/4/2.pbf`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path is malformed or the coordinate is out of range
    /// - The store cannot be reached, is busy, or times out
    /// - The query fails
    /// - The tile is empty and the policy is [`EmptyTilePolicy::NotFound`]
    pub async fn get_tile(&self, path: &str) -> Result<TileResponse, TileError> {
        let (tile, envelope, query) = self.plan(path)?;

        debug!(path, tile = %tile, envelope = ?envelope, "Resolved tile");
        debug!(sql = %query, "Tile query");

        let data = self.store.fetch_tile(&query).await?;

        if data.is_empty() && self.empty_tiles == EmptyTilePolicy::NotFound {
            return Err(TileError::EmptyTile {
                zoom: tile.zoom,
                x: tile.x,
                y: tile.y,
            });
        }

        Ok(TileResponse {
            tile,
            envelope,
            data,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
