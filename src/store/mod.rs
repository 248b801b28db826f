//! Data store layer.
//!
//! The store executes a [`TileQuery`](crate::query::TileQuery) and hands back
//! the encoded tile exactly as the database produced it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Tile Service               │
//! └────────────────────┬────────────────────┘
//!                      │ TileQuery
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            TileStore Trait              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             PostGisStore                │
//! │  (bounded, lazily connecting PgPool)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Resource policy
//!
//! [`PostGisStore`] owns a bounded connection pool. A request checks out one
//! connection for the duration of its query. When every connection is busy the
//! request waits up to the acquire timeout and then fails with
//! [`StoreError::Busy`](crate::error::StoreError::Busy). Queries are bounded by
//! the query timeout and fail with
//! [`StoreError::Timeout`](crate::error::StoreError::Timeout).

mod postgis;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;
use crate::query::TileQuery;

pub use postgis::{
    ConnectionParams, PoolOptions, PostGisStore, DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_QUERY_TIMEOUT,
};

/// Executes tile queries against a spatial data store.
///
/// Implementations are shared between concurrent requests and must be
/// thread-safe.
#[async_trait]
pub trait TileStore: Send + Sync {
    /// Run `query` and return the single encoded tile it produces.
    ///
    /// An empty payload is a valid result: it means no feature intersected
    /// the tile.
    async fn fetch_tile(&self, query: &TileQuery) -> Result<Bytes, StoreError>;
}
