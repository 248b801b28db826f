//! Query construction for the spatial data store.
//!
//! Turns a tile envelope and the configured [`SourceTable`] into a
//! [`TileQuery`] that asks PostGIS to clip, reproject and encode the matching
//! features as a single MVT blob. Nothing here talks to the database.

mod builder;
mod source;

pub use builder::{segment_length, TileQuery, TileQueryBuilder, TileQueryParams, DENSIFY_FACTOR};
pub use source::{Identifier, SourceTable};
