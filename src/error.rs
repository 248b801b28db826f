use thiserror::Error;

/// Errors raised while talking to the spatial data store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No connection to the store could be established
    #[error("Store unreachable: {0}")]
    Unreachable(String),

    /// Every pooled connection stayed checked out past the acquire timeout
    #[error("Store busy: no connection available after {waited_ms}ms")]
    Busy { waited_ms: u64 },

    /// The query ran longer than the configured limit
    #[error("Store timeout: query exceeded {limit_ms}ms")]
    Timeout { limit_ms: u64 },

    /// The query was submitted but failed or produced no row
    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },
}

/// Errors produced by the tile request pipeline
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Path is not `/{z}/{x}/{y}.{format}` or the coordinate is impossible
    #[error("Invalid tile path: {path}")]
    InvalidTilePath { path: String },

    /// The store returned an empty tile and empty tiles are reported as missing
    #[error("No features in tile {zoom}/{x}/{y}")]
    EmptyTile { zoom: i32, x: i64, y: i64 },

    /// Error from the data store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Invalid startup configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A table or column name cannot be used as an SQL identifier
    #[error("Invalid identifier '{value}' for {field}")]
    InvalidIdentifier { field: &'static str, value: String },

    /// A required option was left empty
    #[error("Missing value for {0}")]
    Missing(&'static str),

    /// A numeric option is out of its accepted range
    #[error("Invalid value for {field}: {message}")]
    OutOfRange {
        field: &'static str,
        message: String,
    },
}
