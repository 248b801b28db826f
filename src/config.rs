//! Configuration management for the MVT tile server.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `MVT_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use mvt_tile_server::config::{Cli, Command};
//!
//! match Cli::parse().into_command() {
//!     Command::Serve(config) => println!("Listening on {}", config.bind_address()),
//!     Command::Check(config) => println!("Checking {}", config.database.connection_params()),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `MVT_HOST` - Server bind address (default: 0.0.0.0)
//! - `MVT_PORT` - Server port (default: 8081)
//! - `MVT_DB_HOST` / `MVT_DB_PORT` - PostgreSQL server (default: localhost:5432)
//! - `MVT_DB_USER` / `MVT_DB_PASSWORD` / `MVT_DB_NAME` - Credentials and database
//! - `MVT_TABLE` - Source table, optionally schema-qualified (required)
//! - `MVT_SRID` - SRID of the stored geometry (required)
//! - `MVT_GEOM_COLUMN` - Geometry column (default: geometry)
//! - `MVT_ATTR_COLUMNS` - Comma-separated attribute columns (default: none)
//! - `MVT_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `MVT_ACQUIRE_TIMEOUT_SECS` - Wait for a free connection (default: 5)
//! - `MVT_QUERY_TIMEOUT_SECS` - Limit per tile query (default: 30)
//! - `MVT_EMPTY_TILES` - `serve` or `not-found` (default: serve)
//! - `MVT_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 0, no header)

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::error::ConfigError;
use crate::query::SourceTable;
use crate::store::{ConnectionParams, PoolOptions, DEFAULT_MAX_CONNECTIONS};
use crate::tile::EmptyTilePolicy;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8081;

/// Default PostgreSQL host.
pub const DEFAULT_DB_HOST: &str = "localhost";

/// Default PostgreSQL port.
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Default geometry column name.
pub const DEFAULT_GEOM_COLUMN: &str = "geometry";

/// Default seconds to wait for a pooled connection.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Default seconds a tile query may run.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// CLI Arguments
// =============================================================================

/// MVT Tile Server - Mapbox Vector Tiles straight from PostGIS.
#[derive(Parser, Debug, Clone)]
#[command(name = "mvt-tile-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the tile server
    Serve(ServeConfig),

    /// Verify database connectivity and the source table, then exit
    Check(CheckConfig),
}

// =============================================================================
// Shared Sections
// =============================================================================

/// PostgreSQL connection options.
#[derive(Args, Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL host.
    #[arg(long, default_value = DEFAULT_DB_HOST, env = "MVT_DB_HOST")]
    pub db_host: String,

    /// PostgreSQL port.
    #[arg(long, default_value_t = DEFAULT_DB_PORT, env = "MVT_DB_PORT")]
    pub db_port: u16,

    /// Database user.
    #[arg(long, env = "MVT_DB_USER")]
    pub db_user: String,

    /// Database password.
    #[arg(long, default_value = "", env = "MVT_DB_PASSWORD", hide_env_values = true)]
    pub db_password: String,

    /// Database name.
    #[arg(long, env = "MVT_DB_NAME")]
    pub db_name: String,
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_host.trim().is_empty() {
            return Err(ConfigError::Missing("db_host"));
        }
        if self.db_user.trim().is_empty() {
            return Err(ConfigError::Missing("db_user"));
        }
        if self.db_name.trim().is_empty() {
            return Err(ConfigError::Missing("db_name"));
        }
        Ok(())
    }

    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
        }
    }
}

/// The table that tiles are rendered from.
#[derive(Args, Debug, Clone)]
pub struct SourceConfig {
    /// Source table, optionally schema-qualified (e.g. data.roads).
    #[arg(long, env = "MVT_TABLE")]
    pub table: String,

    /// SRID of the stored geometry.
    #[arg(long, env = "MVT_SRID")]
    pub srid: i32,

    /// Geometry column.
    #[arg(long, default_value = DEFAULT_GEOM_COLUMN, env = "MVT_GEOM_COLUMN")]
    pub geom_column: String,

    /// Attribute columns to include in each feature (comma-separated).
    #[arg(long, default_value = "", env = "MVT_ATTR_COLUMNS")]
    pub attr_columns: String,
}

impl SourceConfig {
    /// Parse and validate the table description.
    pub fn source_table(&self) -> Result<SourceTable, ConfigError> {
        SourceTable::new(
            &self.table,
            self.srid,
            &self.geom_column,
            &self.attr_columns,
        )
    }
}

// =============================================================================
// Serve Command
// =============================================================================

/// Options for `serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "MVT_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "MVT_PORT")]
    pub port: u16,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub source: SourceConfig,

    /// Maximum number of pooled database connections.
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS, env = "MVT_MAX_CONNECTIONS")]
    pub max_connections: u32,

    /// Seconds to wait for a free database connection before answering 503.
    #[arg(long, default_value_t = DEFAULT_ACQUIRE_TIMEOUT_SECS, env = "MVT_ACQUIRE_TIMEOUT_SECS")]
    pub acquire_timeout_secs: u64,

    /// Seconds a tile query may run before answering 504.
    #[arg(long, default_value_t = DEFAULT_QUERY_TIMEOUT_SECS, env = "MVT_QUERY_TIMEOUT_SECS")]
    pub query_timeout_secs: u64,

    /// How to answer tiles without features.
    #[arg(long, value_enum, default_value_t = EmptyTilePolicy::Serve, env = "MVT_EMPTY_TILES")]
    pub empty_tiles: EmptyTilePolicy,

    /// HTTP Cache-Control max-age in seconds (0 disables the header).
    #[arg(long, default_value_t = 0, env = "MVT_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Enable verbose logging (debug level, includes per-tile SQL).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.source.source_table()?;

        if self.max_connections == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_connections",
                message: "must be greater than 0".to_string(),
            });
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                field: "acquire_timeout_secs",
                message: "must be greater than 0".to_string(),
            });
        }
        if self.query_timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                field: "query_timeout_secs",
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
            query_timeout: Duration::from_secs(self.query_timeout_secs),
        }
    }
}

// =============================================================================
// Check Command
// =============================================================================

/// Options for `check`.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub source: SourceConfig,

    /// Tile to render as a smoke test.
    #[arg(long, default_value = "/0/0/0.pbf")]
    pub test_tile: String,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CheckConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.source.source_table()?;
        Ok(())
    }

    /// Pool options for a one-shot check: a single connection, short waits.
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
