use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, error, warn};

use super::TileStore;
use crate::error::StoreError;
use crate::query::TileQuery;

/// Default number of pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default time to wait for a free connection.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default limit on a single tile query.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// SQLSTATE `query_canceled`, raised when `statement_timeout` fires.
const QUERY_CANCELED: &str = "57014";

// =============================================================================
// Connection Parameters
// =============================================================================

/// Where and as whom to connect to PostgreSQL.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionParams {
    /// Session options for new connections.
    ///
    /// `statement_timeout` makes the server abandon a statement on its own,
    /// so an abandoned query does not keep a backend busy.
    fn connect_options(&self, statement_timeout: Duration) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .application_name(env!("CARGO_PKG_NAME"))
            .options([("statement_timeout", statement_timeout.as_millis())])
    }
}

// Keeps the password out of logs and error messages.
impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "postgres://{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

/// Sizing and timeouts for the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Upper bound on open connections
    pub max_connections: u32,

    /// How long a request waits for a free connection
    pub acquire_timeout: Duration,

    /// How long a tile query may run
    pub query_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

// =============================================================================
// PostGisStore
// =============================================================================

/// PostGIS-backed [`TileStore`].
///
/// The pool opens connections on first use, so constructing a store never
/// touches the network. Connections are reused across requests.
#[derive(Clone)]
pub struct PostGisStore {
    pool: PgPool,
    params: ConnectionParams,
    options: PoolOptions,
}

impl PostGisStore {
    /// Create a store that connects lazily with the given parameters.
    pub fn new(params: ConnectionParams, options: PoolOptions) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect_lazy_with(params.connect_options(options.query_timeout));

        Self {
            pool,
            params,
            options,
        }
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    pub fn options(&self) -> &PoolOptions {
        &self.options
    }

    /// Query the PostGIS version, forcing a connection to be opened.
    pub async fn postgis_version(&self) -> Result<String, StoreError> {
        let mut conn = self.acquire().await?;
        sqlx::query_scalar::<_, String>("SELECT postgis_version()")
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| StoreError::QueryFailed {
                reason: e.to_string(),
            })
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn acquire(&self) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, StoreError> {
        self.pool.acquire().await.map_err(|e| {
            let err = self.classify_acquire_error(e, self.pool.size());
            match &err {
                StoreError::Busy { .. } => warn!("Connection pool exhausted: {}", err),
                _ => error!(database = %self.params, "Cannot connect: {}", err),
            }
            err
        })
    }

    /// Tell an exhausted pool apart from a database that cannot be reached.
    ///
    /// The pool reports both as a timeout. If it timed out while below its
    /// connection limit (`pool_size` open connections), opening a new
    /// connection is what failed.
    fn classify_acquire_error(&self, err: sqlx::Error, pool_size: u32) -> StoreError {
        match err {
            sqlx::Error::PoolTimedOut if pool_size >= self.options.max_connections => {
                StoreError::Busy {
                    waited_ms: self.options.acquire_timeout.as_millis() as u64,
                }
            }
            sqlx::Error::PoolTimedOut => StoreError::Unreachable(format!(
                "no connection to {} within {}ms",
                self.params,
                self.options.acquire_timeout.as_millis()
            )),
            other => StoreError::Unreachable(other.to_string()),
        }
    }
}

#[async_trait]
impl TileStore for PostGisStore {
    async fn fetch_tile(&self, query: &TileQuery) -> Result<Bytes, StoreError> {
        let mut conn = self.acquire().await?;

        let p = &query.params;
        let pending = sqlx::query_scalar::<_, Option<Vec<u8>>>(&query.sql)
            .bind(p.xmin)
            .bind(p.ymin)
            .bind(p.xmax)
            .bind(p.ymax)
            .bind(p.segment_length)
            .bind(p.source_srid)
            .fetch_optional(&mut *conn);

        let limit = self.options.query_timeout;
        let row = match tokio::time::timeout(limit, pending).await {
            Ok(Ok(row)) => row,
            Ok(Err(e)) => {
                error!(sql = %query, "Tile query failed: {}", e);
                return Err(classify_query_error(e, limit));
            }
            Err(_) => {
                error!(sql = %query, "Tile query timed out after {:?}", limit);
                return Err(StoreError::Timeout {
                    limit_ms: limit.as_millis() as u64,
                });
            }
        };

        match row {
            Some(payload) => {
                let tile = Bytes::from(payload.unwrap_or_default());
                debug!(bytes = tile.len(), "Tile query returned");
                Ok(tile)
            }
            None => {
                error!(sql = %query, "Tile query returned no rows");
                Err(StoreError::QueryFailed {
                    reason: "query returned no rows".to_string(),
                })
            }
        }
    }
}

/// Map a failed statement to a store error. A statement cancelled by the
/// server-side timeout counts as a timeout, everything else as a failed query.
fn classify_query_error(err: sqlx::Error, limit: Duration) -> StoreError {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED) => {
            StoreError::Timeout {
                limit_ms: limit.as_millis() as u64,
            }
        }
        other => StoreError::QueryFailed {
            reason: other.to_string(),
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
