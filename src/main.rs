//! MVT Tile Server - Mapbox Vector Tiles straight from PostGIS.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mvt_tile_server::{
    config::{CheckConfig, Cli, Command, ServeConfig},
    query::TileQueryBuilder,
    server::{create_router, RouterConfig},
    store::PostGisStore,
    tile::{TileService, RD_NEW_GRID},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let source = match config.source.source_table() {
        Ok(source) => source,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let params = config.database.connection_params();
    let pool_options = config.pool_options();

    info!("MVT Tile Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Database: {}", params);
    info!(
        "  Source: {} (SRID {}), geometry {}, {} attribute column(s)",
        source.table,
        source.srid,
        source.geom_column,
        source.attr_columns.len()
    );
    info!("  Grid: EPSG:{}", RD_NEW_GRID.srid);
    info!(
        "  Pool: {} connections, acquire timeout {:?}, query timeout {:?}",
        pool_options.max_connections, pool_options.acquire_timeout, pool_options.query_timeout
    );
    info!("  Empty tiles: {:?}", config.empty_tiles);

    // The pool connects on first use; a database outage at startup surfaces
    // as 500s on tile requests rather than a failed start
    let store = PostGisStore::new(params, pool_options);
    let tile_service = TileService::new(store, TileQueryBuilder::new(source))
        .with_empty_tile_policy(config.empty_tiles);

    let router_config = RouterConfig::default()
        .with_cache_max_age(config.cache_max_age)
        .with_tracing(!config.no_tracing);
    let router = create_router(tile_service, router_config);

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Serving tiles at http://{}/{{z}}/{{x}}/{{y}}.pbf", addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "mvt_tile_server=debug,tower_http=debug"
    } else {
        "mvt_tile_server=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("MVT Tile Server Configuration Check");
    println!("═══════════════════════════════════");
    println!();

    if let Err(e) = config.validate() {
        println!("✗ Configuration: {}", e);
        return ExitCode::FAILURE;
    }
    let source = match config.source.source_table() {
        Ok(source) => source,
        Err(e) => {
            println!("✗ Configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let params = config.database.connection_params();
    println!("✓ Database: {}", params);
    println!("✓ Source: {} (SRID {})", source.table, source.srid);
    println!();

    begin_step(&mut std::io::stdout(), "Testing database connection");
    let store = PostGisStore::new(params, config.pool_options());
    match store.postgis_version().await {
        Ok(version) => println!("✓ PostGIS {}", version),
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", e);
            println!();
            println!("Please check:");
            println!("  - The database is running and reachable");
            println!("  - The credentials are correct");
            println!("  - The PostGIS extension is installed");
            return ExitCode::FAILURE;
        }
    }

    begin_step(
        &mut std::io::stdout(),
        &format!("Rendering tile {}", config.test_tile),
    );
    let service = TileService::new(store, TileQueryBuilder::new(source));
    let result = service.get_tile(&config.test_tile).await;
    service.store().close().await;

    match result {
        Ok(tile) => println!("✓ {} bytes", tile.data.len()),
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    println!();
    println!("═══════════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}

/// Print a progress label that stays on the line until the step finishes.
fn begin_step(out: &mut impl Write, label: &str) {
    let _ = write!(out, "{}... ", label);
    let _ = out.flush();
}
