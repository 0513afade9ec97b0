/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Adreel server - HTTP API for ads, packages and ad analytics.

use std::path::PathBuf;

use adreel::config::load_env_file;
use adreel::{AdreelConfig, Database};
use adreel_server::{build_router, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Adreel - ad records, ad events and click/impression analytics over HTTP
#[derive(Parser)]
#[command(name = "adreel-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ADREEL_CONFIG")]
    config: Option<PathBuf>,

    /// Database URL: memory://, a SQLite file path or a sqlite:// URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log output format (text or json)
    #[arg(long)]
    log_format: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(config: &AdreelConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = load_env_file(None);
    let cli = Cli::parse();

    let mut config =
        AdreelConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    config.validate().context("Invalid configuration")?;

    init_tracing(&config, cli.verbose);
    if let Some(path) = env_file {
        debug!("Loaded environment from {}", path.display());
    }

    let database = Database::init_global(Database::connect(&config.database).await);
    if !database.is_available() {
        tracing::warn!("Starting without a record store; requests will fail until restart");
    }

    let app = build_router(AppState::new(database.clone()));
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("Adreel server listening on {}", address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
