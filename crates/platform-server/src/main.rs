//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! pkid Server — thin entry point for the Axum HTTP service.
//!
//! All routing logic lives in `pkid_platform::http::create_router`. This
//! binary is responsible only for: CLI parsing, storage backend wiring,
//! server binding, and graceful shutdown.

use anyhow::{Context, Result};
use clap::Parser;
use pkid_platform::ca::storage;
use pkid_platform::ca::TransactionalManager;
use pkid_platform::http::{create_router, AppState, Config};

/// pkid Server — boots the pkid certificate authority service over HTTP.
#[derive(Parser)]
#[command(name = "pkid-server", version = env!("CARGO_PKG_VERSION"), about = "pkid — a small certificate authority and PKI service")]
struct Cli {
    /// Storage backend URI (file://PATH or leveldb://PATH).
    #[arg(long)]
    storage: Option<String>,

    /// Address to listen on (host:port).
    #[arg(long)]
    listen: Option<String>,

    /// Bearer token for remote storage backends.
    #[arg(long)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage_uri = cli.storage.unwrap_or(config.storage_uri);
    let listen = cli.listen.unwrap_or(config.listen);
    let _token = cli.token.or(config.token);

    tracing::info!("pkid-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(storage = %storage_uri, "storage backend");
    tracing::info!(listen = %listen, "listen address");

    let backend = storage::open(&storage_uri).context("opening storage backend")?;
    let manager = TransactionalManager::new(backend);
    let state = AppState::new(manager);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    tracing::info!("listening on {listen}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections...");
}
