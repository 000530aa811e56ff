// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use hyperdrive_daemon::{
    api::router,
    config::DaemonConfig,
    logging,
    nodeset::{NodeSetClient, NodeSetServiceManager},
    requirements::wait_for_nodeset_registration,
    state::AppState,
    wallet::NodeWallet,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match DaemonConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init(config.log_format) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Daemon stopped with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: DaemonConfig) -> Result<(), Box<dyn std::error::Error>> {
    let wallet = Arc::new(NodeWallet::new());
    match (&config.wallet_key_path, config.node_address) {
        (Some(path), _) => {
            wallet.load_key_file(path).await?;
        }
        (None, Some(address)) => {
            tracing::info!(%address, "No key file configured, running with read-only node address");
            wallet.set_node_address(address).await;
        }
        (None, None) => {
            tracing::warn!("No node wallet configured; NodeSet operations are unavailable");
        }
    }

    let client = NodeSetClient::new(config.nodeset_api_url.as_str(), config.client_timeout)?;
    let nodeset = Arc::new(NodeSetServiceManager::new(wallet, client));

    let shutdown = CancellationToken::new();
    let watcher = {
        let nodeset = Arc::clone(&nodeset);
        let shutdown = shutdown.clone();
        let interval = config.registration_check_interval;
        tokio::spawn(async move {
            if !wait_for_nodeset_registration(&nodeset, interval, &shutdown).await {
                tracing::info!("Node is registered with NodeSet");
            }
        })
    };

    let app = router(AppState::new(nodeset));
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        network = config.network.as_str(),
        nodeset = %config.nodeset_api_url,
        addr = %config.bind_addr,
        "Hyperdrive daemon listening (docs at /docs)"
    );

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    watcher.await?;
    Ok(())
}
