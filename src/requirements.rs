// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Requirements
//!
//! Preconditions checked by API routes before they touch NodeSet, plus the
//! background wait for NodeSet registration.
//!
//! Messages are shown to the operator by the CLI, so they are full
//! sentences with the command that fixes the problem.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::nodeset::{NodeSetError, NodeSetServiceManager, RegistrationStatus};
use crate::wallet::{NodeWallet, WalletStatus};

#[derive(Debug, thiserror::Error)]
pub enum RequirementError {
    #[error("The node currently does not have a node wallet keystore. Please run 'hyperdrive wallet init' or 'hyperdrive wallet recover' and try again.")]
    NoKeystore,

    #[error("The node currently does not have an address set. Please run 'hyperdrive wallet restore-address' or 'hyperdrive wallet masquerade' and try again.")]
    NoAddress,

    #[error("The node's wallet keystore does not match the node address. This node is currently in read-only mode.")]
    AddressMismatch,

    #[error("The node is not registered with the Node Set. Please run 'hyperdrive nodeset register-node' and try again.")]
    NotRegisteredWithNodeSet,

    #[error("The node does not have a wallet ready yet. Please run 'hyperdrive wallet status' to learn more first.")]
    WalletNotReady,

    #[error("unknown registration status [{status:?}]: {source}")]
    UnknownRegistrationStatus {
        status: RegistrationStatus,
        #[source]
        source: NodeSetError,
    },
}

/// Check that a key is loaded and matches the node address.
pub fn check_wallet_ready(status: &WalletStatus) -> Result<(), RequirementError> {
    if !status.wallet.is_loaded {
        return Err(RequirementError::NoKeystore);
    }
    if !status.address.has_address {
        return Err(RequirementError::NoAddress);
    }
    if status.wallet.wallet_address != status.address.node_address {
        return Err(RequirementError::AddressMismatch);
    }
    Ok(())
}

pub async fn require_wallet_ready(wallet: &NodeWallet) -> Result<(), RequirementError> {
    check_wallet_ready(&wallet.status().await)
}

/// Require the node to be registered, logging in if the status is unknown.
pub async fn require_registered_with_nodeset(
    manager: &NodeSetServiceManager,
) -> Result<(), RequirementError> {
    let (status, err) = manager.get_registration_status().await;
    match status {
        RegistrationStatus::Registered => Ok(()),
        RegistrationStatus::Unregistered => Err(RequirementError::NotRegisteredWithNodeSet),
        RegistrationStatus::NoWallet => Err(RequirementError::WalletNotReady),
        RegistrationStatus::Unknown => Err(RequirementError::UnknownRegistrationStatus {
            status,
            source: err.unwrap_or_else(|| {
                NodeSetError::InvalidResponse("registration status could not be determined".into())
            }),
        }),
    }
}

/// Poll until the node is registered with NodeSet.
///
/// Returns `true` if `shutdown` fired first, `false` once registered.
pub async fn wait_for_nodeset_registration(
    manager: &NodeSetServiceManager,
    interval: Duration,
    shutdown: &CancellationToken,
) -> bool {
    loop {
        let (status, err) = manager.get_registration_status().await;
        let retry_secs = interval.as_secs();
        match status {
            RegistrationStatus::Registered => return false,
            RegistrationStatus::NoWallet => {
                tracing::info!(
                    retry_secs,
                    "Can't check NodeSet registration status until node has a wallet"
                );
            }
            RegistrationStatus::Unregistered => {
                tracing::info!(retry_secs, "Not registered with NodeSet yet");
            }
            RegistrationStatus::Unknown => {
                let error = err.map(|e| e.to_string()).unwrap_or_default();
                tracing::info!(retry_secs, %error, "Can't check NodeSet registration status");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.cancelled() => return true,
        }
    }
}
