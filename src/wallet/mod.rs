// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Node Wallet
//!
//! The node wallet is the credential the daemon uses to authenticate with
//! NodeSet. It is in one of three states:
//!
//! - **Empty**: no address and no key.
//! - **Address only**: a node address was set but no key is loaded. The node
//!   can be inspected but cannot sign.
//! - **Loaded**: a secp256k1 key is loaded. Loading a key sets the node
//!   address to the key's address.
//!
//! Signatures are EIP-191 personal messages (`"\x19Ethereum Signed Message:\n"`
//! prefix), 65 bytes `r || s || v`.

pub mod keys;

use std::path::{Path, PathBuf};

use alloy::{
    primitives::Address,
    signers::{local::PrivateKeySigner, Signer},
};
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

/// Errors raised by the node wallet.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("node wallet is not loaded")]
    NotLoaded,

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Key file error: {0}")]
    KeyFile(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Node address portion of the wallet status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressStatus {
    /// The address the node operates as.
    #[schema(value_type = String)]
    pub node_address: Address,
    /// Whether a node address has been set.
    pub has_address: bool,
}

/// Keystore portion of the wallet status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeystoreStatus {
    /// Whether a private key is loaded and can sign.
    pub is_loaded: bool,
    /// Whether the configured key file exists on disk.
    pub is_on_disk: bool,
    /// Address of the loaded key (zero when not loaded).
    #[schema(value_type = String)]
    pub wallet_address: Address,
}

/// Snapshot of the node wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct WalletStatus {
    pub address: AddressStatus,
    pub wallet: KeystoreStatus,
}

impl WalletStatus {
    /// A wallet is ready when a key is loaded and matches the node address.
    pub fn is_ready(&self) -> bool {
        self.wallet.is_loaded
            && self.address.has_address
            && self.wallet.wallet_address == self.address.node_address
    }
}

#[derive(Default)]
struct WalletInner {
    node_address: Option<Address>,
    signer: Option<PrivateKeySigner>,
    key_path: Option<PathBuf>,
}

/// The node wallet capability.
///
/// Shared between the NodeSet session manager (for login signatures) and the
/// HTTP handlers (for status), so all state sits behind an async lock.
#[derive(Default)]
pub struct NodeWallet {
    inner: RwLock<WalletInner>,
}

impl NodeWallet {
    /// Create an empty wallet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the key at `path` and remember the path for status reporting.
    pub async fn load_key_file(&self, path: impl AsRef<Path>) -> Result<Address, WalletError> {
        let path = path.as_ref();
        let signer = keys::signer_from_file(path)?;
        let address = signer.address();

        let mut inner = self.inner.write().await;
        inner.key_path = Some(path.to_path_buf());
        inner.node_address = Some(address);
        inner.signer = Some(signer);
        tracing::info!(%address, path = %path.display(), "Loaded node wallet key");
        Ok(address)
    }

    /// Load an in-memory signer.
    pub async fn load_signer(&self, signer: PrivateKeySigner) -> Address {
        let address = signer.address();
        let mut inner = self.inner.write().await;
        inner.node_address = Some(address);
        inner.signer = Some(signer);
        address
    }

    /// Set the node address without a key (read-only mode).
    pub async fn set_node_address(&self, address: Address) {
        self.inner.write().await.node_address = Some(address);
    }

    /// Drop the loaded key. The node address is kept.
    pub async fn unload(&self) {
        self.inner.write().await.signer = None;
    }

    pub async fn status(&self) -> WalletStatus {
        let inner = self.inner.read().await;
        let wallet_address = inner
            .signer
            .as_ref()
            .map(PrivateKeySigner::address)
            .unwrap_or(Address::ZERO);

        WalletStatus {
            address: AddressStatus {
                node_address: inner.node_address.unwrap_or(Address::ZERO),
                has_address: inner.node_address.is_some(),
            },
            wallet: KeystoreStatus {
                is_loaded: inner.signer.is_some(),
                is_on_disk: inner.key_path.as_deref().is_some_and(Path::exists),
                wallet_address,
            },
        }
    }

    /// Sign an EIP-191 personal message with the loaded key.
    pub async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletError> {
        let inner = self.inner.read().await;
        let signer = inner.signer.as_ref().ok_or(WalletError::NotLoaded)?;
        let signature = signer
            .sign_message(message)
            .await
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(signature.as_bytes().to_vec())
    }
}
