// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! NodeSet client errors.
//!
//! The service reports failures as an `error` key inside its JSON envelope.
//! Keys with business meaning get their own variant so callers can branch on
//! them (registration results, response flags) without matching on strings.

use crate::wallet::WalletError;

/// Error key: the session token is missing, expired or was revoked.
pub const KEY_INVALID_SESSION: &str = "invalid_session";
/// Error key: the node address has not been registered to any user.
pub const KEY_UNREGISTERED_NODE: &str = "unregistered_node";
/// Error key: the node address is already registered.
pub const KEY_ALREADY_REGISTERED: &str = "already_registered";
/// Error key: the node's wallet could not sign the login challenge.
pub const KEY_WALLET_NOT_LOADED: &str = "wallet_not_loaded";
/// Error key: the user has not whitelisted this node address.
pub const KEY_NOT_WHITELISTED: &str = "not_whitelisted";
/// Error key: the user lacks permissions for the requested module.
pub const KEY_INVALID_PERMISSIONS: &str = "invalid_permissions";
/// Error key: the vault does not exist on the deployment.
pub const KEY_VAULT_NOT_FOUND: &str = "vault_not_found";
/// Error key: the beacon deposit root was already used for a signature.
pub const KEY_DEPOSIT_ROOT_ALREADY_ASSIGNED: &str = "deposit_root_already_assigned";
/// Error key: the node is not authorized for Constellation.
pub const KEY_NODE_UNAUTHORIZED: &str = "node_unauthorized";
/// Error key: the node address does not match the user's registered node.
pub const KEY_INCORRECT_NODE_ADDRESS: &str = "incorrect_node_address";

/// Errors produced by the NodeSet transport, session manager and sub-clients.
#[derive(Debug, thiserror::Error)]
pub enum NodeSetError {
    // ---- local preconditions ----
    #[error("can't log into nodeset, hyperdrive wallet not initialized yet")]
    WalletNotReady,

    #[error("node wallet is not loaded")]
    WalletNotLoaded,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // ---- session ----
    #[error("session is invalid or has expired")]
    InvalidSession,

    // ---- business outcomes ----
    #[error("node is not registered with NodeSet")]
    UnregisteredNode,

    #[error("node is already registered with NodeSet")]
    AlreadyRegistered,

    #[error("node address has not been whitelisted by the user")]
    NotWhitelisted,

    #[error("user does not have permission for this module")]
    InvalidPermissions,

    #[error("vault not found")]
    VaultNotFound,

    #[error("beacon deposit root has already been assigned")]
    DepositRootAlreadyAssigned,

    #[error("node is not authorized")]
    NodeUnauthorized,

    #[error("node address does not match the registered node")]
    IncorrectNodeAddress,

    // ---- transport ----
    #[error("NodeSet request failed: {0}")]
    Transport(String),

    #[error("NodeSet returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("NodeSet response was invalid: {0}")]
    InvalidResponse(String),

    #[error("error {operation}: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: Box<NodeSetError>,
    },
}

impl NodeSetError {
    /// Map an error key from the response envelope to an error.
    pub fn from_key(status: u16, key: &str, message: &str) -> Self {
        match key {
            KEY_INVALID_SESSION => Self::InvalidSession,
            KEY_UNREGISTERED_NODE => Self::UnregisteredNode,
            KEY_ALREADY_REGISTERED => Self::AlreadyRegistered,
            KEY_NOT_WHITELISTED => Self::NotWhitelisted,
            KEY_WALLET_NOT_LOADED => Self::WalletNotLoaded,
            KEY_INVALID_PERMISSIONS => Self::InvalidPermissions,
            KEY_VAULT_NOT_FOUND => Self::VaultNotFound,
            KEY_DEPOSIT_ROOT_ALREADY_ASSIGNED => Self::DepositRootAlreadyAssigned,
            KEY_NODE_UNAUTHORIZED => Self::NodeUnauthorized,
            KEY_INCORRECT_NODE_ADDRESS => Self::IncorrectNodeAddress,
            _ => Self::Api {
                status,
                code: key.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Wrap the error with the name of the operation that produced it.
    pub fn during(self, operation: &'static str) -> Self {
        Self::Operation {
            operation,
            source: Box::new(self),
        }
    }

    /// The innermost error, with operation context stripped.
    pub fn root(&self) -> &NodeSetError {
        match self {
            Self::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_invalid_session(&self) -> bool {
        matches!(self.root(), Self::InvalidSession)
    }
}

impl From<WalletError> for NodeSetError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::NotLoaded => Self::WalletNotLoaded,
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for NodeSetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
