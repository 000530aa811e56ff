// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # NodeSet Session Manager
//!
//! Single source of truth for "are we authenticated, and is this node
//! registered". The session token and the cached registration status live in
//! one [`SessionState`] behind one async mutex; every operation holds the
//! guard for its full duration, so a token is never observed half-replaced.
//!
//! ## Status transitions
//!
//! ```text
//!   Unknown ──login──► Registered | Unregistered | NoWallet
//!   NoWallet ──login──► (same as Unknown)
//!   Registered / Unregistered ──failed request──► unchanged
//! ```
//!
//! A failed request never downgrades a known status to `Unknown`; only a
//! completed login moves away from `Registered` or `Unregistered`.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;

use super::client::{login_message, node_address_message, NodeSetClient};
use super::error::NodeSetError;
use crate::wallet::{NodeWallet, WalletError};

/// Cached belief about whether the node is registered with NodeSet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationStatus {
    #[default]
    Unknown,
    NoWallet,
    Unregistered,
    Registered,
}

impl RegistrationStatus {
    /// Whether the status was established by a completed login.
    pub fn is_known(self) -> bool {
        matches!(self, Self::Registered | Self::Unregistered)
    }
}

/// Outcome of [`NodeSetServiceManager::register_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationResult {
    Unknown,
    Success,
    AlreadyRegistered,
    NotWhitelisted,
}

/// Session token and registration status, guarded together.
#[derive(Debug, Default)]
pub struct SessionState {
    token: Option<String>,
    status: RegistrationStatus,
    logged_in_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn status(&self) -> RegistrationStatus {
        self.status
    }

    fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    fn set_status(&mut self, status: RegistrationStatus) {
        if status == RegistrationStatus::Unknown && self.status.is_known() {
            return;
        }
        self.status = status;
    }
}

/// Manager for all interactions with the NodeSet service.
pub struct NodeSetServiceManager {
    wallet: Arc<NodeWallet>,
    pub(super) client: NodeSetClient,
    pub(super) session: Mutex<SessionState>,
}

impl NodeSetServiceManager {
    pub fn new(wallet: Arc<NodeWallet>, client: NodeSetClient) -> Self {
        Self {
            wallet,
            client,
            session: Mutex::new(SessionState::default()),
        }
    }

    pub fn wallet(&self) -> &Arc<NodeWallet> {
        &self.wallet
    }

    /// Current registration status, logging in first if it isn't known yet.
    ///
    /// The error (if any) is the login failure that produced the status.
    pub async fn get_registration_status(&self) -> (RegistrationStatus, Option<NodeSetError>) {
        let mut session = self.session.lock().await;

        match session.status {
            RegistrationStatus::Unknown | RegistrationStatus::NoWallet => {
                let result = self.login_impl(&mut session).await;
                (session.status, result.err())
            }
            status => (status, None),
        }
    }

    /// Log in unconditionally.
    pub async fn login(&self) -> Result<(), NodeSetError> {
        let mut session = self.session.lock().await;
        self.login_impl(&mut session).await
    }

    /// Cached status, without triggering a login.
    pub async fn cached_status(&self) -> RegistrationStatus {
        self.session.lock().await.status
    }

    /// Time of the last successful login.
    pub async fn last_login(&self) -> Option<DateTime<Utc>> {
        self.session.lock().await.logged_in_at
    }

    /// Register the node's wallet address with the NodeSet user owning `email`.
    pub async fn register_node(&self, email: &str) -> Result<RegistrationResult, NodeSetError> {
        let email = normalize_email(email)?;
        let mut session = self.session.lock().await;
        tracing::debug!(%email, "Registering node with NodeSet");

        let status = self.wallet.status().await;
        if !status.wallet.is_loaded {
            return Err(NodeSetError::WalletNotLoaded);
        }
        let address = status.wallet.wallet_address;

        let result = match self
            .wallet
            .sign_message(node_address_message(&email, address).as_bytes())
            .await
        {
            Ok(signature) => {
                self.client
                    .node_address(session.token(), &email, address, &signature)
                    .await
            }
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => {
                tracing::info!(%address, "Registered node with NodeSet");
                // Refresh the session so the cached status reflects the registration
                if let Err(e) = self.login_impl(&mut session).await {
                    tracing::warn!(error = %e, "Login after registration failed");
                }
                Ok(RegistrationResult::Success)
            }
            Err(e) => {
                session.set_status(RegistrationStatus::Unknown);
                match e {
                    NodeSetError::AlreadyRegistered => Ok(RegistrationResult::AlreadyRegistered),
                    NodeSetError::NotWhitelisted => Ok(RegistrationResult::NotWhitelisted),
                    other => Err(other.during("registering node")),
                }
            }
        }
    }

    /// Run `request` with the current token, logging in and retrying once if
    /// the session turned out to be invalid.
    ///
    /// A second invalid session after a fresh login is returned as is.
    pub(super) async fn run_request<T, F, Fut>(
        &self,
        session: &mut SessionState,
        request: F,
    ) -> Result<T, NodeSetError>
    where
        F: Fn(Option<String>) -> Fut,
        Fut: Future<Output = Result<T, NodeSetError>>,
    {
        match request(session.token.clone()).await {
            Err(e) if e.is_invalid_session() => {
                tracing::debug!("NodeSet session is invalid, logging in again");
                self.login_impl(session).await?;
                request(session.token.clone()).await
            }
            other => other,
        }
    }

    async fn login_impl(&self, session: &mut SessionState) -> Result<(), NodeSetError> {
        let wallet_status = self.wallet.status().await;
        if !wallet_status.is_ready() {
            session.set_status(RegistrationStatus::NoWallet);
            return Err(NodeSetError::WalletNotReady);
        }
        let address = wallet_status.wallet.wallet_address;

        tracing::info!(%address, "Not authenticated with the NodeSet server, logging in");

        let nonce = match self.client.nonce().await {
            Ok(nonce) => nonce,
            Err(e) => {
                session.set_status(RegistrationStatus::Unknown);
                return Err(e.during("getting nonce for login"));
            }
        };
        tracing::debug!(nonce = %nonce.nonce, "Got nonce for login");

        session.set_token(nonce.token);

        let signature = match self
            .wallet
            .sign_message(login_message(&nonce.nonce, address).as_bytes())
            .await
        {
            Ok(signature) => signature,
            Err(WalletError::NotLoaded) => {
                session.set_status(RegistrationStatus::NoWallet);
                return Err(NodeSetError::WalletNotLoaded);
            }
            Err(e) => {
                session.set_status(RegistrationStatus::Unknown);
                return Err(NodeSetError::from(e).during("logging in"));
            }
        };

        match self
            .client
            .login(session.token(), &nonce.nonce, address, &signature)
            .await
        {
            Ok(login) => {
                session.set_token(login.token);
                session.status = RegistrationStatus::Registered;
                session.logged_in_at = Some(Utc::now());
                tracing::info!("Logged into NodeSet server");
                Ok(())
            }
            Err(NodeSetError::UnregisteredNode) => {
                session.status = RegistrationStatus::Unregistered;
                tracing::info!(%address, "Node is not registered with NodeSet");
                Ok(())
            }
            Err(NodeSetError::WalletNotLoaded) => {
                session.set_status(RegistrationStatus::NoWallet);
                Err(NodeSetError::WalletNotLoaded)
            }
            Err(e) => {
                session.set_status(RegistrationStatus::Unknown);
                Err(e.during("logging in"))
            }
        }
    }
}

/// Trim, NFKC-normalize and lowercase an email, rejecting malformed input.
pub fn normalize_email(email: &str) -> Result<String, NodeSetError> {
    let normalized = email.trim().nfkc().collect::<String>().to_lowercase();

    let valid = match normalized.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !normalized.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(NodeSetError::InvalidEmail(email.trim().to_string()));
    }
    Ok(normalized)
}
