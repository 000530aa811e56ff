// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP transport for the NodeSet v3 API.
//!
//! The client is stateless with respect to sessions: every call that needs
//! authorization receives the session token explicitly. Token ownership lives
//! in [`super::NodeSetServiceManager`].

use std::time::Duration;

use alloy::primitives::Address;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use url::Url;

use super::error::{NodeSetError, KEY_INVALID_SESSION};
use super::types::*;

const CORE: &str = "core";
const MODULES: &str = "modules";
const STAKEWISE: &str = "stakewise";
const CONSTELLATION: &str = "constellation";
const API_VERSION: &str = "v3";

/// Message the node signs to log in.
pub fn login_message(nonce: &str, address: Address) -> String {
    format!("nonce={nonce}\naddress={}", address.to_checksum(None))
}

/// Message the node signs to register its address under an email.
pub fn node_address_message(email: &str, address: Address) -> String {
    format!("email={email}\nnodeAddress={}", address.to_checksum(None))
}

#[derive(Debug, Clone)]
pub struct NodeSetClient {
    base_url: Url,
    http: Client,
}

impl NodeSetClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NodeSetError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| NodeSetError::InvalidInput(format!("invalid NodeSet URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(NodeSetError::InvalidInput(format!(
                "NodeSet URL cannot be a base: {base_url}"
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NodeSetError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // =========================================================================
    // Core
    // =========================================================================

    /// Request a one-time login nonce.
    pub async fn nonce(&self) -> Result<NonceData, NodeSetError> {
        let url = self.endpoint(&[CORE, "nonce"]);
        self.execute(self.http.get(url), None).await
    }

    /// Exchange a signed nonce for a session token.
    pub async fn login(
        &self,
        token: Option<&str>,
        nonce: &str,
        address: Address,
        signature: &[u8],
    ) -> Result<LoginData, NodeSetError> {
        let body = LoginRequest {
            nonce: nonce.to_string(),
            address: address.to_checksum(None),
            signature: alloy::hex::encode_prefixed(signature),
        };
        let url = self.endpoint(&[CORE, "login"]);
        self.execute(self.http.post(url).json(&body), token).await
    }

    /// Register the node address under the user with the given email.
    pub async fn node_address(
        &self,
        token: Option<&str>,
        email: &str,
        address: Address,
        signature: &[u8],
    ) -> Result<(), NodeSetError> {
        let body = NodeAddressRequest {
            email: email.to_string(),
            node_address: address.to_checksum(None),
            signature: alloy::hex::encode_prefixed(signature),
        };
        let url = self.endpoint(&[CORE, "node-address"]);
        self.execute_empty(self.http.post(url).json(&body), token)
            .await
    }

    // =========================================================================
    // StakeWise
    //
    // Tokens are taken by value so request futures don't borrow from the
    // session guard of the caller.
    // =========================================================================

    pub async fn stakewise_vaults(
        &self,
        token: Option<String>,
        deployment: &str,
    ) -> Result<VaultsData, NodeSetError> {
        let url = self.endpoint(&[MODULES, STAKEWISE, deployment, "vaults"]);
        self.execute(self.http.get(url), token.as_deref()).await
    }

    pub async fn stakewise_validators(
        &self,
        token: Option<String>,
        deployment: &str,
        vault: Address,
    ) -> Result<StakeWiseValidatorsData, NodeSetError> {
        let vault = vault.to_checksum(None);
        let url = self.endpoint(&[MODULES, STAKEWISE, deployment, &vault, "validators"]);
        self.execute(self.http.get(url), token.as_deref()).await
    }

    pub async fn stakewise_validators_meta(
        &self,
        token: Option<String>,
        deployment: &str,
        vault: Address,
    ) -> Result<ValidatorsMetaData, NodeSetError> {
        let vault = vault.to_checksum(None);
        let url = self.endpoint(&[MODULES, STAKEWISE, deployment, &vault, "validators", "meta"]);
        self.execute(self.http.get(url), token.as_deref()).await
    }

    pub async fn stakewise_post_validators(
        &self,
        token: Option<String>,
        deployment: &str,
        vault: Address,
        body: &PostValidatorsRequest,
    ) -> Result<SignatureData, NodeSetError> {
        let vault = vault.to_checksum(None);
        let url = self.endpoint(&[MODULES, STAKEWISE, deployment, &vault, "validators"]);
        self.execute(self.http.post(url).json(body), token.as_deref())
            .await
    }

    // =========================================================================
    // Constellation
    // =========================================================================

    pub async fn constellation_whitelist(
        &self,
        token: Option<String>,
        deployment: &str,
    ) -> Result<WhitelistData, NodeSetError> {
        let url = self.endpoint(&[MODULES, CONSTELLATION, deployment, "whitelist"]);
        self.execute(self.http.get(url), token.as_deref()).await
    }

    pub async fn constellation_post_whitelist(
        &self,
        token: Option<String>,
        deployment: &str,
    ) -> Result<SignatureData, NodeSetError> {
        let url = self.endpoint(&[MODULES, CONSTELLATION, deployment, "whitelist"]);
        self.execute(self.http.post(url).json(&Empty {}), token.as_deref())
            .await
    }

    pub async fn constellation_deposit_signature(
        &self,
        token: Option<String>,
        deployment: &str,
        body: &MinipoolDepositSignatureRequest,
    ) -> Result<SignatureData, NodeSetError> {
        let url = self.endpoint(&[
            MODULES,
            CONSTELLATION,
            deployment,
            "minipool",
            "deposit-signature",
        ]);
        self.execute(self.http.post(url).json(body), token.as_deref())
            .await
    }

    pub async fn constellation_validators(
        &self,
        token: Option<String>,
        deployment: &str,
    ) -> Result<ConstellationValidatorsData, NodeSetError> {
        let url = self.endpoint(&[MODULES, CONSTELLATION, deployment, "validators"]);
        self.execute(self.http.get(url), token.as_deref()).await
    }

    pub async fn constellation_upload_exits(
        &self,
        token: Option<String>,
        deployment: &str,
        body: &ExitMessagesRequest,
    ) -> Result<(), NodeSetError> {
        let url = self.endpoint(&[MODULES, CONSTELLATION, deployment, "validators"]);
        self.execute_empty(self.http.request(Method::PATCH, url).json(body), token.as_deref())
            .await
    }

    // =========================================================================
    // Internal HTTP helpers
    // =========================================================================

    /// Build `<base>/v3/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(API_VERSION).extend(segments);
        }
        url
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: Option<&str>,
    ) -> Result<T, NodeSetError> {
        let (context, envelope) = self.send::<T>(request, token).await?;
        envelope
            .data
            .ok_or_else(|| NodeSetError::InvalidResponse(format!("{context} returned no data")))
    }

    async fn execute_empty(
        &self,
        request: RequestBuilder,
        token: Option<&str>,
    ) -> Result<(), NodeSetError> {
        self.send::<Empty>(request, token).await.map(|_| ())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: Option<&str>,
    ) -> Result<(String, Envelope<T>), NodeSetError> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let request = request
            .build()
            .map_err(|e| NodeSetError::Transport(format!("failed to build request: {e}")))?;
        let context = format!("{} {}", request.method(), request.url().path());
        tracing::debug!(request = %context, "Sending NodeSet request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| NodeSetError::Transport(format!("{context} failed: {e}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| NodeSetError::Transport(format!("{context} body read failed: {e}")))?;

        let envelope = decode_envelope(&context, status, &body)?;
        Ok((context, envelope))
    }
}

/// Decode a reply body. Error replies are read without their `data` so the
/// error key survives whatever payload the server attaches.
fn decode_envelope<T: DeserializeOwned>(
    context: &str,
    status: StatusCode,
    body: &[u8],
) -> Result<Envelope<T>, NodeSetError> {
    if !status.is_success() {
        let err = match serde_json::from_slice::<Envelope<IgnoredAny>>(body) {
            Ok(envelope) => status_error(status, &envelope.error, &envelope.message),
            Err(_) => status_error(status, "", &String::from_utf8_lossy(body)),
        };
        return Err(err);
    }

    serde_json::from_slice(body)
        .map_err(|e| NodeSetError::InvalidResponse(format!("{context} invalid JSON: {e}")))
}

fn status_error(status: StatusCode, key: &str, message: &str) -> NodeSetError {
    // A bare 401 without an error key is still an expired session
    let key = if key.is_empty() && status == StatusCode::UNAUTHORIZED {
        KEY_INVALID_SESSION
    } else {
        key
    };
    NodeSetError::from_key(status.as_u16(), key, message)
}
