// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process NodeSet v3 server for tests.
//!
//! Enforces the parts of the protocol the daemon depends on: nonce tokens
//! are only good for the login they were issued with, login signatures must
//! recover to the claimed address, and module routes reject any bearer that
//! isn't a session token from a completed login.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy::primitives::{address, Address, Signature, B256};
use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, task::JoinHandle};
use uuid::Uuid;

use crate::nodeset::client::{login_message, node_address_message};
use crate::nodeset::error::{
    KEY_ALREADY_REGISTERED, KEY_DEPOSIT_ROOT_ALREADY_ASSIGNED, KEY_INCORRECT_NODE_ADDRESS,
    KEY_INVALID_PERMISSIONS, KEY_INVALID_SESSION, KEY_NODE_UNAUTHORIZED, KEY_NOT_WHITELISTED,
    KEY_UNREGISTERED_NODE, KEY_VAULT_NOT_FOUND,
};
use crate::nodeset::types::*;
use crate::nodeset::{NodeSetClient, NodeSetServiceManager};
use crate::state::AppState;
use crate::wallet::keys::{signer_from_hex, tests::DEV_KEY_HEX};
use crate::wallet::NodeWallet;

pub const MOCK_DEPLOYMENT: &str = "holesky";
pub const MOCK_VAULT: Address = address!("8a6c3ba47e0b2b8c2f7d1c19e5a3f0d2b64e9c71");
pub const MOCK_SIGNATURE: [u8; 65] = [0x5a; 65];

const MOCK_VALIDATOR_PUBKEY: &str =
    "0xa1d1ad0714035353258038e964ae9675dc0252ee22cea896825c01458e1807bfad2f9969338798548d9858a571f7425c";

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    total: usize,
    nonce: usize,
    login: usize,
    vaults: usize,
    unknown_token: usize,
    stale_token: usize,
}

#[derive(Default)]
struct MockState {
    /// Registered node address -> user email.
    registered: HashMap<Address, String>,
    whitelisted: HashSet<(String, Address)>,
    /// Outstanding nonce -> provisional token issued with it.
    nonces: HashMap<String, String>,
    sessions: HashMap<String, Address>,
    /// Session token issued by the most recent login.
    latest_session: Option<String>,
    constellation: HashSet<Address>,
    deposit_roots: HashSet<B256>,
    exits: Vec<EncryptedExitData>,
    forced: HashMap<&'static str, &'static str>,
    fail_nonce: bool,
    expire_sessions: usize,
    delay: Duration,
    counters: Counters,
}

impl MockState {
    /// Authenticate a module call and apply any forced error for `route`.
    fn module_call(&mut self, headers: &HeaderMap, route: &str) -> Result<Address, Response> {
        if self.expire_sessions > 0 {
            self.expire_sessions -= 1;
            return Err(failure(KEY_INVALID_SESSION));
        }

        let token = bearer(headers);
        let node = token.and_then(|t| self.sessions.get(t).copied());
        let Some(node) = node else {
            if token.is_some() {
                self.counters.unknown_token += 1;
            }
            return Err(failure(KEY_INVALID_SESSION));
        };
        if token != self.latest_session.as_deref() {
            self.counters.stale_token += 1;
        }

        if let Some(key) = self.forced.get(route) {
            return Err(failure(key));
        }
        Ok(node)
    }
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<MockState>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call, wait out the configured delay, then lock the state.
    async fn enter(&self, count: fn(&mut Counters)) -> MutexGuard<'_, MockState> {
        let delay = {
            let mut state = self.lock();
            state.counters.total += 1;
            count(&mut state.counters);
            state.delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.lock()
    }
}

/// Handle to a running mock server. The server stops when dropped.
pub struct MockNodeSet {
    url: String,
    shared: Shared,
    server: JoinHandle<()>,
}

impl MockNodeSet {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock NodeSet listener");
        let addr = listener.local_addr().expect("mock NodeSet address");
        let shared = Shared::default();
        let app = router(shared.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock NodeSet server failed");
        });

        Self {
            url: format!("http://{addr}/api"),
            shared,
            server,
        }
    }

    pub fn url(&self) -> String {
        self.url.clone()
    }

    /// Register `node` directly, as if the user had completed registration.
    pub fn register(&self, node: Address, email: &str) {
        self.shared.lock().registered.insert(node, email.to_string());
    }

    /// Let the user owning `email` register `node`.
    pub fn whitelist(&self, email: &str, node: Address) {
        self.shared
            .lock()
            .whitelisted
            .insert((email.to_string(), node));
    }

    pub fn fail_nonce(&self, fail: bool) {
        self.shared.lock().fail_nonce = fail;
    }

    /// Reject the next `count` module calls with `invalid_session`.
    pub fn expire_sessions(&self, count: usize) {
        self.shared.lock().expire_sessions = count;
    }

    pub fn delay_responses(&self, delay: Duration) {
        self.shared.lock().delay = delay;
    }

    /// Fail every authenticated call to `route` with the error key `key`.
    ///
    /// `login` and `node-address` fail once the request signature checks out.
    pub fn force_error(&self, route: &'static str, key: &'static str) {
        self.shared.lock().forced.insert(route, key);
    }

    pub fn total_calls(&self) -> usize {
        self.shared.lock().counters.total
    }

    pub fn nonce_calls(&self) -> usize {
        self.shared.lock().counters.nonce
    }

    pub fn login_calls(&self) -> usize {
        self.shared.lock().counters.login
    }

    pub fn vaults_calls(&self) -> usize {
        self.shared.lock().counters.vaults
    }

    /// Module calls whose bearer was not a session token from a login.
    pub fn unknown_token_calls(&self) -> usize {
        self.shared.lock().counters.unknown_token
    }

    /// Module calls made with a session token older than the latest login's.
    pub fn stale_token_calls(&self) -> usize {
        self.shared.lock().counters.stale_token
    }

    pub fn uploaded_exits(&self) -> Vec<EncryptedExitData> {
        self.shared.lock().exits.clone()
    }
}

impl Drop for MockNodeSet {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// App state backed by `mock`, with the dev key loaded when `loaded`.
pub async fn test_state(mock: &MockNodeSet, loaded: bool) -> AppState {
    let wallet = Arc::new(NodeWallet::new());
    if loaded {
        wallet
            .load_signer(signer_from_hex(DEV_KEY_HEX).expect("dev key"))
            .await;
    }
    let client = NodeSetClient::new(&mock.url(), Duration::from_secs(5)).expect("mock URL");
    AppState::new(Arc::new(NodeSetServiceManager::new(wallet, client)))
}

pub fn sample_deposit_data() -> ExtendedDepositData {
    ExtendedDepositData {
        pubkey: MOCK_VALIDATOR_PUBKEY.trim_start_matches("0x").to_string(),
        withdrawal_credentials: format!("01{}{}", "00".repeat(11), alloy::hex::encode(MOCK_VAULT)),
        amount: 32_000_000_000,
        signature: "ab".repeat(96),
        deposit_message_root: "11".repeat(32),
        deposit_data_root: "22".repeat(32),
        fork_version: "01017000".to_string(),
        network_name: MOCK_DEPLOYMENT.to_string(),
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(shared: Shared) -> Router {
    let v3 = Router::new()
        .route("/core/nonce", get(nonce))
        .route("/core/login", post(login))
        .route("/core/node-address", post(node_address))
        .route("/modules/stakewise/{deployment}/vaults", get(stakewise_vaults))
        .route(
            "/modules/stakewise/{deployment}/{vault}/validators",
            get(stakewise_validators).post(stakewise_post_validators),
        )
        .route(
            "/modules/stakewise/{deployment}/{vault}/validators/meta",
            get(stakewise_validators_meta),
        )
        .route(
            "/modules/constellation/{deployment}/whitelist",
            get(constellation_whitelist).post(constellation_post_whitelist),
        )
        .route(
            "/modules/constellation/{deployment}/minipool/deposit-signature",
            post(constellation_deposit_signature),
        )
        .route(
            "/modules/constellation/{deployment}/validators",
            get(constellation_validators).patch(constellation_upload_exits),
        )
        .with_state(shared);

    Router::new().nest("/api/v3", v3)
}

fn success<T: Serialize>(data: T) -> Response {
    Json(Envelope::success(data)).into_response()
}

fn failure(key: &str) -> Response {
    let status = match key {
        KEY_INVALID_SESSION | KEY_UNREGISTERED_NODE | KEY_NODE_UNAUTHORIZED => {
            StatusCode::UNAUTHORIZED
        }
        KEY_INVALID_PERMISSIONS => StatusCode::FORBIDDEN,
        KEY_VAULT_NOT_FOUND => StatusCode::NOT_FOUND,
        KEY_ALREADY_REGISTERED
        | KEY_NOT_WHITELISTED
        | KEY_DEPOSIT_ROOT_ALREADY_ASSIGNED
        | KEY_INCORRECT_NODE_ADDRESS => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(Envelope::<Empty>::failure(key, key))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn signed_by(message: &str, signature: &str, signer: Address) -> bool {
    let recovered = alloy::hex::decode(signature)
        .ok()
        .and_then(|raw| Signature::from_raw(&raw).ok())
        .and_then(|sig| sig.recover_address_from_msg(message).ok());
    recovered == Some(signer)
}

fn signature_data() -> SignatureData {
    SignatureData {
        signature: alloy::hex::encode_prefixed(MOCK_SIGNATURE),
    }
}

async fn nonce(State(shared): State<Shared>) -> Response {
    let mut state = shared.enter(|c| c.nonce += 1).await;
    if state.fail_nonce {
        let body = Envelope::<Empty>::failure("", "nonce generation is unavailable");
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
    }

    let nonce = Uuid::new_v4().simple().to_string();
    let token = Uuid::new_v4().to_string();
    state.nonces.insert(nonce.clone(), token.clone());
    success(NonceData { nonce, token })
}

async fn login(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Response {
    let mut state = shared.enter(|c| c.login += 1).await;

    let Some(nonce_token) = state.nonces.remove(&request.nonce) else {
        return failure(KEY_INVALID_SESSION);
    };
    if bearer(&headers) != Some(nonce_token.as_str()) {
        return failure(KEY_INVALID_SESSION);
    }
    let Ok(node) = request.address.parse::<Address>() else {
        return failure("invalid_address");
    };
    if !signed_by(&login_message(&request.nonce, node), &request.signature, node) {
        return failure("invalid_signature");
    }
    if let Some(key) = state.forced.get("login") {
        return failure(key);
    }
    if !state.registered.contains_key(&node) {
        return failure(KEY_UNREGISTERED_NODE);
    }

    let token = Uuid::new_v4().to_string();
    state.sessions.insert(token.clone(), node);
    state.latest_session = Some(token.clone());
    success(LoginData { token })
}

async fn node_address(
    State(shared): State<Shared>,
    Json(request): Json<NodeAddressRequest>,
) -> Response {
    let mut state = shared.enter(|_| {}).await;

    let Ok(node) = request.node_address.parse::<Address>() else {
        return failure("invalid_address");
    };
    let message = node_address_message(&request.email, node);
    if !signed_by(&message, &request.signature, node) {
        return failure("invalid_signature");
    }
    if let Some(key) = state.forced.get("node-address") {
        return failure(key);
    }
    if state.registered.contains_key(&node) {
        return failure(KEY_ALREADY_REGISTERED);
    }
    if !state.whitelisted.contains(&(request.email.clone(), node)) {
        return failure(KEY_NOT_WHITELISTED);
    }

    state.registered.insert(node, request.email);
    success(Empty {})
}

fn known_vault(deployment: &str, vault: &str) -> bool {
    deployment == MOCK_DEPLOYMENT && vault.parse::<Address>().is_ok_and(|v| v == MOCK_VAULT)
}

async fn stakewise_vaults(
    State(shared): State<Shared>,
    Path(deployment): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = shared.enter(|c| c.vaults += 1).await;
    if let Err(response) = state.module_call(&headers, "vaults") {
        return response;
    }

    let mut vaults = Vec::new();
    if deployment == MOCK_DEPLOYMENT {
        vaults.push(VaultInfo {
            name: "Mock Vault".to_string(),
            address: MOCK_VAULT,
        });
    }
    success(VaultsData { vaults })
}

async fn stakewise_validators(
    State(shared): State<Shared>,
    Path((deployment, vault)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut state = shared.enter(|_| {}).await;
    if let Err(response) = state.module_call(&headers, "stakewise-validators") {
        return response;
    }
    if !known_vault(&deployment, &vault) {
        return failure(KEY_VAULT_NOT_FOUND);
    }

    success(StakeWiseValidatorsData {
        validators: vec![StakeWiseValidatorStatus {
            pubkey: MOCK_VALIDATOR_PUBKEY.to_string(),
            status: "REGISTERED".to_string(),
            exit_message_uploaded: true,
        }],
    })
}

async fn stakewise_validators_meta(
    State(shared): State<Shared>,
    Path((deployment, vault)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut state = shared.enter(|_| {}).await;
    if let Err(response) = state.module_call(&headers, "stakewise-meta") {
        return response;
    }
    if !known_vault(&deployment, &vault) {
        return failure(KEY_VAULT_NOT_FOUND);
    }

    success(ValidatorsMetaData {
        active: 1,
        max: 4,
        available: 3,
    })
}

async fn stakewise_post_validators(
    State(shared): State<Shared>,
    Path((deployment, vault)): Path<(String, String)>,
    headers: HeaderMap,
    Json(request): Json<PostValidatorsRequest>,
) -> Response {
    let mut state = shared.enter(|_| {}).await;
    if let Err(response) = state.module_call(&headers, "stakewise-post-validators") {
        return response;
    }
    if !known_vault(&deployment, &vault) {
        return failure(KEY_VAULT_NOT_FOUND);
    }
    if !state.deposit_roots.insert(request.beacon_deposit_root) {
        return failure(KEY_DEPOSIT_ROOT_ALREADY_ASSIGNED);
    }
    success(signature_data())
}

async fn constellation_whitelist(
    State(shared): State<Shared>,
    Path(_deployment): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = shared.enter(|_| {}).await;
    let node = match state.module_call(&headers, "constellation-whitelist") {
        Ok(node) => node,
        Err(response) => return response,
    };

    let whitelisted = state.constellation.contains(&node);
    success(WhitelistData {
        whitelisted,
        address: if whitelisted { node } else { Address::ZERO },
    })
}

async fn constellation_post_whitelist(
    State(shared): State<Shared>,
    Path(_deployment): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = shared.enter(|_| {}).await;
    let node = match state.module_call(&headers, "constellation-whitelist") {
        Ok(node) => node,
        Err(response) => return response,
    };

    state.constellation.insert(node);
    success(signature_data())
}

async fn constellation_deposit_signature(
    State(shared): State<Shared>,
    Path(_deployment): Path<String>,
    headers: HeaderMap,
    Json(_request): Json<MinipoolDepositSignatureRequest>,
) -> Response {
    let mut state = shared.enter(|_| {}).await;
    let node = match state.module_call(&headers, "constellation-deposit-signature") {
        Ok(node) => node,
        Err(response) => return response,
    };

    if !state.constellation.contains(&node) {
        return failure(KEY_NODE_UNAUTHORIZED);
    }
    success(signature_data())
}

async fn constellation_validators(
    State(shared): State<Shared>,
    Path(_deployment): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = shared.enter(|_| {}).await;
    if let Err(response) = state.module_call(&headers, "constellation-validators") {
        return response;
    }

    let uploaded = state
        .exits
        .iter()
        .any(|exit| exit.pubkey == MOCK_VALIDATOR_PUBKEY);
    success(ConstellationValidatorsData {
        validators: vec![ConstellationValidatorStatus {
            pubkey: MOCK_VALIDATOR_PUBKEY.to_string(),
            requires_exit_message: !uploaded,
        }],
    })
}

async fn constellation_upload_exits(
    State(shared): State<Shared>,
    Path(_deployment): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ExitMessagesRequest>,
) -> Response {
    let mut state = shared.enter(|_| {}).await;
    if let Err(response) = state.module_call(&headers, "constellation-exits") {
        return response;
    }

    state.exits.extend(request.exit_messages);
    success(Empty {})
}
