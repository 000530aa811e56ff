// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Liveness and readiness checks.
//!
//! Readiness only depends on the node wallet. NodeSet registration is
//! reported from the session cache so a health check never causes a login.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    nodeset::RegistrationStatus,
    requirements::{check_wallet_ready, RequirementError},
    state::AppState,
    wallet::WalletStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WalletReadiness {
    Ready,
    NoKeystore,
    NoAddress,
    AddressMismatch,
}

impl From<&WalletStatus> for WalletReadiness {
    fn from(status: &WalletStatus) -> Self {
        match check_wallet_ready(status) {
            Ok(()) => Self::Ready,
            Err(RequirementError::NoAddress) => Self::NoAddress,
            Err(RequirementError::AddressMismatch) => Self::AddressMismatch,
            Err(_) => Self::NoKeystore,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaemonHealth {
    pub status: HealthStatus,
    pub wallet: WalletReadiness,
    /// Cached NodeSet registration status.
    pub nodeset: RegistrationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Liveness {
    pub status: HealthStatus,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Node wallet is ready", body = DaemonHealth),
        (status = 503, description = "Node wallet is not ready", body = DaemonHealth)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<DaemonHealth>) {
    let wallet = WalletReadiness::from(&state.wallet().status().await);
    let (code, status) = match wallet {
        WalletReadiness::Ready => (StatusCode::OK, HealthStatus::Ok),
        _ => (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Degraded),
    };

    let body = DaemonHealth {
        status,
        wallet,
        nodeset: state.nodeset.cached_status().await,
        last_login: state.nodeset.last_login().await,
    };
    (code, Json(body))
}

#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses((status = 200, body = Liveness))
)]
pub async fn liveness() -> Json<Liveness> {
    Json(Liveness {
        status: HealthStatus::Ok,
    })
}
