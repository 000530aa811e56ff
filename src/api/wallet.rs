// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{state::AppState, wallet::WalletStatus};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatusResponse {
    pub wallet_status: WalletStatus,
}

#[utoipa::path(
    get,
    path = "/api/v1/wallet/status",
    tag = "Wallet",
    responses((status = 200, body = WalletStatusResponse))
)]
pub async fn wallet_status(State(state): State<AppState>) -> Json<WalletStatusResponse> {
    Json(WalletStatusResponse {
        wallet_status: state.wallet().status().await,
    })
}
