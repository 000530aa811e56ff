// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ErrorBody},
    nodeset::{RegistrationResult, RegistrationStatus},
    requirements::{self, RequirementError},
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatusResponse {
    pub status: RegistrationStatus,
    /// Why the status could not be determined, when it is `unknown`.
    pub error_message: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterNodeRequest {
    pub email: String,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterNodeResponse {
    pub success: bool,
    pub already_registered: bool,
    pub not_whitelisted: bool,
}

/// Preconditions shared by the module routes.
///
/// Returns `Ok(false)` when the wallet is ready but the node isn't registered,
/// which routes report as a `notRegistered` flag instead of an error.
pub(crate) async fn check_registered(state: &AppState) -> Result<bool, ApiError> {
    requirements::require_wallet_ready(state.wallet()).await?;
    match requirements::require_registered_with_nodeset(&state.nodeset).await {
        Ok(()) => Ok(true),
        Err(RequirementError::NotRegisteredWithNodeSet) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/nodeset/get-registration-status",
    tag = "NodeSet",
    responses((status = 200, body = RegistrationStatusResponse))
)]
pub async fn get_registration_status(
    State(state): State<AppState>,
) -> Json<RegistrationStatusResponse> {
    let (status, err) = state.nodeset.get_registration_status().await;
    let error_message = match (status, err) {
        (RegistrationStatus::Unknown, Some(e)) => e.to_string(),
        _ => String::new(),
    };
    Json(RegistrationStatusResponse {
        status,
        error_message,
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/nodeset/register-node",
    request_body = RegisterNodeRequest,
    tag = "NodeSet",
    responses(
        (status = 200, body = RegisterNodeResponse),
        (status = 400, description = "Malformed email", body = ErrorBody),
        (status = 409, description = "Node wallet is not loaded", body = ErrorBody)
    )
)]
pub async fn register_node(
    State(state): State<AppState>,
    Json(request): Json<RegisterNodeRequest>,
) -> Result<Json<RegisterNodeResponse>, ApiError> {
    let result = state.nodeset.register_node(&request.email).await?;

    let mut response = RegisterNodeResponse::default();
    match result {
        RegistrationResult::Success => response.success = true,
        RegistrationResult::AlreadyRegistered => response.already_registered = true,
        RegistrationResult::NotWhitelisted => response.not_whitelisted = true,
        RegistrationResult::Unknown => {
            return Err(ApiError::internal("unknown registration result"));
        }
    }
    Ok(Json(response))
}
