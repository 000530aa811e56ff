// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::str::FromStr;

use alloy::primitives::{Address, U256};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::{nodeset::check_registered, require_deployment, DeploymentQuery};
use crate::{
    error::{ApiError, ErrorBody},
    nodeset::{
        constellation::{
            ConstellationRegisteredAddressData, ConstellationSignatureData,
            ConstellationUploadExitsData, ConstellationValidatorsData,
        },
        types::EncryptedExitData,
    },
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct DepositSignatureQuery {
    pub deployment: String,
    #[param(value_type = String)]
    pub minipool_address: Address,
    /// Minipool salt, decimal or 0x-prefixed hex.
    pub salt: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadSignedExitsRequest {
    pub deployment: String,
    pub exit_messages: Vec<EncryptedExitData>,
}

#[utoipa::path(
    get,
    path = "/api/v1/nodeset/constellation/get-registered-address",
    params(DeploymentQuery),
    tag = "Constellation",
    responses(
        (status = 200, body = ConstellationRegisteredAddressData),
        (status = 409, description = "Node wallet is not ready", body = ErrorBody)
    )
)]
pub async fn get_registered_address(
    State(state): State<AppState>,
    Query(query): Query<DeploymentQuery>,
) -> Result<Json<ConstellationRegisteredAddressData>, ApiError> {
    let deployment = require_deployment(&query.deployment)?;
    if !check_registered(&state).await? {
        return Ok(Json(ConstellationRegisteredAddressData {
            not_registered: true,
            ..Default::default()
        }));
    }
    let data = state
        .nodeset
        .constellation_get_registered_address(deployment)
        .await?;
    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/api/v1/nodeset/constellation/get-registration-signature",
    params(DeploymentQuery),
    tag = "Constellation",
    responses(
        (status = 200, body = ConstellationSignatureData),
        (status = 409, description = "Node wallet is not ready", body = ErrorBody)
    )
)]
pub async fn get_registration_signature(
    State(state): State<AppState>,
    Query(query): Query<DeploymentQuery>,
) -> Result<Json<ConstellationSignatureData>, ApiError> {
    let deployment = require_deployment(&query.deployment)?;
    if !check_registered(&state).await? {
        return Ok(Json(ConstellationSignatureData {
            not_registered: true,
            ..Default::default()
        }));
    }
    let data = state
        .nodeset
        .constellation_get_registration_signature(deployment)
        .await?;
    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/api/v1/nodeset/constellation/get-deposit-signature",
    params(DepositSignatureQuery),
    tag = "Constellation",
    responses(
        (status = 200, body = ConstellationSignatureData),
        (status = 400, description = "Invalid salt", body = ErrorBody),
        (status = 409, description = "Node wallet is not ready", body = ErrorBody)
    )
)]
pub async fn get_deposit_signature(
    State(state): State<AppState>,
    Query(query): Query<DepositSignatureQuery>,
) -> Result<Json<ConstellationSignatureData>, ApiError> {
    let deployment = require_deployment(&query.deployment)?;
    let salt = U256::from_str(query.salt.trim())
        .map_err(|e| ApiError::bad_request(format!("invalid salt '{}': {e}", query.salt)))?;

    if !check_registered(&state).await? {
        return Ok(Json(ConstellationSignatureData {
            not_registered: true,
            ..Default::default()
        }));
    }
    let data = state
        .nodeset
        .constellation_get_deposit_signature(deployment, query.minipool_address, salt)
        .await?;
    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/api/v1/nodeset/constellation/get-validators",
    params(DeploymentQuery),
    tag = "Constellation",
    responses(
        (status = 200, body = ConstellationValidatorsData),
        (status = 409, description = "Node wallet is not ready", body = ErrorBody)
    )
)]
pub async fn get_validators(
    State(state): State<AppState>,
    Query(query): Query<DeploymentQuery>,
) -> Result<Json<ConstellationValidatorsData>, ApiError> {
    let deployment = require_deployment(&query.deployment)?;
    if !check_registered(&state).await? {
        return Ok(Json(ConstellationValidatorsData {
            not_registered: true,
            ..Default::default()
        }));
    }
    let data = state.nodeset.constellation_get_validators(deployment).await?;
    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/api/v1/nodeset/constellation/upload-signed-exits",
    request_body = UploadSignedExitsRequest,
    tag = "Constellation",
    responses(
        (status = 200, body = ConstellationUploadExitsData),
        (status = 409, description = "Node wallet is not ready", body = ErrorBody)
    )
)]
pub async fn upload_signed_exits(
    State(state): State<AppState>,
    Json(request): Json<UploadSignedExitsRequest>,
) -> Result<Json<ConstellationUploadExitsData>, ApiError> {
    let deployment = require_deployment(&request.deployment)?;
    if !check_registered(&state).await? {
        return Ok(Json(ConstellationUploadExitsData {
            not_registered: true,
            ..Default::default()
        }));
    }
    let data = state
        .nodeset
        .constellation_upload_signed_exits(deployment, request.exit_messages)
        .await?;
    Ok(Json(data))
}
