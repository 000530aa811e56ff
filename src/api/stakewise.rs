// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use alloy::primitives::{Address, B256};
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
        stakewise::{
            StakeWiseRegisteredValidatorsData, StakeWiseValidatorManagerSignatureData,
            StakeWiseValidatorsInfoData, StakeWiseVaultsData,
        },
        types::ExtendedDepositData,
    },
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct VaultQuery {
    pub deployment: String,
    /// Vault contract address.
    #[param(value_type = String)]
    pub vault: Address,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorManagerSignatureRequest {
    pub deployment: String,
    #[schema(value_type = String)]
    pub vault: Address,
    #[schema(value_type = String)]
    pub beacon_deposit_root: B256,
    pub deposit_data: Vec<ExtendedDepositData>,
    /// Exit messages encrypted to NodeSet's key, one per deposit.
    pub encrypted_exit_messages: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/nodeset/stakewise/get-vaults",
    params(DeploymentQuery),
    tag = "StakeWise",
    responses(
        (status = 200, body = StakeWiseVaultsData),
        (status = 409, description = "Node wallet is not ready", body = ErrorBody)
    )
)]
pub async fn get_vaults(
    State(state): State<AppState>,
    Query(query): Query<DeploymentQuery>,
) -> Result<Json<StakeWiseVaultsData>, ApiError> {
    let deployment = require_deployment(&query.deployment)?;
    if !check_registered(&state).await? {
        return Ok(Json(StakeWiseVaultsData {
            not_registered: true,
            ..Default::default()
        }));
    }
    Ok(Json(state.nodeset.stakewise_get_vaults(deployment).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/nodeset/stakewise/get-registered-validators",
    params(VaultQuery),
    tag = "StakeWise",
    responses(
        (status = 200, body = StakeWiseRegisteredValidatorsData),
        (status = 409, description = "Node wallet is not ready", body = ErrorBody)
    )
)]
pub async fn get_registered_validators(
    State(state): State<AppState>,
    Query(query): Query<VaultQuery>,
) -> Result<Json<StakeWiseRegisteredValidatorsData>, ApiError> {
    let deployment = require_deployment(&query.deployment)?;
    if !check_registered(&state).await? {
        return Ok(Json(StakeWiseRegisteredValidatorsData {
            not_registered: true,
            ..Default::default()
        }));
    }
    let data = state
        .nodeset
        .stakewise_get_registered_validators(deployment, query.vault)
        .await?;
    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/api/v1/nodeset/stakewise/get-validators-info",
    params(VaultQuery),
    tag = "StakeWise",
    responses(
        (status = 200, body = StakeWiseValidatorsInfoData),
        (status = 409, description = "Node wallet is not ready", body = ErrorBody)
    )
)]
pub async fn get_validators_info(
    State(state): State<AppState>,
    Query(query): Query<VaultQuery>,
) -> Result<Json<StakeWiseValidatorsInfoData>, ApiError> {
    let deployment = require_deployment(&query.deployment)?;
    if !check_registered(&state).await? {
        return Ok(Json(StakeWiseValidatorsInfoData {
            not_registered: true,
            ..Default::default()
        }));
    }
    let data = state
        .nodeset
        .stakewise_get_validators_info(deployment, query.vault)
        .await?;
    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/api/v1/nodeset/stakewise/get-validator-manager-signature",
    request_body = ValidatorManagerSignatureRequest,
    tag = "StakeWise",
    responses(
        (status = 200, body = StakeWiseValidatorManagerSignatureData),
        (status = 400, description = "Deposit data and exit messages don't line up", body = ErrorBody),
        (status = 409, description = "Node wallet is not ready", body = ErrorBody)
    )
)]
pub async fn get_validator_manager_signature(
    State(state): State<AppState>,
    Json(request): Json<ValidatorManagerSignatureRequest>,
) -> Result<Json<StakeWiseValidatorManagerSignatureData>, ApiError> {
    let deployment = require_deployment(&request.deployment)?;
    if !check_registered(&state).await? {
        return Ok(Json(StakeWiseValidatorManagerSignatureData {
            not_registered: true,
            ..Default::default()
        }));
    }
    let data = state
        .nodeset
        .stakewise_get_validator_manager_signature(
            deployment,
            request.vault,
            request.beacon_deposit_root,
            request.deposit_data,
            request.encrypted_exit_messages,
        )
        .await?;
    Ok(Json(data))
}
