// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! StakeWise module operations.
//!
//! Well-known NodeSet error keys come back as flags on the result so callers
//! can branch on them without inspecting errors.

use alloy::primitives::{Address, B256};
use serde::Serialize;
use utoipa::ToSchema;

use super::error::NodeSetError;
use super::manager::NodeSetServiceManager;
use super::types::{
    ExtendedDepositData, PostValidatorsRequest, StakeWiseValidatorStatus,
    ValidatorRegistrationDetails, VaultInfo,
};

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StakeWiseVaultsData {
    pub not_registered: bool,
    pub invalid_permissions: bool,
    pub vaults: Vec<VaultInfo>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StakeWiseRegisteredValidatorsData {
    pub not_registered: bool,
    pub invalid_permissions: bool,
    pub vault_not_found: bool,
    pub validators: Vec<StakeWiseValidatorStatus>,
}

/// Validator slot accounting for the node account on a vault.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StakeWiseValidatorsInfoData {
    pub not_registered: bool,
    pub vault_not_found: bool,
    pub active: u32,
    pub max: u32,
    pub available: u32,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StakeWiseValidatorManagerSignatureData {
    pub not_registered: bool,
    pub vault_not_found: bool,
    pub invalid_permissions: bool,
    pub deposit_root_already_used: bool,
    pub signature: String,
}

impl NodeSetServiceManager {
    /// Vaults available to the node's user on `deployment`.
    pub async fn stakewise_get_vaults(
        &self,
        deployment: &str,
    ) -> Result<StakeWiseVaultsData, NodeSetError> {
        let mut session = self.session.lock().await;
        tracing::debug!(deployment, "Getting StakeWise vaults");

        let result = self
            .run_request(&mut session, |token| {
                self.client.stakewise_vaults(token, deployment)
            })
            .await;

        match result {
            Ok(data) => Ok(StakeWiseVaultsData {
                vaults: data.vaults,
                ..Default::default()
            }),
            Err(NodeSetError::InvalidPermissions) => Ok(StakeWiseVaultsData {
                invalid_permissions: true,
                ..Default::default()
            }),
            Err(e) => Err(e.during("getting StakeWise vaults")),
        }
    }

    /// Validators NodeSet has on record for the node on `vault`.
    pub async fn stakewise_get_registered_validators(
        &self,
        deployment: &str,
        vault: Address,
    ) -> Result<StakeWiseRegisteredValidatorsData, NodeSetError> {
        let mut session = self.session.lock().await;
        tracing::debug!(deployment, %vault, "Getting registered validators");

        let result = self
            .run_request(&mut session, |token| {
                self.client.stakewise_validators(token, deployment, vault)
            })
            .await;

        match result {
            Ok(data) => Ok(StakeWiseRegisteredValidatorsData {
                validators: data.validators,
                ..Default::default()
            }),
            Err(NodeSetError::InvalidPermissions) => Ok(StakeWiseRegisteredValidatorsData {
                invalid_permissions: true,
                ..Default::default()
            }),
            Err(NodeSetError::VaultNotFound) => Ok(StakeWiseRegisteredValidatorsData {
                vault_not_found: true,
                ..Default::default()
            }),
            Err(e) => Err(e.during("getting registered validators")),
        }
    }

    pub async fn stakewise_get_validators_info(
        &self,
        deployment: &str,
        vault: Address,
    ) -> Result<StakeWiseValidatorsInfoData, NodeSetError> {
        let mut session = self.session.lock().await;
        tracing::debug!(deployment, %vault, "Getting server validators info for node account");

        let result = self
            .run_request(&mut session, |token| {
                self.client.stakewise_validators_meta(token, deployment, vault)
            })
            .await;

        match result {
            Ok(meta) => Ok(StakeWiseValidatorsInfoData {
                active: meta.active,
                max: meta.max,
                available: meta.available,
                ..Default::default()
            }),
            Err(NodeSetError::VaultNotFound) => Ok(StakeWiseValidatorsInfoData {
                vault_not_found: true,
                ..Default::default()
            }),
            Err(e) => Err(e.during("getting validators info for node account")),
        }
    }

    /// Submit deposit data and encrypted exit messages and have NodeSet sign
    /// them for the vault's validators manager.
    pub async fn stakewise_get_validator_manager_signature(
        &self,
        deployment: &str,
        vault: Address,
        beacon_deposit_root: B256,
        deposit_data: Vec<ExtendedDepositData>,
        encrypted_exit_messages: Vec<String>,
    ) -> Result<StakeWiseValidatorManagerSignatureData, NodeSetError> {
        if deposit_data.len() != encrypted_exit_messages.len() {
            return Err(NodeSetError::InvalidInput(format!(
                "deposit data and exit messages lengths don't match ({} vs {})",
                deposit_data.len(),
                encrypted_exit_messages.len()
            )));
        }

        let body = PostValidatorsRequest {
            validators: deposit_data
                .into_iter()
                .zip(encrypted_exit_messages)
                .map(|(deposit_data, exit_message)| ValidatorRegistrationDetails {
                    deposit_data,
                    exit_message,
                })
                .collect(),
            beacon_deposit_root,
        };

        let mut session = self.session.lock().await;
        tracing::debug!(
            deployment,
            %vault,
            validators = body.validators.len(),
            "Getting validators manager signature"
        );

        let result = self
            .run_request(&mut session, |token| {
                self.client
                    .stakewise_post_validators(token, deployment, vault, &body)
            })
            .await;

        match result {
            Ok(data) => Ok(StakeWiseValidatorManagerSignatureData {
                signature: data.signature,
                ..Default::default()
            }),
            Err(NodeSetError::VaultNotFound) => Ok(StakeWiseValidatorManagerSignatureData {
                vault_not_found: true,
                ..Default::default()
            }),
            Err(NodeSetError::InvalidPermissions) => Ok(StakeWiseValidatorManagerSignatureData {
                invalid_permissions: true,
                ..Default::default()
            }),
            Err(NodeSetError::DepositRootAlreadyAssigned) => {
                Ok(StakeWiseValidatorManagerSignatureData {
                    deposit_root_already_used: true,
                    ..Default::default()
                })
            }
            Err(e) => Err(e.during("getting validator manager signature")),
        }
    }
}
