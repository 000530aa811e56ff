// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wire types for the NodeSet v3 API.
//!
//! All bodies are camelCase JSON. Deposit data follows the staking deposit
//! CLI layout (snake_case), which NodeSet accepts verbatim.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response envelope wrapping every NodeSet reply.
#[derive(Debug, Deserialize, Serialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Successful envelope around `data`.
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            message: String::new(),
            error: String::new(),
            data: Some(data),
        }
    }
}

impl Envelope<Empty> {
    /// Failed envelope carrying an error key.
    pub fn failure(key: &str, message: &str) -> Self {
        Self {
            ok: false,
            message: message.to_string(),
            error: key.to_string(),
            data: Some(Empty {}),
        }
    }
}

/// Placeholder for endpoints that reply without data.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Empty {}

// =============================================================================
// Core
// =============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NonceData {
    /// One-time challenge to sign.
    pub nonce: String,
    /// Provisional session token bound to the nonce.
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub nonce: String,
    pub address: String,
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginData {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAddressRequest {
    pub email: String,
    pub node_address: String,
    pub signature: String,
}

// =============================================================================
// StakeWise
// =============================================================================

/// A StakeWise vault available on a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct VaultInfo {
    pub name: String,
    #[schema(value_type = String)]
    pub address: Address,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VaultsData {
    pub vaults: Vec<VaultInfo>,
}

/// Status of a validator NodeSet has on record for a vault.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StakeWiseValidatorStatus {
    pub pubkey: String,
    pub status: String,
    pub exit_message_uploaded: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StakeWiseValidatorsData {
    pub validators: Vec<StakeWiseValidatorStatus>,
}

/// Validator slot accounting for the node account on a vault.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidatorsMetaData {
    pub active: u32,
    pub max: u32,
    pub available: u32,
}

/// Deposit data for one validator, in deposit CLI format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct ExtendedDepositData {
    pub pubkey: String,
    pub withdrawal_credentials: String,
    pub amount: u64,
    pub signature: String,
    pub deposit_message_root: String,
    pub deposit_data_root: String,
    pub fork_version: String,
    pub network_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorRegistrationDetails {
    pub deposit_data: ExtendedDepositData,
    pub exit_message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostValidatorsRequest {
    pub validators: Vec<ValidatorRegistrationDetails>,
    pub beacon_deposit_root: B256,
}

/// A hex signature returned by NodeSet.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignatureData {
    pub signature: String,
}

// =============================================================================
// Constellation
// =============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhitelistData {
    pub whitelisted: bool,
    #[serde(default)]
    pub address: Address,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinipoolDepositSignatureRequest {
    pub minipool_address: Address,
    pub salt: U256,
}

/// A Constellation validator NodeSet has on record for the node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConstellationValidatorStatus {
    pub pubkey: String,
    pub requires_exit_message: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConstellationValidatorsData {
    pub validators: Vec<ConstellationValidatorStatus>,
}

/// An exit message for a validator, encrypted to NodeSet's public key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedExitData {
    pub pubkey: String,
    pub exit_message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitMessagesRequest {
    pub exit_messages: Vec<EncryptedExitData>,
}
