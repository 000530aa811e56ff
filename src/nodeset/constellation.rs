// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Constellation module operations.

use alloy::primitives::{Address, Bytes, U256};
use serde::Serialize;
use utoipa::ToSchema;

use super::error::NodeSetError;
use super::manager::NodeSetServiceManager;
use super::types::{
    ConstellationValidatorStatus, EncryptedExitData, ExitMessagesRequest,
    MinipoolDepositSignatureRequest,
};

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConstellationRegisteredAddressData {
    pub not_registered: bool,
    pub invalid_permissions: bool,
    pub is_registered: bool,
    /// Address the user registered for Constellation, if any.
    #[schema(value_type = Option<String>)]
    pub registered_address: Option<Address>,
}

/// A NodeSet signature over a Constellation contract message.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConstellationSignatureData {
    pub not_registered: bool,
    pub not_authorized: bool,
    pub invalid_permissions: bool,
    pub incorrect_node_address: bool,
    #[schema(value_type = String)]
    pub signature: Bytes,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConstellationValidatorsData {
    pub not_registered: bool,
    pub invalid_permissions: bool,
    pub validators: Vec<ConstellationValidatorStatus>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConstellationUploadExitsData {
    pub not_registered: bool,
    pub invalid_permissions: bool,
    pub incorrect_node_address: bool,
}

fn decode_signature(signature: &str) -> Result<Bytes, NodeSetError> {
    alloy::hex::decode(signature)
        .map(Bytes::from)
        .map_err(|e| NodeSetError::InvalidResponse(format!("error decoding signature from server: {e}")))
}

/// Fold the errors shared by the signature endpoints into flags.
fn signature_result(
    result: Result<String, NodeSetError>,
    operation: &'static str,
) -> Result<ConstellationSignatureData, NodeSetError> {
    let flags = match result {
        Ok(signature) => {
            return Ok(ConstellationSignatureData {
                signature: decode_signature(&signature).map_err(|e| e.during(operation))?,
                ..Default::default()
            });
        }
        Err(NodeSetError::NodeUnauthorized) => ConstellationSignatureData {
            not_authorized: true,
            ..Default::default()
        },
        Err(NodeSetError::InvalidPermissions) => ConstellationSignatureData {
            invalid_permissions: true,
            ..Default::default()
        },
        Err(NodeSetError::IncorrectNodeAddress) => ConstellationSignatureData {
            incorrect_node_address: true,
            ..Default::default()
        },
        Err(e) => return Err(e.during(operation)),
    };
    Ok(flags)
}

impl NodeSetServiceManager {
    /// Address the node's user registered for Constellation.
    ///
    /// `registered_address` is `None` while the user hasn't registered one.
    pub async fn constellation_get_registered_address(
        &self,
        deployment: &str,
    ) -> Result<ConstellationRegisteredAddressData, NodeSetError> {
        let mut session = self.session.lock().await;
        tracing::debug!(deployment, "Getting registered Constellation address");

        let result = self
            .run_request(&mut session, |token| {
                self.client.constellation_whitelist(token, deployment)
            })
            .await;

        match result {
            Ok(data) => {
                tracing::debug!(
                    whitelisted = data.whitelisted,
                    address = %data.address,
                    "NodeSet responded"
                );
                Ok(ConstellationRegisteredAddressData {
                    is_registered: data.whitelisted,
                    registered_address: data.whitelisted.then_some(data.address),
                    ..Default::default()
                })
            }
            Err(NodeSetError::InvalidPermissions) => Ok(ConstellationRegisteredAddressData {
                invalid_permissions: true,
                ..Default::default()
            }),
            Err(e) => Err(e.during("getting registered Constellation address")),
        }
    }

    /// Signature for whitelisting the node with the Constellation contracts.
    pub async fn constellation_get_registration_signature(
        &self,
        deployment: &str,
    ) -> Result<ConstellationSignatureData, NodeSetError> {
        let mut session = self.session.lock().await;
        tracing::debug!(deployment, "Registering with the Constellation contracts");

        let result = self
            .run_request(&mut session, |token| {
                self.client.constellation_post_whitelist(token, deployment)
            })
            .await
            .map(|data| data.signature);

        signature_result(result, "registering with Constellation")
    }

    /// Signature permitting a minipool deposit.
    pub async fn constellation_get_deposit_signature(
        &self,
        deployment: &str,
        minipool_address: Address,
        salt: U256,
    ) -> Result<ConstellationSignatureData, NodeSetError> {
        let body = MinipoolDepositSignatureRequest {
            minipool_address,
            salt,
        };

        let mut session = self.session.lock().await;
        tracing::debug!(deployment, minipool = %minipool_address, "Getting minipool deposit signature");

        let result = self
            .run_request(&mut session, |token| {
                self.client
                    .constellation_deposit_signature(token, deployment, &body)
            })
            .await
            .map(|data| data.signature);

        signature_result(result, "getting deposit signature")
    }

    pub async fn constellation_get_validators(
        &self,
        deployment: &str,
    ) -> Result<ConstellationValidatorsData, NodeSetError> {
        let mut session = self.session.lock().await;
        tracing::debug!(deployment, "Getting validators for node");

        let result = self
            .run_request(&mut session, |token| {
                self.client.constellation_validators(token, deployment)
            })
            .await;

        match result {
            Ok(data) => Ok(ConstellationValidatorsData {
                validators: data.validators,
                ..Default::default()
            }),
            Err(NodeSetError::InvalidPermissions) => Ok(ConstellationValidatorsData {
                invalid_permissions: true,
                ..Default::default()
            }),
            Err(e) => Err(e.during("getting validators for node")),
        }
    }

    /// Upload signed, encrypted exit messages for the node's minipools.
    pub async fn constellation_upload_signed_exits(
        &self,
        deployment: &str,
        exit_messages: Vec<EncryptedExitData>,
    ) -> Result<ConstellationUploadExitsData, NodeSetError> {
        let body = ExitMessagesRequest { exit_messages };

        let mut session = self.session.lock().await;
        tracing::debug!(
            deployment,
            count = body.exit_messages.len(),
            "Submitting signed exit messages to NodeSet"
        );

        let result = self
            .run_request(&mut session, |token| {
                self.client
                    .constellation_upload_exits(token, deployment, &body)
            })
            .await;

        match result {
            Ok(()) => Ok(ConstellationUploadExitsData::default()),
            Err(NodeSetError::InvalidPermissions) => Ok(ConstellationUploadExitsData {
                invalid_permissions: true,
                ..Default::default()
            }),
            Err(NodeSetError::IncorrectNodeAddress) => Ok(ConstellationUploadExitsData {
                incorrect_node_address: true,
                ..Default::default()
            }),
            Err(e) => Err(e.during("submitting signed exit messages")),
        }
    }
}
