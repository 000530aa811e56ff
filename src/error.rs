// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::nodeset::NodeSetError;
use crate::requirements::RequirementError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error_code: &'static str,
}

/// Error body returned by every daemon route.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub error_code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error_code,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", message)
    }

    pub fn wallet_not_ready(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "wallet_not_ready", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl From<NodeSetError> for ApiError {
    fn from(err: NodeSetError) -> Self {
        match err.root() {
            NodeSetError::WalletNotReady | NodeSetError::WalletNotLoaded => {
                Self::wallet_not_ready(err.to_string())
            }
            NodeSetError::InvalidEmail(_) | NodeSetError::InvalidInput(_) => {
                Self::bad_request(err.to_string())
            }
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "nodeset_error", err.to_string()),
        }
    }
}

impl From<RequirementError> for ApiError {
    fn from(err: RequirementError) -> Self {
        match err {
            RequirementError::NoKeystore
            | RequirementError::NoAddress
            | RequirementError::AddressMismatch
            | RequirementError::WalletNotReady => Self::wallet_not_ready(err.to_string()),
            RequirementError::NotRegisteredWithNodeSet => {
                Self::new(StatusCode::CONFLICT, "not_registered", err.to_string())
            }
            RequirementError::UnknownRegistrationStatus { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "nodeset_error", err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error_code = self.error_code, error = %self.message, "Request failed");
        }
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.error_code.to_string(),
        });
        (self.status, body).into_response()
    }
}
