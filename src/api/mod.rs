// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Daemon HTTP API.
//!
//! Routes live under `/api/v1`; health checks and the OpenAPI UI sit at the
//! root.

use axum::{
    body::Body,
    http::HeaderName,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::{ApiError, ErrorBody},
    logging::{self, MakeRequestUuidV4, REQUEST_ID_HEADER},
    nodeset::{
        constellation::{
            ConstellationRegisteredAddressData, ConstellationSignatureData,
            ConstellationUploadExitsData, ConstellationValidatorsData,
        },
        stakewise::{
            StakeWiseRegisteredValidatorsData, StakeWiseValidatorManagerSignatureData,
            StakeWiseValidatorsInfoData, StakeWiseVaultsData,
        },
        types::{
            ConstellationValidatorStatus, EncryptedExitData, ExtendedDepositData,
            StakeWiseValidatorStatus, VaultInfo,
        },
        RegistrationStatus,
    },
    state::AppState,
    wallet::{AddressStatus, KeystoreStatus, WalletStatus},
};

pub mod constellation;
pub mod health;
pub mod nodeset;
pub mod stakewise;
pub mod wallet;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeploymentQuery {
    /// NodeSet deployment name.
    pub deployment: String,
}

pub(crate) fn require_deployment(deployment: &str) -> Result<&str, ApiError> {
    let deployment = deployment.trim();
    if deployment.is_empty() {
        return Err(ApiError::bad_request("deployment is required"));
    }
    Ok(deployment)
}

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/nodeset/get-registration-status",
            get(nodeset::get_registration_status),
        )
        .route("/nodeset/register-node", post(nodeset::register_node))
        .route("/nodeset/stakewise/get-vaults", get(stakewise::get_vaults))
        .route(
            "/nodeset/stakewise/get-registered-validators",
            get(stakewise::get_registered_validators),
        )
        .route(
            "/nodeset/stakewise/get-validators-info",
            get(stakewise::get_validators_info),
        )
        .route(
            "/nodeset/stakewise/get-validator-manager-signature",
            post(stakewise::get_validator_manager_signature),
        )
        .route(
            "/nodeset/constellation/get-registered-address",
            get(constellation::get_registered_address),
        )
        .route(
            "/nodeset/constellation/get-registration-signature",
            get(constellation::get_registration_signature),
        )
        .route(
            "/nodeset/constellation/get-deposit-signature",
            get(constellation::get_deposit_signature),
        )
        .route(
            "/nodeset/constellation/get-validators",
            get(constellation::get_validators),
        )
        .route(
            "/nodeset/constellation/upload-signed-exits",
            post(constellation::upload_signed_exits),
        )
        .route("/wallet/status", get(wallet::wallet_status))
        .with_state(state.clone());

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state)
        .nest("/api/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http().make_span_with(logging::request_span::<Body>))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuidV4))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        nodeset::get_registration_status,
        nodeset::register_node,
        stakewise::get_vaults,
        stakewise::get_registered_validators,
        stakewise::get_validators_info,
        stakewise::get_validator_manager_signature,
        constellation::get_registered_address,
        constellation::get_registration_signature,
        constellation::get_deposit_signature,
        constellation::get_validators,
        constellation::upload_signed_exits,
        wallet::wallet_status
    ),
    components(
        schemas(
            ErrorBody,
            RegistrationStatus,
            nodeset::RegistrationStatusResponse,
            nodeset::RegisterNodeRequest,
            nodeset::RegisterNodeResponse,
            StakeWiseVaultsData,
            StakeWiseRegisteredValidatorsData,
            StakeWiseValidatorsInfoData,
            StakeWiseValidatorManagerSignatureData,
            stakewise::ValidatorManagerSignatureRequest,
            ConstellationRegisteredAddressData,
            ConstellationSignatureData,
            ConstellationValidatorsData,
            ConstellationUploadExitsData,
            constellation::UploadSignedExitsRequest,
            VaultInfo,
            StakeWiseValidatorStatus,
            ConstellationValidatorStatus,
            ExtendedDepositData,
            EncryptedExitData,
            WalletStatus,
            AddressStatus,
            KeystoreStatus,
            wallet::WalletStatusResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "NodeSet", description = "NodeSet registration and session status"),
        (name = "StakeWise", description = "StakeWise vaults and validator signatures"),
        (name = "Constellation", description = "Constellation whitelist, deposits and exits"),
        (name = "Wallet", description = "Node wallet status")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::testing::{test_state, MockNodeSet, MOCK_DEPLOYMENT};
    use crate::wallet::keys::tests::DEV_ADDRESS;

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value, Option<String>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body, request_id)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/api/v1/nodeset/get-registration-status".to_string()));
        assert!(paths.contains(&"/api/v1/nodeset/constellation/upload-signed-exits".to_string()));
        assert!(paths.contains(&"/health/live".to_string()));
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let mock = MockNodeSet::start().await;
        let app = router(test_state(&mock, false).await);

        let (status, _, request_id) = call(app.clone(), get_request("/health/live")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(uuid::Uuid::parse_str(&request_id.unwrap()).is_ok());

        let request = Request::builder()
            .uri("/health/live")
            .header(REQUEST_ID_HEADER, "caller-supplied")
            .body(Body::empty())
            .unwrap();
        let (_, _, request_id) = call(app, request).await;
        assert_eq!(request_id.as_deref(), Some("caller-supplied"));
    }

    #[tokio::test]
    async fn module_route_without_wallet_is_conflict() {
        let mock = MockNodeSet::start().await;
        let app = router(test_state(&mock, false).await);

        let uri = format!("/api/v1/nodeset/stakewise/get-vaults?deployment={MOCK_DEPLOYMENT}");
        let (status, body, _) = call(app, get_request(&uri)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error_code"], "wallet_not_ready");
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn bad_vault_query_is_bad_request() {
        let mock = MockNodeSet::start().await;
        let app = router(test_state(&mock, true).await);

        let uri = format!(
            "/api/v1/nodeset/stakewise/get-validators-info?deployment={MOCK_DEPLOYMENT}&vault=nope"
        );
        let (status, _, _) = call(app, get_request(&uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn registration_flow_over_http() {
        let mock = MockNodeSet::start().await;
        let app = router(test_state(&mock, true).await);

        let (_, body, _) = call(app.clone(), get_request("/api/v1/nodeset/get-registration-status")).await;
        assert_eq!(body["status"], "unregistered");
        assert_eq!(body["errorMessage"], "");

        mock.whitelist("test@nodeset.io", DEV_ADDRESS);
        let (status, body, _) = call(
            app.clone(),
            post_json(
                "/api/v1/nodeset/register-node",
                serde_json::json!({ "email": "test@nodeset.io" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["alreadyRegistered"], false);

        let (_, body, _) = call(app.clone(), get_request("/api/v1/nodeset/get-registration-status")).await;
        assert_eq!(body["status"], "registered");

        let uri = format!("/api/v1/nodeset/constellation/get-validators?deployment={MOCK_DEPLOYMENT}");
        let (status, body, _) = call(app, get_request(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notRegistered"], false);
        assert_eq!(body["validators"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_email_is_bad_request() {
        let mock = MockNodeSet::start().await;
        let app = router(test_state(&mock, true).await);

        let (status, body, _) = call(
            app,
            post_json(
                "/api/v1/nodeset/register-node",
                serde_json::json!({ "email": "nodeset.io" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "invalid_input");
    }

    #[tokio::test]
    async fn wallet_status_route() {
        let mock = MockNodeSet::start().await;
        let app = router(test_state(&mock, true).await);

        let (status, body, _) = call(app, get_request("/api/v1/wallet/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["walletStatus"]["wallet"]["isLoaded"], true);
        assert_eq!(body["walletStatus"]["address"]["hasAddress"], true);
    }
}
