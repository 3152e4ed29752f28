// src/server.rs
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::{Router, routing::get};
use ethers::providers::Middleware;
use ethers::types::Address;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::error::DappError;
use crate::ico::IcoClient;
use crate::models::{ContractData, IcoData, TokenInfo};
use crate::staking::StakingClient;

pub struct AppState<M> {
    pub staking: StakingClient<M>,
    pub ico: IcoClient<M>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid address: {0}")]
    BadAddress(String),
    #[error(transparent)]
    Chain(#[from] DappError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadAddress(_) => StatusCode::BAD_REQUEST,
            Self::Chain(_) => StatusCode::BAD_GATEWAY,
        };
        if let Self::Chain(err) = &self {
            warn!(error = %err, "read request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_address(raw: &str) -> Result<Address, ApiError> {
    raw.parse::<Address>()
        .map_err(|_| ApiError::BadAddress(raw.to_string()))
}

pub fn router<M: Middleware + 'static>(state: Arc<AppState<M>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/contract-data/{address}", get(contract_data::<M>))
        .route("/ico/{address}", get(ico::<M>))
        .route("/tokens/{token}/{address}", get(token::<M>))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn contract_data<M: Middleware + 'static>(
    State(state): State<Arc<AppState<M>>>,
    Path(address): Path<String>,
) -> Result<Json<ContractData>, ApiError> {
    let user = parse_address(&address)?;
    Ok(Json(state.staking.contract_data(user).await?))
}

async fn ico<M: Middleware + 'static>(
    State(state): State<Arc<AppState<M>>>,
    Path(address): Path<String>,
) -> Result<Json<IcoData>, ApiError> {
    let user = parse_address(&address)?;
    Ok(Json(state.ico.load(user).await?))
}

async fn token<M: Middleware + 'static>(
    State(state): State<Arc<AppState<M>>>,
    Path((token, address)): Path<(String, String)>,
) -> Result<Json<TokenInfo>, ApiError> {
    let token = parse_address(&token)?;
    let user = parse_address(&address)?;
    Ok(Json(state.staking.tokens().token_info(token, user).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::notify::LogNotifier;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use ethers::providers::{MockProvider, Provider};
    use tower::ServiceExt;

    fn app() -> Router {
        let (provider, _mock) = Provider::mocked();
        let client: Arc<Provider<MockProvider>> = Arc::new(provider);
        let config = test_config();
        let notifier = Arc::new(LogNotifier);
        let state = AppState {
            staking: StakingClient::new(client.clone(), &config, notifier.clone()),
            ico: IcoClient::new(client, &config, notifier),
        };
        router(Arc::new(state))
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bad_address_is_rejected() {
        let response = app()
            .oneshot(
                Request::get("/contract-data/not-an-address")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], 400);
    }

    #[tokio::test]
    async fn chain_failure_maps_to_bad_gateway() {
        let response = app()
            .oneshot(
                Request::get("/ico/0x00000000000000000000000000000000000000aa")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
