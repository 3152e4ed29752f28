// src/error.rs
use ethers::contract::{ContractError, MulticallError};
use ethers::providers::{Middleware, MiddlewareError, ProviderError, RpcError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::utils::UnitsError;

#[derive(Debug, Error)]
pub enum DappError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input rejected before anything was sent to the chain.
    #[error("{0}")]
    Validation(String),

    #[error("invalid amount: {0}")]
    Units(#[from] UnitsError),

    /// A contract call or transaction failed. `message` is the best-effort
    /// reason extracted from the node response.
    #[error("{message}")]
    Contract { message: String },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("multicall failed: {0}")]
    Multicall(String),

    #[error("no signer configured, set PRIVATE_KEY")]
    NoSigner,

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("transaction {0} was dropped from the mempool")]
    Dropped(String),

    #[error("transaction {0} reverted")]
    Reverted(String),
}

impl DappError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl<M: Middleware> From<ContractError<M>> for DappError {
    fn from(err: ContractError<M>) -> Self {
        DappError::Contract {
            message: revert_message(&err),
        }
    }
}

impl<M: Middleware> From<MulticallError<M>> for DappError {
    fn from(err: MulticallError<M>) -> Self {
        match err {
            MulticallError::ContractError(inner) => inner.into(),
            other => DappError::Multicall(other.to_string()),
        }
    }
}

impl From<ProviderError> for DappError {
    fn from(err: ProviderError) -> Self {
        match RpcError::as_error_response(&err) {
            Some(resp) => DappError::Provider(resp.message.clone()),
            None => DappError::Provider(err.to_string()),
        }
    }
}

pub fn from_middleware<E: MiddlewareError>(err: E) -> DappError {
    match err.as_error_response() {
        Some(resp) => DappError::Provider(resp.message.clone()),
        None => DappError::Provider(err.to_string()),
    }
}

/// Best-effort reason for a failed contract call: the decoded
/// `Error(string)` revert reason, then the JSON-RPC error message, then the
/// display text of the error itself.
pub fn revert_message<M: Middleware>(err: &ContractError<M>) -> String {
    if let Some(reason) = err.decode_revert::<String>() {
        return reason;
    }
    if let Some(resp) = err
        .as_middleware_error()
        .and_then(MiddlewareError::as_error_response)
    {
        return resp.message.clone();
    }
    err.to_string()
}
