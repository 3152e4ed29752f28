// src/tx.rs
use ethers::abi::Detokenize;
use ethers::contract::ContractCall;
use ethers::providers::Middleware;
use ethers::types::{TransactionReceipt, U64, U256};
use tracing::{error, info};

use crate::error::DappError;
use crate::notify::Notifier;

/// Gas limit policy for a submitted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gas {
    Estimate,
    Fixed(u64),
}

/// Sends `call` with the chosen gas limit and waits for `confirmations`.
/// A missing receipt or a receipt with status 0 is an error.
pub async fn submit<M, D>(
    call: ContractCall<M, D>,
    gas: Gas,
    confirmations: usize,
) -> Result<TransactionReceipt, DappError>
where
    M: Middleware + 'static,
    D: Detokenize,
{
    let limit = match gas {
        Gas::Estimate => call.estimate_gas().await?,
        Gas::Fixed(limit) => U256::from(limit),
    };
    let call = call.gas(limit);

    let pending = call.send().await?;
    let tx_hash = format!("{:?}", *pending);
    info!(tx = %tx_hash, gas = %limit, "transaction submitted");

    let receipt = pending
        .confirmations(confirmations)
        .await?
        .ok_or_else(|| DappError::Dropped(tx_hash.clone()))?;
    if receipt.status == Some(U64::zero()) {
        return Err(DappError::Reverted(tx_hash));
    }

    info!(tx = %tx_hash, block = ?receipt.block_number, gas_used = ?receipt.gas_used, "transaction confirmed");
    Ok(receipt)
}

/// Logs a failed action and shows its message to the user.
pub fn report<T>(
    notifier: &dyn Notifier,
    action: &str,
    result: Result<T, DappError>,
) -> Result<T, DappError> {
    if let Err(err) = &result {
        error!(action, error = ?err, "action failed");
        notifier.error(&err.user_message());
    }
    result
}

pub fn require_text<'a>(value: &'a str, message: &str) -> Result<&'a str, DappError> {
    let value = value.trim();
    if value.is_empty() {
        Err(DappError::Validation(message.to_string()))
    } else {
        Ok(value)
    }
}
