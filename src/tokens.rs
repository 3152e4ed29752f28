// src/tokens.rs
use ethers::contract::Multicall;
use ethers::providers::Middleware;
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::debug;

use crate::ERC20;
use crate::config::Config;
use crate::error::{DappError, from_middleware};
use crate::models::TokenInfo;
use crate::utils;

/// Reads ERC-20 snapshots, batching the per-token calls through Multicall3.
#[derive(Debug, Clone)]
pub struct TokenReader<M> {
    client: Arc<M>,
    multicall: Address,
    /// Contract whose holdings are reported as `contract_token_balance`.
    holder: Address,
    native_decimals: u8,
}

impl<M: Middleware + 'static> TokenReader<M> {
    pub fn new(client: Arc<M>, config: &Config) -> Self {
        Self {
            client,
            multicall: config.multicall,
            holder: config.contracts.staking_dapp,
            native_decimals: config.network.decimals,
        }
    }

    pub fn native_decimals(&self) -> u8 {
        self.native_decimals
    }

    pub fn erc20(&self, token: Address) -> ERC20<M> {
        ERC20::new(token, self.client.clone())
    }

    pub async fn decimals(&self, token: Address) -> Result<u8, DappError> {
        Ok(self.erc20(token).decimals().call().await?)
    }

    pub async fn token_info(&self, token: Address, user: Address) -> Result<TokenInfo, DappError> {
        debug!(%token, %user, "reading token snapshot");
        let erc20 = self.erc20(token);

        let mut multicall = Multicall::new(self.client.clone(), Some(self.multicall)).await?;
        multicall
            .add_call(erc20.name(), false)
            .add_call(erc20.symbol(), false)
            .add_call(erc20.decimals(), false)
            .add_call(erc20.total_supply(), false)
            .add_call(erc20.balance_of(user), false)
            .add_call(erc20.balance_of(self.holder), false);
        let (name, symbol, decimals, total_supply, balance, held): (String, String, u8, U256, U256, U256) =
            multicall.call().await?;

        let native = self
            .client
            .get_balance(user, None)
            .await
            .map_err(from_middleware)?;

        Ok(TokenInfo {
            address: token,
            name,
            symbol,
            decimals,
            total_supply: utils::format_units(total_supply, decimals),
            balance: utils::format_units(balance, decimals),
            native_balance: utils::format_units(native, self.native_decimals),
            contract_token_balance: utils::format_units(held, decimals),
        })
    }
}

/// Canned JSON-RPC answers for `Provider::mocked()`.
#[cfg(test)]
pub(crate) mod mock {
    use ethers::abi::{Token, encode};
    use ethers::providers::MockProvider;
    use ethers::types::{Bytes, U256};
    use serde_json::Value;

    /// Queues answers in call order. The mock pops the newest answer first.
    pub(crate) fn queue(mock: &MockProvider, answers: Vec<Value>) {
        for answer in answers.into_iter().rev() {
            mock.push::<Value, _>(answer).unwrap();
        }
    }

    pub(crate) fn returns(tokens: &[Token]) -> Value {
        serde_json::to_value(Bytes::from(encode(tokens))).unwrap()
    }

    pub(crate) fn uint(value: U256) -> Value {
        returns(&[Token::Uint(value)])
    }

    pub(crate) fn balance(value: U256) -> Value {
        serde_json::to_value(value).unwrap()
    }

    /// Multicall3 `aggregate3` answer for one token snapshot.
    pub(crate) fn erc20_batch(symbol: &str, decimals: u8, supply: U256, balance: U256, held: U256) -> Value {
        let results = [
            Token::String(format!("{} Token", symbol)),
            Token::String(symbol.to_string()),
            Token::Uint(U256::from(decimals)),
            Token::Uint(supply),
            Token::Uint(balance),
            Token::Uint(held),
        ]
        .into_iter()
        .map(|value| Token::Tuple(vec![Token::Bool(true), Token::Bytes(encode(&[value]))]))
        .collect();
        returns(&[Token::Array(results)])
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{self, balance, erc20_batch};
    use super::*;
    use crate::config::test_config;
    use ethers::abi::Token;
    use ethers::providers::Provider;

    #[tokio::test]
    async fn batches_token_snapshot() {
        let (provider, mock) = Provider::mocked();
        let reader = TokenReader::new(Arc::new(provider), &test_config());
        let token = Address::from([5u8; 20]);
        let user = Address::from([9u8; 20]);

        mock::queue(
            &mock,
            vec![
                erc20_batch(
                    "STK",
                    6,
                    U256::from(1_000_000_000_000u64),
                    U256::from(2_500_000u64),
                    U256::from(7_000_000u64),
                ),
                balance(U256::from(3u64) * U256::exp10(17)),
            ],
        );

        let info = reader.token_info(token, user).await.unwrap();
        assert_eq!(info.address, token);
        assert_eq!(info.name, "STK Token");
        assert_eq!(info.symbol, "STK");
        assert_eq!(info.decimals, 6);
        assert_eq!(info.total_supply, "1000000");
        assert_eq!(info.balance, "2.5");
        assert_eq!(info.contract_token_balance, "7");
        assert_eq!(info.native_balance, "0.3");
    }

    #[tokio::test]
    async fn reverted_batch_call_is_an_error() {
        let (provider, mock) = Provider::mocked();
        let reader = TokenReader::new(Arc::new(provider), &test_config());
        let reverted = Token::Tuple(vec![Token::Bool(false), Token::Bytes(vec![])]);
        mock::queue(&mock, vec![mock::returns(&[Token::Array(vec![reverted; 6])])]);

        let err = reader
            .token_info(Address::from([5u8; 20]), Address::from([9u8; 20]))
            .await
            .unwrap_err();
        assert!(matches!(err, DappError::Multicall(_)));
    }
}
