// src/ico.rs
use ethers::providers::Middleware;
use ethers::types::{Address, TransactionReceipt, U256};
use std::sync::Arc;
use tracing::{debug, info};

use crate::TokenICO;
use crate::config::Config;
use crate::error::DappError;
use crate::models::IcoData;
use crate::notify::Notifier;
use crate::tokens::TokenReader;
use crate::tx::{self, Gas};
use crate::utils::{format_units, parse_units};

/// Gas limit sent with `buyToken`.
pub const BUY_GAS_LIMIT: u64 = 8_000_000;

const LOW_BALANCE: &str = "Token balance is lower than expected";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleDetails {
    pub name: String,
    pub symbol: String,
    pub balance: U256,
    pub supply: U256,
    pub token_price: U256,
    pub token_addr: Address,
}

pub struct IcoClient<M> {
    ico: TokenICO<M>,
    tokens: TokenReader<M>,
    notifier: Arc<dyn Notifier>,
    confirmations: usize,
    currency: String,
}

impl<M: Middleware + 'static> IcoClient<M> {
    pub fn new(client: Arc<M>, config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            ico: TokenICO::new(config.contracts.token_ico, client.clone()),
            tokens: TokenReader::new(client, config),
            notifier,
            confirmations: config.confirmations,
            currency: config.network.currency.clone(),
        }
    }

    pub fn address(&self) -> Address {
        self.ico.address()
    }

    pub async fn sale_details(&self) -> Result<SaleDetails, DappError> {
        let (name, symbol, balance, supply, token_price, token_addr) =
            self.ico.get_token_details().call().await?;
        Ok(SaleDetails {
            name,
            symbol,
            balance,
            supply,
            token_price,
            token_addr,
        })
    }

    pub async fn load(&self, user: Address) -> Result<IcoData, DappError> {
        debug!(%user, ico = %self.address(), "loading token sale");
        let details = self.sale_details().await?;
        let owner = self.ico.owner().call().await?;
        let sold_tokens = self.ico.sold_tokens().call().await?;
        let token = self.tokens.token_info(details.token_addr, user).await?;
        let native = self.tokens.native_decimals();

        Ok(IcoData {
            token_bal: format_units(details.balance, token.decimals),
            name: details.name,
            symbol: details.symbol,
            supply: format_units(details.supply, token.decimals),
            token_price: format_units(details.token_price, native),
            currency: self.currency.clone(),
            token_addr: details.token_addr,
            owner: format!("{:?}", owner).to_lowercase(),
            sold_tokens: sold_tokens.to_string(),
            token,
        })
    }

    /// Buys `amount` whole tokens, paying `tokenPrice * amount` in native
    /// currency.
    pub async fn buy_token(&self, amount: u64) -> Result<TransactionReceipt, DappError> {
        let result = async {
            if amount == 0 {
                return Err(DappError::Validation("Amount must be greater than zero".into()));
            }
            self.notifier.success("Calling ico contract");
            let details = self.sale_details().await?;
            if details.balance.is_zero() {
                return Err(DappError::Validation(LOW_BALANCE.into()));
            }

            let decimals = self.tokens.decimals(details.token_addr).await?;
            let wanted = U256::from(10u64)
                .checked_pow(U256::from(decimals))
                .and_then(|unit| unit.checked_mul(U256::from(amount)))
                .ok_or_else(|| DappError::Validation(LOW_BALANCE.into()))?;
            if details.balance < wanted {
                return Err(DappError::Validation(LOW_BALANCE.into()));
            }

            let value = details
                .token_price
                .checked_mul(U256::from(amount))
                .ok_or_else(|| DappError::Validation("Purchase value overflows".into()))?;
            info!(amount, value = %value, currency = %self.currency, "buying tokens");

            let call = self.ico.buy_token(U256::from(amount)).value(value);
            let receipt = tx::submit(call, Gas::Fixed(BUY_GAS_LIMIT), self.confirmations).await?;
            self.notifier.success("Transaction successfully completed");
            Ok::<_, DappError>(receipt)
        }
        .await;
        tx::report(self.notifier.as_ref(), "buy_token", result)
    }

    pub async fn withdraw_all_tokens(&self) -> Result<TransactionReceipt, DappError> {
        let result = async {
            self.notifier.success("Calling ico contract");
            let details = self.sale_details().await?;
            if details.balance.is_zero() {
                return Err(DappError::Validation(LOW_BALANCE.into()));
            }
            let receipt = tx::submit(self.ico.withdraw_all_tokens(), Gas::Estimate, self.confirmations).await?;
            self.notifier.success("Transaction successfully completed");
            Ok::<_, DappError>(receipt)
        }
        .await;
        tx::report(self.notifier.as_ref(), "withdraw_all_tokens", result)
    }

    pub async fn update_token(&self, token: Option<Address>) -> Result<TransactionReceipt, DappError> {
        let result = async {
            let token = token
                .filter(|t| !t.is_zero())
                .ok_or_else(|| DappError::Validation("Data is missing".into()))?;
            self.notifier.success("Calling ico contract");
            let receipt = tx::submit(self.ico.update_token(token), Gas::Estimate, self.confirmations).await?;
            self.notifier.success("Transaction successfully completed");
            Ok::<_, DappError>(receipt)
        }
        .await;
        tx::report(self.notifier.as_ref(), "update_token", result)
    }

    /// Admin: sets the per-token price, given in native currency.
    pub async fn update_token_price(&self, price: &str) -> Result<TransactionReceipt, DappError> {
        let result = async {
            let price = tx::require_text(price, "Data is missing")?;
            let price = parse_units(price, self.tokens.native_decimals())?;
            if price.is_zero() {
                return Err(DappError::Validation("Price must be greater than zero".into()));
            }
            self.notifier.success("Calling ico contract");
            let receipt = tx::submit(
                self.ico.update_token_sale_price(price),
                Gas::Estimate,
                self.confirmations,
            )
            .await?;
            self.notifier.success("Transaction successfully completed");
            Ok::<_, DappError>(receipt)
        }
        .await;
        tx::report(self.notifier.as_ref(), "update_token_price", result)
    }
}
