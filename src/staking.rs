// src/staking.rs
use ethers::providers::Middleware;
use ethers::types::{Address, TransactionReceipt, U256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::DappError;
use crate::models::{ContractData, NewPool, PoolInfo, PoolNotification, TokenInfo};
use crate::notify::Notifier;
use crate::tokens::TokenReader;
use crate::tx::{self, Gas};
use crate::utils::{self, format_timestamp, format_units, low_u64, parse_units};
use crate::wallet;
use crate::{Notification, StakingDapp};

/// Reads and drives the staking contract on behalf of the connected user.
pub struct StakingClient<M> {
    client: Arc<M>,
    staking: StakingDapp<M>,
    deposit_token: Address,
    reward_token: Address,
    tokens: TokenReader<M>,
    notifier: Arc<dyn Notifier>,
    confirmations: usize,
    token_logo: Option<String>,
}

impl<M: Middleware + 'static> StakingClient<M> {
    pub fn new(client: Arc<M>, config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            staking: StakingDapp::new(config.contracts.staking_dapp, client.clone()),
            tokens: TokenReader::new(client.clone(), config),
            client,
            deposit_token: config.contracts.deposit_token,
            reward_token: config.contracts.reward_token,
            notifier,
            confirmations: config.confirmations,
            token_logo: config.token_logo.clone(),
        }
    }

    pub fn address(&self) -> Address {
        self.staking.address()
    }

    pub fn tokens(&self) -> &TokenReader<M> {
        &self.tokens
    }

    /// Everything the dashboard shows for `user`.
    pub async fn contract_data(&self, user: Address) -> Result<ContractData, DappError> {
        debug!(%user, "loading staking contract data");
        let contract_owner = self.staking.owner().call().await?;
        let deposit_decimals = self.tokens.decimals(self.deposit_token).await?;

        let log = self
            .staking
            .get_notifications()
            .call()
            .await?
            .into_iter()
            .map(|(pool_id, amount, user, type_of, time_stamp)| Notification {
                pool_id,
                amount,
                user,
                type_of,
                time_stamp,
            })
            .collect();
        let notifications = notification_log(log, deposit_decimals);

        let length = low_u64(self.staking.pool_length().call().await?);
        let mut snapshots: HashMap<Address, TokenInfo> = HashMap::new();
        let mut pools = Vec::new();
        let mut total_deposited = U256::zero();

        for pool_id in 0..length {
            let pid = U256::from(pool_id);
            let (deposit_token, reward_token, deposited, apy, lock_days) =
                self.staking.pool_info(pid).call().await?;
            let (amount, last_reward_at, lock_until) = self.staking.user_info(pid, user).call().await?;
            let reward = self.staking.pending_reward(pid, user).call().await?;

            let deposit_info = self.snapshot(&mut snapshots, deposit_token, user).await?;
            let reward_info = self.snapshot(&mut snapshots, reward_token, user).await?;

            if deposit_token == self.deposit_token {
                total_deposited = total_deposited.saturating_add(deposited);
            }

            pools.push(PoolInfo {
                pool_id,
                deposit_token_address: deposit_token,
                reward_token_address: reward_token,
                deposited_amount: format_units(deposited, deposit_info.decimals),
                apy: apy.to_string(),
                lock_days: lock_days.to_string(),
                amount: format_units(amount, deposit_info.decimals),
                user_reward: format_units(reward, reward_info.decimals),
                lock_until: format_timestamp(low_u64(lock_until)),
                last_reward_at: format_timestamp(low_u64(last_reward_at)),
                deposit_token: deposit_info,
                reward_token: reward_info,
            });
        }

        let reward_token = self.snapshot(&mut snapshots, self.reward_token, user).await?;
        let deposit_token = self.snapshot(&mut snapshots, self.deposit_token, user).await?;

        let held = self
            .tokens
            .erc20(self.deposit_token)
            .balance_of(self.address())
            .call()
            .await?;

        Ok(ContractData {
            contract_owner,
            contract_address: self.address(),
            notifications,
            reward_token,
            deposit_token,
            pool_info_array: pools,
            total_deposit_amount: format_units(total_deposited, deposit_decimals),
            contract_token_balance: format_units(held.saturating_sub(total_deposited), deposit_decimals),
        })
    }

    async fn snapshot(
        &self,
        cache: &mut HashMap<Address, TokenInfo>,
        token: Address,
        user: Address,
    ) -> Result<TokenInfo, DappError> {
        if let Some(info) = cache.get(&token) {
            return Ok(info.clone());
        }
        let info = self.tokens.token_info(token, user).await?;
        cache.insert(token, info.clone());
        Ok(info)
    }

    async fn pool_deposit_token(&self, pool_id: u64) -> Result<Address, DappError> {
        let (deposit_token, ..) = self.staking.pool_info(U256::from(pool_id)).call().await?;
        Ok(deposit_token)
    }

    /// Stakes `amount` (display units) into `pool_id`, approving the staking
    /// contract first when the allowance is too low.
    pub async fn deposit(&self, pool_id: u64, amount: &str) -> Result<TransactionReceipt, DappError> {
        let result = self.try_deposit(pool_id, amount).await;
        tx::report(self.notifier.as_ref(), "deposit", result)
    }

    async fn try_deposit(&self, pool_id: u64, amount: &str) -> Result<TransactionReceipt, DappError> {
        let amount = tx::require_text(amount, "Provide an amount")?;
        self.notifier.success("Depositing...");
        let user = wallet::sender(self.client.as_ref())?;

        let token = self.tokens.erc20(self.pool_deposit_token(pool_id).await?);
        let decimals = token.decimals().call().await?;
        let amount = positive(parse_units(amount, decimals)?)?;

        let allowance = token.allowance(user, self.address()).call().await?;
        if allowance < amount {
            self.notifier.success("Approving...");
            tx::submit(token.approve(self.address(), amount), Gas::Estimate, self.confirmations).await?;
            info!(%amount, spender = %self.address(), "approved tokens for staking");
        }

        self.notifier.success("Depositing...");
        let receipt = tx::submit(
            self.staking.deposit(U256::from(pool_id), amount),
            Gas::Estimate,
            self.confirmations,
        )
        .await?;
        self.notifier.success("Deposited successfully");
        Ok(receipt)
    }

    pub async fn withdraw(&self, pool_id: u64, amount: &str) -> Result<TransactionReceipt, DappError> {
        let result = async {
            let amount = tx::require_text(amount, "Provide an amount")?;
            self.notifier.success("Calling contract...");
            let token = self.pool_deposit_token(pool_id).await?;
            let decimals = self.tokens.decimals(token).await?;
            let amount = positive(parse_units(amount, decimals)?)?;

            let receipt = tx::submit(
                self.staking.withdraw(U256::from(pool_id), amount),
                Gas::Estimate,
                self.confirmations,
            )
            .await?;
            self.notifier.success("Withdrawal successfully completed");
            Ok::<_, DappError>(receipt)
        }
        .await;
        tx::report(self.notifier.as_ref(), "withdraw", result)
    }

    pub async fn claim_reward(&self, pool_id: u64) -> Result<TransactionReceipt, DappError> {
        let result = async {
            self.notifier.success("Calling contract...");
            let receipt = tx::submit(
                self.staking.claim_reward(U256::from(pool_id)),
                Gas::Estimate,
                self.confirmations,
            )
            .await?;
            self.notifier.success("Reward claim successfully completed");
            Ok::<_, DappError>(receipt)
        }
        .await;
        tx::report(self.notifier.as_ref(), "claim_reward", result)
    }

    /// Admin: registers a new pool. Zero APY or lock days are passed through.
    pub async fn create_pool(&self, pool: &NewPool) -> Result<TransactionReceipt, DappError> {
        let result = async {
            let (Some(deposit_token), Some(reward_token), Some(apy), Some(lock_days)) =
                (pool.deposit_token, pool.reward_token, pool.apy, pool.lock_days)
            else {
                return Err(DappError::Validation("Provide all the details".into()));
            };

            self.notifier.success("Calling contract...");
            let receipt = tx::submit(
                self.staking.add_pool(
                    deposit_token,
                    reward_token,
                    U256::from(apy),
                    U256::from(lock_days),
                ),
                Gas::Estimate,
                self.confirmations,
            )
            .await?;
            self.notifier.success("Pool successfully created");
            Ok::<_, DappError>(receipt)
        }
        .await;
        tx::report(self.notifier.as_ref(), "create_pool", result)
    }

    pub async fn modify_pool(&self, pool_id: u64, apy: Option<u64>) -> Result<TransactionReceipt, DappError> {
        let result = async {
            let apy = apy.ok_or_else(|| DappError::Validation("Data is missing".into()))?;
            self.notifier.success("Calling contract...");
            let receipt = tx::submit(
                self.staking.modify_pool(U256::from(pool_id), U256::from(apy)),
                Gas::Estimate,
                self.confirmations,
            )
            .await?;
            self.notifier.success("Pool modify successfully completed");
            Ok::<_, DappError>(receipt)
        }
        .await;
        tx::report(self.notifier.as_ref(), "modify_pool", result)
    }

    /// Admin: moves `amount` of `token` out of the staking contract.
    pub async fn sweep(&self, token: Option<Address>, amount: &str) -> Result<TransactionReceipt, DappError> {
        let result = async {
            let (Some(token), false) = (token, amount.trim().is_empty()) else {
                return Err(DappError::Validation("Data is missing".into()));
            };
            self.notifier.success("Calling contract...");
            let decimals = self.tokens.decimals(token).await?;
            let amount = positive(parse_units(amount, decimals)?)?;

            let receipt = tx::submit(self.staking.sweep(token, amount), Gas::Estimate, self.confirmations).await?;
            self.notifier.success("Transaction completed successfully");
            Ok::<_, DappError>(receipt)
        }
        .await;
        tx::report(self.notifier.as_ref(), "sweep", result)
    }

    pub async fn transfer_token(&self, to: Option<Address>, amount: &str) -> Result<TransactionReceipt, DappError> {
        let result = async {
            let (Some(to), false) = (to, amount.trim().is_empty()) else {
                return Err(DappError::Validation("Data is missing".into()));
            };
            self.notifier.success("Calling token contract...");
            let token = self.tokens.erc20(self.deposit_token);
            let decimals = token.decimals().call().await?;
            let amount = positive(parse_units(amount, decimals)?)?;

            let receipt = tx::submit(token.transfer(to, amount), Gas::Estimate, self.confirmations).await?;
            self.notifier.success("Token transferred successfully");
            Ok::<_, DappError>(receipt)
        }
        .await;
        tx::report(self.notifier.as_ref(), "transfer_token", result)
    }

    pub async fn add_token_to_wallet(&self) -> bool {
        wallet::add_token_to_wallet(
            self.client.clone(),
            self.deposit_token,
            self.token_logo.clone(),
            self.notifier.as_ref(),
        )
        .await
    }
}

fn positive(amount: U256) -> Result<U256, DappError> {
    if amount.is_zero() {
        Err(DappError::Validation("Amount must be greater than zero".into()))
    } else {
        Ok(amount)
    }
}

/// Converts the contract's activity log for display, newest first.
pub fn notification_log(entries: Vec<Notification>, decimals: u8) -> Vec<PoolNotification> {
    entries
        .into_iter()
        .rev()
        .map(|n| PoolNotification {
            pool_id: low_u64(n.pool_id),
            amount: utils::format_units(n.amount, decimals),
            user: n.user,
            type_of: n.type_of,
            time_stamp: format_timestamp(low_u64(n.time_stamp)),
        })
        .collect()
}
