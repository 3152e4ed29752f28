// src/models.rs
use ethers::types::Address;
use serde::Serialize;

/// ERC-20 snapshot from the point of view of one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: String,
    pub balance: String,
    pub native_balance: String,
    /// Balance held by the staking contract.
    pub contract_token_balance: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfo {
    pub pool_id: u64,
    pub deposit_token_address: Address,
    pub reward_token_address: Address,
    pub deposit_token: TokenInfo,
    pub reward_token: TokenInfo,
    pub deposited_amount: String,
    pub apy: String,
    pub lock_days: String,
    /// Amount staked by the user.
    pub amount: String,
    pub user_reward: String,
    pub lock_until: String,
    pub last_reward_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolNotification {
    #[serde(rename = "poolID")]
    pub pool_id: u64,
    pub amount: String,
    pub user: Address,
    pub type_of: String,
    pub time_stamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractData {
    pub contract_owner: Address,
    pub contract_address: Address,
    /// Newest first.
    pub notifications: Vec<PoolNotification>,
    pub reward_token: TokenInfo,
    pub deposit_token: TokenInfo,
    pub pool_info_array: Vec<PoolInfo>,
    pub total_deposit_amount: String,
    /// Deposit-token balance of the staking contract not owed to stakers.
    pub contract_token_balance: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IcoData {
    pub token_bal: String,
    pub name: String,
    pub symbol: String,
    pub supply: String,
    pub token_price: String,
    pub currency: String,
    pub token_addr: Address,
    pub owner: String,
    pub sold_tokens: String,
    pub token: TokenInfo,
}

#[derive(Debug, Clone, Default)]
pub struct NewPool {
    pub deposit_token: Option<Address>,
    pub reward_token: Option<Address>,
    pub apy: Option<u64>,
    pub lock_days: Option<u64>,
}
