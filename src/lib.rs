// src/lib.rs
#![allow(clippy::module_inception)]

use ethers::contract::abigen;

abigen!(ERC20, r#"[
    function name() external view returns (string)
    function symbol() external view returns (string)
    function decimals() external view returns (uint8)
    function totalSupply() external view returns (uint256)
    function balanceOf(address) external view returns (uint256)
    function allowance(address owner, address spender) external view returns (uint256)
    function approve(address spender, uint256 amount) external returns (bool)
    function transfer(address to, uint256 amount) external returns (bool)
]"#);

abigen!(StakingDapp, r#"[
    struct Notification { uint256 poolID; uint256 amount; address user; string typeOf; uint256 timeStamp; }
    function owner() external view returns (address)
    function poolLength() external view returns (uint256)
    function poolInfo(uint256) external view returns (address depositToken, address rewardToken, uint256 depositedAmount, uint256 apy, uint256 lockDays)
    function userInfo(uint256, address) external view returns (uint256 amount, uint256 lastRewardAt, uint256 lockUntil)
    function pendingReward(uint256 pid, address user) external view returns (uint256)
    function getNotifications() external view returns (Notification[])
    function deposit(uint256 pid, uint256 amount) external
    function withdraw(uint256 pid, uint256 amount) external
    function claimReward(uint256 pid) external
    function addPool(address depositToken, address rewardToken, uint256 apy, uint256 lockDays) external
    function modifyPool(uint256 pid, uint256 apy) external
    function sweep(address token, uint256 amount) external
]"#);

abigen!(TokenICO, r#"[
    function owner() external view returns (address)
    function soldTokens() external view returns (uint256)
    function getTokenDetails() external view returns (string name, string symbol, uint256 balance, uint256 supply, uint256 tokenPrice, address tokenAddr)
    function buyToken(uint256 amount) external payable
    function withdrawAllTokens() external
    function updateToken(address tokenAddress) external
    function updateTokenSalePrice(uint256 price) external
]"#);

pub mod config;
pub mod error;
pub mod ico;
pub mod models;
pub mod notify;
pub mod server;
pub mod staking;
pub mod tokens;
pub mod tx;
pub mod utils;
pub mod wallet;

pub use config::Config;
pub use error::DappError;
pub use notify::{Notifier, Toast, ToastLevel};
