// src/config.rs
use ethers::types::Address;
use serde::Serialize;
use std::env;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_MULTICALL: &str = "0xcA11bde05977b3631167028862bE2a173976CA11";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is not valid: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("{0} is the zero address")]
    ZeroAddress(&'static str),
    #[error("{first} and {second} point at the same contract {address:?}")]
    Duplicate {
        first: &'static str,
        second: &'static str,
        address: Address,
    },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ContractAddresses {
    pub staking_dapp: Address,
    pub token_ico: Address,
    pub deposit_token: Address,
    pub reward_token: Address,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkConfig {
    pub name: String,
    pub currency: String,
    pub decimals: u8,
    pub explorer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub chain_id: u64,
    pub network: NetworkConfig,
    pub contracts: ContractAddresses,
    pub multicall: Address,
    pub token_logo: Option<String>,
    pub private_key: Option<String>,
    pub confirmations: usize,
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let address = |key: &'static str, value: String| {
            value
                .parse::<Address>()
                .map_err(|_| ConfigError::Invalid { key, value })
        };
        let number = |key: &'static str, value: String| {
            value
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid { key, value })
        };

        let contracts = ContractAddresses {
            staking_dapp: address("STAKING_DAPP", required("STAKING_DAPP")?)?,
            token_ico: address("TOKEN_ICO", required("TOKEN_ICO")?)?,
            deposit_token: address("DEPOSIT_TOKEN", required("DEPOSIT_TOKEN")?)?,
            reward_token: address("REWARD_TOKEN", required("REWARD_TOKEN")?)?,
        };

        let decimals = match get("NETWORK_DECIMALS") {
            Some(value) => value.parse::<u8>().map_err(|_| ConfigError::Invalid {
                key: "NETWORK_DECIMALS",
                value,
            })?,
            None => 18,
        };

        let confirmations = match get("CONFIRMATIONS") {
            Some(value) => number("CONFIRMATIONS", value)? as usize,
            None => 1,
        };

        let listen = get("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            key: "LISTEN_ADDR",
            value: listen.clone(),
        })?;

        let multicall = address(
            "MULTICALL_ADDRESS",
            get("MULTICALL_ADDRESS").unwrap_or_else(|| DEFAULT_MULTICALL.to_string()),
        )?;

        Ok(Config {
            rpc_url: required("RPC_URL")?,
            chain_id: number("CHAIN_ID", required("CHAIN_ID")?)?,
            network: NetworkConfig {
                name: get("NETWORK").unwrap_or_else(|| "unknown".to_string()),
                currency: get("CURRENCY").unwrap_or_else(|| "ETH".to_string()),
                decimals,
                explorer: get("EXPLORER").map(|e| e.trim_end_matches('/').to_string()),
            },
            contracts,
            multicall,
            token_logo: get("TOKEN_LOGO"),
            private_key: get("PRIVATE_KEY"),
            confirmations,
            listen_addr,
        })
    }

    /// Rejects zero addresses and a contract configured for two roles. The
    /// deposit and reward token may legitimately be the same token.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.contracts;
        let roles = [
            ("STAKING_DAPP", c.staking_dapp),
            ("TOKEN_ICO", c.token_ico),
            ("DEPOSIT_TOKEN", c.deposit_token),
            ("REWARD_TOKEN", c.reward_token),
        ];

        for (key, address) in roles {
            if address.is_zero() {
                return Err(ConfigError::ZeroAddress(key));
            }
        }

        for (i, (first, a)) in roles.iter().enumerate() {
            for (second, b) in &roles[i + 1..] {
                let tokens_pair = *first == "DEPOSIT_TOKEN" && *second == "REWARD_TOKEN";
                if a == b && !tokens_pair {
                    return Err(ConfigError::Duplicate {
                        first: *first,
                        second: *second,
                        address: *a,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn explorer_tx_url(&self, hash: &str) -> Option<String> {
        self.network
            .explorer
            .as_ref()
            .map(|base| format!("{}/tx/{}", base, hash))
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config::from_lookup(|key| {
        let value = match key {
            "RPC_URL" => "http://localhost:8545",
            "CHAIN_ID" => "17000",
            "STAKING_DAPP" => "0x1000000000000000000000000000000000000001",
            "TOKEN_ICO" => "0x2000000000000000000000000000000000000002",
            "DEPOSIT_TOKEN" => "0x3000000000000000000000000000000000000003",
            "REWARD_TOKEN" => "0x4000000000000000000000000000000000000004",
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("static test config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("RPC_URL", "http://localhost:8545".to_string()),
            ("CHAIN_ID", "17000".to_string()),
            ("STAKING_DAPP", "0x1000000000000000000000000000000000000001".to_string()),
            ("TOKEN_ICO", "0x2000000000000000000000000000000000000002".to_string()),
            ("DEPOSIT_TOKEN", "0x3000000000000000000000000000000000000003".to_string()),
            ("REWARD_TOKEN", "0x3000000000000000000000000000000000000003".to_string()),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.chain_id, 17000);
        assert_eq!(config.network.decimals, 18);
        assert_eq!(config.confirmations, 1);
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.multicall, DEFAULT_MULTICALL.parse::<Address>().unwrap());
        assert!(config.private_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reports_missing_and_invalid_values() {
        let mut vars = base_env();
        vars.remove("RPC_URL");
        assert!(matches!(load(&vars), Err(ConfigError::Missing("RPC_URL"))));

        let mut vars = base_env();
        vars.insert("TOKEN_ICO", "not-an-address".to_string());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "TOKEN_ICO", .. })
        ));

        let mut vars = base_env();
        vars.insert("CHAIN_ID", " ".to_string());
        assert!(matches!(load(&vars), Err(ConfigError::Missing("CHAIN_ID"))));
    }

    #[test]
    fn rejects_duplicate_contracts() {
        let mut vars = base_env();
        vars.insert("TOKEN_ICO", vars["STAKING_DAPP"].clone());
        let config = load(&vars).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Duplicate {
                first: "STAKING_DAPP",
                second: "TOKEN_ICO",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_address() {
        let mut vars = base_env();
        vars.insert("REWARD_TOKEN", format!("{:?}", Address::zero()));
        let config = load(&vars).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroAddress("REWARD_TOKEN"))
        ));
    }

    #[test]
    fn builds_explorer_links() {
        let mut vars = base_env();
        vars.insert("EXPLORER", "https://holesky.etherscan.io/".to_string());
        let config = load(&vars).unwrap();
        assert_eq!(
            config.explorer_tx_url("0xabc").as_deref(),
            Some("https://holesky.etherscan.io/tx/0xabc")
        );
    }
}
