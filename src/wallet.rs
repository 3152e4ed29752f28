// src/wallet.rs

use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::ERC20;
use crate::config::Config;
use crate::error::DappError;
use crate::notify::Notifier;

pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

pub fn provider(config: &Config) -> Result<Provider<Http>, DappError> {
    Provider::<Http>::try_from(config.rpc_url.as_str())
        .map_err(|e| DappError::Wallet(format!("invalid RPC_URL: {}", e)))
}

/// Provider wrapped with the configured private key.
pub fn signer(config: &Config) -> Result<Arc<SignerClient>, DappError> {
    let key = config.private_key.as_deref().ok_or(DappError::NoSigner)?;
    let wallet = key
        .trim_start_matches("0x")
        .parse::<LocalWallet>()
        .map_err(|e| DappError::Wallet(e.to_string()))?
        .with_chain_id(config.chain_id);
    info!(address = ?wallet.address(), chain_id = config.chain_id, "wallet connected");
    Ok(Arc::new(SignerMiddleware::new(provider(config)?, wallet)))
}

pub fn sender<M: Middleware>(client: &M) -> Result<Address, DappError> {
    client.default_sender().ok_or(DappError::NoSigner)
}

/// EIP-747 `wallet_watchAsset` parameters.
#[derive(Debug, Clone, Serialize)]
pub struct WatchAsset {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub options: WatchAssetOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchAssetOptions {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl WatchAsset {
    pub fn erc20(address: Address, symbol: String, decimals: u8, image: Option<String>) -> Self {
        Self {
            kind: "ERC20",
            options: WatchAssetOptions {
                address,
                symbol,
                decimals,
                image,
            },
        }
    }
}

pub async fn watch_asset<M: Middleware>(client: &M, asset: &WatchAsset) -> Result<bool, DappError> {
    client
        .provider()
        .request::<_, bool>("wallet_watchAsset", asset)
        .await
        .map_err(DappError::from)
}

/// Asks the wallet to track `token`. Any failure is reported as a single
/// "Failed to add token" toast.
pub async fn add_token_to_wallet<M: Middleware + 'static>(
    client: Arc<M>,
    token: Address,
    image: Option<String>,
    notifier: &dyn Notifier,
) -> bool {
    let erc20 = ERC20::new(token, client.clone());
    let asset = async {
        let decimals = erc20.decimals().call().await?;
        let symbol = erc20.symbol().call().await?;
        Ok::<_, DappError>(WatchAsset::erc20(token, symbol, decimals, image))
    };

    let added = match asset.await {
        Ok(asset) => watch_asset(client.as_ref(), &asset).await,
        Err(err) => Err(err),
    };

    match added {
        Ok(true) => {
            notifier.success("Token added");
            true
        }
        Ok(false) => {
            notifier.error("Failed to add token");
            false
        }
        Err(err) => {
            warn!(%token, error = %err, "wallet_watchAsset failed");
            notifier.error("Failed to add token");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{MemoryNotifier, ToastLevel};
    use ethers::providers::Provider;

    fn token() -> Address {
        "0x3000000000000000000000000000000000000003".parse().unwrap()
    }

    #[test]
    fn watch_asset_payload_shape() {
        let asset = WatchAsset::erc20(token(), "STK".into(), 18, None);
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["type"], "ERC20");
        assert_eq!(json["options"]["symbol"], "STK");
        assert_eq!(json["options"]["decimals"], 18);
        assert!(json["options"].get("image").is_none());

        let asset = WatchAsset::erc20(token(), "STK".into(), 18, Some("https://logo".into()));
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["options"]["image"], "https://logo");
    }

    #[tokio::test]
    async fn watch_asset_returns_wallet_answer() {
        let (provider, mock) = Provider::mocked();
        mock.push::<bool, _>(true).unwrap();
        let asset = WatchAsset::erc20(token(), "STK".into(), 18, None);
        assert!(watch_asset(&provider, &asset).await.unwrap());
    }

    #[tokio::test]
    async fn add_token_reports_failure_as_toast() {
        let (provider, _mock) = Provider::mocked();
        let notifier = MemoryNotifier::new();
        let added = add_token_to_wallet(Arc::new(provider), token(), None, &notifier).await;
        assert!(!added);
        assert_eq!(
            notifier.messages(),
            vec![(ToastLevel::Error, "Failed to add token".to_string())]
        );
    }

    #[test]
    fn read_only_provider_has_no_sender() {
        let (provider, _mock) = Provider::mocked();
        assert!(matches!(sender(&provider), Err(DappError::NoSigner)));
    }
}
