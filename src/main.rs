// src/main.rs
use anyhow::{Result as AnyhowResult, bail};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use ethers::providers::Middleware;
use ethers::types::{Address, TransactionReceipt};
use serde::Serialize;
use staking_dapp::config::Config;
use staking_dapp::ico::IcoClient;
use staking_dapp::models::NewPool;
use staking_dapp::notify::{LogNotifier, Notifier};
use staking_dapp::server::{self, AppState};
use staking_dapp::staking::StakingClient;
use staking_dapp::utils::shorten_address;
use staking_dapp::{DappError, wallet};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "staking-dapp")]
#[command(about = "Client for the staking and token-sale contracts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the read-only JSON API
    Serve,
    /// Show pools, tokens and activity for a user
    ContractData {
        /// User address (defaults to the configured wallet)
        #[arg(long, value_parser = parse_address)]
        address: Option<Address>,
    },
    /// Show the token sale
    Ico {
        #[arg(long, value_parser = parse_address)]
        address: Option<Address>,
    },
    /// Show an ERC-20 token as seen by a user
    Token {
        #[arg(value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_address)]
        address: Option<Address>,
    },
    /// Stake into a pool
    Deposit {
        #[arg(long)]
        pool: u64,
        #[arg(long)]
        amount: String,
    },
    /// Unstake from a pool
    Withdraw {
        #[arg(long)]
        pool: u64,
        #[arg(long)]
        amount: String,
    },
    /// Claim pending rewards of a pool
    Claim {
        #[arg(long)]
        pool: u64,
    },
    /// Add a staking pool (owner only)
    CreatePool {
        #[arg(long, value_parser = parse_address)]
        deposit_token: Option<Address>,
        #[arg(long, value_parser = parse_address)]
        reward_token: Option<Address>,
        /// APY in percent
        #[arg(long)]
        apy: Option<u64>,
        #[arg(long)]
        lock_days: Option<u64>,
    },
    /// Change the APY of a pool (owner only)
    ModifyPool {
        #[arg(long)]
        pool: u64,
        #[arg(long)]
        apy: Option<u64>,
    },
    /// Move tokens out of the staking contract (owner only)
    Sweep {
        #[arg(long, value_parser = parse_address)]
        token: Option<Address>,
        #[arg(long, default_value = "")]
        amount: String,
    },
    /// Transfer deposit tokens to another address
    Transfer {
        #[arg(long, value_parser = parse_address)]
        to: Option<Address>,
        #[arg(long, default_value = "")]
        amount: String,
    },
    /// Ask the wallet to track the deposit token
    AddToken,
    /// Buy whole tokens from the sale
    BuyToken {
        #[arg(long)]
        amount: u64,
    },
    /// Withdraw unsold tokens from the sale (owner only)
    WithdrawIco,
    /// Point the sale at another token (owner only)
    UpdateToken {
        #[arg(long, value_parser = parse_address)]
        address: Option<Address>,
    },
    /// Set the sale price in native currency (owner only)
    UpdatePrice {
        #[arg(long)]
        price: String,
    },
}

impl Commands {
    fn is_read_only(&self) -> bool {
        matches!(
            self,
            Commands::Serve | Commands::ContractData { .. } | Commands::Ico { .. } | Commands::Token { .. }
        )
    }
}

#[tokio::main]
async fn main() -> AnyhowResult<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.validate()?;
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    if let Commands::Serve = cli.command {
        return serve(config, notifier).await;
    }

    match wallet::signer(&config) {
        Ok(client) => run(cli.command, client, &config, notifier).await,
        Err(DappError::NoSigner) if cli.command.is_read_only() => {
            let client = Arc::new(wallet::provider(&config)?);
            run(cli.command, client, &config, notifier).await
        }
        Err(err) => Err(err.into()),
    }
}

async fn serve(config: Config, notifier: Arc<dyn Notifier>) -> AnyhowResult<()> {
    let client = Arc::new(wallet::provider(&config)?);
    let chain_id = client.get_chainid().await?;
    if chain_id.as_u64() != config.chain_id {
        bail!("RPC_URL serves chain {} but CHAIN_ID is {}", chain_id, config.chain_id);
    }

    let state = Arc::new(AppState {
        staking: StakingClient::new(client.clone(), &config, notifier.clone()),
        ico: IcoClient::new(client, &config, notifier),
    });
    let app = server::router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(
        addr = %config.listen_addr,
        network = %config.network.name,
        currency = %config.network.currency,
        "serving read API"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run<M: Middleware + 'static>(
    command: Commands,
    client: Arc<M>,
    config: &Config,
    notifier: Arc<dyn Notifier>,
) -> AnyhowResult<()> {
    let user_or = |address: Option<Address>| -> Result<Address, DappError> {
        match address {
            Some(address) => Ok(address),
            None => wallet::sender(client.as_ref()),
        }
    };
    let staking = StakingClient::new(client.clone(), config, notifier.clone());
    let ico = IcoClient::new(client.clone(), config, notifier);

    match command {
        Commands::Serve => bail!("serve does not use a wallet"),
        Commands::ContractData { address } => print_json(&staking.contract_data(user_or(address)?).await?)?,
        Commands::Ico { address } => print_json(&ico.load(user_or(address)?).await?)?,
        Commands::Token { token, address } => {
            print_json(&staking.tokens().token_info(token, user_or(address)?).await?)?
        }
        Commands::Deposit { pool, amount } => print_receipt(config, &staking.deposit(pool, &amount).await?),
        Commands::Withdraw { pool, amount } => print_receipt(config, &staking.withdraw(pool, &amount).await?),
        Commands::Claim { pool } => print_receipt(config, &staking.claim_reward(pool).await?),
        Commands::CreatePool {
            deposit_token,
            reward_token,
            apy,
            lock_days,
        } => {
            let pool = NewPool {
                deposit_token,
                reward_token,
                apy,
                lock_days,
            };
            print_receipt(config, &staking.create_pool(&pool).await?)
        }
        Commands::ModifyPool { pool, apy } => print_receipt(config, &staking.modify_pool(pool, apy).await?),
        Commands::Sweep { token, amount } => print_receipt(config, &staking.sweep(token, &amount).await?),
        Commands::Transfer { to, amount } => print_receipt(config, &staking.transfer_token(to, &amount).await?),
        Commands::AddToken => {
            if !staking.add_token_to_wallet().await {
                bail!("wallet did not add the token");
            }
        }
        Commands::BuyToken { amount } => print_receipt(config, &ico.buy_token(amount).await?),
        Commands::WithdrawIco => print_receipt(config, &ico.withdraw_all_tokens().await?),
        Commands::UpdateToken { address } => print_receipt(config, &ico.update_token(address).await?),
        Commands::UpdatePrice { price } => print_receipt(config, &ico.update_token_price(&price).await?),
    }

    Ok(())
}

fn parse_address(raw: &str) -> Result<Address, String> {
    raw.parse::<Address>().map_err(|_| format!("'{}' is not an address", raw))
}

fn print_json<T: Serialize>(value: &T) -> AnyhowResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_receipt(config: &Config, receipt: &TransactionReceipt) {
    let hash = format!("{:?}", receipt.transaction_hash);
    println!(
        "✅ {} from {} (block {:?})",
        hash,
        shorten_address(receipt.from),
        receipt.block_number
    );
    if let Some(url) = config.explorer_tx_url(&hash) {
        println!("🔗 {}", url);
    }
}
