//! TDEX swap router - Entry Point

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tdex_core::{Coin, CoinPair, Network, Provider};
use tracing::info;

/// Best-price swaps across TDEX liquidity providers
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via TDEX_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Network override: liquid or testnet
    #[arg(short, long)]
    network: Option<Network>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List providers from the registry
    Providers,
    /// Discover and list markets with prices
    Markets,
    /// Select the best market for a swap and preview it
    Quote {
        /// Asset hash to pay
        #[arg(long)]
        from: String,
        /// Asset hash to receive
        #[arg(long)]
        dest: String,
        /// Amount to pay, or to receive with --receive
        #[arg(long)]
        amount: Decimal,
        /// Fix the received amount instead of the paid one
        #[arg(long)]
        receive: bool,
        /// Restrict to one provider endpoint
        #[arg(long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => tdex_swap::AppConfig::from_file(path)?,
        None => tdex_swap::AppConfig::load()?,
    };
    if let Some(network) = args.network {
        config.network = network;
    }

    tdex_telemetry::init_logging(&config.log)?;

    info!("Starting tdex-swap v{}", env!("CARGO_PKG_VERSION"));
    info!(
        config_path = args.config.as_deref().unwrap_or("<default>"),
        network = %config.network,
        "Configuration loaded"
    );

    let app = tdex_swap::Application::new(config)?;

    match args.command {
        Command::Providers => {
            let providers = app.providers().await?;
            println!("{}", serde_json::to_string_pretty(&providers)?);
        }
        Command::Markets => {
            let discovery = app.refresh().await?;
            println!("{}", serde_json::to_string_pretty(&discovery.markets)?);
        }
        Command::Quote {
            from,
            dest,
            amount,
            receive,
            provider,
        } => {
            let pair = if receive {
                CoinPair::new(Coin::new(from), Coin::new(dest).with_amount(amount))
            } else {
                CoinPair::new(Coin::new(from).with_amount(amount), Coin::new(dest))
            };
            let provider = provider.as_deref().and_then(Provider::from_endpoint);

            let quote = app.quote(&pair, provider.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
    }

    Ok(())
}
