//! Currency Converter CLI
//!
//! Command-line interface for the Currency Converter API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use converter_client::ConverterClient;
use converter_types::{CurrencyCode, MIN_SOURCE_CURRENCY_VALUE};

#[derive(Parser)]
#[command(name = "converter")]
#[command(author, version, about = "Currency Converter API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Currency Converter API
    #[arg(
        long,
        env = "CONVERTER_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    /// Identity sent in the `user-id` header
    #[arg(long, env = "CONVERTER_USER_ID")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an amount and record the transaction
    Convert {
        /// Source currency code, e.g. USD
        from: String,
        /// Amount to convert (at least 0.1)
        amount: f64,
        /// Target currency code, e.g. BRL
        to: String,
    },
    /// List recorded conversions
    Conversions {
        /// Only this user's conversions
        #[arg(long)]
        user: Option<String>,
    },
    /// Check API health
    Health,
}

fn parse_currency(s: &str) -> Result<CurrencyCode> {
    CurrencyCode::parse(s).map_err(|e| anyhow::anyhow!("{e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = ConverterClient::new(&cli.api_url);
    if let Some(user) = &cli.user {
        client = client.with_user_id(user);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Convert { from, amount, to } => {
            let from = parse_currency(&from)?;
            let to = parse_currency(&to)?;
            if amount < MIN_SOURCE_CURRENCY_VALUE {
                anyhow::bail!("The minimum allowed value is {MIN_SOURCE_CURRENCY_VALUE}");
            }
            if cli.user.is_none() {
                anyhow::bail!("--user (or CONVERTER_USER_ID) is required to convert");
            }

            let tx = client.convert(from.as_str(), amount, to.as_str()).await?;
            println!(
                "{} {} = {} {} (rate {})",
                tx.source_currency_value,
                tx.source_currency_code,
                tx.target_currency_value,
                tx.target_currency_code,
                tx.rate_value
            );
            println!("{}", serde_json::to_string_pretty(&tx)?);
        }

        Commands::Conversions { user } => {
            let conversions = client.list_conversions(user.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&conversions)?);
        }
    }

    Ok(())
}
