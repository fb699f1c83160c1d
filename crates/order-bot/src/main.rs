//! Order Bot
//!
//! Prompts for futures orders and places them on the Binance testnet.

use anyhow::{Context, Result};
use binance_core::api::{ApiCredentials, FuturesClient};
use binance_core::config::{parse_recv_window, Config};
use clap::Parser;
use order_bot::{logging, session, OrderSubmitter, Prompter};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "order-bot",
    about = "Place orders on the Binance USD-M futures testnet"
)]
struct Args {
    /// API key (default: BINANCE_API_KEY, otherwise prompted)
    #[arg(long)]
    api_key: Option<String>,

    /// API secret (default: BINANCE_API_SECRET, otherwise prompted)
    #[arg(long)]
    api_secret: Option<String>,

    /// REST base URL (default: BINANCE_FUTURES_URL or the testnet)
    #[arg(long)]
    base_url: Option<String>,

    /// recvWindow in milliseconds
    #[arg(long, value_parser = recv_window_arg)]
    recv_window: Option<u64>,

    /// Log file to append to (default: TRADING_BOT_LOG or trading_bot.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(key) = self.api_key {
            config.binance.api_key = Some(key);
        }
        if let Some(secret) = self.api_secret {
            config.binance.api_secret = Some(secret);
        }
        if let Some(url) = self.base_url {
            config.binance.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(recv_window) = self.recv_window {
            config.binance.recv_window = Some(recv_window);
        }
        if let Some(file) = self.log_file {
            config.log.file = file;
        }
    }
}

fn recv_window_arg(raw: &str) -> std::result::Result<u64, String> {
    parse_recv_window(raw).map_err(|e| e.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env()?;
    args.apply(&mut config);

    logging::init_file_logging(&config.log.file)
        .with_context(|| format!("Failed to open log file {}", config.log.file.display()))?;

    let mut prompter = Prompter::new(BufReader::new(tokio::io::stdin()), std::io::stdout());

    tokio::select! {
        result = run(&mut prompter, config) => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            println!("\nProgram interrupted by user. Exiting...");
            info!("Program interrupted by user");
            std::io::stdout().flush().ok();
            // A pending stdin read would otherwise hold up runtime shutdown.
            std::process::exit(0);
        }
    }
}

async fn run<R, W>(prompter: &mut Prompter<R, W>, config: Config) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    prompter.say("Welcome to Binance Futures Testnet Trading Bot")?;

    let api_key = match config.binance.api_key.clone() {
        Some(key) => key,
        None => required_line(prompter, "Enter your Binance Testnet API Key: ").await?,
    };
    let api_secret = match config.binance.api_secret.clone() {
        Some(secret) => secret,
        None => required_line(prompter, "Enter your Binance Testnet API Secret: ").await?,
    };

    let credentials = ApiCredentials::new(api_key, api_secret);
    let client = FuturesClient::from_config(&config.binance, credentials)?;
    info!("Initialized Binance Client with testnet={}", client.is_testnet());

    let submitter = OrderSubmitter::new(Arc::new(client));
    session::run(prompter, &submitter).await?;
    Ok(())
}

async fn required_line<R, W>(prompter: &mut Prompter<R, W>, prompt: &str) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        let value = prompter
            .line(prompt)
            .await
            .context("Input closed before credentials were entered")?;
        if !value.is_empty() {
            return Ok(value);
        }
    }
}
