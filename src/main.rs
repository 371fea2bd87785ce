use airdrop_tracker::{
    apis::EtherscanClient,
    config::{load_config_from_path, resolve_api_key, TrackerConfig, CONFIG_FILE_PATH},
    logger::{ConsoleSink, LogLevel, LogTag, Logger},
    pipeline::{fetch_airdrop_data, AirdropRequest, TEST_MODE_RECIPIENTS},
    report::{write_report, ReportLayout},
};
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "airdrop-tracker")]
#[command(about = "Reconcile airdrop recipients against current token balances", long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = CONFIG_FILE_PATH)]
    config: String,

    /// Output CSV path (overrides run.output)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Airdrop transaction hash; repeatable, replaces run.tx_hashes
    #[arg(long = "tx")]
    tx: Vec<String>,

    /// Token contract address
    #[arg(long)]
    token: Option<String>,

    #[arg(long)]
    decimals: Option<u32>,

    /// Suffix for amount columns, e.g. YB
    #[arg(long)]
    symbol: Option<String>,

    /// Only reconcile the first 100 recipients
    #[arg(long)]
    test: bool,

    #[arg(long)]
    max_holders: Option<usize>,

    /// Skip the informational holder count request
    #[arg(long)]
    no_holder_count: bool,

    /// Per-request details
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn apply(&self, config: &mut TrackerConfig) {
        if !self.tx.is_empty() {
            config.run.tx_hashes = self.tx.clone();
        }
        if let Some(token) = &self.token {
            config.token.contract = token.clone();
        }
        if let Some(decimals) = self.decimals {
            config.token.decimals = decimals;
        }
        if self.symbol.is_some() {
            config.token.symbol = self.symbol.clone();
        }
        if self.test {
            config.run.max_recipients = Some(TEST_MODE_RECIPIENTS);
        }
        if self.max_holders.is_some() {
            config.run.max_holders = self.max_holders;
        }
        if self.no_holder_count {
            config.run.fetch_holder_count = false;
        }
    }

    fn log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else if self.quiet {
            LogLevel::Warning
        } else {
            LogLevel::Info
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let logger = Logger::new(ConsoleSink::new(args.log_level()));

    let mut config = load_config_from_path(&args.config, &logger)
        .with_context(|| format!("loading {}", args.config))?;
    args.apply(&mut config);

    let request = AirdropRequest::from_config(&config).context("invalid run configuration")?;
    let api_key = resolve_api_key(&config);
    let client = EtherscanClient::new(&config.api, api_key, logger.clone())
        .map_err(airdrop_tracker::errors::TrackerError::from)
        .context("creating Etherscan client")?;

    if request.options.max_recipients.is_some() {
        logger.info(LogTag::System, "TEST MODE: processing a subset of recipients");
    }

    let report = fetch_airdrop_data(&client, &request)
        .await
        .context("airdrop reconciliation failed")?;

    let output = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.run.output));
    let layout = ReportLayout::new(request.token.symbol.clone());
    write_report(&output, &report.reconciliation, &layout)
        .with_context(|| format!("writing {}", output.display()))?;
    logger.info(LogTag::Report, &format!("Saved {}", output.display()));

    println!("\n{}", "=".repeat(60));
    println!("{}", "AIRDROP RECONCILIATION".bold());
    println!("{}", "=".repeat(60));
    println!("Recipients:        {}", report.recipients);
    println!("Rows written:      {}", report.reconciliation.rows.len());
    println!("Not in holders:    {}", report.reconciliation.not_found);
    if let Some(count) = report.holder_count {
        println!("Token holders:     {}", count);
    }
    if !report.snapshot_complete {
        println!("{}", "Holder snapshot incomplete".yellow());
    }
    println!("API calls:         {}", report.api_calls);
    println!("Output:            {}", output.display());

    Ok(())
}
