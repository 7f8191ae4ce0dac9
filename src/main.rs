use std::io::{stderr, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use csv::Writer;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use bank_transaction_engine::config::EngineConfig;
use bank_transaction_engine::engine::TransactionEngine;
use bank_transaction_engine::settings::SettingsStorage;
use bank_transaction_engine::storage::{AccountStorage, LedgerStorage};

#[derive(Parser)]
#[command(author, version, about = "Replays deposit and withdrawal requests against a set of accounts", long_about = None)]
struct Cli {
    /// Accounts CSV: account_number,customer_name,initial_balance,active
    accounts: PathBuf,

    /// Requests CSV: account_number,type,amount,description
    requests: PathBuf,

    /// Settings CSV: key,value,description. Policy defaults apply without it.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// One of error, warn, info, debug, trace
    #[arg(long, default_value = "error")]
    log_level: String,

    /// Print the ledger instead of the final account balances
    #[arg(long)]
    ledger: bool,

    /// Cache policy settings for this many milliseconds instead of reading them per transaction
    #[arg(long)]
    policy_ttl_ms: Option<u64>,

    #[arg(long, default_value_t = 256)]
    mailbox_capacity: usize,

    #[arg(long, default_value_t = 5000)]
    enqueue_timeout_ms: u64
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(parse_log_level(&cli.log_level));

    let settings = match &cli.settings {
        Some(path) => SettingsStorage::from_csv(path)?,
        None => SettingsStorage::new()
    };

    let mut config = EngineConfig::default()
        .with_mailbox_capacity(cli.mailbox_capacity)
        .with_enqueue_timeout(Duration::from_millis(cli.enqueue_timeout_ms));

    if let Some(ttl) = cli.policy_ttl_ms {
        config = config.with_policy_ttl(Duration::from_millis(ttl));
    }

    let engine = TransactionEngine::new(Arc::new(AccountStorage::new()), Arc::new(LedgerStorage::new()), Arc::new(settings))
        .with_config(config);

    let opened = engine.seed_accounts(&cli.accounts.to_string_lossy()).await?;
    info!("Opened {opened} accounts");

    let timer = Instant::now();
    let summary = engine.replay(&cli.requests.to_string_lossy()).await?;
    engine.shutdown().await;
    let duration = timer.elapsed();

    info!(
        "Processed requests in: {duration:?} | committed: {} | rejected: {} | malformed: {}",
        summary.committed, summary.total_rejected(), summary.malformed
    );

    for (kind, count) in &summary.rejected {
        info!("Rejected {kind}: {count}");
    }

    let statistics = engine.statistics()?;
    info!(
        "Accounts: {} ({} active) | total balance: {} | average balance: {} | net cash flow: {}",
        statistics.accounts.total_accounts,
        statistics.accounts.active_accounts,
        statistics.accounts.total_balance,
        statistics.accounts.average_balance,
        statistics.transactions.net_cash_flow
    );

    if cli.ledger {
        write_ledger_to_stdout(&engine)?;
    } else {
        write_accounts_to_stdout(&engine)?;
    }

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: Results go to stdout, so logging is kept on stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn write_accounts_to_stdout(engine: &TransactionEngine) -> Result<()> {
    let mut output = Writer::from_writer(stdout().lock());

    output.write_record(["account_number", "owner", "balance", "active"])?;

    for account in engine.all_accounts() {
        output.write_record([
            account.account_number,
            account.customer_name,
            account.balance.to_string(),
            account.active.to_string()
        ])?;
    }

    output.flush()?;

    Ok(())
}

fn write_ledger_to_stdout(engine: &TransactionEngine) -> Result<()> {
    let mut output = Writer::from_writer(stdout().lock());

    output.write_record(["id", "account_number", "owner", "type", "amount", "balance_after", "timestamp", "description"])?;

    for view in engine.all_transactions() {
        output.write_record([
            view.id.to_string(),
            view.account_number,
            view.account_owner,
            view.transaction_type.to_string(),
            view.amount.to_string(),
            view.balance_after.to_string(),
            view.timestamp.to_rfc3339(),
            view.description.unwrap_or_default()
        ])?;
    }

    output.flush()?;

    Ok(())
}
