use super::TransactionEngine;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone};
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::task::JoinSet;

use crate::clock::{Clock, FixedClock};
use crate::config::EngineConfig;
use crate::models::{AccountError, AccountView, AmountViolation, Owner, TransactionError, TransactionRequest, TransactionType};
use crate::settings::SettingsStorage;
use crate::storage::{AccountStorage, LedgerStorage};
use crate::types::Monetary;

const ACCOUNT_NUMBER: &str = "1234567890";

struct Harness {
    engine: Arc<TransactionEngine>,
    settings: Arc<SettingsStorage>,
    clock: Arc<FixedClock>
}

fn local_time(day: u32, hour: u32, minute: u32, second: u32, millisecond: u32) -> Result<DateTime<Local>> {
    let naive = NaiveDate::from_ymd_opt(2026, 6, day)
        .and_then(|date| date.and_hms_milli_opt(hour, minute, second, millisecond))
        .ok_or_else(|| anyhow!("invalid date"))?;

    Local.from_local_datetime(&naive).earliest().ok_or_else(|| anyhow!("nonexistent local time"))
}

fn create_harness(settings: &[(&str, &str)]) -> Result<Harness> {
    let storage = Arc::new(SettingsStorage::new());

    for (key, value) in settings {
        storage.create(key, value, None)?;
    }

    let clock = Arc::new(FixedClock::new(local_time(15, 12, 0, 0, 0)?));
    let engine = TransactionEngine::new(Arc::new(AccountStorage::new()), Arc::new(LedgerStorage::new()), storage.clone())
        .with_clock(clock.clone());

    Ok(Harness { engine: Arc::new(engine), settings: storage, clock })
}

fn money(value: &str) -> Result<Monetary> {
    Ok(Monetary::from_str(value)?)
}

fn open(harness: &Harness, number: &str, balance: &str) -> Result<AccountView> {
    Ok(harness.engine.open_account(number, Owner::new("John Doe"), money(balance)?)?)
}

#[tokio::test]
async fn test_deposit_updates_balance_and_records_entry() -> Result<()> {
    let harness = create_harness(&[])?;
    open(&harness, ACCOUNT_NUMBER, "1000.00")?;

    let request = TransactionRequest::new(ACCOUNT_NUMBER, "DEPOSIT", money("500.00")?, Some("Salary".to_string()));
    let view = harness.engine.execute(request).await?;

    assert_eq!(view.transaction_type, TransactionType::Deposit);
    assert_eq!(view.amount.to_string(), "500.00");
    assert_eq!(view.balance_after.to_string(), "1500.00");
    assert_eq!(view.account_owner, "John Doe");
    assert_eq!(view.account_number, ACCOUNT_NUMBER);
    assert_eq!(view.description.as_deref(), Some("Salary"));
    assert_eq!(view.timestamp, harness.clock.now());
    assert_eq!(harness.engine.balance(ACCOUNT_NUMBER)?.to_string(), "1500.00");

    Ok(())
}

#[tokio::test]
async fn test_withdrawal_updates_balance() -> Result<()> {
    let harness = create_harness(&[])?;
    open(&harness, ACCOUNT_NUMBER, "1000.00")?;

    let view = harness.engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, money("300.00")?)).await?;

    assert_eq!(view.transaction_type, TransactionType::Withdraw);
    assert_eq!(view.balance_after.to_string(), "700.00");
    assert_eq!(harness.engine.balance(ACCOUNT_NUMBER)?.to_string(), "700.00");

    Ok(())
}

#[tokio::test]
async fn test_unknown_account_is_rejected() -> Result<()> {
    let harness = create_harness(&[])?;

    let result = harness.engine.execute(TransactionRequest::deposit("9999999999", money("10.00")?)).await;

    assert!(matches!(result, Err(TransactionError::AccountNotFound { .. })));
    assert!(harness.engine.all_transactions().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_inactive_account_rejects_transactions_without_side_effects() -> Result<()> {
    let harness = create_harness(&[])?;
    let account = open(&harness, ACCOUNT_NUMBER, "100.00")?;
    harness.engine.deactivate(account.id).await?;

    for request in [TransactionRequest::deposit(ACCOUNT_NUMBER, money("10.00")?), TransactionRequest::withdraw(ACCOUNT_NUMBER, money("10.00")?)] {
        let result = harness.engine.execute(request).await;

        assert!(matches!(result, Err(TransactionError::InactiveAccount { .. })));
    }

    assert_eq!(harness.engine.balance(ACCOUNT_NUMBER)?.to_string(), "100.00");
    assert!(harness.engine.transactions_by_account_number(ACCOUNT_NUMBER).is_empty());

    let reactivated = harness.engine.activate(account.id).await?;

    assert!(reactivated.active);
    assert!(harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("10.00")?)).await.is_ok());

    Ok(())
}

#[tokio::test]
async fn test_insufficient_balance_leaves_balance_and_ledger_unchanged() -> Result<()> {
    let harness = create_harness(&[])?;
    open(&harness, ACCOUNT_NUMBER, "100.00")?;

    let result = harness.engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, money("100.01")?)).await;

    assert!(matches!(result, Err(TransactionError::InsufficientBalance { .. })));
    assert_eq!(harness.engine.balance(ACCOUNT_NUMBER)?.to_string(), "100.00");
    assert!(harness.engine.transactions_by_account_number(ACCOUNT_NUMBER).is_empty());

    Ok(())
}

#[tokio::test]
async fn test_daily_withdrawal_limit_includes_current_attempt() -> Result<()> {
    let harness = create_harness(&[("MAX_DAILY_WITHDRAWAL", "5000.00")])?;
    open(&harness, ACCOUNT_NUMBER, "10000.00")?;

    harness.engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, money("4800.00")?)).await?;

    let exceeded = harness.engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, money("300.00")?)).await;

    match exceeded {
        Err(TransactionError::DailyLimitExceeded { limit, withdrawn_today, attempted, .. }) => {
            assert_eq!(limit.to_string(), "5000.00");
            assert_eq!(withdrawn_today.to_string(), "4800.00");
            assert_eq!(attempted.to_string(), "300.00");
        },
        other => return Err(anyhow!("expected DailyLimitExceeded, got {other:?}"))
    }

    let view = harness.engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, money("200.00")?)).await?;

    assert_eq!(view.balance_after.to_string(), "5000.00");

    let withdrawn: Vec<Monetary> = harness.engine.transactions_by_account_number(ACCOUNT_NUMBER).into_iter()
        .map(|view| view.amount)
        .collect();

    assert_eq!(Monetary::checked_sum(withdrawn), Some(money("5000.00")?));

    let further = harness.engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, money("1.00")?)).await;

    assert!(matches!(further, Err(TransactionError::DailyLimitExceeded { .. })));

    Ok(())
}

#[tokio::test]
async fn test_daily_limit_ignores_deposits_and_other_days() -> Result<()> {
    let harness = create_harness(&[("MAX_DAILY_WITHDRAWAL", "1000.00")])?;
    open(&harness, ACCOUNT_NUMBER, "5000.00")?;

    harness.clock.set(local_time(14, 18, 0, 0, 0)?);
    harness.engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, money("900.00")?)).await?;

    harness.clock.set(local_time(15, 0, 0, 0, 0)?);
    harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("900.00")?)).await?;

    let view = harness.engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, money("1000.00")?)).await?;

    assert_eq!(view.balance_after.to_string(), "4000.00");

    Ok(())
}

#[tokio::test]
async fn test_daily_window_drops_withdrawals_in_final_sub_second() -> Result<()> {
    // Known boundary gap: the window closes at 23:59:59, so a withdrawal stamped
    // 23:59:59.500 is not counted towards its own day.
    let harness = create_harness(&[("MAX_DAILY_WITHDRAWAL", "1000.00")])?;
    open(&harness, ACCOUNT_NUMBER, "5000.00")?;

    harness.clock.set(local_time(15, 23, 59, 59, 500)?);
    harness.engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, money("1000.00")?)).await?;

    harness.clock.set(local_time(15, 23, 59, 59, 800)?);
    let view = harness.engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, money("1000.00")?)).await?;

    assert_eq!(view.balance_after.to_string(), "3000.00");

    Ok(())
}

#[tokio::test]
async fn test_amount_bounds_are_inclusive() -> Result<()> {
    let harness = create_harness(&[("MIN_TRANSACTION_AMOUNT", "1.00"), ("MAX_TRANSACTION_AMOUNT", "100000.00")])?;
    open(&harness, ACCOUNT_NUMBER, "0")?;

    let below = harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("0.50")?)).await;
    let above = harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("150000.00")?)).await;

    assert!(matches!(below, Err(TransactionError::InvalidAmount { violation: AmountViolation::BelowMinimum(_), .. })));
    assert!(matches!(above, Err(TransactionError::InvalidAmount { violation: AmountViolation::AboveMaximum(_), .. })));

    harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("1.00")?)).await?;
    harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("100000.00")?)).await?;

    assert_eq!(harness.engine.balance(ACCOUNT_NUMBER)?.to_string(), "100001.00");

    Ok(())
}

#[tokio::test]
async fn test_sub_cent_maximum_is_enforced_rather_than_defaulted() -> Result<()> {
    let harness = create_harness(&[("MAX_TRANSACTION_AMOUNT", "500.005")])?;
    open(&harness, ACCOUNT_NUMBER, "1000.00")?;

    for amount in ["50000.00", "500.01"] {
        let result = harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money(amount)?)).await;

        assert!(matches!(result, Err(TransactionError::InvalidAmount { violation: AmountViolation::AboveMaximum(_), .. })));
    }

    let view = harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("500.00")?)).await?;

    assert_eq!(view.balance_after.to_string(), "1500.00");

    Ok(())
}

#[tokio::test]
async fn test_amount_bounds_are_checked_before_account_lookup() -> Result<()> {
    let harness = create_harness(&[])?;

    let result = harness.engine.execute(TransactionRequest::deposit("9999999999", money("0.50")?)).await;

    assert!(matches!(result, Err(TransactionError::InvalidAmount { .. })));

    Ok(())
}

#[tokio::test]
async fn test_unreadable_settings_fall_back_to_defaults() -> Result<()> {
    let harness = create_harness(&[("MIN_TRANSACTION_AMOUNT", "one"), ("MAX_TRANSACTION_AMOUNT", "")])?;
    open(&harness, ACCOUNT_NUMBER, "0")?;

    assert!(harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("1.00")?)).await.is_ok());
    assert!(matches!(
        harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("0.99")?)).await,
        Err(TransactionError::InvalidAmount { .. })
    ));
    assert!(matches!(
        harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("100000.01")?)).await,
        Err(TransactionError::InvalidAmount { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_settings_changes_apply_to_next_transaction() -> Result<()> {
    let harness = create_harness(&[("MAX_TRANSACTION_AMOUNT", "50.00")])?;
    open(&harness, ACCOUNT_NUMBER, "0")?;

    assert!(harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("60.00")?)).await.is_err());

    harness.settings.update("MAX_TRANSACTION_AMOUNT", "100.00", None)?;

    assert!(harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("60.00")?)).await.is_ok());

    Ok(())
}

#[tokio::test]
async fn test_cached_policy_is_refreshed_on_demand() -> Result<()> {
    let settings = Arc::new(SettingsStorage::new());
    settings.create("MAX_TRANSACTION_AMOUNT", "50.00", None)?;

    let engine = TransactionEngine::new(Arc::new(AccountStorage::new()), Arc::new(LedgerStorage::new()), settings.clone())
        .with_config(EngineConfig::default().with_policy_ttl(Duration::from_secs(60)));
    engine.open_account(ACCOUNT_NUMBER, Owner::new("John Doe"), Monetary::ZERO)?;

    assert!(engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("60.00")?)).await.is_err());

    settings.update("MAX_TRANSACTION_AMOUNT", "100.00", None)?;

    assert!(engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("60.00")?)).await.is_err());

    engine.refresh_policy();

    assert!(engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("60.00")?)).await.is_ok());

    Ok(())
}

#[tokio::test]
async fn test_invalid_transaction_type_is_rejected() -> Result<()> {
    let harness = create_harness(&[])?;
    open(&harness, ACCOUNT_NUMBER, "100.00")?;

    let result = harness.engine.execute(TransactionRequest::new(ACCOUNT_NUMBER, "TRANSFER", money("10.00")?, None)).await;

    assert!(matches!(result, Err(TransactionError::InvalidTransactionType { .. })));
    assert_eq!(harness.engine.balance(ACCOUNT_NUMBER)?.to_string(), "100.00");

    Ok(())
}

#[tokio::test]
async fn test_transaction_lookup_by_id() -> Result<()> {
    let harness = create_harness(&[])?;
    open(&harness, ACCOUNT_NUMBER, "0")?;

    let view = harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("25.00")?)).await?;

    assert_eq!(harness.engine.transaction_by_id(view.id)?, view);

    let missing = harness.engine.transaction_by_id(uuid::Uuid::new_v4());

    assert!(matches!(missing, Err(TransactionError::TransactionNotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_listings_are_newest_first() -> Result<()> {
    let harness = create_harness(&[])?;
    let account = open(&harness, ACCOUNT_NUMBER, "0")?;
    open(&harness, "5555555555", "0")?;

    // Clock moves backwards so insertion order is the reverse of timestamp order.
    for (offset, amount) in [(30, "3.00"), (10, "1.00"), (20, "2.00")] {
        harness.clock.set(local_time(15, 12, 0, 0, 0)? + TimeDelta::seconds(offset));
        harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money(amount)?)).await?;
    }

    harness.engine.execute(TransactionRequest::deposit("5555555555", money("9.00")?)).await?;

    let by_number: Vec<String> = harness.engine.transactions_by_account_number(ACCOUNT_NUMBER).into_iter()
        .map(|view| view.amount.to_string())
        .collect();
    let by_id: Vec<String> = harness.engine.transactions_by_account_id(account.id).into_iter()
        .map(|view| view.amount.to_string())
        .collect();

    assert_eq!(by_number, vec!["3.00", "2.00", "1.00"]);
    assert_eq!(by_id, by_number);
    assert_eq!(harness.engine.all_transactions().len(), 4);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_drain_account_exactly_to_zero() -> Result<()> {
    const WITHDRAWALS: usize = 50;

    let harness = create_harness(&[("MAX_DAILY_WITHDRAWAL", "100000.00")])?;
    open(&harness, ACCOUNT_NUMBER, "500.00")?;

    let mut tasks = JoinSet::new();

    for _ in 0..WITHDRAWALS {
        let engine = harness.engine.clone();
        let amount = money("10.00")?;
        tasks.spawn(async move { engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, amount)).await });
    }

    let mut committed = 0;

    while let Some(result) = tasks.join_next().await {
        result??;
        committed += 1;
    }

    let ledger = harness.engine.transactions_by_account_number(ACCOUNT_NUMBER);

    assert_eq!(committed, WITHDRAWALS);
    assert!(harness.engine.balance(ACCOUNT_NUMBER)?.is_zero());
    assert_eq!(ledger.len(), WITHDRAWALS);
    assert!(ledger.iter().all(|view| !view.balance_after.is_negative()));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_oversubscribed_withdrawals_reject_the_excess() -> Result<()> {
    const ATTEMPTS: usize = 40;
    const AFFORDABLE: usize = 25;

    let harness = create_harness(&[("MAX_DAILY_WITHDRAWAL", "100000.00")])?;
    open(&harness, ACCOUNT_NUMBER, "250.00")?;

    let mut tasks = JoinSet::new();

    for _ in 0..ATTEMPTS {
        let engine = harness.engine.clone();
        let amount = money("10.00")?;
        tasks.spawn(async move { engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, amount)).await });
    }

    let mut committed = 0;
    let mut insufficient = 0;

    while let Some(result) = tasks.join_next().await {
        match result? {
            Ok(_) => committed += 1,
            Err(TransactionError::InsufficientBalance { .. }) => insufficient += 1,
            Err(error) => return Err(anyhow!("unexpected failure: {error}"))
        }
    }

    let mut ledger = harness.engine.transactions_by_account_number(ACCOUNT_NUMBER);
    ledger.sort_by(|left, right| right.balance_after.cmp(&left.balance_after));

    assert_eq!(committed, AFFORDABLE);
    assert_eq!(insufficient, ATTEMPTS - AFFORDABLE);
    assert!(harness.engine.balance(ACCOUNT_NUMBER)?.is_zero());

    // Every committed withdrawal observed a distinct balance: no lost updates.
    for (index, view) in ledger.iter().enumerate() {
        assert_eq!(view.balance_after, Monetary::from_cents(25_000 - 1_000 * (index as i64 + 1)));
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_cannot_jointly_exceed_daily_limit() -> Result<()> {
    let harness = create_harness(&[("MAX_DAILY_WITHDRAWAL", "1000.00")])?;
    open(&harness, ACCOUNT_NUMBER, "10000.00")?;

    let mut tasks = JoinSet::new();

    for _ in 0..30 {
        let engine = harness.engine.clone();
        let amount = money("100.00")?;
        tasks.spawn(async move { engine.execute(TransactionRequest::withdraw(ACCOUNT_NUMBER, amount)).await });
    }

    let mut committed = 0;
    let mut limited = 0;

    while let Some(result) = tasks.join_next().await {
        match result? {
            Ok(_) => committed += 1,
            Err(TransactionError::DailyLimitExceeded { .. }) => limited += 1,
            Err(error) => return Err(anyhow!("unexpected failure: {error}"))
        }
    }

    assert_eq!(committed, 10);
    assert_eq!(limited, 20);
    assert_eq!(harness.engine.balance(ACCOUNT_NUMBER)?.to_string(), "9000.00");

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_balance_equals_initial_plus_deposits_minus_withdrawals() -> Result<()> {
    let harness = create_harness(&[("MAX_DAILY_WITHDRAWAL", "100000.00")])?;
    let accounts = ["1000000001", "1000000002", "1000000003"];

    for number in accounts {
        open(&harness, number, "100.00")?;
    }

    let mut tasks = JoinSet::new();

    for index in 0..90 {
        let engine = harness.engine.clone();
        let number = accounts[(index / 3) % accounts.len()];
        let request = if index % 3 == 0 {
            TransactionRequest::deposit(number, money("7.25")?)
        } else {
            TransactionRequest::withdraw(number, money("12.50")?)
        };

        tasks.spawn(async move { engine.execute(request).await });
    }

    while let Some(result) = tasks.join_next().await {
        match result? {
            Ok(_) | Err(TransactionError::InsufficientBalance { .. }) => {},
            Err(error) => return Err(anyhow!("unexpected failure: {error}"))
        }
    }

    for number in accounts {
        let ledger = harness.engine.transactions_by_account_number(number);
        let deposits = Monetary::checked_sum(ledger.iter().filter(|view| view.transaction_type == TransactionType::Deposit).map(|view| view.amount))
            .ok_or_else(|| anyhow!("overflow"))?;
        let withdrawals = Monetary::checked_sum(ledger.iter().filter(|view| view.transaction_type == TransactionType::Withdraw).map(|view| view.amount))
            .ok_or_else(|| anyhow!("overflow"))?;
        let expected = money("100.00")?.checked_add(deposits).and_then(|value| value.checked_sub(withdrawals))
            .ok_or_else(|| anyhow!("overflow"))?;
        let balance = harness.engine.balance(number)?;

        assert_eq!(balance, expected);
        assert!(!balance.is_negative());
        assert!(ledger.iter().all(|view| !view.balance_after.is_negative()));
    }

    Ok(())
}

#[tokio::test]
async fn test_open_account_validates_number_and_uniqueness() -> Result<()> {
    let harness = create_harness(&[])?;
    open(&harness, ACCOUNT_NUMBER, "0")?;

    assert!(matches!(
        harness.engine.open_account(ACCOUNT_NUMBER, Owner::new("Jane Roe"), Monetary::ZERO),
        Err(AccountError::DuplicateAccount { .. })
    ));
    assert!(matches!(
        harness.engine.open_account("12345", Owner::new("Jane Roe"), Monetary::ZERO),
        Err(AccountError::InvalidAccountNumber { .. })
    ));
    assert!(matches!(
        harness.engine.open_account("5555555555", Owner::new("Jane Roe"), money("-1.00")?),
        Err(AccountError::NegativeInitialBalance { .. })
    ));
    assert_eq!(harness.engine.all_accounts().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_account_reads_and_active_filter() -> Result<()> {
    let harness = create_harness(&[])?;
    let first = open(&harness, "1000000001", "10.00")?;
    let second = open(&harness, "1000000002", "20.00")?;
    harness.engine.deactivate(second.id).await?;

    assert_eq!(harness.engine.account_by_id(first.id)?.account_number, "1000000001");
    assert_eq!(harness.engine.account_by_number("1000000002")?.customer_name, "John Doe");
    assert_eq!(harness.engine.active_accounts().len(), 1);
    assert_eq!(harness.engine.all_accounts().len(), 2);
    assert!(matches!(harness.engine.account_by_id(uuid::Uuid::new_v4()), Err(AccountError::AccountNotFound { .. })));
    assert!(matches!(harness.engine.balance("9999999999"), Err(AccountError::AccountNumberNotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_engine_rejects_work_after_shutdown() -> Result<()> {
    let harness = create_harness(&[])?;
    open(&harness, ACCOUNT_NUMBER, "0")?;

    harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("5.00")?)).await?;
    harness.engine.shutdown().await;

    let result = harness.engine.execute(TransactionRequest::deposit(ACCOUNT_NUMBER, money("5.00")?)).await;

    assert!(matches!(result, Err(TransactionError::Unavailable { .. })));
    assert!(result.err().is_some_and(|error| error.is_transient()));
    assert_eq!(harness.engine.balance(ACCOUNT_NUMBER)?.to_string(), "5.00");

    Ok(())
}

#[tokio::test]
async fn test_statistics_reflect_committed_transactions() -> Result<()> {
    let harness = create_harness(&[])?;
    open(&harness, "1000000001", "100.00")?;
    open(&harness, "1000000002", "0.01")?;

    harness.engine.execute(TransactionRequest::deposit("1000000001", money("50.00")?)).await?;
    harness.engine.execute(TransactionRequest::withdraw("1000000001", money("20.00")?)).await?;

    let statistics = harness.engine.statistics()?;

    assert_eq!(statistics.transactions.total_transactions, 2);
    assert_eq!(statistics.transactions.net_cash_flow.to_string(), "30.00");
    assert_eq!(statistics.accounts.total_balance.to_string(), "130.01");
    assert_eq!(statistics.accounts.average_balance.to_string(), "65.01");

    Ok(())
}

fn create_temporary_csv(header: &str, rows: &[&str]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;

    writeln!(file, "{header}")?;

    for row in rows {
        writeln!(file, "{row}")?;
    }

    Ok(file)
}

#[tokio::test]
async fn test_engine_replays_valid_csv_stream_successfully() -> Result<()> {
    let harness = create_harness(&[])?;
    let accounts = create_temporary_csv("account_number,customer_name,initial_balance,active", &[
        "1000000001,Alice,100.00,true",
        "1000000002,Bob,0,",
        "1000000003,Carol,50.00,false",
    ])?;
    let requests = create_temporary_csv("account_number,type,amount,description", &[
        "1000000001,DEPOSIT,10.00,Top up",
        "1000000002,DEPOSIT,20.00,",
        "1000000001,WITHDRAW,5.00,",
        "1000000002,WITHDRAW,50.00,",
        "1000000003,DEPOSIT,5.00,",
    ])?;

    let path = |file: &NamedTempFile| file.path().to_str().map(str::to_string).ok_or_else(|| anyhow!("non utf-8 path"));

    assert_eq!(harness.engine.seed_accounts(&path(&accounts)?).await?, 3);

    let summary = harness.engine.replay(&path(&requests)?).await?;

    assert_eq!(summary.committed, 3);
    assert_eq!(summary.rejected.get("INSUFFICIENT_BALANCE"), Some(&1));
    assert_eq!(summary.rejected.get("INACTIVE_ACCOUNT"), Some(&1));
    assert_eq!(harness.engine.balance("1000000001")?.to_string(), "105.00");
    assert_eq!(harness.engine.balance("1000000002")?.to_string(), "20.00");

    Ok(())
}

#[tokio::test]
async fn test_engine_gracefully_skips_malformed_csv_input() -> Result<()> {
    let harness = create_harness(&[])?;
    open(&harness, ACCOUNT_NUMBER, "0")?;

    let requests = create_temporary_csv("account_number,type,amount,description", &[
        "1234567890,DEPOSIT,10.00,",
        "1234567890,DEPOSIT,abc,",
        "1234567890,DEPOSIT,1.005,",
        "1234567890,TRANSFER,5.00,",
        "1234567890,DEPOSIT,-5.00,",
        "1234567890,DEPOSIT,5.00,",
    ])?;

    let path = requests.path().to_str().ok_or_else(|| anyhow!("non utf-8 path"))?;
    let summary = harness.engine.replay(path).await?;

    assert_eq!(summary.committed, 2);
    assert_eq!(summary.malformed, 2);
    assert_eq!(summary.rejected.get("INVALID_TRANSACTION_TYPE"), Some(&1));
    assert_eq!(summary.rejected.get("INVALID_REQUEST"), Some(&1));
    assert_eq!(summary.total_rejected(), 2);
    assert_eq!(harness.engine.balance(ACCOUNT_NUMBER)?.to_string(), "15.00");

    Ok(())
}

#[tokio::test]
async fn test_engine_handles_missing_csv_file_without_error() -> Result<()> {
    let harness = create_harness(&[])?;

    let summary = harness.engine.replay("missing.csv").await?;

    assert_eq!(summary.committed, 0);
    assert_eq!(summary.total_rejected(), 0);

    Ok(())
}
