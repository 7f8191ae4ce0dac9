use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::oneshot;
use tracing::{error, info};

use crate::actors::{AccountActor, AccountMailbox, ActorContext, TransactionOrder};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::models::{
    Account, AccountError, AccountView, LedgerEntry, Owner, TransactionError, TransactionRequest, TransactionType, TransactionView
};
use crate::reports::{DashboardStatistics, ReportError};
use crate::settings::{Policy, PolicyKey, SettingsProvider};
use crate::storage::{AccountStore, LedgerStore};
use crate::types::{AccountId, AccountNumber, Monetary, TransactionId};

/// Executes deposits and withdrawals against accounts and serves the ledger.
///
/// Each account gets its own worker the first time it is touched. Amount bounds and
/// account existence are checked up front; everything that depends on the account's
/// current state runs inside its worker so concurrent requests for the same account
/// are serialized, while different accounts never contend.
pub struct TransactionEngine {
    accounts: Arc<dyn AccountStore>,
    ledger: Arc<dyn LedgerStore>,
    settings: Arc<dyn SettingsProvider>,
    policy: Arc<Policy>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    actors: DashMap<AccountId, AccountActor>,
    closed: AtomicBool
}

/// A transaction accepted into its account's queue, waiting to be applied.
pub struct PendingTransaction {
    outcome: oneshot::Receiver<Result<LedgerEntry, TransactionError>>,
    account_number: AccountNumber,
    account_owner: String
}

impl PendingTransaction {
    pub async fn outcome(self) -> Result<TransactionView, TransactionError> {
        let account_number = self.account_number;
        let entry = self.outcome.await
            .map_err(|_| TransactionError::Unavailable { account_number })??;

        Ok(TransactionView::new(entry, self.account_owner))
    }
}

impl TransactionEngine {
    /// Creates a new engine over the provided stores with default configuration and the system clock.
    pub fn new(accounts: Arc<dyn AccountStore>, ledger: Arc<dyn LedgerStore>, settings: Arc<dyn SettingsProvider>) -> Self {
        let config = EngineConfig::default();

        Self {
            accounts,
            ledger,
            policy: Arc::new(Policy::new(settings.clone(), config.policy_ttl)),
            settings,
            clock: Arc::new(SystemClock),
            config,
            actors: DashMap::new(),
            closed: AtomicBool::new(false)
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.policy = Arc::new(Policy::new(self.settings.clone(), config.policy_ttl));
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs one deposit or withdrawal end to end.
    ///
    /// # Errors
    /// Business-rule rejections (`InvalidTransactionType`, `InvalidAmount`, `AccountNotFound`,
    /// `InactiveAccount`, `DailyLimitExceeded`, `InsufficientBalance`) leave no trace in
    /// either store. `Busy` and `Unavailable` are transient and nothing was applied.
    pub async fn execute(&self, request: TransactionRequest) -> Result<TransactionView, TransactionError> {
        self.submit(request).await?.outcome().await
    }

    /// Validates a request and enqueues it on its account's worker without waiting for the outcome.
    ///
    /// Requests submitted one after another for the same account are applied in submission order.
    pub async fn submit(&self, request: TransactionRequest) -> Result<PendingTransaction, TransactionError> {
        let transaction_type = TransactionType::from_str(&request.transaction_type)?;

        self.check_amount(request.amount).await?;

        let account = self.accounts.find_by_number(request.account_number.trim())
            .ok_or_else(|| TransactionError::account_not_found(&request.account_number))?;

        if !account.active {
            return Err(TransactionError::InactiveAccount { account_number: account.account_number });
        }

        let mailbox = self.mailbox(&account)
            .ok_or_else(|| TransactionError::Unavailable { account_number: account.account_number.clone() })?;

        let order = TransactionOrder {
            transaction_type,
            amount: request.amount,
            description: request.description
        };

        let outcome = mailbox.submit(order, self.config.enqueue_timeout).await?;

        Ok(PendingTransaction {
            outcome,
            account_number: account.account_number,
            account_owner: account.owner.name
        })
    }

    pub fn transaction_by_id(&self, transaction_id: TransactionId) -> Result<TransactionView, TransactionError> {
        self.ledger.find_by_id(transaction_id)
            .map(|entry| self.view(entry))
            .ok_or(TransactionError::TransactionNotFound { transaction_id })
    }

    pub fn all_transactions(&self) -> Vec<TransactionView> {
        self.ledger.all().into_iter().map(|entry| self.view(entry)).collect()
    }

    /// Ledger of one account, most recent first.
    pub fn transactions_by_account_id(&self, account_id: AccountId) -> Vec<TransactionView> {
        let owner = self.owner_name(account_id);

        self.ledger.find_by_account_id(account_id).into_iter()
            .map(|entry| TransactionView::new(entry, owner.clone()))
            .collect()
    }

    /// Ledger of one account, most recent first.
    pub fn transactions_by_account_number(&self, account_number: &str) -> Vec<TransactionView> {
        self.ledger.find_by_account_number(account_number.trim()).into_iter()
            .map(|entry| self.view(entry))
            .collect()
    }

    /// Opens a new active account holding `initial_balance`.
    pub fn open_account(&self, account_number: &str, owner: Owner, initial_balance: Monetary) -> Result<AccountView, AccountError> {
        let account_number = AccountNumber::from_str(account_number)
            .map_err(|value| AccountError::InvalidAccountNumber { value })?;

        let account = Account::open(account_number, owner, initial_balance, self.clock.now())?;

        if !self.accounts.insert(account.clone()) {
            return Err(AccountError::DuplicateAccount { account_number: account.account_number });
        }

        info!("Opened account [{}] for [{}] with balance {}", account.account_number, account.owner.name, account.balance);

        Ok(account.into())
    }

    pub async fn activate(&self, account_id: AccountId) -> Result<AccountView, AccountError> {
        self.set_active(account_id, true).await
    }

    pub async fn deactivate(&self, account_id: AccountId) -> Result<AccountView, AccountError> {
        self.set_active(account_id, false).await
    }

    pub fn account_by_id(&self, account_id: AccountId) -> Result<AccountView, AccountError> {
        self.accounts.find_by_id(account_id)
            .map(AccountView::from)
            .ok_or(AccountError::AccountNotFound { account_id })
    }

    pub fn account_by_number(&self, account_number: &str) -> Result<AccountView, AccountError> {
        self.accounts.find_by_number(account_number.trim())
            .map(AccountView::from)
            .ok_or_else(|| AccountError::AccountNumberNotFound { account_number: account_number.to_string() })
    }

    pub fn all_accounts(&self) -> Vec<AccountView> {
        self.accounts.all().into_iter().map(AccountView::from).collect()
    }

    pub fn active_accounts(&self) -> Vec<AccountView> {
        self.accounts.all().into_iter()
            .filter(|account| account.active)
            .map(AccountView::from)
            .collect()
    }

    pub fn balance(&self, account_number: &str) -> Result<Monetary, AccountError> {
        self.account_by_number(account_number).map(|account| account.balance)
    }

    pub fn statistics(&self) -> Result<DashboardStatistics, ReportError> {
        DashboardStatistics::collect(&self.accounts.all(), &self.ledger.all())
    }

    /// Forces the next policy lookup to read the settings provider again.
    pub fn refresh_policy(&self) {
        self.policy.invalidate();
    }

    /// Stops accepting work, then waits for every account worker to drain its queue.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);

        loop {
            let account_ids: Vec<AccountId> = self.actors.iter().map(|item| *item.key()).collect();

            if account_ids.is_empty() {
                break;
            }

            let despawns = account_ids.into_iter()
                .filter_map(|account_id| self.actors.remove(&account_id))
                .map(|(_, actor)| actor.despawn());

            for result in join_all(despawns).await {
                if let Err(error) = result {
                    error!("An account worker did not despawn gracefully: {error:?}");
                }
            }
        }
    }

    async fn check_amount(&self, amount: Monetary) -> Result<(), TransactionError> {
        let minimum = self.policy.resolve(PolicyKey::MinTransactionAmount).await;

        if amount.value() < minimum {
            return Err(TransactionError::below_minimum(amount, minimum));
        }

        let maximum = self.policy.resolve(PolicyKey::MaxTransactionAmount).await;

        if amount.value() > maximum {
            return Err(TransactionError::above_maximum(amount, maximum));
        }

        if !amount.is_positive() {
            return Err(TransactionError::not_positive(amount));
        }

        Ok(())
    }

    async fn set_active(&self, account_id: AccountId, active: bool) -> Result<AccountView, AccountError> {
        let account = self.accounts.find_by_id(account_id)
            .ok_or(AccountError::AccountNotFound { account_id })?;

        let mailbox = self.mailbox(&account)
            .ok_or_else(|| AccountError::Unavailable { account_number: account.account_number.clone() })?;

        let updated = mailbox.set_active(active, self.config.enqueue_timeout).await?;

        info!("Account [{}] is now {}", updated.account_number, if updated.active { "active" } else { "inactive" });

        Ok(updated.into())
    }

    /// Mailbox of the account's worker, spawning it on first use. `None` once shut down.
    fn mailbox(&self, account: &Account) -> Option<AccountMailbox> {
        match self.actors.entry(account.id) {
            Entry::Occupied(occupied) => Some(occupied.get().mailbox()),
            Entry::Vacant(vacant) => {
                if self.closed.load(Ordering::SeqCst) {
                    return None;
                }

                let actor = AccountActor::new(account, self.actor_context(), self.config.mailbox_capacity);
                Some(vacant.insert(actor).mailbox())
            }
        }
    }

    fn actor_context(&self) -> Arc<ActorContext> {
        Arc::new(ActorContext {
            accounts: self.accounts.clone(),
            ledger: self.ledger.clone(),
            policy: self.policy.clone(),
            clock: self.clock.clone()
        })
    }

    fn owner_name(&self, account_id: AccountId) -> String {
        self.accounts.find_by_id(account_id)
            .map(|account| account.owner.name)
            .unwrap_or_default()
    }

    fn view(&self, entry: LedgerEntry) -> TransactionView {
        let owner = self.owner_name(entry.account_id);
        TransactionView::new(entry, owner)
    }
}
