use std::sync::Arc;

use tracing::info;

use crate::clock::Clock;
use crate::models::{Account, AccountError, DayWindow, LedgerEntry, TransactionError, TransactionType};
use crate::settings::{Policy, PolicyKey};
use crate::storage::{AccountStore, LedgerStore};
use crate::types::{AccountId, Monetary};

/// A validated deposit or withdrawal, ready to be applied by the account's worker.
#[derive(Debug, Clone)]
pub struct TransactionOrder {
    pub transaction_type: TransactionType,
    pub amount: Monetary,
    pub description: Option<String>
}

/// Everything an account worker needs to read and commit state.
pub struct ActorContext {
    pub accounts: Arc<dyn AccountStore>,
    pub ledger: Arc<dyn LedgerStore>,
    pub policy: Arc<Policy>,
    pub clock: Arc<dyn Clock>
}

impl ActorContext {
    /// Applies one order to the account as a single unit.
    ///
    /// Must only be called by the worker that owns `account_id`: the balance read, the
    /// daily-limit aggregate and the write-back are not atomic with respect to any other caller.
    /// Every check runs before the first write, so a rejection leaves no trace.
    pub async fn apply(&self, account_id: AccountId, order: TransactionOrder) -> Result<LedgerEntry, TransactionError> {
        let account = self.accounts.find_by_id(account_id)
            .ok_or_else(|| TransactionError::account_not_found(&account_id.to_string()))?;

        if !account.active {
            return Err(TransactionError::InactiveAccount { account_number: account.account_number });
        }

        let now = self.clock.now();

        if order.transaction_type == TransactionType::Withdraw {
            self.check_daily_withdrawal_limit(&account, order.amount, DayWindow::containing(now)).await?;
        }

        let balance_after = account.settle(order.transaction_type, order.amount)?;
        let updated = self.accounts.save(account.with_balance(balance_after, now));

        let entry = LedgerEntry::record(
            updated.id,
            updated.account_number,
            order.transaction_type,
            order.amount,
            balance_after,
            now,
            order.description
        );

        Ok(self.ledger.append(entry))
    }

    pub fn set_active(&self, account_id: AccountId, active: bool) -> Result<Account, AccountError> {
        let account = self.accounts.find_by_id(account_id)
            .ok_or(AccountError::AccountNotFound { account_id })?;

        Ok(self.accounts.save(account.with_active(active, self.clock.now())))
    }

    async fn check_daily_withdrawal_limit(&self, account: &Account, amount: Monetary, window: DayWindow) -> Result<(), TransactionError> {
        let limit = self.policy.resolve(PolicyKey::MaxDailyWithdrawal).await;
        let overflow = || TransactionError::Overflow { account_number: account.account_number.clone() };

        let withdrawals = self.ledger.withdrawals_within(account.account_number.as_str(), &window);
        let withdrawn_today = Monetary::checked_sum(withdrawals).ok_or_else(overflow)?;
        let total_with_today = withdrawn_today.checked_add(amount).ok_or_else(overflow)?;

        if total_with_today.value() > limit {
            return Err(TransactionError::DailyLimitExceeded {
                account_number: account.account_number.clone(),
                limit,
                withdrawn_today,
                attempted: amount
            });
        }

        info!(
            "Daily withdrawal validation passed for account [{}]. Total today: {}, Limit: {}",
            account.account_number, total_with_today.rounded(), limit
        );

        Ok(())
    }
}
