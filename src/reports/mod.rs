
use serde::Serialize;
use thiserror::Error;

use crate::models::{Account, LedgerEntry, TransactionType};
use crate::types::Monetary;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Numeric overflow while aggregating {0}")]
    Overflow(&'static str)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionStatistics {
    pub total_transactions: usize,
    pub total_deposits: usize,
    pub total_withdrawals: usize,
    pub total_deposit_amount: Monetary,
    pub total_withdrawal_amount: Monetary,
    pub net_cash_flow: Monetary
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountStatistics {
    pub total_accounts: usize,
    pub active_accounts: usize,
    pub inactive_accounts: usize,
    pub total_balance: Monetary,
    /// Rounded half-up to two places; zero when there are no accounts.
    pub average_balance: Monetary
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStatistics {
    pub accounts: AccountStatistics,
    pub transactions: TransactionStatistics
}

impl TransactionStatistics {
    pub fn collect(entries: &[LedgerEntry]) -> Result<Self, ReportError> {
        let amounts_of = |transaction_type: TransactionType| {
            entries.iter()
                .filter(move |entry| entry.transaction_type == transaction_type)
                .map(|entry| entry.amount)
        };

        let total_deposit_amount = Monetary::checked_sum(amounts_of(TransactionType::Deposit))
            .ok_or(ReportError::Overflow("deposits"))?;
        let total_withdrawal_amount = Monetary::checked_sum(amounts_of(TransactionType::Withdraw))
            .ok_or(ReportError::Overflow("withdrawals"))?;
        let net_cash_flow = total_deposit_amount.checked_sub(total_withdrawal_amount)
            .ok_or(ReportError::Overflow("net cash flow"))?;

        Ok(Self {
            total_transactions: entries.len(),
            total_deposits: amounts_of(TransactionType::Deposit).count(),
            total_withdrawals: amounts_of(TransactionType::Withdraw).count(),
            total_deposit_amount,
            total_withdrawal_amount,
            net_cash_flow
        })
    }
}

impl AccountStatistics {
    pub fn collect(accounts: &[Account]) -> Result<Self, ReportError> {
        let active_accounts = accounts.iter().filter(|account| account.active).count();
        let total_balance = Monetary::checked_sum(accounts.iter().map(|account| account.balance))
            .ok_or(ReportError::Overflow("balances"))?;

        Ok(Self {
            total_accounts: accounts.len(),
            active_accounts,
            inactive_accounts: accounts.len() - active_accounts,
            total_balance,
            average_balance: total_balance.checked_average(accounts.len()).unwrap_or(Monetary::ZERO)
        })
    }
}

impl DashboardStatistics {
    pub fn collect(accounts: &[Account], entries: &[LedgerEntry]) -> Result<Self, ReportError> {
        Ok(Self {
            accounts: AccountStatistics::collect(accounts)?,
            transactions: TransactionStatistics::collect(entries)?
        })
    }
}
