use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::errors::RequestError;
use crate::models::TransactionType;
use crate::types::{AccountId, AccountNumber, Monetary, TransactionId};

/// An immutable ledger entry recording one committed deposit or withdrawal.
///
/// Stores only ever append these; nothing updates or removes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub account_number: AccountNumber,
    pub transaction_type: TransactionType,
    /// Strictly positive amount moved.
    pub amount: Monetary,
    /// Account balance immediately after this entry.
    pub balance_after: Monetary,
    pub timestamp: DateTime<Local>,
    pub description: Option<String>
}

impl LedgerEntry {
    pub fn record(
        account_id: AccountId,
        account_number: AccountNumber,
        transaction_type: TransactionType,
        amount: Monetary,
        balance_after: Monetary,
        timestamp: DateTime<Local>,
        description: Option<String>
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            account_number,
            transaction_type,
            amount,
            balance_after,
            timestamp,
            description
        }
    }
}

/// A deposit or withdrawal request as it arrives from a caller.
///
/// The type is kept as raw text so the engine can reject unknown kinds itself.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRequest {
    pub account_number: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub amount: Monetary,
    #[serde(default)]
    pub description: Option<String>
}

impl TransactionRequest {
    pub fn new(account_number: impl Into<String>, transaction_type: impl Into<String>, amount: Monetary, description: Option<String>) -> Self {
        Self {
            account_number: account_number.into(),
            transaction_type: transaction_type.into(),
            amount,
            description
        }
    }

    pub fn deposit(account_number: impl Into<String>, amount: Monetary) -> Self {
        Self::new(account_number, TransactionType::Deposit.to_string(), amount, None)
    }

    pub fn withdraw(account_number: impl Into<String>, amount: Monetary) -> Self {
        Self::new(account_number, TransactionType::Withdraw.to_string(), amount, None)
    }

    /// Caller-side input checks: a non-blank account number and type, a strictly positive amount.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.account_number.trim().is_empty() {
            return Err(RequestError::BlankAccountNumber);
        }

        if self.transaction_type.trim().is_empty() {
            return Err(RequestError::BlankTransactionType);
        }

        if !self.amount.is_positive() {
            return Err(RequestError::NonPositiveAmount(self.amount));
        }

        Ok(())
    }
}
