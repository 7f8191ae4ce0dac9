use chrono::{DateTime, Local};
use serde::Serialize;

use crate::models::{Account, LedgerEntry, TransactionType};
use crate::types::{AccountId, CustomerId, Monetary, TransactionId};

/// A ledger entry as presented to callers, with the account owner's display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    pub id: TransactionId,
    pub account_number: String,
    pub account_owner: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Monetary,
    pub balance_after: Monetary,
    pub timestamp: DateTime<Local>,
    pub description: Option<String>
}

impl TransactionView {
    pub fn new(entry: LedgerEntry, account_owner: String) -> Self {
        Self {
            id: entry.id,
            account_number: entry.account_number.to_string(),
            account_owner,
            transaction_type: entry.transaction_type,
            amount: entry.amount,
            balance_after: entry.balance_after,
            timestamp: entry.timestamp,
            description: entry.description
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    pub id: AccountId,
    pub account_number: String,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub balance: Monetary,
    pub active: bool,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            account_number: account.account_number.to_string(),
            customer_id: account.owner.customer_id,
            customer_name: account.owner.name,
            balance: account.balance,
            active: account.active,
            created_at: account.created_at,
            updated_at: account.updated_at
        }
    }
}
