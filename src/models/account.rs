use crate::models::errors::{AccountError, TransactionError};
use crate::models::TransactionType;
use crate::types::{AccountId, AccountNumber, CustomerId, Monetary};
use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

/// The customer an account belongs to, as far as this core needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Owner {
    pub customer_id: CustomerId,
    pub name: String
}

impl Owner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            customer_id: Uuid::new_v4(),
            name: name.into()
        }
    }
}

/// Represents the persisted state of a single customer account.
///
/// State transitions are pure: `settle` computes the balance a transaction would
/// produce and `with_balance`/`with_active` return the next version of the account.
/// Writing that version back is left to the account worker that owns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// Opaque unique identifier.
    pub id: AccountId,
    /// Unique human-facing number.
    pub account_number: AccountNumber,
    /// Owning customer.
    pub owner: Owner,
    /// Current balance, never negative once committed.
    pub balance: Monetary,
    /// Inactive accounts reject every transaction.
    pub active: bool,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>
}

impl Account {
    /// Creates a new active account holding the initial deposit.
    ///
    /// # Errors
    /// Returns `AccountError::NegativeInitialBalance` when `initial_balance` is below zero.
    pub fn open(account_number: AccountNumber, owner: Owner, initial_balance: Monetary, now: DateTime<Local>) -> Result<Self, AccountError> {
        if initial_balance.is_negative() {
            return Err(AccountError::NegativeInitialBalance {
                account_number,
                balance: initial_balance
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            account_number,
            owner,
            balance: initial_balance,
            active: true,
            created_at: now,
            updated_at: now
        })
    }

    /// Computes the balance after applying `amount` as the given transaction type.
    ///
    /// # Errors
    /// Returns `TransactionError` if:
    /// - The account is inactive.
    /// - A withdrawal exceeds the current balance.
    /// - The arithmetic overflows.
    pub fn settle(&self, transaction_type: TransactionType, amount: Monetary) -> Result<Monetary, TransactionError> {
        if !self.active {
            return Err(TransactionError::InactiveAccount { account_number: self.account_number.clone() });
        }

        match transaction_type {
            TransactionType::Deposit => self.balance.checked_add(amount)
                .ok_or_else(|| TransactionError::Overflow { account_number: self.account_number.clone() }),
            TransactionType::Withdraw => {
                if self.balance < amount {
                    return Err(TransactionError::InsufficientBalance {
                        account_number: self.account_number.clone(),
                        balance: self.balance,
                        amount
                    });
                }

                self.balance.checked_sub(amount)
                    .ok_or_else(|| TransactionError::Overflow { account_number: self.account_number.clone() })
            }
        }
    }

    pub fn with_balance(&self, balance: Monetary, now: DateTime<Local>) -> Self {
        Self {
            balance,
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn with_active(&self, active: bool, now: DateTime<Local>) -> Self {
        Self {
            active,
            updated_at: now,
            ..self.clone()
        }
    }
}
