use crate::types::{AccountId, AccountNumber, Monetary, TransactionId};
use rust_decimal::Decimal;
use std::fmt;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Which policy bound an amount broke.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AmountViolation {
    NotPositive,
    BelowMinimum(Decimal),
    AboveMaximum(Decimal)
}

impl Display for AmountViolation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountViolation::NotPositive => write!(formatter, "must be greater than zero"),
            AmountViolation::BelowMinimum(minimum) => write!(formatter, "must be at least {minimum}"),
            AmountViolation::AboveMaximum(maximum) => write!(formatter, "cannot exceed {maximum}")
        }
    }
}

/// Outcome of a failed deposit, withdrawal or ledger read.
///
/// Business-rule rejections are terminal. `Busy` and `Unavailable` describe contention
/// or shutdown of the account worker and may be retried by the caller.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Account not found with number [{account_number}]")]
    AccountNotFound {
        account_number: String
    },
    #[error("Cannot perform transaction on inactive account [{account_number}]")]
    InactiveAccount {
        account_number: AccountNumber
    },
    #[error("Transaction amount {amount} {violation}")]
    InvalidAmount {
        amount: Monetary,
        violation: AmountViolation
    },
    #[error("Insufficient balance on account [{account_number}]: balance {balance}, requested {amount}")]
    InsufficientBalance {
        account_number: AccountNumber,
        balance: Monetary,
        amount: Monetary
    },
    #[error("Daily withdrawal limit of {limit} exceeded on account [{account_number}]. Current: {withdrawn_today}, Attempted: {attempted}")]
    DailyLimitExceeded {
        account_number: AccountNumber,
        limit: Decimal,
        withdrawn_today: Monetary,
        attempted: Monetary
    },
    #[error("Invalid transaction type [{value}]")]
    InvalidTransactionType {
        value: String
    },
    #[error("Transaction not found with ID [{transaction_id}]")]
    TransactionNotFound {
        transaction_id: TransactionId
    },
    #[error("Numeric overflow occurred on account [{account_number}]")]
    Overflow {
        account_number: AccountNumber
    },
    #[error("Account [{account_number}] is busy, retry later")]
    Busy {
        account_number: AccountNumber
    },
    #[error("Account [{account_number}] worker is unavailable, retry later")]
    Unavailable {
        account_number: AccountNumber
    }
}

impl TransactionError {
    pub fn account_not_found(account_number: &str) -> Self {
        Self::AccountNotFound { account_number: account_number.to_string() }
    }

    pub fn below_minimum(amount: Monetary, minimum: Decimal) -> Self {
        Self::InvalidAmount { amount, violation: AmountViolation::BelowMinimum(minimum) }
    }

    pub fn above_maximum(amount: Monetary, maximum: Decimal) -> Self {
        Self::InvalidAmount { amount, violation: AmountViolation::AboveMaximum(maximum) }
    }

    pub fn not_positive(amount: Monetary) -> Self {
        Self::InvalidAmount { amount, violation: AmountViolation::NotPositive }
    }

    /// True for contention and shutdown failures a caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Busy { .. } | Self::Unavailable { .. })
    }

    /// Stable, upper-case name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            Self::InactiveAccount { .. } => "INACTIVE_ACCOUNT",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::DailyLimitExceeded { .. } => "DAILY_LIMIT_EXCEEDED",
            Self::InvalidTransactionType { .. } => "INVALID_TRANSACTION_TYPE",
            Self::TransactionNotFound { .. } => "TRANSACTION_NOT_FOUND",
            Self::Overflow { .. } => "OVERFLOW",
            Self::Busy { .. } => "BUSY",
            Self::Unavailable { .. } => "UNAVAILABLE"
        }
    }
}

/// Failures of account lifecycle operations (opening, activation).
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Account number [{value}] must be between 10 and 20 digits")]
    InvalidAccountNumber {
        value: String
    },
    #[error("Initial balance {balance} of account [{account_number}] must be zero or positive")]
    NegativeInitialBalance {
        account_number: AccountNumber,
        balance: Monetary
    },
    #[error("Account with number [{account_number}] already exists")]
    DuplicateAccount {
        account_number: AccountNumber
    },
    #[error("Account not found with ID [{account_id}]")]
    AccountNotFound {
        account_id: AccountId
    },
    #[error("Account not found with number [{account_number}]")]
    AccountNumberNotFound {
        account_number: String
    },
    #[error("Account [{account_number}] is busy, retry later")]
    Busy {
        account_number: AccountNumber
    },
    #[error("Account [{account_number}] worker is unavailable, retry later")]
    Unavailable {
        account_number: AccountNumber
    }
}

impl AccountError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Busy { .. } | Self::Unavailable { .. })
    }
}

/// Input validation performed before a request reaches the engine.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Account number is required")]
    BlankAccountNumber,
    #[error("Transaction type is required")]
    BlankTransactionType,
    #[error("Amount {0} must be greater than zero")]
    NonPositiveAmount(Monetary)
}
