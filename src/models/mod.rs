mod account;
mod errors;
mod transaction;
mod views;
mod window;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub use account::{Account, Owner};
pub use errors::{AccountError, AmountViolation, RequestError, TransactionError};
pub use transaction::{LedgerEntry, TransactionRequest};
pub use views::{AccountView, TransactionView};
pub use window::DayWindow;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Deposit,
    Withdraw
}

impl Display for TransactionType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Deposit => formatter.write_str("DEPOSIT"),
            TransactionType::Withdraw => formatter.write_str("WITHDRAW")
        }
    }
}

impl FromStr for TransactionType {
    type Err = TransactionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "WITHDRAW" => Ok(TransactionType::Withdraw),
            _ => Err(TransactionError::InvalidTransactionType { value: value.to_string() })
        }
    }
}
