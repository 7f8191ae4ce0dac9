mod account_number;
mod errors;
mod monetary;

use uuid::Uuid;

pub use account_number::AccountNumber;
pub use errors::MonetaryError;
pub use monetary::Monetary;

pub type AccountId = Uuid;
pub type CustomerId = Uuid;
pub type TransactionId = Uuid;
