mod account_storage;
mod ledger_storage;

use crate::models::{Account, DayWindow, LedgerEntry};
use crate::types::{AccountId, Monetary, TransactionId};

pub use account_storage::AccountStorage;
pub use ledger_storage::LedgerStorage;

/// Persists accounts keyed by id, with a unique index on account number.
pub trait AccountStore: Send + Sync + 'static {
    fn find_by_id(&self, account_id: AccountId) -> Option<Account>;
    fn find_by_number(&self, account_number: &str) -> Option<Account>;
    /// Inserts a new account. Returns `false` and stores nothing when the number is already taken.
    fn insert(&self, account: Account) -> bool;
    /// Overwrites the stored version of an existing account.
    fn save(&self, account: Account) -> Account;
    fn all(&self) -> Vec<Account>;
}

/// Append-only store of ledger entries.
///
/// Every listing comes back newest first. Entries stamped at the same instant are
/// listed in reverse append order.
pub trait LedgerStore: Send + Sync + 'static {
    fn append(&self, entry: LedgerEntry) -> LedgerEntry;
    fn find_by_id(&self, transaction_id: TransactionId) -> Option<LedgerEntry>;
    fn all(&self) -> Vec<LedgerEntry>;
    fn find_by_account_id(&self, account_id: AccountId) -> Vec<LedgerEntry>;
    fn find_by_account_number(&self, account_number: &str) -> Vec<LedgerEntry>;
    /// Amounts of the account's withdrawals stamped inside `window`.
    fn withdrawals_within(&self, account_number: &str, window: &DayWindow) -> Vec<Monetary>;
}
