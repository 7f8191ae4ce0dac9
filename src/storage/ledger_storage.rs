use crate::models::{DayWindow, LedgerEntry, TransactionType};
use crate::storage::LedgerStore;
use crate::types::{AccountId, Monetary, TransactionId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
struct StoredEntry {
    sequence: u64,
    entry: LedgerEntry
}

/// In-memory ledger with per-account indexes.
#[derive(Debug, Default)]
pub struct LedgerStorage {
    entries: DashMap<TransactionId, StoredEntry>,
    by_account: DashMap<AccountId, Vec<TransactionId>>,
    by_number: DashMap<String, Vec<TransactionId>>,
    sequence: AtomicU64
}

impl LedgerStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, transaction_ids: Vec<TransactionId>) -> Vec<StoredEntry> {
        transaction_ids.iter()
            .filter_map(|transaction_id| self.entries.get(transaction_id).map(|stored| stored.value().clone()))
            .collect()
    }

    fn ids_for_number(&self, account_number: &str) -> Vec<TransactionId> {
        self.by_number.get(account_number)
            .map(|ids| ids.value().clone())
            .unwrap_or_default()
    }
}

/// Most recent first; ties on timestamp fall back to the later append.
fn newest_first(mut stored: Vec<StoredEntry>) -> Vec<LedgerEntry> {
    stored.sort_by(|left, right| {
        right.entry.timestamp.cmp(&left.entry.timestamp)
            .then_with(|| right.sequence.cmp(&left.sequence))
    });

    stored.into_iter().map(|stored| stored.entry).collect()
}

impl LedgerStore for LedgerStorage {
    fn append(&self, entry: LedgerEntry) -> LedgerEntry {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);

        self.entries.insert(entry.id, StoredEntry { sequence, entry: entry.clone() });
        self.by_account.entry(entry.account_id).or_default().push(entry.id);
        self.by_number.entry(entry.account_number.to_string()).or_default().push(entry.id);
        entry
    }

    fn find_by_id(&self, transaction_id: TransactionId) -> Option<LedgerEntry> {
        self.entries.get(&transaction_id).map(|stored| stored.value().entry.clone())
    }

    fn all(&self) -> Vec<LedgerEntry> {
        newest_first(self.entries.iter().map(|stored| stored.value().clone()).collect())
    }

    fn find_by_account_id(&self, account_id: AccountId) -> Vec<LedgerEntry> {
        let transaction_ids = self.by_account.get(&account_id)
            .map(|ids| ids.value().clone())
            .unwrap_or_default();

        newest_first(self.resolve(transaction_ids))
    }

    fn find_by_account_number(&self, account_number: &str) -> Vec<LedgerEntry> {
        newest_first(self.resolve(self.ids_for_number(account_number)))
    }

    fn withdrawals_within(&self, account_number: &str, window: &DayWindow) -> Vec<Monetary> {
        self.resolve(self.ids_for_number(account_number))
            .into_iter()
            .map(|stored| stored.entry)
            .filter(|entry| entry.transaction_type == TransactionType::Withdraw)
            .filter(|entry| window.contains(&entry.timestamp))
            .map(|entry| entry.amount)
            .collect()
    }
}
