use crate::models::Account;
use crate::storage::AccountStore;
use crate::types::AccountId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory account store.
///
/// Concurrent access is safe, but read-modify-write sequences are not atomic here;
/// the engine routes every balance change for an account through a single worker.
#[derive(Debug, Default)]
pub struct AccountStorage {
    accounts: DashMap<AccountId, Account>,
    numbers: DashMap<String, AccountId>
}

impl AccountStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for AccountStorage {
    fn find_by_id(&self, account_id: AccountId) -> Option<Account> {
        self.accounts.get(&account_id).map(|account| account.value().clone())
    }

    fn find_by_number(&self, account_number: &str) -> Option<Account> {
        let account_id = *self.numbers.get(account_number)?.value();
        self.find_by_id(account_id)
    }

    fn insert(&self, account: Account) -> bool {
        match self.numbers.entry(account.account_number.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                self.accounts.insert(account.id, account.clone());
                vacant.insert(account.id);
                true
            }
        }
    }

    fn save(&self, account: Account) -> Account {
        self.accounts.insert(account.id, account.clone());
        account
    }

    fn all(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.iter().map(|item| item.value().clone()).collect();
        accounts.sort_by(|left, right| left.account_number.cmp(&right.account_number));
        accounts
    }
}
