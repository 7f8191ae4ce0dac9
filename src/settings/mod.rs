mod errors;
mod policy;
mod settings_storage;

use rust_decimal::Decimal;

pub use errors::SettingsError;
pub use policy::Policy;
pub use settings_storage::{Setting, SettingsStorage};

/// Read-only key/value lookup of externally managed configuration.
pub trait SettingsProvider: Send + Sync + 'static {
    fn get_setting(&self, key: &str) -> Option<String>;
}

/// Monetary policy parameters the engine enforces, each with a built-in default.
///
/// Values are plain decimals rather than `Monetary`: a configured bound may be more
/// precise than any amount it is compared against.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum PolicyKey {
    MinTransactionAmount,
    MaxTransactionAmount,
    MaxDailyWithdrawal
}

impl PolicyKey {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyKey::MinTransactionAmount => "MIN_TRANSACTION_AMOUNT",
            PolicyKey::MaxTransactionAmount => "MAX_TRANSACTION_AMOUNT",
            PolicyKey::MaxDailyWithdrawal => "MAX_DAILY_WITHDRAWAL"
        }
    }

    pub fn default_value(&self) -> Decimal {
        match self {
            PolicyKey::MinTransactionAmount => Decimal::new(1_00, 2),
            PolicyKey::MaxTransactionAmount => Decimal::new(100_000_00, 2),
            PolicyKey::MaxDailyWithdrawal => Decimal::new(5_000_00, 2)
        }
    }
}
