mod replay;
#[cfg(test)]
mod tests;
mod transaction_engine;

pub use replay::ReplaySummary;
pub use transaction_engine::{PendingTransaction, TransactionEngine};
