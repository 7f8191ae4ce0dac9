mod account_actor;
mod context;

pub use account_actor::{AccountActor, AccountMailbox};
pub use context::{ActorContext, TransactionOrder};
