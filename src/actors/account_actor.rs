use std::sync::Arc;
use std::time::Duration;

use tokio::spawn;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::actors::context::{ActorContext, TransactionOrder};
use crate::models::{Account, AccountError, LedgerEntry, TransactionError};
use crate::types::AccountNumber;

enum AccountCommand {
    Apply {
        order: TransactionOrder,
        reply: oneshot::Sender<Result<LedgerEntry, TransactionError>>
    },
    SetActive {
        active: bool,
        reply: oneshot::Sender<Result<Account, AccountError>>
    }
}

/// Single worker that owns every state change of one account.
///
/// Commands are handled strictly one at a time in arrival order, which makes each
/// balance read-validate-write sequence atomic per account while different accounts
/// proceed in parallel on their own workers.
pub struct AccountActor {
    mailbox: AccountMailbox,
    handle: JoinHandle<()>
}

/// Cloneable sending side of an account worker's bounded queue.
#[derive(Clone)]
pub struct AccountMailbox {
    account_number: AccountNumber,
    sender: mpsc::Sender<AccountCommand>
}

impl AccountActor {
    /// Spawns a new worker for the account.
    pub fn new(account: &Account, context: Arc<ActorContext>, capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<AccountCommand>(capacity.max(1));
        let account_id = account.id;
        let account_number = account.account_number.clone();

        let handle = spawn(async move {
            while let Some(command) = receiver.recv().await {
                match command {
                    AccountCommand::Apply { order, reply } => {
                        let transaction_type = order.transaction_type;
                        let outcome = context.apply(account_id, order).await;

                        match &outcome {
                            Ok(entry) => debug!("Transaction [{}]:[{}] for account [{}] committed", entry.id, transaction_type, entry.account_number),
                            Err(error) => debug!("{error}")
                        }

                        if reply.send(outcome).is_err() {
                            warn!("Caller for a [{transaction_type}] on account [{account_id}] went away before the outcome was delivered");
                        }
                    },
                    AccountCommand::SetActive { active, reply } => {
                        let _ = reply.send(context.set_active(account_id, active));
                    }
                }
            }

            debug!("Account worker for [{account_id}] drained and stopped");
        });

        Self {
            mailbox: AccountMailbox { account_number, sender },
            handle
        }
    }

    pub fn mailbox(&self) -> AccountMailbox {
        self.mailbox.clone()
    }

    /// Closes the queue, lets the worker finish what is already enqueued and waits for it to stop.
    pub async fn despawn(self) -> Result<(), JoinError> {
        drop(self.mailbox);
        self.handle.await
    }
}

impl AccountMailbox {
    /// Enqueues an order, waiting at most `timeout` for room in the queue.
    ///
    /// Once this returns `Ok` the order will be applied; the receiver yields its outcome.
    pub async fn submit(&self, order: TransactionOrder, timeout: Duration) -> Result<oneshot::Receiver<Result<LedgerEntry, TransactionError>>, TransactionError> {
        let (reply, outcome) = oneshot::channel();

        match self.sender.send_timeout(AccountCommand::Apply { order, reply }, timeout).await {
            Ok(()) => Ok(outcome),
            Err(SendTimeoutError::Timeout(_)) => Err(TransactionError::Busy { account_number: self.account_number.clone() }),
            Err(SendTimeoutError::Closed(_)) => Err(TransactionError::Unavailable { account_number: self.account_number.clone() })
        }
    }

    pub async fn set_active(&self, active: bool, timeout: Duration) -> Result<Account, AccountError> {
        let (reply, outcome) = oneshot::channel();

        match self.sender.send_timeout(AccountCommand::SetActive { active, reply }, timeout).await {
            Ok(()) => {},
            Err(SendTimeoutError::Timeout(_)) => return Err(AccountError::Busy { account_number: self.account_number.clone() }),
            Err(SendTimeoutError::Closed(_)) => return Err(AccountError::Unavailable { account_number: self.account_number.clone() })
        }

        outcome.await
            .map_err(|_| AccountError::Unavailable { account_number: self.account_number.clone() })?
    }
}
