use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use csv::{ReaderBuilder, Trim};
use futures::future::join_all;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::{spawn_blocking, JoinHandle};
use tracing::{debug, error, warn};

use crate::engine::TransactionEngine;
use crate::models::{Owner, TransactionRequest};
use crate::types::Monetary;

const BACKPRESSURE: usize = 256;
const INVALID_REQUEST: &str = "INVALID_REQUEST";

/// Tally of a replayed request file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub committed: usize,
    /// Rejections keyed by error kind.
    pub rejected: BTreeMap<String, usize>,
    /// Rows that could not be deserialized.
    pub malformed: usize
}

impl ReplaySummary {
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }

    fn reject(&mut self, kind: &str) {
        *self.rejected.entry(kind.to_string()).or_default() += 1;
    }
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    account_number: String,
    customer_name: String,
    initial_balance: Monetary,
    #[serde(default)]
    active: Option<bool>
}

impl TransactionEngine {
    /// Opens every account listed in a `account_number,customer_name,initial_balance,active` CSV.
    ///
    /// Rows that fail to parse or to open are logged and skipped. Returns the number of accounts opened.
    pub async fn seed_accounts(&self, path: &str) -> anyhow::Result<usize> {
        let path = path.to_string();
        let records = spawn_blocking(move || -> anyhow::Result<Vec<AccountRecord>> {
            let mut reader = ReaderBuilder::new()
                .trim(Trim::All)
                .flexible(true)
                .from_reader(BufReader::new(File::open(&path)?));

            let mut records = Vec::new();

            for result in reader.deserialize::<AccountRecord>() {
                match result {
                    Ok(record) => records.push(record),
                    Err(error) => error!("Account CSV deserialization error: {error}")
                }
            }

            Ok(records)
        }).await??;

        let mut opened = 0;

        for record in records {
            let account = match self.open_account(&record.account_number, Owner::new(record.customer_name), record.initial_balance) {
                Ok(account) => account,
                Err(error) => {
                    warn!("{error}");
                    continue;
                }
            };

            if record.active == Some(false) {
                self.deactivate(account.id).await?;
            }

            opened += 1;
        }

        Ok(opened)
    }

    /// Replays a `account_number,type,amount,description` CSV of requests.
    ///
    /// Requests are enqueued in file order, so each account sees them in that order, while
    /// different accounts are processed concurrently. Rejections are logged and tallied.
    pub async fn replay(&self, path: &str) -> anyhow::Result<ReplaySummary> {
        let (sender, mut receiver) = mpsc::channel::<TransactionRequest>(BACKPRESSURE);
        let csv_handle = spawn_csv_reader(path.to_string(), sender);
        let mut summary = ReplaySummary::default();
        let mut pending = Vec::new();

        while let Some(request) = receiver.recv().await {
            if let Err(error) = request.validate() {
                warn!("Request for account [{}] rejected: {error}", request.account_number);
                summary.reject(INVALID_REQUEST);
                continue;
            }

            match self.submit(request).await {
                Ok(transaction) => pending.push(transaction.outcome()),
                Err(error) => {
                    warn!("{error}");
                    summary.reject(error.kind());
                }
            }
        }

        for outcome in join_all(pending).await {
            match outcome {
                Ok(view) => {
                    debug!("Transaction [{}]:[{}] {} on account [{}], balance after {}", view.id, view.transaction_type, view.amount, view.account_number, view.balance_after);
                    summary.committed += 1;
                },
                Err(error) => {
                    warn!("{error}");
                    summary.reject(error.kind());
                }
            }
        }

        match csv_handle.await {
            Ok(malformed) => summary.malformed = malformed,
            Err(error) => error!("CSV ingestion failed: {error}")
        }

        Ok(summary)
    }
}

fn spawn_csv_reader(path: String, sender: mpsc::Sender<TransactionRequest>) -> JoinHandle<usize> {
    spawn_blocking(move || {
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(error) => {
                error!("Error opening CSV at path: {path} | {error}");
                return 0;
            }
        };

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut malformed = 0;

        for result in reader.deserialize::<TransactionRequest>() {
            match result {
                Ok(request) => {
                    if sender.blocking_send(request).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    error!("CSV deserialization error: {error}");
                    malformed += 1;
                }
            }
        }

        malformed
    })
}
