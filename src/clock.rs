use chrono::{DateTime, Local};
use std::sync::Mutex;

/// Source of the current local time. Ledger timestamps and the daily withdrawal window both read it.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
///
/// A testing aid for callers that need deterministic ledger timestamps or want to
/// place transactions on either side of a day boundary. Production code uses [`SystemClock`].
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Local>>
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Local>) {
        match self.now.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner()
        }
    }
}
