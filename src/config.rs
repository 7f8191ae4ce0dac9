use std::time::Duration;

const DEFAULT_MAILBOX_CAPACITY: usize = 256;
const DEFAULT_ENQUEUE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tuning knobs for the transaction engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound on the number of queued requests per account worker.
    pub mailbox_capacity: usize,
    /// How long a caller waits for room in an account's queue before getting a transient `Busy`.
    pub enqueue_timeout: Duration,
    /// When set, resolved policy parameters are cached for this long.
    pub policy_ttl: Option<Duration>
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            enqueue_timeout: DEFAULT_ENQUEUE_TIMEOUT,
            policy_ttl: None
        }
    }
}

impl EngineConfig {
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity.max(1);
        self
    }

    pub fn with_enqueue_timeout(mut self, timeout: Duration) -> Self {
        self.enqueue_timeout = timeout;
        self
    }

    pub fn with_policy_ttl(mut self, ttl: Duration) -> Self {
        self.policy_ttl = Some(ttl);
        self
    }
}
