use crate::settings::{PolicyKey, SettingsProvider};
use moka::future::Cache;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Resolves policy parameters from a settings provider, substituting defaults.
///
/// A missing or unparseable value is never an error: the default for the key is used
/// and a warning logged. With a TTL configured, resolved values are cached so that
/// busy accounts do not hit the provider on every request.
pub struct Policy {
    settings: Arc<dyn SettingsProvider>,
    cache: Option<Cache<PolicyKey, Decimal>>
}

impl Policy {
    pub fn new(settings: Arc<dyn SettingsProvider>, ttl: Option<Duration>) -> Self {
        let cache = ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(16)
                .time_to_live(ttl)
                .build()
        });

        Self { settings, cache }
    }

    pub async fn resolve(&self, key: PolicyKey) -> Decimal {
        let Some(cache) = &self.cache else {
            return self.read(key);
        };

        if let Some(value) = cache.get(&key).await {
            return value;
        }

        let value = self.read(key);
        cache.insert(key, value).await;
        value
    }

    /// Drops cached values so the next resolution reads the provider again.
    pub fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }

    fn read(&self, key: PolicyKey) -> Decimal {
        let default = key.default_value();

        let Some(raw) = self.settings.get_setting(key.name()) else {
            warn!("Setting {} not found, using default: {default}", key.name());
            return default;
        };

        match Decimal::from_str(raw.trim()) {
            Ok(value) => value,
            Err(error) => {
                warn!("Setting {} has unreadable value [{raw}] ({error}), using default: {default}", key.name());
                default
            }
        }
    }
}
