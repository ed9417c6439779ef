// ABOUTME: Client configuration and an explicit per-session client cache.
// ABOUTME: Clients are built from a config value and rebuilt only on invalidation or config change.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// Default upper bound handed to native completion waiters.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(2 * 60 * 60);

/// Everything needed to build provider handles for one region/credential profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub region: String,
    pub profile: Option<String>,
    /// Upper bound for native completion waiters.
    pub max_wait: Duration,
}

impl ClientConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
}

/// Holds at most one built client set, keyed by the config it was built from.
///
/// Intended for single-session use: callers that change region or credentials
/// call [`ClientCache::invalidate`] (or pass a different config) and receive a
/// freshly built set. The cached set itself is never mutated.
pub struct ClientCache<C> {
    slot: Mutex<Option<(ClientConfig, Arc<C>)>>,
}

impl<C> Default for ClientCache<C> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<C> ClientCache<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached clients for `config`, building them with `connect` if
    /// nothing is cached or the cache was built from a different config.
    pub async fn get_or_connect<F, Fut>(&self, config: &ClientConfig, connect: F) -> Result<Arc<C>>
    where
        F: FnOnce(ClientConfig) -> Fut,
        Fut: Future<Output = Result<C>>,
    {
        let cached = {
            let slot = self.slot.lock();
            slot.as_ref()
                .filter(|(built_from, _)| built_from == config)
                .map(|(_, clients)| Arc::clone(clients))
        };
        if let Some(clients) = cached {
            return Ok(clients);
        }

        tracing::debug!(region = %config.region, profile = ?config.profile, "building provider clients");
        let clients = Arc::new(connect(config.clone()).await?);
        *self.slot.lock() = Some((config.clone(), Arc::clone(&clients)));
        Ok(clients)
    }

    /// Drop the cached clients; the next lookup rebuilds them.
    pub fn invalidate(&self) {
        self.slot.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Handles {
        region: String,
    }

    async fn connect(counter: &AtomicUsize, config: ClientConfig) -> Result<Handles> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Handles {
            region: config.region,
        })
    }

    #[tokio::test]
    async fn reuses_clients_for_same_config() {
        let cache = ClientCache::new();
        let builds = AtomicUsize::new(0);
        let config = ClientConfig::new("eu-west-1");

        let first = cache
            .get_or_connect(&config, |c| connect(&builds, c))
            .await
            .unwrap();
        let second = cache
            .get_or_connect(&config, |c| connect(&builds, c))
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rebuilds_after_invalidate() {
        let cache = ClientCache::new();
        let builds = AtomicUsize::new(0);
        let config = ClientConfig::new("eu-west-1");

        cache
            .get_or_connect(&config, |c| connect(&builds, c))
            .await
            .unwrap();
        cache.invalidate();
        cache
            .get_or_connect(&config, |c| connect(&builds, c))
            .await
            .unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rebuilds_when_region_changes() {
        let cache = ClientCache::new();
        let builds = AtomicUsize::new(0);

        cache
            .get_or_connect(&ClientConfig::new("eu-west-1"), |c| connect(&builds, c))
            .await
            .unwrap();
        let clients = cache
            .get_or_connect(&ClientConfig::new("us-east-1"), |c| connect(&builds, c))
            .await
            .unwrap();

        assert_eq!(clients.region, "us-east-1");
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }
}
