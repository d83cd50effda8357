//! Short-TTL, write-through membership cache.
//!
//! Bounds per-request latency and cost of a remote backend. Staleness is
//! bounded by the TTL for writes made to the backend by someone else, and is
//! zero for writes made through this cache: every successful `add`/`remove`
//! installs a fresh entry with the new state.

use crate::error::StoreResult;
use crate::store::EntitlementStore;
use async_trait::async_trait;
use licensegate_types::ClientId;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;

/// Default time an entry stays live (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    enabled: bool,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<ClientId, CacheEntry>,
    /// Bumped on every write-through. A read-fill that started before a
    /// write-through must not overwrite it.
    generation: u64,
}

/// Read-through, write-through cache around another [`EntitlementStore`].
///
/// Mutations are serialised: each one holds `writes` across the backend call
/// and its write-through, so cache entries land in backend order.
pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    state: RwLock<CacheState>,
    writes: Mutex<()>,
}

impl<S: EntitlementStore> CachedStore<S> {
    /// Wraps `inner` with entries that live for `ttl`.
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            state: RwLock::new(CacheState::default()),
            writes: Mutex::new(()),
        }
    }

    /// Returns the wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the entry lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn write_through(&self, client: &ClientId, enabled: bool) {
        let mut state = self.state.write().await;
        state.generation = state.generation.wrapping_add(1);
        state.entries.insert(
            client.clone(),
            CacheEntry {
                enabled,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }
}

#[async_trait]
impl<S: EntitlementStore> EntitlementStore for CachedStore<S> {
    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }

    async fn contains(&self, client: &ClientId) -> StoreResult<bool> {
        let generation = {
            let state = self.state.read().await;
            if let Some(entry) = state.entries.get(client) {
                if Instant::now() < entry.expires_at {
                    debug!("Cache hit for {}", client);
                    return Ok(entry.enabled);
                }
            }
            state.generation
        };

        debug!("Cache miss for {}", client);
        let enabled = self.inner.contains(client).await?;

        let mut state = self.state.write().await;
        let now = Instant::now();
        let superseded = state.generation != generation
            && state
                .entries
                .get(client)
                .is_some_and(|entry| now < entry.expires_at);
        if !superseded {
            state.entries.insert(
                client.clone(),
                CacheEntry {
                    enabled,
                    expires_at: now + self.ttl,
                },
            );
        }
        Ok(enabled)
    }

    async fn add(&self, client: &ClientId) -> StoreResult<()> {
        let _writes = self.writes.lock().await;
        self.inner.add(client).await?;
        self.write_through(client, true).await;
        Ok(())
    }

    async fn remove(&self, client: &ClientId) -> StoreResult<()> {
        let _writes = self.writes.lock().await;
        self.inner.remove(client).await?;
        self.write_through(client, false).await;
        Ok(())
    }

    async fn enumerate(&self) -> StoreResult<BTreeSet<ClientId>> {
        self.inner.enumerate().await
    }
}
