//! Shared test helpers for store tests.

#![allow(dead_code)]

use async_trait::async_trait;
use licensegate_store::{EntitlementStore, StoreError, StoreResult};
use licensegate_types::ClientId;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

pub fn client(id: &str) -> ClientId {
    ClientId::parse(id).unwrap()
}

/// Stand-in for a remote backend: an in-memory set that counts calls and can
/// be switched into failing.
#[derive(Clone, Default)]
pub struct MockRemote {
    set: Arc<Mutex<BTreeSet<ClientId>>>,
    contains_calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MockRemote {
    pub fn with(ids: &[&str]) -> Self {
        let remote = Self::default();
        {
            let mut set = remote.set.try_lock().unwrap();
            set.extend(ids.iter().map(|id| client(id)));
        }
        remote
    }

    pub fn contains_calls(&self) -> usize {
        self.contains_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Changes the set behind the cache's back, like another process would.
    pub async fn external_add(&self, id: &str) {
        self.set.lock().await.insert(client(id));
    }

    pub async fn external_remove(&self, id: &str) {
        self.set.lock().await.remove(&client(id));
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Network("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EntitlementStore for MockRemote {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    async fn contains(&self, client: &ClientId) -> StoreResult<bool> {
        self.contains_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.set.lock().await.contains(client))
    }

    async fn add(&self, client: &ClientId) -> StoreResult<()> {
        self.check()?;
        self.set.lock().await.insert(client.clone());
        Ok(())
    }

    async fn remove(&self, client: &ClientId) -> StoreResult<()> {
        self.check()?;
        self.set.lock().await.remove(client);
        Ok(())
    }

    async fn enumerate(&self) -> StoreResult<BTreeSet<ClientId>> {
        self.check()?;
        Ok(self.set.lock().await.clone())
    }
}
