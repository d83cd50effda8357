//! Shared test helpers for server tests.

#![allow(dead_code)]

use async_trait::async_trait;
use licensegate_server::{AdminSecret, AppState, AuthorizationService, build_router};
use licensegate_store::{EntitlementStore, LocalStore, StoreError, StoreResult};
use licensegate_token::TokenCodec;
use licensegate_types::ClientId;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const TEST_ADMIN_SECRET: &str = "test-admin-secret";

pub fn client(id: &str) -> ClientId {
    ClientId::parse(id).unwrap()
}

pub fn test_codec() -> TokenCodec {
    TokenCodec::new(TEST_SECRET).unwrap()
}

pub fn service_over(store: Arc<dyn EntitlementStore>) -> AuthorizationService {
    AuthorizationService::new(test_codec(), store)
}

pub fn state_over(store: Arc<dyn EntitlementStore>) -> AppState {
    AppState::new(service_over(store), AdminSecret::new(TEST_ADMIN_SECRET))
}

/// State over an empty in-memory local store.
pub fn empty_state() -> AppState {
    state_over(Arc::new(LocalStore::in_memory([])))
}

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
pub async fn spawn_test_server(state: AppState) -> String {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

/// Stand-in for a remote backend: an in-memory set that counts reads and can
/// be switched into failing.
#[derive(Clone, Default)]
pub struct MockRemote {
    set: Arc<Mutex<BTreeSet<ClientId>>>,
    contains_calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MockRemote {
    pub fn contains_calls(&self) -> usize {
        self.contains_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Backend("simulated outage".to_string()))
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
