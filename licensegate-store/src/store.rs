//! Entitlement store abstraction.
//!
//! Defines the common interface for entitlement backends.

use crate::error::StoreResult;
use async_trait::async_trait;
use licensegate_types::ClientId;
use std::collections::BTreeSet;

/// Abstract entitlement set.
///
/// Membership is the single source of truth for "is this client licensed
/// now". `add` and `remove` are idempotent: adding a present id or removing
/// an absent one succeeds.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Returns a short name for the backend, used in logs.
    fn backend_name(&self) -> &'static str;

    /// Returns whether `client` is currently entitled.
    async fn contains(&self, client: &ClientId) -> StoreResult<bool>;

    /// Entitles `client`.
    async fn add(&self, client: &ClientId) -> StoreResult<()>;

    /// Revokes the entitlement of `client`.
    async fn remove(&self, client: &ClientId) -> StoreResult<()>;

    /// Lists every entitled client.
    async fn enumerate(&self) -> StoreResult<BTreeSet<ClientId>>;
}
