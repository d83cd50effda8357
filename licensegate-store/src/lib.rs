//! Entitlement storage for Licensegate.
//!
//! Two interchangeable backends implement [`EntitlementStore`]:
//! - [`UpstashStore`]: a remote shared set behind the Upstash Redis REST API
//! - [`LocalStore`]: an in-process set, optionally mirrored to a JSON snapshot
//!
//! [`CachedStore`] is a short-TTL, write-through read cache meant to sit in
//! front of the remote backend.

mod cache;
mod error;
mod local;
mod store;
mod upstash;

pub use cache::{CachedStore, DEFAULT_CACHE_TTL};
pub use error::{StoreError, StoreResult};
pub use local::{LocalStore, Snapshot};
pub use store::EntitlementStore;
pub use upstash::{DEFAULT_REMOTE_TIMEOUT, DEFAULT_SET_KEY, UpstashConfig, UpstashStore};
