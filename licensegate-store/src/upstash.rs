//! Remote shared entitlement set on the Upstash Redis REST API.
//!
//! Every operation is one `POST` of a JSON command array to the REST base
//! URL, e.g. `["SISMEMBER", "enabled", "acme"]`. Replies are
//! `{"result": ...}` on success and `{"error": "..."}` on failure.

use crate::error::{StoreError, StoreResult};
use crate::store::EntitlementStore;
use async_trait::async_trait;
use licensegate_types::ClientId;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

/// Redis key of the entitlement set.
pub const DEFAULT_SET_KEY: &str = "enabled";

/// Default bound on a single remote call.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upstash connection settings.
#[derive(Clone)]
pub struct UpstashConfig {
    /// REST base URL (e.g. `https://eu1-xxx.upstash.io`).
    pub url: String,
    /// REST bearer token.
    pub token: String,
    /// Redis key holding the set.
    pub set_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl UpstashConfig {
    /// Creates a config with the default set key and timeout.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            set_key: DEFAULT_SET_KEY.to_string(),
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

impl fmt::Debug for UpstashConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstashConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("set_key", &self.set_key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct RestReply {
    result: Option<Value>,
    error: Option<String>,
}

/// Entitlement store backed by a Redis set over Upstash REST.
pub struct UpstashStore {
    config: UpstashConfig,
    client: Client,
}

impl UpstashStore {
    /// Creates a new store. No request is made until the first operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Network`] if the HTTP client cannot be built.
    pub fn new(config: UpstashConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Adds every id in `clients` to the set in a single `SADD`.
    ///
    /// Used at startup to apply the configured seed list.
    pub async fn seed(&self, clients: &[ClientId]) -> StoreResult<()> {
        if clients.is_empty() {
            return Ok(());
        }
        let mut args = vec!["SADD", self.config.set_key.as_str()];
        args.extend(clients.iter().map(ClientId::as_str));
        self.command(&args).await?;
        Ok(())
    }

    /// Runs one Redis command and returns its `result`.
    async fn command(&self, args: &[&str]) -> StoreResult<Value> {
        let name = args.first().copied().unwrap_or_default();
        debug!("Upstash {}", name);

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.token)
            .json(args)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StoreError::Timeout
                } else {
                    StoreError::Network(format!("{name} request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout
            } else {
                StoreError::Network(format!("{name} reply unreadable: {e}"))
            }
        })?;
        let reply: Option<RestReply> = serde_json::from_str(&body).ok();

        if let Some(message) = reply.as_ref().and_then(|r| r.error.clone()) {
            error!("Upstash {} failed ({}): {}", name, status, message);
            return Err(StoreError::Backend(message));
        }
        if !status.is_success() {
            error!("Upstash {} failed with status {}", name, status);
            return Err(StoreError::Backend(format!("{name} returned {status}")));
        }

        reply
            .and_then(|r| r.result)
            .ok_or_else(|| StoreError::UnexpectedReply(format!("{name}: missing result")))
    }
}

fn expect_integer(command: &str, value: &Value) -> StoreResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| StoreError::UnexpectedReply(format!("{command}: expected integer, got {value}")))
}

#[async_trait]
impl EntitlementStore for UpstashStore {
    fn backend_name(&self) -> &'static str {
        "upstash"
    }

    async fn contains(&self, client: &ClientId) -> StoreResult<bool> {
        let result = self
            .command(&["SISMEMBER", self.config.set_key.as_str(), client.as_str()])
            .await?;
        Ok(expect_integer("SISMEMBER", &result)? == 1)
    }

    async fn add(&self, client: &ClientId) -> StoreResult<()> {
        let result = self
            .command(&["SADD", self.config.set_key.as_str(), client.as_str()])
            .await?;
        expect_integer("SADD", &result)?;
        Ok(())
    }

    async fn remove(&self, client: &ClientId) -> StoreResult<()> {
        let result = self
            .command(&["SREM", self.config.set_key.as_str(), client.as_str()])
            .await?;
        expect_integer("SREM", &result)?;
        Ok(())
    }

    async fn enumerate(&self) -> StoreResult<BTreeSet<ClientId>> {
        let result = self.command(&["SMEMBERS", self.config.set_key.as_str()]).await?;
        let members: Vec<ClientId> = serde_json::from_value(result).map_err(|e| {
            StoreError::UnexpectedReply(format!("SMEMBERS: expected string array: {e}"))
        })?;
        Ok(members.into_iter().filter(|c| !c.is_blank()).collect())
    }
}
