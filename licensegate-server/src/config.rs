//! Process configuration from flags and environment variables.
//!
//! Presence of both Upstash credentials selects the remote backend (behind
//! the write-through cache); otherwise the local backend with a snapshot file
//! is used.

use crate::{AdminSecret, AppState, AuthorizationService};
use clap::Parser;
use licensegate_store::{
    CachedStore, EntitlementStore, LocalStore, StoreResult, UpstashConfig, UpstashStore,
};
use licensegate_token::{TokenCodec, TokenResult};
use licensegate_types::ClientId;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Signing secret used when none is configured.
pub const DEFAULT_SECRET: &str = "change-me-in-production";

/// Admin secret used when none is configured.
pub const DEFAULT_ADMIN_SECRET: &str = "change-admin-secret";

#[derive(Parser, Clone)]
#[command(name = "licensegate")]
#[command(about = "License-authorization service with hot enable/disable")]
pub struct Config {
    /// HTTP port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3333)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_ADDR", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// HMAC secret for access tokens
    #[arg(long, env = "SECRET", default_value = DEFAULT_SECRET, hide_env_values = true)]
    pub secret: String,

    /// Shared secret for /admin endpoints
    #[arg(long, env = "ADMIN_SECRET", default_value = DEFAULT_ADMIN_SECRET, hide_env_values = true)]
    pub admin_secret: String,

    /// Comma-separated clients enabled at startup
    #[arg(long, env = "ENABLED_CLIENTS", default_value = "")]
    pub enabled_clients: String,

    /// Snapshot file for the local backend
    #[arg(long, env = "DATA_FILE", default_value = "enabled-clients.json")]
    pub data_file: PathBuf,

    /// Lifetime of cached remote membership answers, in milliseconds
    #[arg(long, env = "ENABLED_CACHE_TTL_MS", default_value_t = 300_000)]
    pub cache_ttl_ms: u64,

    /// Upstash Redis REST URL
    #[arg(long, env = "UPSTASH_REDIS_REST_URL")]
    pub redis_url: Option<String>,

    /// Upstash Redis REST token
    #[arg(long, env = "UPSTASH_REDIS_REST_TOKEN", hide_env_values = true)]
    pub redis_token: Option<String>,

    /// Timeout for a single remote call, in milliseconds
    #[arg(long, env = "REMOTE_TIMEOUT_MS", default_value_t = 5_000)]
    pub remote_timeout_ms: u64,

    /// Do not re-read the snapshot file before each read
    #[arg(long, env = "DISABLE_HOT_RELOAD")]
    pub no_hot_reload: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const REDACTED: &str = "<redacted>";
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind", &self.bind)
            .field("secret", &REDACTED)
            .field("admin_secret", &REDACTED)
            .field("enabled_clients", &self.enabled_clients)
            .field("data_file", &self.data_file)
            .field("cache_ttl_ms", &self.cache_ttl_ms)
            .field("redis_url", &self.redis_url)
            .field("redis_token", &self.redis_token.as_ref().map(|_| REDACTED))
            .field("remote_timeout_ms", &self.remote_timeout_ms)
            .field("no_hot_reload", &self.no_hot_reload)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Config {
    /// Socket address to listen on.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Parses `enabled_clients`, dropping blanks and duplicates.
    #[must_use]
    pub fn seed_clients(&self) -> Vec<ClientId> {
        let mut seed: Vec<ClientId> = self
            .enabled_clients
            .split(',')
            .filter_map(|s| ClientId::parse(s).ok())
            .collect();
        seed.sort();
        seed.dedup();
        seed
    }

    /// Remote backend settings, if both URL and token are set.
    #[must_use]
    pub fn remote(&self) -> Option<UpstashConfig> {
        let url = self.redis_url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let token = self.redis_token.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let mut config = UpstashConfig::new(url, token);
        config.timeout = Duration::from_millis(self.remote_timeout_ms);
        Some(config)
    }

    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Returns the names of secrets still at their insecure defaults.
    #[must_use]
    pub fn default_secrets_in_use(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.secret == DEFAULT_SECRET {
            names.push("SECRET");
        }
        if self.admin_secret == DEFAULT_ADMIN_SECRET {
            names.push("ADMIN_SECRET");
        }
        names
    }

    pub fn token_codec(&self) -> TokenResult<TokenCodec> {
        TokenCodec::new(&self.secret)
    }

    /// Builds the configured entitlement backend.
    ///
    /// The remote backend is seeded with `enabled_clients` and wrapped in the
    /// write-through cache. The local backend starts from the seed unless the
    /// snapshot file has contents.
    pub async fn build_store(&self) -> StoreResult<Arc<dyn EntitlementStore>> {
        let seed = self.seed_clients();
        match self.remote() {
            Some(remote) => {
                info!("Using Upstash Redis at {}", remote.url);
                let upstash = UpstashStore::new(remote)?;
                upstash.seed(&seed).await?;
                info!("Seeded {} client(s)", seed.len());
                Ok(Arc::new(CachedStore::new(upstash, self.cache_ttl())))
            }
            None => {
                info!("Using local store with snapshot {:?}", self.data_file);
                let local = LocalStore::open(&self.data_file, seed)
                    .await
                    .with_hot_reload(!self.no_hot_reload);
                Ok(Arc::new(local))
            }
        }
    }

    /// Builds the full application state.
    pub async fn build_state(&self) -> anyhow::Result<AppState> {
        let codec = self.token_codec()?;
        let store = self.build_store().await?;
        Ok(AppState::new(
            AuthorizationService::new(codec, store),
            AdminSecret::new(self.admin_secret.clone()),
        ))
    }
}
