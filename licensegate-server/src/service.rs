//! License checks, token validation and admin toggles.

use crate::error::ServiceResult;
use licensegate_store::EntitlementStore;
use licensegate_token::{AccessToken, TokenCodec};
use licensegate_types::ClientId;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a license check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseCheck {
    /// The client is entitled; here is a fresh token.
    Licensed {
        /// Token bound to the client, valid for 7 days.
        access_token: AccessToken,
    },
    /// The client is not entitled (or was never known).
    Unlicensed,
}

impl LicenseCheck {
    /// Returns true for [`LicenseCheck::Licensed`].
    #[must_use]
    pub fn is_licensed(&self) -> bool {
        matches!(self, Self::Licensed { .. })
    }
}

/// Composes the token codec with the entitlement store.
///
/// Token possession alone never authorizes: validation re-checks the store
/// so a revocation takes effect on the very next validation.
pub struct AuthorizationService {
    codec: TokenCodec,
    store: Arc<dyn EntitlementStore>,
}

impl AuthorizationService {
    /// Creates a service over `store`, signing with `codec`.
    pub fn new(codec: TokenCodec, store: Arc<dyn EntitlementStore>) -> Self {
        Self { codec, store }
    }

    /// Returns the entitlement store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn EntitlementStore> {
        &self.store
    }

    /// Checks whether `client` is licensed and issues a token if so.
    ///
    /// # Errors
    ///
    /// `MissingClient` for blank input, `Store` if the backend failed.
    pub async fn check_license(&self, client: &str) -> ServiceResult<LicenseCheck> {
        let client = ClientId::parse(client)?;
        if !self.store.contains(&client).await? {
            debug!("License check: {} not licensed", client);
            return Ok(LicenseCheck::Unlicensed);
        }
        let access_token = self.codec.issue(&client)?;
        debug!("License check: issued token to {}", client);
        Ok(LicenseCheck::Licensed { access_token })
    }

    /// Returns whether `token` is valid and its client still entitled.
    ///
    /// Blank, malformed, forged and expired tokens are `Ok(false)`.
    ///
    /// # Errors
    ///
    /// `Store` if the entitlement re-check failed.
    pub async fn validate_token(&self, token: &str) -> ServiceResult<bool> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(false);
        }
        let claims = match self.codec.decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Token rejected: {}", e);
                return Ok(false);
            }
        };
        let entitled = self.store.contains(&claims.client_id).await?;
        if !entitled {
            debug!("Token for {} rejected: no longer licensed", claims.client_id);
        }
        Ok(entitled)
    }

    /// Enables or disables `client`. Returns the normalised id.
    ///
    /// # Errors
    ///
    /// `MissingClient` for blank input, `Store` if the backend failed.
    pub async fn admin_set_enabled(&self, client: &str, enabled: bool) -> ServiceResult<ClientId> {
        let client = ClientId::parse(client)?;
        if enabled {
            self.store.add(&client).await?;
            info!("Enabled client: {}", client);
        } else {
            self.store.remove(&client).await?;
            info!("Disabled client: {}", client);
        }
        Ok(client)
    }

    /// Lists every enabled client.
    pub async fn admin_list_enabled(&self) -> ServiceResult<BTreeSet<ClientId>> {
        Ok(self.store.enumerate().await?)
    }
}

impl std::fmt::Debug for AuthorizationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationService")
            .field("codec", &self.codec)
            .field("backend", &self.store.backend_name())
            .finish()
    }
}
