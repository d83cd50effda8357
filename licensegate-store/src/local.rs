//! In-process entitlement set with an optional JSON snapshot file.
//!
//! The snapshot is rewritten in full after every mutation. A crash mid-write
//! can leave a corrupt file behind; loading tolerates that by starting from
//! the seed list and logging a warning.

use crate::error::{StoreError, StoreResult};
use crate::store::EntitlementStore;
use async_trait::async_trait;
use licensegate_types::ClientId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// On-disk snapshot format: `{"clients": ["id1", "id2"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Entitled clients.
    #[serde(default)]
    pub clients: Vec<ClientId>,
}

impl Snapshot {
    fn into_set(self) -> BTreeSet<ClientId> {
        self.clients.into_iter().filter(|c| !c.is_blank()).collect()
    }
}

/// Local entitlement store.
///
/// The set and the snapshot file are guarded by one lock, so a mutation and
/// its file rewrite happen as a unit with respect to other requests.
pub struct LocalStore {
    clients: Mutex<BTreeSet<ClientId>>,
    snapshot_path: Option<PathBuf>,
    hot_reload: bool,
}

impl LocalStore {
    /// Creates a purely in-memory store holding `seed`.
    pub fn in_memory(seed: impl IntoIterator<Item = ClientId>) -> Self {
        Self {
            clients: Mutex::new(seed.into_iter().collect()),
            snapshot_path: None,
            hot_reload: false,
        }
    }

    /// Opens a store mirrored to the snapshot file at `path`.
    ///
    /// If the file exists and parses, its contents replace `seed`. A missing
    /// file leaves the seed in place; an unreadable one is logged and
    /// ignored. Opening never fails.
    pub async fn open(path: impl Into<PathBuf>, seed: impl IntoIterator<Item = ClientId>) -> Self {
        let path = path.into();
        let mut clients: BTreeSet<ClientId> = seed.into_iter().collect();

        match read_snapshot(&path).await {
            Ok(Some(loaded)) => {
                info!("Loaded {} client(s) from {:?}", loaded.len(), path);
                clients = loaded;
            }
            Ok(None) => {
                debug!("No snapshot at {:?}, starting from seed", path);
            }
            Err(e) => {
                warn!("Could not load snapshot {:?}: {}", path, e);
            }
        }

        Self {
            clients: Mutex::new(clients),
            snapshot_path: Some(path),
            hot_reload: true,
        }
    }

    /// Enables or disables re-reading the snapshot before each read.
    ///
    /// Hot reload picks up edits made to the file by hand while the process
    /// runs. It only has an effect on stores opened with a snapshot path.
    #[must_use]
    pub fn with_hot_reload(mut self, enabled: bool) -> Self {
        self.hot_reload = enabled;
        self
    }

    /// Returns the snapshot path, if any.
    #[must_use]
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Best-effort reload of the snapshot into `clients`.
    async fn reload(&self, clients: &mut BTreeSet<ClientId>) {
        if !self.hot_reload {
            return;
        }
        let Some(path) = &self.snapshot_path else {
            return;
        };
        match read_snapshot(path).await {
            Ok(Some(loaded)) => *clients = loaded,
            Ok(None) => {}
            Err(e) => debug!("Ignoring unreadable snapshot {:?}: {}", path, e),
        }
    }

    async fn persist(&self, clients: &BTreeSet<ClientId>) -> StoreResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let snapshot = Snapshot {
            clients: clients.iter().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path, json).await.map_err(|e| {
            warn!("Could not save snapshot {:?}: {}", path, e);
            StoreError::Persistence(format!("failed to write {}: {e}", path.display()))
        })
    }

    /// Applies `change` to the (freshly reloaded) set and rewrites the
    /// snapshot. If the rewrite fails the set is restored, so an error means
    /// nothing changed.
    async fn mutate(&self, change: impl FnOnce(&mut BTreeSet<ClientId>)) -> StoreResult<()> {
        let mut clients = self.clients.lock().await;
        self.reload(&mut clients).await;
        let previous = clients.clone();
        change(&mut clients);
        if let Err(e) = self.persist(&clients).await {
            *clients = previous;
            return Err(e);
        }
        Ok(())
    }
}

/// Reads a snapshot file. `Ok(None)` means the file does not exist.
async fn read_snapshot(path: &Path) -> StoreResult<Option<BTreeSet<ClientId>>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StoreError::Persistence(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };
    let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
    Ok(Some(snapshot.into_set()))
}

#[async_trait]
impl EntitlementStore for LocalStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn contains(&self, client: &ClientId) -> StoreResult<bool> {
        let mut clients = self.clients.lock().await;
        self.reload(&mut clients).await;
        Ok(clients.contains(client))
    }

    async fn add(&self, client: &ClientId) -> StoreResult<()> {
        self.mutate(|clients| {
            clients.insert(client.clone());
        })
        .await
    }

    async fn remove(&self, client: &ClientId) -> StoreResult<()> {
        self.mutate(|clients| {
            clients.remove(client);
        })
        .await
    }

    async fn enumerate(&self) -> StoreResult<BTreeSet<ClientId>> {
        let mut clients = self.clients.lock().await;
        self.reload(&mut clients).await;
        Ok(clients.clone())
    }
}
