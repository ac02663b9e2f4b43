//! Durable storage slots.
//!
//! A slot is a named blob of text holding one versioned JSON [`Snapshot`]:
//! the catalog, or one shopper's cart or favorites. [`FileStorage`] keeps one
//! file per slot on disk; [`MemoryStorage`] keeps them in a map and can
//! simulate a full or unavailable store.
//!
//! Backends are blocking. Async code goes through [`restore`] and [`store`],
//! which run the backend call on tokio's blocking pool.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Current snapshot format version. Snapshots with another version are
/// discarded on load.
pub const SNAPSHOT_VERSION: u32 = 0;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage slot name: {0:?}")]
    InvalidSlot(String),

    #[error("storage I/O error for slot {slot}: {source}")]
    Io {
        slot: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage quota exceeded for slot {slot} ({size} bytes, limit {limit})")]
    QuotaExceeded {
        slot: String,
        size: usize,
        limit: usize,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("invalid snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Handle to a durable key/value store of text slots.
pub trait SlotStorage: Send + Sync {
    /// Read a slot. `Ok(None)` means the slot has never been written.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn load(&self, slot: &str) -> Result<Option<String>, StorageError>;

    /// Replace the contents of a slot.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the write fails; the previous contents
    /// are left in place.
    fn save(&self, slot: &str, contents: &str) -> Result<(), StorageError>;
}

impl<S: SlotStorage + ?Sized> SlotStorage for std::sync::Arc<S> {
    fn load(&self, slot: &str) -> Result<Option<String>, StorageError> {
        (**self).load(slot)
    }

    fn save(&self, slot: &str, contents: &str) -> Result<(), StorageError> {
        (**self).save(slot, contents)
    }
}

/// Check that `slot` is usable as a slot name: non-empty ASCII letters,
/// digits, `-` and `_`.
///
/// # Errors
///
/// Returns [`StorageError::InvalidSlot`] otherwise.
pub fn validate_slot(slot: &str) -> Result<(), StorageError> {
    let valid = !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidSlot(slot.to_string()))
    }
}

/// Slot name for one shopper's copy of `base`, e.g. `mavigadget-cart-<id>`.
#[must_use]
pub fn scoped_slot(base: &str, scope: &str) -> String {
    format!("{base}-{scope}")
}

// =============================================================================
// Snapshots
// =============================================================================

/// Versioned envelope written to a slot.
///
/// ```json
/// {"state":{...},"version":0}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub state: T,
    pub version: u32,
}

impl<T> Snapshot<T> {
    /// Wrap `state` with the current version.
    pub const fn new(state: T) -> Self {
        Self {
            state,
            version: SNAPSHOT_VERSION,
        }
    }
}

impl<T: Serialize> Snapshot<T> {
    /// Encode as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<T: DeserializeOwned> Snapshot<T> {
    /// Decode from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Encode`] if the text is not a valid snapshot.
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Read and decode the snapshot in `slot`.
///
/// An empty slot, an undecodable snapshot and a snapshot of another version
/// all give `Ok(None)`; the last two are logged.
///
/// # Errors
///
/// Returns the backend's [`StorageError`] if the slot cannot be read.
pub async fn restore<S, T>(storage: &S, slot: &str) -> Result<Option<T>, StorageError>
where
    S: SlotStorage + Clone + 'static,
    T: DeserializeOwned,
{
    let contents = {
        let storage = storage.clone();
        let slot = slot.to_owned();
        blocking(move || storage.load(&slot)).await?
    };

    let Some(json) = contents else {
        debug!(slot = %slot, "Slot is empty");
        return Ok(None);
    };

    match Snapshot::<T>::from_json(&json) {
        Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => Ok(Some(snapshot.state)),
        Ok(snapshot) => {
            warn!(
                slot = %slot,
                version = snapshot.version,
                "Discarding snapshot with unsupported version"
            );
            Ok(None)
        }
        Err(e) => {
            warn!(slot = %slot, error = %e, "Discarding unreadable snapshot");
            Ok(None)
        }
    }
}

/// Encode `state` and write it to `slot`.
///
/// # Errors
///
/// Returns the [`StorageError`] from encoding or from the backend.
pub async fn store<S, T>(storage: &S, slot: &str, state: &T) -> Result<(), StorageError>
where
    S: SlotStorage + Clone + 'static,
    T: Serialize + ?Sized,
{
    let json = Snapshot::new(state).to_json()?;
    let storage = storage.clone();
    let slot = slot.to_owned();
    blocking(move || storage.save(&slot, &json)).await
}

async fn blocking<T, F>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Unavailable(format!("storage task failed: {e}")))?
}

// =============================================================================
// File storage
// =============================================================================

/// Stores each slot as `<dir>/<slot>.json`.
///
/// Each write goes to its own uniquely named temporary file in the same
/// directory and is renamed into place, so concurrent writers never share a
/// half-written file and a crash leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `dir`. The directory is created lazily on
    /// the first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

impl SlotStorage for FileStorage {
    fn load(&self, slot: &str) -> Result<Option<String>, StorageError> {
        validate_slot(slot)?;
        match std::fs::read_to_string(self.path_for(slot)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                slot: slot.to_string(),
                source,
            }),
        }
    }

    fn save(&self, slot: &str, contents: &str) -> Result<(), StorageError> {
        validate_slot(slot)?;
        let io_err = |source| StorageError::Io {
            slot: slot.to_string(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(io_err)?;

        // Dropped (and deleted) on every early return below.
        let mut file = tempfile::NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        file.write_all(contents.as_bytes()).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        file.persist(self.path_for(slot))
            .map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

// =============================================================================
// Memory storage
// =============================================================================

/// In-process storage for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
    quota: Option<usize>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes larger than `limit` bytes.
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            quota: Some(limit),
            ..Self::default()
        }
    }

    /// Make every subsequent operation fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("storage disabled".to_string()));
        }
        Ok(())
    }

    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.slots
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }
}

impl SlotStorage for MemoryStorage {
    fn load(&self, slot: &str) -> Result<Option<String>, StorageError> {
        validate_slot(slot)?;
        self.check_available()?;
        Ok(self.slots()?.get(slot).cloned())
    }

    fn save(&self, slot: &str, contents: &str) -> Result<(), StorageError> {
        validate_slot(slot)?;
        self.check_available()?;
        if let Some(limit) = self.quota {
            if contents.len() > limit {
                return Err(StorageError::QuotaExceeded {
                    slot: slot.to_string(),
                    size: contents.len(),
                    limit,
                });
            }
        }
        self.slots()?.insert(slot.to_string(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert!(storage.load("cart").unwrap().is_none());
        storage.save("cart", "{\"a\":1}").unwrap();
        assert_eq!(storage.load("cart").unwrap().as_deref(), Some("{\"a\":1}"));

        storage.save("cart", "{}").unwrap();
        assert_eq!(storage.load("cart").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_file_storage_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.save("mavigadget-cart", "{}").unwrap();

        assert_eq!(file_names(dir.path()), vec!["mavigadget-cart.json"]);
    }

    #[test]
    fn test_failed_file_save_cleans_up_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the slot file should go makes the rename fail.
        std::fs::create_dir(dir.path().join("cart.json")).unwrap();
        let storage = FileStorage::new(dir.path());

        assert!(matches!(
            storage.save("cart", "{}"),
            Err(StorageError::Io { .. })
        ));
        assert_eq!(file_names(dir.path()), vec!["cart.json"]);
    }

    #[test]
    fn test_concurrent_file_saves_never_tear() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path()));
        let payloads: Vec<String> = (0..8)
            .map(|i| format!("{{\"writer\":{i},\"pad\":\"{}\"}}", "x".repeat(64 * 1024)))
            .collect();

        let handles: Vec<_> = payloads
            .iter()
            .cloned()
            .map(|payload| {
                let storage = Arc::clone(&storage);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        storage.save("shared", &payload).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = storage.load("shared").unwrap().unwrap();
        assert!(payloads.contains(&stored));
        assert_eq!(file_names(dir.path()), vec!["shared.json"]);
    }

    #[test]
    fn test_slot_names_are_restricted() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.save("../etc/passwd", "x"),
            Err(StorageError::InvalidSlot(_))
        ));
        assert!(matches!(storage.load(""), Err(StorageError::InvalidSlot(_))));
        assert!(validate_slot(&scoped_slot("mavigadget-cart", "0f3a9c")).is_ok());
    }

    #[test]
    fn test_memory_storage_unavailable() {
        let storage = MemoryStorage::new();
        storage.save("cart", "1").unwrap();
        storage.set_unavailable(true);
        assert!(matches!(
            storage.save("cart", "2"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(storage.load("cart").is_err());

        storage.set_unavailable(false);
        assert_eq!(storage.load("cart").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_memory_storage_quota() {
        let storage = MemoryStorage::with_quota(4);
        storage.save("cart", "1234").unwrap();
        assert!(matches!(
            storage.save("cart", "12345"),
            Err(StorageError::QuotaExceeded { limit: 4, .. })
        ));
        assert_eq!(storage.load("cart").unwrap().as_deref(), Some("1234"));
    }

    #[tokio::test]
    async fn test_store_then_restore() {
        let storage = Arc::new(MemoryStorage::new());
        store(&storage, "favorites", &vec!["1", "2"]).await.unwrap();

        let raw = storage.load("favorites").unwrap().unwrap();
        assert_eq!(raw, r#"{"state":["1","2"],"version":0}"#);

        let restored: Option<Vec<String>> = restore(&storage, "favorites").await.unwrap();
        assert_eq!(restored, Some(vec!["1".to_string(), "2".to_string()]));
    }

    #[tokio::test]
    async fn test_restore_discards_bad_snapshots() {
        let storage = Arc::new(MemoryStorage::new());

        let empty: Option<Vec<String>> = restore(&storage, "slot").await.unwrap();
        assert_eq!(empty, None);

        storage.save("slot", "{not json").unwrap();
        let corrupt: Option<Vec<String>> = restore(&storage, "slot").await.unwrap();
        assert_eq!(corrupt, None);

        storage.save("slot", r#"{"state":[],"version":7}"#).unwrap();
        let future: Option<Vec<String>> = restore(&storage, "slot").await.unwrap();
        assert_eq!(future, None);

        storage.set_unavailable(true);
        assert!(restore::<_, Vec<String>>(&storage, "slot").await.is_err());
    }
}
