//! Snapshot encoding for ledger state
//!
//! A snapshot wraps [`LedgerState`] with a format version and the state
//! root, so that a truncated or hand-edited file is caught on load rather
//! than silently producing a different ledger.

use crate::error::ChainError;
use crate::ledger::{Ledger, LedgerState};
use crate::params::{BlockHeight, LedgerParams};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    Json,
    Bincode,
}

impl SnapshotFormat {
    /// Picks the format from a file extension; anything but `.bin` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("bin") => SnapshotFormat::Bincode,
            _ => SnapshotFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub height: BlockHeight,
    pub state_root: String,
    pub state: LedgerState,
}

impl Snapshot {
    pub fn capture(state: &LedgerState) -> Result<Self, ChainError> {
        Ok(Snapshot {
            version: SNAPSHOT_VERSION,
            height: state.block_height,
            state_root: state.state_root_hex()?,
            state: state.clone(),
        })
    }

    /// Checks version and state root, returning the wrapped state.
    pub fn verify(self) -> Result<LedgerState, ChainError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(ChainError::SnapshotError(format!(
                "Unsupported snapshot version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        let actual = self.state.state_root_hex()?;
        if actual != self.state_root {
            return Err(ChainError::SnapshotError(format!(
                "State root mismatch: recorded {}, computed {}",
                self.state_root, actual
            )));
        }
        Ok(self.state)
    }

    pub fn encode(&self, format: SnapshotFormat) -> Result<Vec<u8>, ChainError> {
        match format {
            SnapshotFormat::Json => Ok(serde_json::to_vec_pretty(self)?),
            SnapshotFormat::Bincode => Ok(bincode::serialize(self)?),
        }
    }

    pub fn decode(bytes: &[u8], format: SnapshotFormat) -> Result<Self, ChainError> {
        match format {
            SnapshotFormat::Json => Ok(serde_json::from_slice(bytes)?),
            SnapshotFormat::Bincode => Ok(bincode::deserialize(bytes)?),
        }
    }
}

/// Somewhere a ledger snapshot can be kept between runs.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, state: &LedgerState) -> Result<(), ChainError>;
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<LedgerState>, ChainError>;

    /// Loads the saved ledger, or returns `None` so the caller can start a
    /// fresh one.
    fn load_ledger(&self, params: &LedgerParams) -> Result<Option<Ledger>, ChainError> {
        match self.load()? {
            Some(state) => Ok(Some(Ledger::from_state(params.clone(), state)?)),
            None => Ok(None),
        }
    }
}

/// Keeps the snapshot in a single file, replaced atomically on save.
pub struct FileSnapshotStore {
    path: PathBuf,
    format: SnapshotFormat,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = SnapshotFormat::from_path(&path);
        Self { path, format }
    }

    pub fn with_format(path: impl Into<PathBuf>, format: SnapshotFormat) -> Self {
        Self { path: path.into(), format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, state: &LedgerState) -> Result<(), ChainError> {
        let bytes = Snapshot::capture(state)?.encode(self.format)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Write aside and rename so a crash never leaves half a snapshot.
        let tmp = self.temp_path();
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<LedgerState>, ChainError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "no snapshot found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let state = Snapshot::decode(&bytes, self.format)?.verify()?;
        Ok(Some(state))
    }
}

/// Simple in-memory store useful for tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct InMemorySnapshotStore {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn save(&self, state: &LedgerState) -> Result<(), ChainError> {
        let bytes = Snapshot::capture(state)?.encode(SnapshotFormat::Bincode)?;
        *self.slot.lock() = Some(bytes);
        Ok(())
    }

    fn load(&self) -> Result<Option<LedgerState>, ChainError> {
        match self.slot.lock().as_deref() {
            Some(bytes) => Ok(Some(Snapshot::decode(bytes, SnapshotFormat::Bincode)?.verify()?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountId;

    fn sample_ledger() -> Ledger {
        let admin = AccountId::from("admin");
        let alice = AccountId::from("alice");
        let mut ledger = Ledger::new(admin.clone());
        ledger.initialize(&admin).unwrap();
        ledger.mint(&admin, &alice, 12_000).unwrap();
        ledger.stake(&alice, 10_000, 3, 100).unwrap();
        ledger
    }

    #[test]
    fn test_in_memory_store_round_trip() {
        let store = InMemorySnapshotStore::new();
        assert!(store.load().unwrap().is_none());
        let ledger = sample_ledger();
        store.save(ledger.state()).unwrap();
        let restored = store.load_ledger(ledger.params()).unwrap().unwrap();
        assert_eq!(restored.state(), ledger.state());
    }

    #[test]
    fn test_verify_rejects_tampered_state() {
        let ledger = sample_ledger();
        let mut snapshot = Snapshot::capture(ledger.state()).unwrap();
        snapshot.state.paused = true;
        assert!(matches!(snapshot.verify(), Err(ChainError::SnapshotError(_))));
    }

    #[test]
    fn test_verify_rejects_unknown_version() {
        let ledger = sample_ledger();
        let mut snapshot = Snapshot::capture(ledger.state()).unwrap();
        snapshot.version = 99;
        assert!(snapshot.verify().is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SnapshotFormat::from_path(Path::new("ledger.bin")), SnapshotFormat::Bincode);
        assert_eq!(SnapshotFormat::from_path(Path::new("ledger.json")), SnapshotFormat::Json);
        assert_eq!(SnapshotFormat::from_path(Path::new("ledger")), SnapshotFormat::Json);
    }
}
