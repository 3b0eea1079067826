//! Model persistence behind a trait so the orchestrator never knows
//! whether blobs live in memory or on disk.

use gambit_core::{GambitError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Storage for opaque model blobs plus a champion pointer.
pub trait ModelStore: Send + Sync {
    fn save(&self, id: &str, bytes: &[u8]) -> Result<()>;
    fn load(&self, id: &str) -> Result<Vec<u8>>;
    /// All stored model ids, sorted.
    fn list(&self) -> Result<Vec<String>>;
    /// Current champion id, `None` before the first promotion.
    fn champion(&self) -> Result<Option<String>>;
    fn set_champion(&self, id: &str) -> Result<()>;
}

fn storage_error(context: &str, detail: impl std::fmt::Display) -> GambitError {
    GambitError::Serialization(format!("{context}: {detail}"))
}

#[derive(Default)]
struct MemoryInner {
    models: HashMap<String, Vec<u8>>,
    champion: Option<String>,
}

/// Keeps everything in a mutex-guarded map. Used by tests and the
/// orchestrator's default wiring.
#[derive(Default)]
pub struct InMemoryModelStore {
    inner: Mutex<MemoryInner>,
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ModelStore for InMemoryModelStore {
    fn save(&self, id: &str, bytes: &[u8]) -> Result<()> {
        self.lock().models.insert(id.to_string(), bytes.to_vec());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Vec<u8>> {
        self.lock()
            .models
            .get(id)
            .cloned()
            .ok_or_else(|| storage_error("load model", format!("'{id}' not found")))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.lock().models.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn champion(&self) -> Result<Option<String>> {
        Ok(self.lock().champion.clone())
    }

    fn set_champion(&self, id: &str) -> Result<()> {
        let mut inner = self.lock();
        if !inner.models.contains_key(id) {
            return Err(storage_error("set champion", format!("'{id}' not found")));
        }
        inner.champion = Some(id.to_string());
        Ok(())
    }
}

/// One `.bin` file per model under `root`, champion id in `champion.txt`.
pub struct FileModelStore {
    root: PathBuf,
}

impl FileModelStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| storage_error("create model dir", e))?;
        Ok(Self { root })
    }

    fn model_path(&self, id: &str) -> Result<PathBuf> {
        // Ids become file names, so path separators are off the table.
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(storage_error("model id", format!("'{id}' is not a valid id")));
        }
        Ok(self.root.join(format!("{id}.bin")))
    }

    fn champion_path(&self) -> PathBuf {
        self.root.join("champion.txt")
    }
}

impl ModelStore for FileModelStore {
    fn save(&self, id: &str, bytes: &[u8]) -> Result<()> {
        let path = self.model_path(id)?;
        fs::write(&path, bytes).map_err(|e| storage_error("save model", e))?;
        info!(id, bytes = bytes.len(), path = %path.display(), "model saved");
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.model_path(id)?;
        fs::read(&path).map_err(|e| storage_error("load model", format!("'{id}': {e}")))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let entries = fs::read_dir(&self.root).map_err(|e| storage_error("list models", e))?;
        for entry in entries {
            let entry = entry.map_err(|e| storage_error("list models", e))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "bin") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn champion(&self) -> Result<Option<String>> {
        match fs::read_to_string(self.champion_path()) {
            Ok(contents) => {
                let id = contents.trim().to_string();
                Ok(if id.is_empty() { None } else { Some(id) })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read champion", e)),
        }
    }

    fn set_champion(&self, id: &str) -> Result<()> {
        let path = self.model_path(id)?;
        if !path.exists() {
            return Err(storage_error("set champion", format!("'{id}' not found")));
        }
        fs::write(self.champion_path(), id).map_err(|e| storage_error("set champion", e))?;
        info!(id, "champion updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = InMemoryModelStore::new();
        assert_eq!(store.champion().unwrap(), None);
        assert!(store.list().unwrap().is_empty());

        store.save("model-0001", b"alpha").unwrap();
        store.save("model-0002", b"beta").unwrap();

        assert_eq!(store.load("model-0001").unwrap(), b"alpha");
        assert_eq!(store.list().unwrap(), vec!["model-0001", "model-0002"]);

        store.set_champion("model-0002").unwrap();
        assert_eq!(store.champion().unwrap(), Some("model-0002".to_string()));
    }

    #[test]
    fn test_memory_store_rejects_unknown_ids() {
        let store = InMemoryModelStore::new();
        assert!(store.load("missing").is_err());
        assert!(store.set_champion("missing").is_err());
    }

    #[test]
    fn test_file_store_round_trip() {
        let root = std::env::temp_dir().join(format!("gambit-store-{}", std::process::id()));
        let store = FileModelStore::new(&root).unwrap();

        store.save("model-0001", b"alpha").unwrap();
        assert_eq!(store.load("model-0001").unwrap(), b"alpha");
        assert_eq!(store.list().unwrap(), vec!["model-0001"]);
        assert_eq!(store.champion().unwrap(), None);

        store.set_champion("model-0001").unwrap();

        // A fresh handle over the same directory sees the same state.
        let reopened = FileModelStore::new(&root).unwrap();
        assert_eq!(reopened.champion().unwrap(), Some("model-0001".to_string()));
        assert_eq!(reopened.load("model-0001").unwrap(), b"alpha");

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_file_store_rejects_path_like_ids() {
        let root = std::env::temp_dir().join(format!("gambit-store-ids-{}", std::process::id()));
        let store = FileModelStore::new(&root).unwrap();

        assert!(store.save("../escape", b"x").is_err());
        assert!(store.save("a/b", b"x").is_err());
        assert!(store.save("", b"x").is_err());

        fs::remove_dir_all(&root).ok();
    }
}
