//! Durable storage for the cart.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::cart::LineItem;
use crate::error::CartError;

/// Where a cart lives between runs.
pub trait CartStorage {
    /// Returns the stored items, or an empty list when nothing was stored.
    fn load(&self) -> Result<Vec<LineItem>, CartError>;

    fn save(&self, items: &[LineItem]) -> Result<(), CartError>;
}

/// A JSON file. Writes go to a sibling temp file that is then renamed over
/// the target, so a crash never leaves a half-written cart.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    path: PathBuf,
}

impl FileCartStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "cart.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CartStorage for FileCartStorage {
    fn load(&self) -> Result<Vec<LineItem>, CartError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, items: &[LineItem]) -> Result<(), CartError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.temp_path();
        std::fs::write(&tmp, serde_json::to_vec(items)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    raw: Option<String>,
    fail_writes: bool,
    writes: usize,
}

/// Keeps the serialized cart in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryCartStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from raw stored text, which may be invalid.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.lock().raw = Some(raw.into());
        storage
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock only means another holder panicked mid-test.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes every following `save` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn raw(&self) -> Option<String> {
        self.lock().raw.clone()
    }

    /// Number of successful saves.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self) -> Result<Vec<LineItem>, CartError> {
        match self.lock().raw.as_deref() {
            None => Ok(Vec::new()),
            Some(raw) => Ok(serde_json::from_str(raw)?),
        }
    }

    fn save(&self, items: &[LineItem]) -> Result<(), CartError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(CartError::Storage("storage is read-only".to_string()));
        }
        state.raw = Some(serde_json::to_string(items)?);
        state.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, ProductId};

    fn item() -> LineItem {
        LineItem {
            product_id: ProductId::new(),
            name: "Ethiopian Yirgacheffe".to_string(),
            unit_price: Money::from_cents(1899),
            quantity: 2,
            grind_option: None,
        }
    }

    #[test]
    fn file_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileCartStorage::new(dir.path().join("nested").join("cart.json"));
        assert!(storage.load().unwrap().is_empty());

        storage.save(&[item()]).unwrap();
        let loaded = storage.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].quantity, 2);
        assert!(!storage.temp_path().exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = FileCartStorage::new(path).load().unwrap_err();
        assert!(matches!(err, CartError::Corrupt(_)));
    }

    #[test]
    fn memory_storage_can_refuse_writes() {
        let storage = MemoryCartStorage::new();
        storage.save(&[item()]).unwrap();
        storage.set_fail_writes(true);
        assert!(storage.save(&[]).is_err());
        assert_eq!(storage.load().unwrap().len(), 1);
        assert_eq!(storage.write_count(), 1);
    }
}
