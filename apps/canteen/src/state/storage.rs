//! # Durable Slots
//!
//! A tiny key-value store on disk for client-local state that must survive
//! a restart (today only the cart).
//!
//! ## Layout
//! ```text
//! <data dir>/cart.json
//! {
//!   "canteen-cart": [ { "item": { ... }, "quantity": 2 }, ... ]
//! }
//! ```
//!
//! Reads never fail: a missing file, a missing key or content that no longer
//! deserializes is logged and replaced by the default value. Writes replace
//! the whole file through a temporary sibling and a rename. There is no
//! schema versioning.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage key of the persisted cart lines.
pub const CART_SLOT_KEY: &str = "canteen-cart";

/// File holding the cart slot inside the data directory.
pub const CART_SLOT_FILE: &str = "cart.json";

/// Failure writing a slot.
#[derive(Debug, Error)]
pub enum SlotError {
    #[error("Failed to write slot file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode slot {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One typed value stored under `key` in a JSON file.
#[derive(Debug, Clone)]
pub struct DurableSlot<T> {
    path: PathBuf,
    key: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> DurableSlot<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Creates a slot. Nothing touches the disk until the first read or write.
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        DurableSlot {
            path: path.into(),
            key: key.into(),
            _value: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored value, falling back to `T::default()`.
    pub fn read(&self) -> T {
        let Some(raw) = self.load_map().remove(&self.key) else {
            debug!(key = %self.key, path = %self.path.display(), "Slot empty");
            return T::default();
        };

        match serde_json::from_value(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Slot content is corrupt, starting empty");
                T::default()
            }
        }
    }

    /// Replaces the stored value.
    ///
    /// ## Errors
    /// `SlotError` if the value cannot be encoded or the file written.
    pub fn write(&self, value: &T) -> Result<(), SlotError> {
        let encoded = serde_json::to_value(value).map_err(|source| SlotError::Encode {
            key: self.key.clone(),
            source,
        })?;

        let mut map = self.load_map();
        map.insert(self.key.clone(), encoded);

        let bytes = serde_json::to_vec_pretty(&map).map_err(|source| SlotError::Encode {
            key: self.key.clone(),
            source,
        })?;

        let io_err = |source| SlotError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    fn load_map(&self) -> BTreeMap<String, Value> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read slot file");
                return BTreeMap::new();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Slot file is not a JSON object");
            BTreeMap::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // The directory is removed when the returned guard drops.
    fn scratch_file() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CART_SLOT_FILE);
        (dir, path)
    }

    #[test]
    fn test_missing_file_reads_default() {
        let (_dir, path) = scratch_file();
        let slot: DurableSlot<Vec<i64>> = DurableSlot::new(path, CART_SLOT_KEY);
        assert!(slot.read().is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let (_dir, path) = scratch_file();
        let slot: DurableSlot<Vec<i64>> = DurableSlot::new(path, CART_SLOT_KEY);
        slot.write(&vec![1, 2, 3]).unwrap();
        assert_eq!(slot.read(), vec![1, 2, 3]);

        let raw: Value = serde_json::from_slice(&fs::read(slot.path()).unwrap()).unwrap();
        assert_eq!(raw[CART_SLOT_KEY], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_corrupt_value_reads_default() {
        let (_dir, path) = scratch_file();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "canteen-cart": "not a list" }"#).unwrap();

        let slot: DurableSlot<Vec<i64>> = DurableSlot::new(&path, CART_SLOT_KEY);
        assert!(slot.read().is_empty());
    }

    #[test]
    fn test_garbage_file_reads_default_and_is_overwritten() {
        let (_dir, path) = scratch_file();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{{{").unwrap();

        let slot: DurableSlot<Vec<i64>> = DurableSlot::new(&path, CART_SLOT_KEY);
        assert!(slot.read().is_empty());

        slot.write(&vec![7]).unwrap();
        assert_eq!(slot.read(), vec![7]);
    }

    #[test]
    fn test_other_keys_preserved() {
        let (_dir, path) = scratch_file();
        let cart: DurableSlot<Vec<i64>> = DurableSlot::new(&path, CART_SLOT_KEY);
        let other: DurableSlot<Vec<i64>> = DurableSlot::new(&path, "other");

        other.write(&vec![9]).unwrap();
        cart.write(&vec![1]).unwrap();

        assert_eq!(other.read(), vec![9]);
        assert_eq!(cart.read(), vec![1]);
    }
}
