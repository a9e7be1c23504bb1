//! In-RAM asset store.
//!
//! Backs the store on the host and serves as the RAM-disk fallback when the
//! flash filesystem fails to mount. Contents are lost on power cycle.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::path;
use crate::{AssetStore, StorageError};

/// Flat map of normalised path to file contents.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    files: BTreeMap<String, Vec<u8>>,
    /// Byte budget across all files (None = unlimited).
    capacity: Option<usize>,
    read_only: bool,
}

impl MemStore {
    /// Create an empty, unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that refuses writes beyond `bytes` in total.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            capacity: Some(bytes),
            ..Self::default()
        }
    }

    /// Freeze or unfreeze the store.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Total bytes stored.
    pub fn used(&self) -> usize {
        self.files.values().map(|v| v.len()).sum()
    }

    /// Number of files stored.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate `(path, contents)` in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl AssetStore for MemStore {
    fn exists(&self, path: &str) -> bool {
        match path::normalize(path) {
            Ok(p) => self.files.contains_key(&p),
            Err(_) => false,
        }
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let p = path::normalize(path)?;
        self.files.get(&p).cloned().ok_or(StorageError::NotFound)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        let p = path::normalize(path)?;
        if p == "/" {
            return Err(StorageError::InvalidPath);
        }
        if let Some(cap) = self.capacity {
            let replaced = self.files.get(&p).map(|v| v.len()).unwrap_or(0);
            if self.used() - replaced + data.len() > cap {
                log::warn!("[RoseBox/Storage] no space for {} ({} bytes)", p, data.len());
                return Err(StorageError::NoSpace);
            }
        }
        self.files.insert(p, data.to_vec());
        Ok(())
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let dir = path::normalize(dir)?;
        let prefix = if dir == "/" {
            String::from("/")
        } else {
            let mut s = dir.clone();
            s.push('/');
            s
        };

        let mut names: Vec<String> = Vec::new();
        for key in self.files.keys() {
            if let Some(rest) = key.strip_prefix(prefix.as_str()) {
                // Direct child file, or the first component of a nested path.
                let name = rest.split('/').next().unwrap_or(rest);
                if !name.is_empty() {
                    names.push(String::from(name));
                }
            }
        }
        names.sort();
        names.dedup();

        if names.is_empty() && dir != "/" {
            return Err(StorageError::NotFound);
        }
        Ok(names)
    }
}
