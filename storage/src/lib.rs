//! Persistent asset store for RoseBox.
//!
//! The device keeps its configuration, bootstrap scripts and application
//! modules in a small path-addressed flash filesystem (plus an optional SD
//! card mounted under `/sd`). The firmware core never talks to the flash
//! driver directly; it goes through the [`AssetStore`] contract defined here.
//!
//! - `path`: absolute path validation and normalisation
//! - `mem`: in-RAM store used on the host and as the RAM-disk fallback

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod mem;
pub mod path;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

pub use mem::MemStore;

/// Storage error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// File not found.
    NotFound,
    /// Path is not absolute, too long, or escapes the root.
    InvalidPath,
    /// No space left on device.
    NoSpace,
    /// Read-only filesystem.
    ReadOnly,
    /// Device I/O error.
    IoError,
}

impl StorageError {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageError::NotFound => "not found",
            StorageError::InvalidPath => "invalid path",
            StorageError::NoSpace => "no space left on device",
            StorageError::ReadOnly => "read-only filesystem",
            StorageError::IoError => "I/O error",
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path-addressed byte storage, durable across power loss.
///
/// Writes replace the whole file. Directories are implicit: a file at
/// `/apps/clock.lua` makes `/apps` listable.
pub trait AssetStore {
    /// Check whether a file exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Read the full contents of the file at `path`.
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Create or replace the file at `path`.
    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError>;

    /// List the names of the direct children of `dir`, sorted.
    fn list(&self, dir: &str) -> Result<Vec<String>, StorageError>;
}
