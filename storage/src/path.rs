//! Absolute path handling.

use alloc::string::String;
use alloc::vec::Vec;

use crate::StorageError;

/// Maximum path length accepted by the flash filesystem.
pub const MAX_PATH_LEN: usize = 255;

/// Normalise an absolute path.
///
/// Collapses repeated separators and `.` segments and resolves `..`.
/// Fails for relative paths, paths that climb above `/`, and paths longer
/// than [`MAX_PATH_LEN`].
pub fn normalize(path: &str) -> Result<String, StorageError> {
    if !path.starts_with('/') || path.len() > MAX_PATH_LEN {
        return Err(StorageError::InvalidPath);
    }

    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(StorageError::InvalidPath);
                }
            }
            s => parts.push(s),
        }
    }

    if parts.is_empty() {
        return Ok(String::from("/"));
    }

    let mut out = String::with_capacity(path.len());
    for part in parts {
        out.push('/');
        out.push_str(part);
    }
    Ok(out)
}

/// Parent directory of a normalised path (`/` for top-level entries).
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(pos) => &path[..pos],
    }
}

/// Final component of a normalised path.
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Join a directory and a single name.
pub fn join(dir: &str, name: &str) -> String {
    let mut out = String::from(dir.trim_end_matches('/'));
    out.push('/');
    out.push_str(name.trim_start_matches('/'));
    out
}
