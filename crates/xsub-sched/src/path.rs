//! Path helpers shared by the adapters.

use std::io;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

/// Make `path` absolute against the current directory and fold `.`/`..`
/// components lexically. Symlinks are left alone and the path need not exist.
pub fn expand(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(path).map(|path| path.clean())
}

/// Last path component as a string, or the whole path when there is none (`/`).
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
