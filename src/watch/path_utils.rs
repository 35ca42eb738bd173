// src/watch/path_utils.rs

use std::path::Path;

use crate::select::to_match_str;

/// Event path relative to `root`, as a forward-slash string for glob
/// matching.
///
/// Falls back to comparing canonical paths, since watchers may report a
/// different absolute prefix for the same directory (symlinks, macOS
/// `/private/var`). Returns `None` for paths outside `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_match_str(rel));
    }

    let root = root.canonicalize().ok()?;
    // A removed file cannot be canonicalized; its parent usually can.
    let canonical = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            let parent = path.parent()?.canonicalize().ok()?;
            parent.join(path.file_name()?)
        }
    };
    canonical.strip_prefix(&root).ok().map(to_match_str)
}
