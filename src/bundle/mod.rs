//! Bundle snapshots: the set of relative file paths under an extracted root.

pub mod extract;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// An extracted bundle: a root directory plus the set of files beneath it.
///
/// Files are identified purely by their path relative to `root`, so two
/// snapshots with different roots are directly comparable. The set is
/// ordered, giving every traversal a deterministic lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSnapshot {
    /// The directory the bundle was extracted into.
    pub root: PathBuf,
    /// Relative paths of every regular file under `root`.
    pub files: BTreeSet<PathBuf>,
}

impl BundleSnapshot {
    /// Builds a snapshot by walking every regular file under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory walk fails (unreadable directory,
    /// permission error).
    pub fn from_dir(root: &Path) -> Result<Self, String> {
        let mut files = BTreeSet::new();
        for entry in WalkDir::new(root) {
            let entry =
                entry.map_err(|e| format!("failed to walk bundle at {}: {e}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| format!("file escapes bundle root {}: {e}", root.display()))?;
            files.insert(rel.to_path_buf());
        }
        Ok(Self { root: root.to_path_buf(), files })
    }

    /// The absolute path of a file identified by its relative path.
    #[must_use]
    pub fn file_path(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }
}
