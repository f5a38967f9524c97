//! Extraction of tar.gz bundle archives into a working directory.

use std::fs;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

/// Extracts a tar.gz bundle into `dest`, flattening a single nested root.
///
/// Bundles often extract to one top-level directory (for example
/// `preflightbundle-<timestamp>/`); when exactly one directory results, its
/// contents are hoisted up so relative paths line up across bundles.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or unpacked, or if the
/// flattening moves fail.
pub fn extract_bundle(archive: &Path, dest: &Path) -> Result<(), String> {
    fs::create_dir_all(dest)
        .map_err(|e| format!("failed to create extraction dir {}: {e}", dest.display()))?;

    let file = fs::File::open(archive)
        .map_err(|e| format!("failed to open bundle {}: {e}", archive.display()))?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.unpack(dest)
        .map_err(|e| format!("failed to extract bundle {}: {e}", archive.display()))?;

    flatten_single_root(dest)
}

/// If `dest` contains exactly one entry and it is a directory, moves that
/// directory's contents up one level and removes it.
fn flatten_single_root(dest: &Path) -> Result<(), String> {
    let entries: Vec<_> = fs::read_dir(dest)
        .map_err(|e| format!("failed to list {}: {e}", dest.display()))?
        .collect::<Result<_, _>>()
        .map_err(|e| format!("failed to list {}: {e}", dest.display()))?;

    let [nested] = entries.as_slice() else {
        return Ok(());
    };
    if !nested.path().is_dir() {
        return Ok(());
    }

    let nested_dir = nested.path();
    let children = fs::read_dir(&nested_dir)
        .map_err(|e| format!("failed to list {}: {e}", nested_dir.display()))?;
    for child in children {
        let child = child.map_err(|e| format!("failed to list {}: {e}", nested_dir.display()))?;
        let target = dest.join(child.file_name());
        fs::rename(child.path(), &target).map_err(|e| {
            format!("failed to move {} to {}: {e}", child.path().display(), target.display())
        })?;
    }
    fs::remove_dir(&nested_dir)
        .map_err(|e| format!("failed to remove {}: {e}", nested_dir.display()))
}
