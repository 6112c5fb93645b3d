use crate::error::AppError;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Files under `root` with the given extension, sorted by path. Only the top
/// level is searched unless `recursive` is set.
pub fn find_images(root: &Path, extension: &str, recursive: bool) -> Vec<PathBuf> {
    log::debug!("Scanning {:?} for *.{} (recursive: {})", root, extension, recursive);

    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut found = Vec::new();
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            log::trace!("Skipping non-file entry: {:?}", entry.path());
            continue;
        }
        if has_extension(entry.path(), extension) {
            log::trace!("Discovered image: {:?}", entry.path());
            found.push(entry.into_path());
        }
    }
    found
}

/// Parents of every directory under `root` (itself included) that has no
/// subdirectory.
pub fn find_artist_folders(root: &Path) -> Result<BTreeSet<PathBuf>, AppError> {
    log::info!("Looking for artist folders in {:?}", root);

    let mut dirs = Vec::new();
    let mut with_subdirs = HashSet::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.depth() > 0 {
            if let Some(parent) = entry.path().parent() {
                with_subdirs.insert(parent.to_path_buf());
            }
        }
        dirs.push(entry.into_path());
    }

    let artists: BTreeSet<PathBuf> = dirs
        .iter()
        .filter(|dir| !with_subdirs.contains(*dir))
        .filter_map(|leaf| leaf.parent().map(Path::to_path_buf))
        .collect();
    log::debug!("Found {} artist folders", artists.len());
    Ok(artists)
}

/// Every `.jpg` under `root`, deduplicated on the lowercased path.
pub fn find_thumbnails(root: &Path) -> Result<Vec<PathBuf>, AppError> {
    log::info!("Looking for artist thumbnails in {:?}", root);

    let mut unique: BTreeMap<String, PathBuf> = BTreeMap::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), "jpg") {
            let key = entry.path().to_string_lossy().to_lowercase();
            unique.entry(key).or_insert_with(|| entry.into_path());
        }
    }
    log::debug!("Found {} thumbnails", unique.len());
    Ok(unique.into_values().collect())
}
