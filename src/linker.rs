use crate::error::AppError;
use crate::metadata::{normalize_artist_name, ArtistFolderRecord, ThumbnailRecord};
use crate::walker;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Folder names that never count as missing a thumbnail.
pub const EXCLUDED_NAMES: [&str; 3] = ["outside mb", "albums", "compilations"];

pub const FOLDER_IMAGE: &str = "folder.jpg";

/// Both sides of the outer join for one normalized name.
#[derive(Debug, Default)]
struct Slots {
    folders: Vec<PathBuf>,
    thumbnails: Vec<PathBuf>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// `(thumbnail, artist_folder)` pairs to copy.
    pub matched: Vec<(PathBuf, PathBuf)>,
    /// Sorted names with a folder but no thumbnail, one per folder.
    pub missing: Vec<String>,
}

pub fn join(folders: &[ArtistFolderRecord], thumbnails: &[ThumbnailRecord]) -> MatchResult {
    let mut table: BTreeMap<&str, Slots> = BTreeMap::new();
    for f in folders {
        table.entry(f.artist_name.as_str()).or_default().folders.push(f.folder_path.clone());
    }
    for t in thumbnails {
        table.entry(t.artist_name.as_str()).or_default().thumbnails.push(t.image_path.clone());
    }

    let mut result = MatchResult::default();
    for (name, slots) in table {
        match (slots.folders.is_empty(), slots.thumbnails.is_empty()) {
            (false, false) => {
                for folder in &slots.folders {
                    for thumb in &slots.thumbnails {
                        result.matched.push((thumb.clone(), folder.clone()));
                    }
                }
            }
            (false, true) if !EXCLUDED_NAMES.contains(&name) => {
                result.missing.extend(slots.folders.iter().map(|_| name.to_string()));
            }
            _ => log::trace!("Ignoring {:?}", name),
        }
    }
    result.missing.sort();
    result
}

pub struct LinkArtists {
    artist_path: PathBuf,
    folder_dir: PathBuf,
    interrupted: Arc<AtomicBool>,
}

impl LinkArtists {
    pub fn new(artist_path: impl Into<PathBuf>, folder_dir: impl Into<PathBuf>) -> Self {
        Self {
            artist_path: artist_path.into(),
            folder_dir: folder_dir.into(),
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stops copying once `flag` is raised.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    pub fn collect(&self) -> Result<MatchResult, AppError> {
        let folders: Vec<ArtistFolderRecord> = walker::find_artist_folders(&self.folder_dir)?
            .into_iter()
            .map(|folder_path| ArtistFolderRecord {
                artist_name: normalize_artist_name(&folder_path),
                folder_path,
            })
            .collect();
        let thumbnails: Vec<ThumbnailRecord> = walker::find_thumbnails(&self.artist_path)?
            .into_iter()
            .map(|image_path| ThumbnailRecord {
                artist_name: normalize_artist_name(&image_path),
                image_path,
            })
            .collect();
        Ok(join(&folders, &thumbnails))
    }

    /// Copies every matched thumbnail and prints the missing-artist table.
    pub fn run(&self) -> Result<MatchResult, AppError> {
        let result = self.collect()?;
        for (thumb, folder) in &result.matched {
            if self.interrupted.load(Ordering::SeqCst) {
                return Err(AppError::Interrupted);
            }
            copy_thumbnail(thumb, folder)?;
        }
        println!("{}", render_missing(&result.missing));
        Ok(result)
    }
}

fn copy_thumbnail(thumb: &Path, folder: &Path) -> Result<PathBuf, AppError> {
    let target = folder.join(FOLDER_IMAGE);
    fs::copy(thumb, &target)?;
    let name = thumb.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    log::info!("Copying {} --> {}", name, target.display());
    Ok(target)
}

/// Single-column, left-aligned box table of missing artist names.
pub fn render_missing(missing: &[String]) -> String {
    let header = format!("Artist Thumbnails Mismatch = Missing {} artists", missing.len());
    let width = missing
        .iter()
        .map(|m| m.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0);

    let border = format!("+{}+", "-".repeat(width + 2));
    let row = |text: &str| format!("| {}{} |", text, " ".repeat(width - text.chars().count()));

    let mut lines = vec![border.clone(), row(&header), border.clone()];
    lines.extend(missing.iter().map(|m| row(m.as_str())));
    if !missing.is_empty() {
        lines.push(border);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn folder(name: &str) -> ArtistFolderRecord {
        let folder_path = PathBuf::from("/music").join(name);
        ArtistFolderRecord { artist_name: normalize_artist_name(&folder_path), folder_path }
    }

    fn thumb(name: &str) -> ThumbnailRecord {
        let image_path = PathBuf::from("/thumbs").join(format!("{name}.jpg"));
        ThumbnailRecord { artist_name: normalize_artist_name(&image_path), image_path }
    }

    #[test]
    fn test_join_partitions_outer_join() {
        let folders = [folder("a"), folder("b"), folder("c")];
        let thumbs = [thumb("a"), thumb("c"), thumb("d")];
        let result = join(&folders, &thumbs);

        let matched: Vec<_> = result
            .matched
            .iter()
            .map(|(_, f)| f.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(matched, vec!["a", "c"]);
        assert_eq!(result.missing, vec!["b".to_string()]);
    }

    #[test]
    fn test_exclusions_are_exact() {
        let folders = [
            folder("outside mb"),
            folder("Albums"),
            folder("compilations"),
            folder("zappa"),
            folder("abba"),
        ];
        let result = join(&folders, &[thumb("compilations")]);
        // Folder names are lowercased before comparison, so "Albums" is excluded too.
        assert_eq!(result.missing, vec!["abba".to_string(), "zappa".to_string()]);
        assert_eq!(result.matched.len(), 1);
    }

    #[test]
    fn test_render_missing_table() {
        let table = render_missing(&["b".to_string()]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "| Artist Thumbnails Mismatch = Missing 1 artists |");
        assert!(lines[3].starts_with("| b "));
        assert_eq!(lines[3].len(), lines[0].len());
    }

    #[test]
    fn test_run_copies_matches_into_artist_folders() {
        let dir = tempdir().unwrap();
        let music = dir.path().join("music");
        let thumbs = dir.path().join("thumbs");
        for album in ["The Beatles/Abbey Road", "R.E.M/Murmur", "Blur/Parklife", "Outside MB/Misc"] {
            fs::create_dir_all(music.join(album)).unwrap();
        }
        fs::create_dir_all(&thumbs).unwrap();
        fs::write(thumbs.join("The Beatles.jpg"), b"beatles").unwrap();
        fs::write(thumbs.join("REM.jpg"), b"rem").unwrap();
        fs::write(thumbs.join("Oasis.jpg"), b"oasis").unwrap();
        fs::write(music.join("The Beatles/folder.jpg"), b"old").unwrap();

        let result = LinkArtists::new(&thumbs, &music).run().unwrap();

        assert_eq!(fs::read(music.join("The Beatles/folder.jpg")).unwrap(), b"beatles");
        assert_eq!(fs::read(music.join("R.E.M/folder.jpg")).unwrap(), b"rem");
        assert!(!music.join("Blur/folder.jpg").exists());
        assert_eq!(result.matched.len(), 2);
        assert_eq!(result.missing, vec!["blur".to_string()]);
    }

    #[test]
    fn test_missing_thumbnail_root_propagates() {
        let dir = tempdir().unwrap();
        let linker = LinkArtists::new(dir.path().join("nope"), dir.path());
        assert!(linker.run().is_err());
    }

    #[test]
    fn test_interrupt_stops_copying() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("music/Abba/Gold")).unwrap();
        fs::write(dir.path().join("Abba.jpg"), b"abba").unwrap();

        let linker = LinkArtists::new(dir.path(), dir.path().join("music"))
            .with_interrupt(Arc::new(AtomicBool::new(true)));
        assert!(matches!(linker.run(), Err(AppError::Interrupted)));
        assert!(!dir.path().join("music/Abba/folder.jpg").exists());
    }
}
