// src/metadata.rs

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpg,
    Png,
    Webp,
}

impl ImageKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

/// A discovered image, consumed as soon as it is processed.
#[derive(Debug, Clone)]
pub struct ImageJob {
    pub path: PathBuf,
    pub kind: ImageKind,
}

impl ImageJob {
    pub fn new(path: PathBuf) -> Option<Self> {
        let kind = ImageKind::from_path(&path)?;
        Some(Self { path, kind })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistFolderRecord {
    pub folder_path: PathBuf,
    pub artist_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRecord {
    pub image_path: PathBuf,
    pub artist_name: String,
}

/// Join key shared by folders and thumbnails: lowercased basename without a
/// trailing `.jpg`/`.png`, with every `.` removed.
pub fn normalize_artist_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let name = name.strip_suffix(".jpg").unwrap_or(&name);
    let name = name.strip_suffix(".png").unwrap_or(name);
    name.replace('.', "")
}
