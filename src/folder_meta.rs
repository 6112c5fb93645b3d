use crate::error::AppError;
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};
use std::fs;
use std::path::{Path, PathBuf};

/// Largest edge the ICO container accepts.
const ICO_MAX_SIZE: u32 = 256;

/// Writes `<stem>.ico` beside `image_path`.
pub fn export_ico(image_path: &Path) -> Result<PathBuf, AppError> {
    let ico_path = image_path.with_extension("ico");
    log::info!("Generate {}.", ico_path.display());

    let img = image::open(image_path)?;
    let (width, height) = img.dimensions();
    let img = if width > ICO_MAX_SIZE || height > ICO_MAX_SIZE {
        log::debug!("Downscaling {}x{} to fit the icon format", width, height);
        img.resize(ICO_MAX_SIZE, ICO_MAX_SIZE, FilterType::Lanczos3)
    } else {
        img
    };
    img.to_rgba8().save_with_format(&ico_path, ImageFormat::Ico)?;
    Ok(ico_path)
}

/// Folder customization pointing Explorer at `folder.ico`, with the folder
/// name as tooltip.
pub fn desktop_ini_contents(folder_name: &str) -> String {
    format!(
        "[ViewState]\n\
         Mode=\n\
         Vid=\n\
         FolderType=Music\n\
         [.ShellClassInfo]\n\
         ConfirmFileOp=0\n\
         IconFile=folder.ico\n\
         IconIndex=0\n\
         InfoTip={}\n",
        folder_name
    )
}

/// Writes `desktop.ini` in the folder holding `image_path` unless one exists
/// and `replace` is unset. Returns whether the file was written.
pub fn write_desktop_ini(image_path: &Path, replace: bool) -> Result<bool, AppError> {
    let folder = image_path
        .parent()
        .ok_or_else(|| AppError::NotFound(format!("parent folder of {}", image_path.display())))?;
    let desk_path = folder.join("desktop.ini");

    if desk_path.exists() && !replace {
        return Ok(false);
    }

    let folder_name = folder
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .or_else(|| folder.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default();

    log::info!("Generating {}.", desk_path.display());
    fs::write(&desk_path, desktop_ini_contents(&folder_name))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_desktop_ini_layout() {
        let ini = desktop_ini_contents("Pink Floyd");
        let lines: Vec<&str> = ini.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[ViewState]",
                "Mode=",
                "Vid=",
                "FolderType=Music",
                "[.ShellClassInfo]",
                "ConfirmFileOp=0",
                "IconFile=folder.ico",
                "IconIndex=0",
                "InfoTip=Pink Floyd",
            ]
        );
    }

    #[test]
    fn test_existing_ini_is_kept_unless_replacing() {
        let dir = tempdir().unwrap();
        let album = dir.path().join("Animals");
        fs::create_dir(&album).unwrap();
        let image = album.join("folder.jpg");
        let ini = album.join("desktop.ini");

        assert!(write_desktop_ini(&image, false).unwrap());
        assert!(fs::read_to_string(&ini).unwrap().ends_with("InfoTip=Animals\n"));

        fs::write(&ini, "custom").unwrap();
        assert!(!write_desktop_ini(&image, false).unwrap());
        assert_eq!(fs::read_to_string(&ini).unwrap(), "custom");

        assert!(write_desktop_ini(&image, true).unwrap());
        assert!(fs::read_to_string(&ini).unwrap().starts_with("[ViewState]\n"));
    }

    #[test]
    fn test_large_image_exports_icon() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("folder.png");
        RgbImage::from_pixel(300, 300, Rgb([200, 10, 10])).save(&image).unwrap();

        let ico = export_ico(&image).unwrap();
        assert_eq!(ico, dir.path().join("folder.ico"));
        let decoded = image::open(&ico).unwrap();
        assert_eq!(decoded.dimensions(), (256, 256));
    }
}
