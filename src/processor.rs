use crate::config::NormalizerConfig;
use crate::error::AppError;
use crate::folder_meta;
use crate::metadata::{ImageJob, ImageKind};
use crate::resample;
use crate::walker;
use crate::workdir;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{ColorType, DynamicImage, GenericImageView, ImageEncoder};
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const JPEG_QUALITY: u8 = 100;

/// What happened to a single image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Resized(u32),
    AlreadySquare,
    NotAnImage,
}

pub struct ImageResize {
    config: NormalizerConfig,
    interrupted: Arc<AtomicBool>,
}

impl ImageResize {
    pub fn new(config: NormalizerConfig, interrupted: Arc<AtomicBool>) -> Self {
        Self { config, interrupted }
    }

    /// Processes one explicit file. Errors are returned as-is.
    pub fn run_single(&self, path: &Path) -> Result<Outcome, AppError> {
        self.resize_image(path)
    }

    /// Converts webp files and squares every target image under `root`.
    pub fn run_batch(&self, root: &Path) -> Result<(), AppError> {
        let ext = self.config.image_type.extension();
        let recursive = self.config.include_subdir;
        let images = walker::find_images(root, ext, recursive);
        let webps = walker::find_images(root, "webp", recursive);
        log::debug!("Found {} images and {} webp files in {:?}", images.len(), webps.len(), root);

        if images.is_empty() && webps.is_empty() {
            log::warn!("I didn't find any images in this directory.");
            return Ok(());
        }

        for webp in &webps {
            self.check_interrupt()?;
            convert_webp(webp)?;
        }

        for path in &images {
            self.check_interrupt()?;
            let original = fs::read(path)?;
            match self.resize_image(path) {
                Ok(outcome) => log::trace!("{:?}: {:?}", path, outcome),
                Err(AppError::PathEncoding(p)) => {
                    log::warn!("There was a unicode error for {}.", p.display());
                }
                Err(e) if e.is_recoverable() => {
                    log::warn!("Failed to resize {}: {}. Retrying as 24-bit RGB.", path.display(), e);
                    self.recover_and_retry(path, &original)?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn check_interrupt(&self) -> Result<(), AppError> {
        if self.interrupted.load(Ordering::SeqCst) {
            return Err(AppError::Interrupted);
        }
        Ok(())
    }

    /// Rewrites `path` as plain RGB and runs the resize step again.
    /// `original` holds the file as it was before the first attempt and is
    /// put back if the recovery fails.
    fn recover_and_retry(&self, path: &Path, original: &[u8]) -> Result<Outcome, AppError> {
        let retried = image::load_from_memory(original)
            .map_err(AppError::from)
            .and_then(|img| {
                img.to_rgb8().save(path)?;
                self.resize_image(path)
            });

        match retried {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                log::error!("Retry failed for {}; restoring the original file.", path.display());
                fs::write(path, original)?;
                Err(e)
            }
        }
    }

    /// Squares one image in place, then handles the icon and `desktop.ini`.
    pub fn resize_image(&self, path: &Path) -> Result<Outcome, AppError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::PathEncoding(path.to_path_buf()))?;
        let job = ImageJob::new(path.to_path_buf())
            .ok_or_else(|| AppError::NotFound(format!("image type of {}", path.display())))?;
        if job.kind == ImageKind::Webp {
            return Err(AppError::UnsupportedTarget(job.path));
        }

        let bytes = fs::read(&job.path)?;
        let img = match image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                log::trace!("Not an image {:?}: {}", job.path, e);
                return Ok(Outcome::NotAnImage);
            }
        };

        let (width, height) = img.dimensions();
        let outcome = if width != height {
            let side = width.min(height);
            let squared = resample::resize_square(&img, side);
            let folder = folder_of(&job.path);
            let encoded = encode(&job, &squared)?;
            workdir::in_directory(&folder, || fs::write(file_name, &encoded))?;
            log::info!("Scaling {} to {}, {}.", job.path.display(), side, side);
            Outcome::Resized(side)
        } else {
            if self.config.verbose {
                log::warn!("{} is already in a square format.", job.path.display());
            }
            Outcome::AlreadySquare
        };

        if self.config.generate_ico {
            self.write_folder_meta(&job.path)?;
        }
        Ok(outcome)
    }

    fn write_folder_meta(&self, path: &Path) -> Result<(), AppError> {
        if path.file_stem().and_then(|s| s.to_str()) == Some("folder") {
            folder_meta::export_ico(path)?;
        } else if self.config.verbose {
            log::warn!("{} not the main folder image. Skipping...", path.display());
        }
        let written = folder_meta::write_desktop_ini(path, self.config.replace_ini)?;
        if !written && self.config.verbose {
            log::warn!("desktop.ini already exists beside {}. Skipping...", path.display());
        }
        Ok(())
    }
}

fn folder_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Saves `<stem>.jpg` beside a webp file as 3-channel RGB.
pub fn convert_webp(webp: &Path) -> Result<PathBuf, AppError> {
    let jpg = webp.with_extension("jpg");
    log::info!("Converting {} to {}.", webp.display(), jpg.display());
    let rgb = image::open(webp)?.to_rgb8();
    let mut writer = BufWriter::new(File::create(&jpg)?);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ColorType::Rgb8,
    )?;
    writer.flush()?;
    Ok(jpg)
}

/// Encodes `img` for `job`'s format at maximum quality. PNG keeps 16-bit
/// samples; JPEG is 8-bit only, so deeper or alpha images are flattened.
fn encode(job: &ImageJob, img: &DynamicImage) -> Result<Vec<u8>, AppError> {
    let mut writer = Cursor::new(Vec::new());
    let (width, height) = img.dimensions();
    match job.kind {
        ImageKind::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut writer, CompressionType::Best, PngFilter::Adaptive);
            encoder.write_image(img.as_bytes(), width, height, img.color())?;
        }
        ImageKind::Webp => return Err(AppError::UnsupportedTarget(job.path.clone())),
        ImageKind::Jpg => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
            match img.color() {
                ColorType::L8 | ColorType::Rgb8 => {
                    encoder.write_image(img.as_bytes(), width, height, img.color())?
                }
                ColorType::L16 | ColorType::La8 | ColorType::La16 => {
                    let luma = img.to_luma8();
                    encoder.write_image(luma.as_raw(), width, height, ColorType::L8)?
                }
                _ => {
                    let rgb = img.to_rgb8();
                    encoder.write_image(rgb.as_raw(), width, height, ColorType::Rgb8)?
                }
            }
        }
    }
    Ok(writer.into_inner())
}
