use std::path::PathBuf;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Path is not valid unicode: {}", .0.display())]
    PathEncoding(PathBuf),

    #[error("Cannot rewrite {} in place; convert it to jpg first", .0.display())]
    UnsupportedTarget(PathBuf),

    #[error("Worker join error: {0}")]
    Join(#[from] JoinError),

    #[error("User interrupt.")]
    Interrupted,

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Failures worth a palette-coercion retry: anything the codec or the
    /// filesystem raised while rewriting the image.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Io(_) | AppError::Image(_))
    }
}
