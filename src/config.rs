use crate::error::AppError;
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_ARTIST_PATH: &str = "D:/Music/Artist Pictures/Thumb";
pub const DEFAULT_FOLDER_DIR: &str = "D:/Music/Music";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub artist_path: String,
    pub folder_dir: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, AppError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("log_level", "info")?
            .set_default("artist_path", DEFAULT_ARTIST_PATH)?
            .set_default("folder_dir", DEFAULT_FOLDER_DIR)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("FOLDER_ART"))
            .build()?;

        Ok(s.try_deserialize()?)
    }
}

/// Image type the normalizer scans for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetType {
    #[default]
    Jpg,
    Png,
}

impl TargetType {
    pub fn extension(self) -> &'static str {
        match self {
            TargetType::Jpg => "jpg",
            TargetType::Png => "png",
        }
    }
}

/// Run configuration of the image normalizer. Built once, read-only afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizerConfig {
    pub generate_ico: bool,
    pub replace_ini: bool,
    pub verbose: bool,
    pub include_subdir: bool,
    pub image_type: TargetType,
}
