use crate::config::{NormalizerConfig, TargetType};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "folder-art", version, about = "Square folder art and link artist thumbnails")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resize images to a square format.
    #[command(alias = "ResizeImage")]
    Resize(ResizeArgs),
    /// Link artist images to the respective artist folders.
    #[command(alias = "LinkArtistsToImage")]
    LinkArtists(LinkArgs),
}

#[derive(Args, Debug)]
pub struct ResizeArgs {
    /// Path to a single image; the current directory is scanned when omitted.
    pub image_path: Option<PathBuf>,

    /// Parse the directories recursively.
    #[arg(short = 'd', long = "dir")]
    pub include_subdir: bool,

    /// Generate icons from the folder image.
    #[arg(short = 'i', long = "ico")]
    pub generate_ico: bool,

    /// Replace the desktop.ini file of the folder (folder cannot be read-only).
    #[arg(long = "replace")]
    pub replace_ini: bool,

    /// Print additional information to the terminal.
    #[arg(short, long)]
    pub verbose: bool,

    /// Look for png images instead of jpg.
    #[arg(long)]
    pub png: bool,
}

impl ResizeArgs {
    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig {
            generate_ico: self.generate_ico,
            replace_ini: self.replace_ini,
            verbose: self.verbose,
            include_subdir: self.include_subdir,
            image_type: if self.png { TargetType::Png } else { TargetType::Jpg },
        }
    }
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Path to the image folder.
    pub artist_path: Option<PathBuf>,

    /// Path to the track folder.
    pub folder_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_flags() {
        let cli = Cli::try_parse_from(["folder-art", "resize", "-d", "-i", "--replace", "-v", "--png"]).unwrap();
        let Command::Resize(args) = cli.command else { panic!("expected resize") };
        let config = args.normalizer_config();
        assert!(args.image_path.is_none());
        assert!(config.include_subdir && config.generate_ico && config.replace_ini && config.verbose);
        assert_eq!(config.image_type, TargetType::Png);
    }

    #[test]
    fn test_aliases_and_positionals() {
        let cli = Cli::try_parse_from(["folder-art", "ResizeImage", "cover.jpg"]).unwrap();
        let Command::Resize(args) = cli.command else { panic!("expected resize") };
        assert_eq!(args.image_path, Some(PathBuf::from("cover.jpg")));
        assert_eq!(args.normalizer_config().image_type, TargetType::Jpg);

        let cli = Cli::try_parse_from(["folder-art", "LinkArtistsToImage", "thumbs"]).unwrap();
        let Command::LinkArtists(args) = cli.command else { panic!("expected link") };
        assert_eq!(args.artist_path, Some(PathBuf::from("thumbs")));
        assert!(args.folder_dir.is_none());
    }
}
