mod cli;
mod config;
mod error;
mod folder_meta;
mod linker;
mod metadata;
mod processor;
mod resample;
mod walker;
mod workdir;

use crate::cli::{Cli, Command, LinkArgs, ResizeArgs};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::linker::LinkArtists;
use crate::processor::ImageResize;
use anyhow::Result;
use clap::Parser;
use log::warn;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn resize(args: ResizeArgs, interrupted: Arc<AtomicBool>) -> Result<(), AppError> {
    let resizer = ImageResize::new(args.normalizer_config(), interrupted);
    match args.image_path {
        Some(path) => resizer.run_single(&path).map(|_| ()),
        None => resizer.run_batch(&std::env::current_dir()?),
    }
}

fn link(args: LinkArgs, config: &AppConfig, interrupted: Arc<AtomicBool>) -> Result<(), AppError> {
    let artist_path = args.artist_path.unwrap_or_else(|| PathBuf::from(&config.artist_path));
    let folder_dir = args.folder_dir.unwrap_or_else(|| PathBuf::from(&config.folder_dir));
    LinkArtists::new(artist_path, folder_dir)
        .with_interrupt(interrupted)
        .run()
        .map(|_| ())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::new()?;

    // Initialize env_logger based on config.log_level
    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    let mut job = tokio::task::spawn_blocking(move || match cli.command {
        Command::Resize(args) => resize(args, flag),
        Command::LinkArtists(args) => link(args, &config, flag),
    });

    let result = tokio::select! {
        res = &mut job => res,
        _ = tokio::signal::ctrl_c() => {
            interrupted.store(true, Ordering::SeqCst);
            job.await
        }
    };

    finish(result.map_err(AppError::from).and_then(|r| r))
}

/// An interrupt is a clean exit; every other error reaches the process boundary.
fn finish(result: Result<(), AppError>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(AppError::Interrupted) => {
            warn!("User interrupt.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
