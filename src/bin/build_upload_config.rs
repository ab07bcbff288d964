#![forbid(unsafe_code)]

//! Uploader-config batch job: scans the dubbing output tree, generates a
//! styled title per finished video, assigns evening publish slots, and
//! writes the uploader's YAML config.

use anyhow::{Context, Result};
use clap::Parser;
use redub_tools::schedule;
use redub_tools::titles::{API_KEY_ENV, DEFAULT_API_BASE, DEFAULT_MODEL, TitleGenerator};
use redub_tools::upload::{self, UploadConfig, UploadEntry};
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Assemble the uploader config from finished dubbing output.")]
struct Cli {
    /// Root of the dubbing tool's output tree.
    #[arg(long, value_name = "DIR", default_value = "batch/output")]
    media_dir: PathBuf,

    /// Destination for the uploader config.
    #[arg(long, value_name = "PATH", default_value = "style/config_bili.yaml")]
    output: PathBuf,

    /// Chat-completion API key; falls back to the environment.
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE)]
    api_base: String,

    #[arg(long, value_name = "NAME", default_value = DEFAULT_MODEL)]
    model: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let api_key = cli
        .api_key
        .or_else(|| env::var(API_KEY_ENV).ok())
        .unwrap_or_default();
    if api_key.is_empty() {
        eprintln!("Warning: no API key ({API_KEY_ENV} unset); titles will keep folder names.");
    }

    let removed = upload::clear_error_dir(&cli.media_dir)
        .with_context(|| format!("clearing error directory under {}", cli.media_dir.display()))?;
    if removed {
        println!("Removed {}", cli.media_dir.join(upload::ERROR_SUBDIR).display());
    } else {
        println!("No {} directory to remove.", upload::ERROR_SUBDIR);
    }

    let media = upload::find_media_files(&cli.media_dir);
    if media.is_empty() {
        println!("No video files found under {}", cli.media_dir.display());
        return Ok(());
    }

    let mut paired = Vec::new();
    for file in media {
        match &file.cover {
            Some(_) => paired.push(file),
            None => eprintln!(
                "  Warning: no cover next to {}, skipping",
                file.video.display()
            ),
        }
    }
    if paired.is_empty() {
        println!("No video/cover pairs found under {}", cli.media_dir.display());
        return Ok(());
    }

    println!("Found {} video/cover pair(s).", paired.len());

    let generator = TitleGenerator::new(&cli.api_base, &api_key, &cli.model);
    let slots = schedule::publish_timestamps(paired.len());

    let mut streamers = BTreeMap::new();
    let total = paired.len();
    for (index, (file, dtime)) in paired.iter().zip(&slots).enumerate() {
        let seed = file.title_seed();
        println!("[{}/{}] Generating title for {seed}", index + 1, total);
        let title = generator.generate(&seed);
        let cover = file
            .cover
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default();
        streamers.insert(
            file.video.to_string_lossy().into_owned(),
            UploadEntry::new(cover, title, *dtime),
        );
    }

    let config = UploadConfig {
        limit: 1,
        streamers,
    };
    upload::write_upload_config(&cli.output, &config)?;
    println!();
    println!(
        "Saved upload config with {} entry(ies) to {}",
        config.streamers.len(),
        cli.output.display()
    );

    Ok(())
}
