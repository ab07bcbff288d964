#![forbid(unsafe_code)]

//! Discovery batch job: fetches the latest uploads of every configured
//! channel, filters them against the account thresholds, samples a bounded
//! batch, and merges it into the persisted task file.
//!
//! Three files come out of a run: the full filtered set and the fresh sample
//! (both for manual auditing) plus the merged task file the dubbing tool
//! picks up.

use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use redub_tools::config::{DEFAULT_CONFIG_PATH, PipelineConfig};
use redub_tools::tasks::{self, TaskRow};
use redub_tools::youtube::{VideoRecord, YouTubeClient};
use std::path::PathBuf;

/// Bound on concurrent channel fetches so a long channel list does not open
/// an unbounded number of connections.
const FETCH_CONCURRENCY: usize = 8;

const ALL_VIDEOS_FILE: &str = "all_videos.csv";
const NEW_VIDEOS_FILE: &str = "new_videos.csv";

#[derive(Parser, Debug)]
#[command(about = "Discover channel videos and assemble the dubbing task batch.")]
struct Cli {
    /// Path to the account config file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Merged task file; also read as the history of previous runs.
    #[arg(long, value_name = "PATH", default_value = "output_batch/tasks_setting.csv")]
    output: PathBuf,

    /// Directory for the per-run audit files.
    #[arg(long, value_name = "DIR", default_value = "batch")]
    batch_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = PipelineConfig::load(&cli.config)?;

    println!("===================================");
    println!("YouTube Video Discovery");
    println!("===================================");
    println!("Config: {}", cli.config.display());
    println!("Output: {}", cli.output.display());
    println!();
    println!("Fetching data from {} channel(s)...", config.channels.len());

    let client =
        YouTubeClient::new(&config.api_key, config.max_results).context("initializing client")?;
    let client = &client;
    let filters = &config.filters;

    let per_channel: Vec<Vec<VideoRecord>> = stream::iter(config.channels.iter())
        .map(|(name, channel_id)| async move {
            match client.latest_videos(channel_id).await {
                Ok(videos) => {
                    let kept: Vec<VideoRecord> = videos
                        .into_iter()
                        .filter(|video| {
                            filters.accepts(
                                video.duration_seconds,
                                video.view_count,
                                video.comment_count,
                            )
                        })
                        .collect();
                    println!("  {name}: {} qualifying video(s)", kept.len());
                    kept
                }
                Err(err) => {
                    eprintln!("  Warning: fetch failed for {name}: {err:#}");
                    Vec::new()
                }
            }
        })
        .buffer_unordered(FETCH_CONCURRENCY)
        .collect()
        .await;

    let all_records: Vec<VideoRecord> = per_channel.into_iter().flatten().collect();
    println!();
    println!("Discovered {} qualifying video(s).", all_records.len());

    let all_rows: Vec<TaskRow> = all_records.iter().map(TaskRow::from_record).collect();
    let all_videos_path = cli.batch_dir.join(ALL_VIDEOS_FILE);
    tasks::write_task_file(&all_videos_path, &all_rows)?;
    println!("Wrote {}", all_videos_path.display());

    let existing = tasks::read_task_file(&cli.output)?;
    if existing.is_empty() {
        println!("No existing task file found; starting fresh.");
    } else {
        println!("Found {} existing task row(s).", existing.len());
    }

    let mut rng = rand::rng();
    let sampled: Vec<TaskRow> = tasks::sample_records(&all_records, &mut rng)
        .into_iter()
        .map(TaskRow::from_record)
        .collect();
    let new_videos_path = cli.batch_dir.join(NEW_VIDEOS_FILE);
    tasks::write_task_file(&new_videos_path, &sampled)?;
    println!("Sampled {} new video(s); wrote {}", sampled.len(), new_videos_path.display());

    let merged = tasks::merge_with_history(existing, sampled);
    tasks::write_task_file(&cli.output, &merged)?;
    println!();
    println!("Saved {} task row(s) to {}", merged.len(), cli.output.display());

    Ok(())
}
