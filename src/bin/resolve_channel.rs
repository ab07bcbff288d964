#![forbid(unsafe_code)]

//! Lookup utility: resolves channel display names to their stable IDs and
//! prints lines ready to paste into the config's `CHANNELS` map.

use anyhow::Result;
use clap::Parser;
use redub_tools::config::{DEFAULT_CONFIG_PATH, PipelineConfig};
use redub_tools::youtube;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Resolve channel display names to channel IDs.")]
struct Cli {
    /// Account config providing the API key.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Display names to resolve.
    #[arg(required = true, value_name = "NAME")]
    names: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = PipelineConfig::load(&cli.config)?;

    println!("Fetching channel IDs...");
    println!();

    for name in &cli.names {
        match youtube::lookup_channel_id(&config.api_key, name) {
            Ok(id) if !id.is_empty() => println!("'{name}': '{id}',"),
            Ok(_) => println!("# Failed to fetch ID for {name}"),
            Err(err) => {
                eprintln!("  Warning: lookup failed for {name}: {err:#}");
                println!("# Failed to fetch ID for {name}");
            }
        }
    }

    Ok(())
}
