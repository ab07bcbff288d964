#![forbid(unsafe_code)]

//! Translation batch job: appends machine-translated `title_zh` and
//! `description_zh` columns to a persisted task file. Cells are translated
//! one at a time; a failed cell becomes an empty string and the batch keeps
//! going.

use anyhow::{Result, bail};
use clap::Parser;
use redub_tools::tasks::{self, TranslatedRow};
use redub_tools::translate::Translator;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Translate the title and description columns of a task file.")]
struct Cli {
    /// Task file produced by the discovery job.
    #[arg(long, value_name = "PATH", default_value = "output_batch/tasks_setting.csv")]
    input: PathBuf,

    /// Destination for the translated copy.
    #[arg(long, value_name = "PATH", default_value = "output_batch/tasks_translated.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if !cli.input.exists() {
        bail!("input file not found: {}", cli.input.display());
    }

    println!("Reading {}", cli.input.display());
    let rows = tasks::read_task_file(&cli.input)?;
    let total = rows.len();
    println!("Translating {} row(s)...", total);

    let translator = Translator::new();
    let mut translated = Vec::with_capacity(total);
    for (index, row) in rows.into_iter().enumerate() {
        println!("[{}/{}] {}", index + 1, total, row.title);
        let title_zh = translator.translate(&row.title);
        let description_zh = translator.translate(&row.description);
        translated.push(TranslatedRow::from_task(row, title_zh, description_zh));
    }

    tasks::write_translated_file(&cli.output, &translated)?;
    println!();
    println!("Saved {} translated row(s) to {}", translated.len(), cli.output.display());

    Ok(())
}
