//! Task-file handling: the row model the dubbing tool consumes, CSV
//! persistence, and the channel sampler that turns a discovery run into a
//! bounded batch.
//!
//! The column set is a contract with the downstream dubbing tool, which
//! rewrites `Dubbing`/`Status` in place. Round-trips must preserve column
//! names and row content exactly.

use anyhow::{Context, Result};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use crate::youtube::VideoRecord;

pub const SOURCE_LANGUAGE: &str = "en";
pub const TARGET_LANGUAGE: &str = "Chinese";

/// At most this many channels contribute to one batch.
pub const MAX_SAMPLED_CHANNELS: usize = 5;
/// Per-channel candidate pool: the top commented videos only.
pub const PER_CHANNEL_POOL: usize = 10;
/// Upper bound of the per-channel draw; the actual size is random in
/// `1..=MAX_PER_CHANNEL_SAMPLE`, clipped to the pool.
pub const MAX_PER_CHANNEL_SAMPLE: usize = 5;

/// One scheduling/translation row, keyed by `Video File`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRow {
    #[serde(rename = "Video File")]
    pub video_file: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "viewCount")]
    pub view_count: u64,
    pub channel_name: String,
    pub duration: u64,
    #[serde(rename = "Source Language")]
    pub source_language: String,
    #[serde(rename = "Target Language")]
    pub target_language: String,
    #[serde(rename = "Dubbing")]
    pub dubbing: u8,
    #[serde(rename = "Status")]
    pub status: String,
}

impl TaskRow {
    pub fn from_record(record: &VideoRecord) -> Self {
        Self {
            video_file: record.watch_url(),
            title: record.title.clone(),
            description: record.description.clone(),
            view_count: record.view_count,
            channel_name: record.channel_name.clone(),
            duration: record.duration_seconds,
            source_language: SOURCE_LANGUAGE.to_string(),
            target_language: TARGET_LANGUAGE.to_string(),
            dubbing: 0,
            status: String::new(),
        }
    }
}

/// A task row with the two machine-translated columns appended. The csv
/// serializer does not flatten nested structs, so the columns are repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedRow {
    #[serde(rename = "Video File")]
    pub video_file: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "viewCount")]
    pub view_count: u64,
    pub channel_name: String,
    pub duration: u64,
    #[serde(rename = "Source Language")]
    pub source_language: String,
    #[serde(rename = "Target Language")]
    pub target_language: String,
    #[serde(rename = "Dubbing")]
    pub dubbing: u8,
    #[serde(rename = "Status")]
    pub status: String,
    pub title_zh: String,
    pub description_zh: String,
}

impl TranslatedRow {
    pub fn from_task(row: TaskRow, title_zh: String, description_zh: String) -> Self {
        Self {
            video_file: row.video_file,
            title: row.title,
            description: row.description,
            view_count: row.view_count,
            channel_name: row.channel_name,
            duration: row.duration,
            source_language: row.source_language,
            target_language: row.target_language,
            dubbing: row.dubbing,
            status: row.status,
            title_zh,
            description_zh,
        }
    }
}

/// Reads a persisted task file. A missing file is not an error: a fresh
/// account simply has no history yet.
pub fn read_task_file(path: impl AsRef<Path>) -> Result<Vec<TaskRow>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening task file {}", path.display()))?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row.with_context(|| format!("reading task row from {}", path.display()))?);
    }
    Ok(rows)
}

pub fn write_task_file(path: impl AsRef<Path>, rows: &[TaskRow]) -> Result<()> {
    write_rows(path.as_ref(), rows)
}

pub fn write_translated_file(path: impl AsRef<Path>, rows: &[TranslatedRow]) -> Result<()> {
    write_rows(path.as_ref(), rows)
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("writing row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// Draws one batch from the filtered record set:
/// up to [`MAX_SAMPLED_CHANNELS`] channels chosen uniformly, then per channel
/// a uniform sample of random size `1..=MAX_PER_CHANNEL_SAMPLE` (clipped to
/// the pool) from that channel's [`PER_CHANNEL_POOL`] most commented videos.
pub fn sample_records<'a, R: Rng + ?Sized>(
    records: &'a [VideoRecord],
    rng: &mut R,
) -> Vec<&'a VideoRecord> {
    let channels: Vec<&str> = records
        .iter()
        .map(|record| record.channel_name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if channels.is_empty() {
        return Vec::new();
    }

    let count = channels.len().min(MAX_SAMPLED_CHANNELS);
    let selected: Vec<&str> = channels.choose_multiple(rng, count).copied().collect();

    let mut batch = Vec::new();
    for channel in selected {
        let mut pool: Vec<&VideoRecord> = records
            .iter()
            .filter(|record| record.channel_name == channel)
            .collect();
        pool.sort_by(|a, b| b.comment_count.cmp(&a.comment_count));
        pool.truncate(PER_CHANNEL_POOL);

        let want = rng.random_range(1..=MAX_PER_CHANNEL_SAMPLE).min(pool.len());
        batch.extend(pool.choose_multiple(rng, want).copied());
    }
    batch
}

/// Concatenates history and the fresh batch, dropping duplicate `Video File`
/// keys. First occurrence wins, so persisted rows keep their (possibly
/// dubbing-tool-mutated) field values over re-sampled duplicates.
pub fn merge_with_history(existing: Vec<TaskRow>, fresh: Vec<TaskRow>) -> Vec<TaskRow> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(existing.len() + fresh.len());
    for row in existing.into_iter().chain(fresh) {
        if seen.insert(row.video_file.clone()) {
            merged.push(row);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::tempdir;

    fn record(channel: &str, index: u64, comments: u64) -> VideoRecord {
        VideoRecord {
            video_id: format!("{channel}-{index:03}"),
            title: format!("{channel} video {index}"),
            description: "A description.".to_string(),
            published_at: "2026-05-01T12:00:00Z".to_string(),
            duration_seconds: 300 + index,
            view_count: 50_000 + index,
            comment_count: comments,
            channel_name: channel.to_string(),
        }
    }

    fn row(key: &str, status: &str) -> TaskRow {
        TaskRow {
            video_file: key.to_string(),
            title: format!("title for {key}"),
            description: "desc".to_string(),
            view_count: 123,
            channel_name: "chan".to_string(),
            duration: 456,
            source_language: SOURCE_LANGUAGE.to_string(),
            target_language: TARGET_LANGUAGE.to_string(),
            dubbing: 0,
            status: status.to_string(),
        }
    }

    #[test]
    fn csv_round_trip_preserves_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch").join("tasks_setting.csv");
        let rows = vec![row("https://youtu.be/a", ""), row("https://youtu.be/b", "Done")];
        write_task_file(&path, &rows).unwrap();
        let read_back = read_task_file(&path).unwrap();
        assert_eq!(read_back, rows);
    }

    #[test]
    fn missing_task_file_reads_empty() {
        let dir = tempdir().unwrap();
        let rows = read_task_file(dir.path().join("absent.csv")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn merge_keeps_first_occurrence_per_key() {
        let existing = vec![row("v1", "Done"), row("v2", "")];
        let fresh = vec![row("v2", "resampled"), row("v3", "")];
        let merged = merge_with_history(existing, fresh);
        assert_eq!(merged.len(), 3);
        let keys: Vec<&str> = merged.iter().map(|r| r.video_file.as_str()).collect();
        assert_eq!(keys, vec!["v1", "v2", "v3"]);
        // The persisted row's values survive the collision.
        assert_eq!(merged[1].status, "");
    }

    #[test]
    fn merge_size_equals_union_by_key() {
        let existing: Vec<TaskRow> = (0..4).map(|i| row(&format!("v{i}"), "old")).collect();
        let fresh: Vec<TaskRow> = (2..8).map(|i| row(&format!("v{i}"), "new")).collect();
        let merged = merge_with_history(existing, fresh);
        assert_eq!(merged.len(), 8);
    }

    #[test]
    fn sample_honors_per_channel_bounds() {
        let mut records = Vec::new();
        for channel in ["alpha", "beta"] {
            for index in 0..12 {
                records.push(record(channel, index, 1000 - index * 10));
            }
        }
        let mut rng = StdRng::seed_from_u64(7);
        let batch = sample_records(&records, &mut rng);

        // Two channels, 1..=5 rows each.
        assert!(batch.len() >= 2 && batch.len() <= 10, "got {}", batch.len());
        for channel in ["alpha", "beta"] {
            let per_channel = batch
                .iter()
                .filter(|r| r.channel_name == channel)
                .count();
            assert!((1..=MAX_PER_CHANNEL_SAMPLE).contains(&per_channel));
        }

        // Every sampled row comes from the channel's top-10 by comments,
        // which for this data means the twelve lowest-indexed videos minus
        // the two least commented.
        for sampled in &batch {
            assert!(sampled.comment_count >= 1000 - 9 * 10);
        }

        // Keys are unique across the batch.
        let keys: HashSet<&str> = batch.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(keys.len(), batch.len());
    }

    #[test]
    fn sample_selects_at_most_five_channels() {
        let mut records = Vec::new();
        for channel in ["a", "b", "c", "d", "e", "f", "g"] {
            for index in 0..3 {
                records.push(record(channel, index, 100 + index));
            }
        }
        let mut rng = StdRng::seed_from_u64(42);
        let batch = sample_records(&records, &mut rng);
        let channels: HashSet<&str> = batch.iter().map(|r| r.channel_name.as_str()).collect();
        assert!(channels.len() <= MAX_SAMPLED_CHANNELS);
        assert!(!batch.is_empty());
    }

    #[test]
    fn sample_never_exceeds_a_small_pool() {
        let records = vec![record("solo", 0, 50), record("solo", 1, 40)];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let batch = sample_records(&records, &mut rng);
            assert!((1..=2).contains(&batch.len()));
        }
    }

    #[test]
    fn sample_of_empty_set_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample_records(&[], &mut rng).is_empty());
    }

    #[test]
    fn discovery_run_with_empty_history_stays_in_bounds() {
        // Two channels with twelve qualifying videos each: the audit set has
        // all 24 rows, the merged batch lands between 2 and 10 unique rows.
        let mut records = Vec::new();
        for channel in ["alpha", "beta"] {
            for index in 0..12 {
                records.push(record(channel, index, 500 + index * 7));
            }
        }
        let all_rows: Vec<TaskRow> = records.iter().map(TaskRow::from_record).collect();
        assert_eq!(all_rows.len(), 24);

        let mut rng = StdRng::seed_from_u64(99);
        let sampled: Vec<TaskRow> = sample_records(&records, &mut rng)
            .into_iter()
            .map(TaskRow::from_record)
            .collect();
        let merged = merge_with_history(Vec::new(), sampled);

        assert!(merged.len() >= 2 && merged.len() <= 10, "got {}", merged.len());
        let keys: HashSet<&str> = merged.iter().map(|r| r.video_file.as_str()).collect();
        assert_eq!(keys.len(), merged.len());
    }

    #[test]
    fn task_row_from_record_fills_constants() {
        let task = TaskRow::from_record(&record("alpha", 1, 10));
        assert_eq!(task.video_file, "https://www.youtube.com/watch?v=alpha-001");
        assert_eq!(task.source_language, "en");
        assert_eq!(task.target_language, "Chinese");
        assert_eq!(task.dubbing, 0);
        assert_eq!(task.status, "");
    }
}
