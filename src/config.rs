use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};

pub const DEFAULT_CONFIG_PATH: &str = "acc_config/channels.yaml";

/// Per-account pipeline configuration, loaded from a YAML document.
///
/// The recognized keys mirror the account config files checked in next to the
/// pipeline (`API_KEY`, `CHANNELS`, `MAX_RESULTS_PER_CHANNEL`,
/// `VIDEO_FILTERS`). Unknown keys are ignored so account files can carry
/// notes for other tooling.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(rename = "API_KEY")]
    pub api_key: String,
    /// Display name -> stable channel ID. Immutable once loaded.
    #[serde(rename = "CHANNELS")]
    pub channels: BTreeMap<String, String>,
    #[serde(rename = "MAX_RESULTS_PER_CHANNEL", alias = "MAX_RESULTS")]
    pub max_results: u32,
    #[serde(rename = "VIDEO_FILTERS")]
    pub filters: VideoFilters,
}

/// Numeric thresholds a video must satisfy to enter the task pool.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoFilters {
    #[serde(rename = "MIN_DURATION")]
    pub min_duration: u64,
    #[serde(rename = "MAX_DURATION")]
    pub max_duration: u64,
    #[serde(rename = "MIN_VIEWS")]
    pub min_views: u64,
    #[serde(rename = "MIN_COMMENTS")]
    pub min_comments: u64,
}

impl VideoFilters {
    /// All four bounds must hold at once; equality at a bound passes.
    pub fn accepts(&self, duration_seconds: u64, views: u64, comments: u64) -> bool {
        self.min_duration <= duration_seconds
            && duration_seconds <= self.max_duration
            && views >= self.min_views
            && comments >= self.min_comments
    }
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}
