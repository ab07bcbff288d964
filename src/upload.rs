//! Uploader-config assembly: scans the dubbing output tree for finished
//! videos and their covers, then serializes the per-video publish metadata
//! the uploader tool consumes.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const VIDEO_SUFFIX: &str = ".webm";
pub const COVER_SUFFIX: &str = ".jpg";
pub const ERROR_SUBDIR: &str = "ERROR";

/// Fixed tag string attached to every upload.
pub const TAG: &str = "时装周,Fashion Week,高级定制,T台秀,设计师品牌,奢侈品,潮流,时尚";

/// Fixed description attached to every upload.
pub const DESCRIPTION: &str = "喜欢的话就狠狠地点个赞吧！也别忘了分享给志同道合的朋友～如果你也喜欢这类风格，记得收藏关注一下！家人们的支持就是我持续更新的“充电宝”，你们每一个点赞留言我都认真看！❤️";

/// One publish entry. Everything except `cover`, `title`, and `dtime` is a
/// static constant the uploader expects verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct UploadEntry {
    pub copyright: u8,
    pub source: Option<String>,
    pub no_reprint: u8,
    pub tid: u32,
    pub cover: String,
    pub title: String,
    pub desc_format_id: u8,
    pub desc: String,
    pub dolby: u8,
    pub lossless_music: u8,
    pub tag: String,
    pub dynamic: String,
    pub dtime: i64,
}

impl UploadEntry {
    pub fn new(cover: impl Into<String>, title: impl Into<String>, dtime: i64) -> Self {
        Self {
            copyright: 2,
            source: None,
            no_reprint: 1,
            tid: 207,
            cover: cover.into(),
            title: title.into(),
            desc_format_id: 0,
            desc: DESCRIPTION.to_string(),
            dolby: 1,
            lossless_music: 1,
            tag: TAG.to_string(),
            dynamic: String::new(),
            dtime,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadConfig {
    pub limit: u32,
    /// Video file path -> publish entry, in sorted path order.
    pub streamers: BTreeMap<String, UploadEntry>,
}

/// A finished video and the cover image sitting next to it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub video: PathBuf,
    pub cover: Option<PathBuf>,
}

impl MediaFile {
    /// The parent directory name, used as the title seed. The dubbing tool
    /// names each output directory after the source video.
    pub fn title_seed(&self) -> String {
        self.video
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.video.to_string_lossy().into_owned())
    }
}

/// Removes the uploader's `ERROR/` quarantine directory if present. Returns
/// whether anything was deleted.
pub fn clear_error_dir(root: &Path) -> Result<bool> {
    let error_dir = root.join(ERROR_SUBDIR);
    if !error_dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(&error_dir)
        .with_context(|| format!("removing {}", error_dir.display()))?;
    Ok(true)
}

/// Walks `root` for videos and pairs each with a cover from the same
/// directory. Videos come back sorted by path so runs are reproducible.
pub fn find_media_files(root: &Path) -> Vec<MediaFile> {
    let mut videos = Vec::new();
    let mut covers: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
    {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();
        if name.ends_with(VIDEO_SUFFIX) {
            videos.push(path.to_path_buf());
        } else if name.ends_with(COVER_SUFFIX)
            && let Some(parent) = path.parent()
        {
            covers.entry(parent.to_path_buf()).or_default().push(path.to_path_buf());
        }
    }

    videos.sort();
    for paths in covers.values_mut() {
        paths.sort();
    }

    videos
        .into_iter()
        .map(|video| {
            let cover = video
                .parent()
                .and_then(|parent| covers.get(parent))
                .and_then(|paths| paths.first())
                .cloned();
            MediaFile { video, cover }
        })
        .collect()
}

pub fn write_upload_config(path: &Path, config: &UploadConfig) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let file =
        fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_yaml::to_writer(file, config)
        .with_context(|| format!("writing upload config to {}", path.display()))?;
    Ok(())
}
