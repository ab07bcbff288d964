//! Thin YouTube Data API v3 client for the discovery pipeline.
//!
//! Two endpoints are used: `search` (most recent uploads of a channel,
//! IDs only) and `videos` (one batched details call for the whole ID set).
//! API-reported errors arrive as a `200` with an `error` payload; those are
//! printed and degrade to an empty result so the other channels keep going.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

pub const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// One fully parsed video. Items missing any required field are dropped
/// whole rather than partially filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    /// First line of the upload description only.
    pub description: String,
    pub published_at: String,
    pub duration_seconds: u64,
    pub view_count: u64,
    pub comment_count: u64,
    pub channel_name: String,
}

impl VideoRecord {
    pub fn watch_url(&self) -> String {
        format!("{WATCH_URL_PREFIX}{}", self.video_id)
    }
}

pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
    max_results: u32,
    base_url: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Deserialize)]
struct SearchItemId {
    #[serde(default)]
    kind: String,
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
    error: Option<ApiErrorBody>,
}

/// Mirror of the `videos` payload, limited to the fields we consume. Every
/// field is optional; `parse_video` decides what is required.
#[derive(Deserialize)]
struct VideoItem {
    id: String,
    snippet: Option<Snippet>,
    #[serde(rename = "contentDetails")]
    content_details: Option<ContentDetails>,
    statistics: Option<Statistics>,
}

#[derive(Deserialize)]
struct Snippet {
    title: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(rename = "channelTitle")]
    channel_title: Option<String>,
}

#[derive(Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "commentCount")]
    comment_count: Option<String>,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>, max_results: u32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            max_results,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Fetches the most recent uploads of `channel_id` and resolves them to
    /// full records via one batched details call. An API-reported error is
    /// printed and yields an empty vec; transport and decode failures are
    /// returned to the caller.
    pub async fn latest_videos(&self, channel_id: &str) -> Result<Vec<VideoRecord>> {
        let max_results = self.max_results.to_string();
        let params = [
            ("part", "snippet"),
            ("channelId", channel_id),
            ("order", "date"),
            ("maxResults", max_results.as_str()),
            ("key", self.api_key.as_str()),
        ];

        let response: SearchResponse = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&params)
            .send()
            .await
            .with_context(|| format!("requesting latest videos for {channel_id}"))?
            .json()
            .await
            .with_context(|| format!("decoding search response for {channel_id}"))?;

        if let Some(error) = response.error {
            eprintln!("[Error] {channel_id}: {}", error.message);
            return Ok(Vec::new());
        }

        let video_ids: Vec<String> = response
            .items
            .into_iter()
            .filter(|item| item.id.kind == "youtube#video")
            .filter_map(|item| item.id.video_id)
            .collect();

        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.video_details(&video_ids).await
    }

    /// One `videos` call for the whole ID set. Items that fail to parse are
    /// dropped with a console note.
    pub async fn video_details(&self, video_ids: &[String]) -> Result<Vec<VideoRecord>> {
        let ids = video_ids.join(",");
        let params = [
            ("part", "snippet,contentDetails,statistics"),
            ("id", ids.as_str()),
            ("key", self.api_key.as_str()),
        ];

        let response: VideosResponse = self
            .http
            .get(format!("{}/videos", self.base_url))
            .query(&params)
            .send()
            .await
            .context("requesting video details")?
            .json()
            .await
            .context("decoding video details response")?;

        if let Some(error) = response.error {
            eprintln!("[Error] fetching details: {}", error.message);
            return Ok(Vec::new());
        }

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.clone();
                let record = parse_video(item);
                if record.is_none() {
                    eprintln!("[Parse error] dropping video {id}");
                }
                record
            })
            .collect())
    }
}

/// Builds a `VideoRecord` from one `videos` item, or `None` when a required
/// field is absent or malformed. The duration is the one lenient field: an
/// unparseable value resolves to 0 seconds, which a positive minimum-duration
/// filter then rejects.
fn parse_video(item: VideoItem) -> Option<VideoRecord> {
    let snippet = item.snippet?;
    let title = snippet.title?;
    let published_at = snippet.published_at?;
    let channel_name = snippet.channel_title?;
    let statistics = item.statistics?;
    let view_count = statistics.view_count?.parse().ok()?;
    let comment_count = statistics.comment_count?.parse().ok()?;
    let duration_seconds = item
        .content_details
        .and_then(|details| details.duration)
        .map(|iso| duration_seconds(&iso))
        .unwrap_or(0);
    let description = snippet.description.lines().next().unwrap_or("").to_string();

    Some(VideoRecord {
        video_id: item.id,
        title,
        description,
        published_at,
        duration_seconds,
        view_count,
        comment_count,
        channel_name,
    })
}

/// ISO-8601 duration (`PT1H2M3S`) to whole seconds; 0 when unparseable.
pub fn duration_seconds(iso: &str) -> u64 {
    parse_iso8601_duration(iso).unwrap_or(0)
}

fn parse_iso8601_duration(iso: &str) -> Option<u64> {
    let rest = iso.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, time),
        None => (rest, ""),
    };

    let mut total = 0u64;
    total += parse_duration_part(date_part, &[('W', 604_800), ('D', 86_400)])?;
    total += parse_duration_part(time_part, &[('H', 3_600), ('M', 60), ('S', 1)])?;
    Some(total)
}

fn parse_duration_part(part: &str, units: &[(char, u64)]) -> Option<u64> {
    let mut total = 0u64;
    let mut digits = String::new();
    for ch in part.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let factor = units.iter().find(|(unit, _)| *unit == ch).map(|(_, f)| *f)?;
        let value: u64 = digits.parse().ok()?;
        digits.clear();
        total += value * factor;
    }
    // Trailing digits without a designator make the whole value invalid.
    if digits.is_empty() { Some(total) } else { None }
}

/// Blocking display-name -> channel-ID lookup against the `search` endpoint.
/// Returns an empty string when the search has no hits.
pub fn lookup_channel_id(api_key: &str, name: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct ChannelSearchResponse {
        #[serde(default)]
        items: Vec<ChannelSearchItem>,
    }

    #[derive(Deserialize)]
    struct ChannelSearchItem {
        id: ChannelSearchId,
    }

    #[derive(Deserialize)]
    struct ChannelSearchId {
        #[serde(rename = "channelId")]
        channel_id: Option<String>,
    }

    let response = ureq::get(&format!("{BASE_URL}/search"))
        .query("part", "id")
        .query("q", name)
        .query("type", "channel")
        .query("key", api_key)
        .call()
        .with_context(|| format!("searching for channel {name}"))?;

    let body: ChannelSearchResponse = response
        .into_json()
        .context("decoding channel search response")?;

    Ok(body
        .items
        .into_iter()
        .filter_map(|item| item.id.channel_id)
        .next()
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> serde_json::Value {
        json!({
            "id": "abc123def45",
            "snippet": {
                "title": "Runway highlights",
                "description": "First line.\nSecond line that must not survive.",
                "publishedAt": "2026-05-01T12:00:00Z",
                "channelTitle": "dwnews"
            },
            "contentDetails": { "duration": "PT4M13S" },
            "statistics": { "viewCount": "120543", "commentCount": "321" }
        })
    }

    #[test]
    fn duration_parsing_handles_common_shapes() {
        assert_eq!(duration_seconds("PT1H2M3S"), 3723);
        assert_eq!(duration_seconds("PT45S"), 45);
        assert_eq!(duration_seconds("PT10M"), 600);
        assert_eq!(duration_seconds("P1DT2H"), 93_600);
        assert_eq!(duration_seconds("PT0S"), 0);
    }

    #[test]
    fn duration_parsing_resolves_garbage_to_zero() {
        assert_eq!(duration_seconds(""), 0);
        assert_eq!(duration_seconds("4m13s"), 0);
        assert_eq!(duration_seconds("PT4X"), 0);
        assert_eq!(duration_seconds("PT12"), 0);
    }

    #[test]
    fn parse_video_extracts_all_fields() {
        let item: VideoItem = serde_json::from_value(sample_item()).unwrap();
        let record = parse_video(item).unwrap();
        assert_eq!(record.video_id, "abc123def45");
        assert_eq!(record.title, "Runway highlights");
        assert_eq!(record.description, "First line.");
        assert_eq!(record.duration_seconds, 253);
        assert_eq!(record.view_count, 120_543);
        assert_eq!(record.comment_count, 321);
        assert_eq!(record.channel_name, "dwnews");
        assert_eq!(
            record.watch_url(),
            "https://www.youtube.com/watch?v=abc123def45"
        );
    }

    #[test]
    fn parse_video_drops_item_with_malformed_statistics() {
        let mut raw = sample_item();
        raw["statistics"]["viewCount"] = json!("not-a-number");
        let item: VideoItem = serde_json::from_value(raw).unwrap();
        assert!(parse_video(item).is_none());
    }

    #[test]
    fn parse_video_drops_item_missing_snippet_fields() {
        let mut raw = sample_item();
        raw["snippet"].as_object_mut().unwrap().remove("channelTitle");
        let item: VideoItem = serde_json::from_value(raw).unwrap();
        assert!(parse_video(item).is_none());
    }

    #[test]
    fn parse_video_defaults_missing_duration_to_zero() {
        let mut raw = sample_item();
        raw.as_object_mut().unwrap().remove("contentDetails");
        let item: VideoItem = serde_json::from_value(raw).unwrap();
        assert_eq!(parse_video(item).unwrap().duration_seconds, 0);
    }

    #[test]
    fn search_response_surfaces_error_payload() {
        let response: SearchResponse = serde_json::from_value(json!({
            "error": { "code": 403, "message": "quotaExceeded" }
        }))
        .unwrap();
        assert_eq!(response.error.unwrap().message, "quotaExceeded");
        assert!(response.items.is_empty());
    }
}
