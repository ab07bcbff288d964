//! Cell-by-cell machine translation through the unauthenticated Google
//! translate text endpoint (the same one the desktop widgets use). Fixed
//! target language, auto-detected source.

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::time::Duration;

pub const TARGET_LANGUAGE_CODE: &str = "zh-CN";

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

pub struct Translator {
    agent: ureq::Agent,
    endpoint: String,
    target: String,
}

impl Translator {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build(),
            endpoint: ENDPOINT.to_string(),
            target: TARGET_LANGUAGE_CODE.to_string(),
        }
    }

    /// Translates one cell. Blank input skips the network round-trip; any
    /// failure is reported and yields an empty string so the batch as a
    /// whole keeps going.
    pub fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        match self.request(text) {
            Ok(translated) => translated,
            Err(err) => {
                let preview: String = text.chars().take(30).collect();
                eprintln!("  Warning: translation failed for \"{preview}\": {err:#}");
                String::new()
            }
        }
    }

    fn request(&self, text: &str) -> Result<String> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("client", "gtx")
            .query("sl", "auto")
            .query("tl", &self.target)
            .query("dt", "t")
            .query("q", text)
            .call()
            .context("requesting translation")?;
        let body: Value = response.into_json().context("decoding translation response")?;
        extract_translation(&body)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

/// The endpoint answers with nested arrays; the first element lists
/// `[translated, original, ...]` segments which concatenate to the full text.
fn extract_translation(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("unexpected translation response shape"))?;
    let mut out = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(Value::as_str) {
            out.push_str(part);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_concatenates_segments() {
        let body = json!([
            [
                ["你好。", "Hello.", null, null, 10],
                ["世界。", "World.", null, null, 10]
            ],
            null,
            "en"
        ]);
        assert_eq!(extract_translation(&body).unwrap(), "你好。世界。");
    }

    #[test]
    fn extract_rejects_unexpected_shape() {
        assert!(extract_translation(&json!({"error": "nope"})).is_err());
        assert!(extract_translation(&json!(null)).is_err());
    }

    #[test]
    fn blank_input_translates_to_empty_without_network() {
        let translator = Translator::new();
        assert_eq!(translator.translate(""), "");
        assert_eq!(translator.translate("   \t"), "");
    }
}
