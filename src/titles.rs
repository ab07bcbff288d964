//! LLM-backed title generation: one single-turn chat completion per video,
//! seeded with the video's folder name and a fixed style guideline.
//!
//! The generator is total: every failure path falls back to the seed string
//! unchanged, so a batch never stalls on a dead endpoint or a bad key.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.302.ai";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const API_KEY_ENV: &str = "REDUB_API_KEY";

const MAX_TOKENS: u32 = 100;
const TEMPERATURE: f32 = 0.7;
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Style guideline sent as the system message of every request.
pub const STYLE_PROMPT: &str = r##"
---

你是一位专业的时尚内容创作专家，擅长为Z世代用户打造具有**视觉冲击力与话题引导力**的**时尚视频标题**，发布平台为**B站**，适用于Vlog/秀场/测评/解析类内容。

---

## 核心任务

将英文品牌名和基础标题内容，优化为**B站爆款时尚标题**，具备**传播力、高级感和年轻人共鸣点**。

---

## 标题要求（更新版）

### 必须包含元素

* **品牌英文名** + 关键词（视觉风格/设计亮点/系列名等）
* **热门话题标签**：#时装周 #高定现场 #爆款预定 等，仅限1-2个
* **情绪共鸣词**：绝美、封神、太会了、神级细节、高阶感爆棚、氛围感拉满
* **趋势/风格标签**：如 老钱风、冷感穿搭、哥特甜妹、美拉德风 等

---

## 推荐结构模版（优化后）

1. **沉浸式直击型**
`[秀场直击] 品牌名 + 系列亮点 + 情感词 + 热门话题`

2. **视觉种草型**
`[高能种草] 品牌名 + 设计风格/关键词 + 共鸣感词 + 话题标签`

3. **解析引导型**
`[时尚解析] 品牌名 + 风格演化/趋势趋势 + 高级形容词 + 互动引导词`

> 示例：Miu Miu 的“甜酷学院风”为啥成顶流？| 时尚解析

---
## 语言风格
* 富有**画面感与情绪感**，具备B站年轻人熟悉的“高感知语言”
* 保持**专业审美**同时注重传播效率
* **控制在18-26字内**，不出现生硬直译
---

## 输出格式

**只返回最终优化标题**，不提供解释、不生成备选项。如标题含数据或品牌专属词汇，务必保持准确。
---
"##;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

pub struct TitleGenerator {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    model: String,
}

impl TitleGenerator {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Generates a styled title for `seed` (typically a folder name). Any
    /// transport, HTTP, or payload failure falls back to the seed itself.
    pub fn generate(&self, seed: &str) -> String {
        match self.request(seed) {
            Ok(title) if !title.is_empty() => title,
            Ok(_) => {
                eprintln!("  Warning: empty title for \"{seed}\", keeping folder name");
                seed.to_string()
            }
            Err(err) => {
                eprintln!("  Warning: title generation failed for \"{seed}\": {err:#}");
                seed.to_string()
            }
        }
    }

    fn request(&self, seed: &str) -> Result<String> {
        let payload = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: STYLE_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: seed,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .agent
            .post(&format!("{}/v1/chat/completions", self.base_url))
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(payload)
            .context("requesting chat completion")?;

        let parsed: ChatResponse = response
            .into_json()
            .context("decoding chat completion response")?;
        Ok(first_choice(parsed))
    }
}

fn first_choice(response: ChatResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .unwrap_or_default()
}
