//! Where the briefing markdown comes from.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::BriefingConfig;
use crate::error::Error;

const API_VERSION: &str = "2023-06-01";
const WEB_SEARCH_BETA: &str = "web-search-2025-03-05";

/// Supplies the complete markdown document, or fails
pub trait Source {
    fn fetch(&self) -> Result<String, Error>;
}

/// Reads markdown from a file, or from stdin for `-`
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Source for FileSource {
    fn fetch(&self) -> Result<String, Error> {
        if self.path.as_os_str() == "-" {
            let mut input = String::new();
            io::stdin().lock().read_to_string(&mut input)?;
            return Ok(input);
        }
        Ok(fs::read_to_string(&self.path)?)
    }
}

/// Asks the Messages API to write the briefing, with web search enabled
pub struct AnthropicSource {
    config: BriefingConfig,
    api_key: String,
    prompt: String,
}

impl AnthropicSource {
    pub fn new(config: BriefingConfig, api_key: String, prompt: String) -> Self {
        Self {
            config,
            api_key,
            prompt,
        }
    }

    /// Build a source with the key taken from `ANTHROPIC_API_KEY`.
    pub fn from_env(config: BriefingConfig, prompt: String) -> Result<Self, Error> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(Error::MissingEnv("ANTHROPIC_API_KEY"))?;
        Ok(Self::new(config, api_key, prompt))
    }

    fn request(&self) -> MessagesRequest<'_> {
        MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            tools: vec![Tool {
                kind: "web_search_20250305",
                name: "web_search",
                max_uses: self.config.max_searches,
            }],
            messages: vec![Message {
                role: "user",
                content: &self.prompt,
            }],
        }
    }
}

impl Source for AnthropicSource {
    fn fetch(&self) -> Result<String, Error> {
        tracing::info!(model = %self.config.model, "fetching briefing");

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(self.config.timeout_secs)))
            .build()
            .into();
        let response: MessagesResponse = agent
            .post(&self.config.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("anthropic-beta", WEB_SEARCH_BETA)
            .send_json(self.request())?
            .body_mut()
            .read_json()?;

        let stop_reason = response.stop_reason.clone().unwrap_or_default();
        tracing::info!(%stop_reason, blocks = response.content.len(), "briefing response");

        let text = response_text(response)?;
        tracing::info!(length = text.len(), "briefing received");
        Ok(text)
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    tools: Vec<Tool>,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Tool {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
    max_uses: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

/// Any content block; only `text` blocks carry briefing text
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

fn response_text(response: MessagesResponse) -> Result<String, Error> {
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::EmptyResponse {
            stop_reason: response.stop_reason.unwrap_or_default(),
        });
    }
    Ok(text.to_string())
}
