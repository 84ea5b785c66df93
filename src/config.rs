use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::block::Severity;
use crate::error::Error;

/// Bundled defaults, validated by `build.rs`
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub style: StyleConfig,
    pub badge: BadgeConfig,
    pub briefing: BriefingConfig,
    pub email: EmailConfig,
    pub smtp: SmtpConfig,
}

/// Inline CSS for every element the renderer emits. Empty means no `style`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    pub h1: String,
    pub h2: String,
    pub h3: String,
    pub paragraph: String,
    pub link: String,
    pub strong: String,
    pub em: String,
    pub rule: String,
    pub list: String,
    pub list_item: String,
    pub sublist: String,
    pub sublist_item: String,
    pub table: String,
    pub th: String,
    pub td: String,
    pub row_alt: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            h1: "font-family:'Playfair Display',Georgia,serif;font-size:30px;font-weight:900;color:#0f0f0f;margin:0 0 4px;line-height:1.15;letter-spacing:-0.5px;".to_string(),
            h2: "font-family:'Helvetica Neue',Arial,sans-serif;font-size:9px;font-weight:700;letter-spacing:0.35em;text-transform:uppercase;color:#c8401a;border-top:2px solid #0f0f0f;padding-top:8px;margin:28px 0 12px;".to_string(),
            h3: "font-family:'Playfair Display',Georgia,serif;font-size:14px;font-weight:700;color:#0f0f0f;margin:14px 0 5px;".to_string(),
            paragraph: "font-family:Georgia,serif;font-size:14px;line-height:1.75;color:#1a1a1a;margin:0 0 10px;".to_string(),
            link: "color:#c8401a;font-family:Georgia,serif;text-decoration:none;border-bottom:1px solid rgba(200,64,26,0.35);".to_string(),
            strong: "font-family:Georgia,serif;color:#0f0f0f;".to_string(),
            em: "color:#4b5563;".to_string(),
            rule: "border:none;border-top:1px solid #d4c9b0;margin:16px 0;".to_string(),
            list: "margin:8px 0 14px 16px;padding:0;".to_string(),
            list_item: "font-family:Georgia,serif;font-size:14px;line-height:1.75;color:#1a1a1a;margin-bottom:8px;padding-left:2px;".to_string(),
            sublist: "margin:4px 0 8px 0;padding:0;list-style:none;".to_string(),
            sublist_item: "font-family:'Helvetica Neue',Arial,sans-serif;font-size:12px;line-height:1.65;color:#4b5563;margin:5px 0;border-left:2px solid #e5e7eb;padding-left:10px;".to_string(),
            table: "width:100%;border-collapse:collapse;margin:12px 0 16px;font-family:'Helvetica Neue',Arial,sans-serif;font-size:12px;".to_string(),
            th: "background:#0f0f0f;color:#f5f0e8;text-align:left;padding:6px 8px;font-weight:700;letter-spacing:0.04em;".to_string(),
            td: "padding:6px 8px;border-bottom:1px solid #e5e0d4;color:#1a1a1a;".to_string(),
            row_alt: "background:#ede8dc;".to_string(),
        }
    }
}

impl StyleConfig {
    /// Structural markup only, for hosts that bring their own stylesheet
    pub fn unstyled() -> Self {
        Self {
            h1: String::new(),
            h2: String::new(),
            h3: String::new(),
            paragraph: String::new(),
            link: String::new(),
            strong: String::new(),
            em: String::new(),
            rule: String::new(),
            list: String::new(),
            list_item: String::new(),
            sublist: String::new(),
            sublist_item: String::new(),
            table: String::new(),
            th: String::new(),
            td: String::new(),
            row_alt: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BadgeConfig {
    /// Literal labels recognised in front of a severity word
    pub labels: Vec<String>,
    pub wrapper: String,
    pub pill: String,
    pub high: TierConfig,
    pub medium: TierConfig,
    pub low: TierConfig,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            labels: ["Hubbell Signal", "Hubbell Relevance", "Signal", "Relevance", "Risk"]
                .into_iter()
                .map(String::from)
                .collect(),
            wrapper: "font-family:'Helvetica Neue',Arial,sans-serif;font-size:10px;font-style:normal;".to_string(),
            pill: "color:#fff;padding:1px 7px;border-radius:2px;font-size:10px;font-weight:600;letter-spacing:0.04em;".to_string(),
            high: TierConfig::new("#166534", "⬆"),
            medium: TierConfig::new("#92400e", "◆"),
            low: TierConfig::new("#374151", "▸"),
        }
    }
}

impl BadgeConfig {
    pub fn tier(&self, severity: Severity) -> &TierConfig {
        match severity {
            Severity::High => &self.high,
            Severity::Medium => &self.medium,
            Severity::Low => &self.low,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct TierConfig {
    pub background: String,
    pub icon: String,
}

impl TierConfig {
    fn new(background: &str, icon: &str) -> Self {
        Self {
            background: background.to_string(),
            icon: icon.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BriefingConfig {
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub max_searches: u32,
    /// Oldest article age accepted by the prompt, in days
    pub cutoff_days: u32,
    pub timeout_secs: u64,
    /// Replaces the built-in prompt template when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_file: Option<PathBuf>,
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 6000,
            max_searches: 12,
            cutoff_days: 2,
            timeout_secs: 300,
            prompt_file: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EmailConfig {
    pub title: String,
    pub tagline: String,
    pub audience: String,
    pub footer: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            title: "DataCenterIQ".to_string(),
            tagline: "Daily Intelligence Briefing · Data Center Market Monitor".to_string(),
            audience: "Prepared exclusively for Hubbell Incorporated".to_string(),
            footer: "Automated briefing · Live web search".to_string(),
        }
    }
}

/// Outgoing mail. `SMTP_HOST`, `SMTP_PORT`, `FROM_EMAIL` and `TO_EMAILS`
/// override these; credentials only come from the environment.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    /// 465 connects with implicit TLS, anything else upgrades with STARTTLS
    pub port: u16,
    pub from: String,
    pub from_name: String,
    pub to: Vec<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            from: String::new(),
            from_name: "DataCenterIQ — Hubbell Intelligence".to_string(),
            to: Vec::new(),
        }
    }
}

impl Config {
    /// Defaults shipped with the crate.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
            tracing::error!(error = %e, "bundled config does not fit the schema, using built-in values");
            Self::default()
        })
    }

    /// Load config from a TOML file, or return defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::compiled_default());
            }
            Err(source) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config = toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
