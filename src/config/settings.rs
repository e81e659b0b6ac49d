use crate::error::{Result, ToolsError};
use std::time::Duration;

pub const DEFAULT_SLACK_API_BASE_URL: &str = "https://slack.com/api";
pub const DEFAULT_SLACK_ARCHIVE_BASE_URL: &str = "https://slack.com";

#[derive(Debug, Clone)]
pub struct Settings {
    pub slack: Option<SlackConfig>,
    pub confluence: Option<ConfluenceConfig>,
    pub http: HttpConfig,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub api_base_url: String,
    /// Host used when building message permalinks (`<host>/archives/...`)
    pub archive_base_url: String,
    /// Fixed pause between history pages
    pub page_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct ConfluenceConfig {
    /// Site root, e.g. `https://company.atlassian.net`
    pub base_url: String,
    pub token: String,
    /// Switches authentication to Basic (email + token) when present
    pub email: Option<String>,
    /// Comma-separated space keys searched when a tool call names none
    pub default_spaces: String,
    pub primary_space: Option<PrimarySpace>,
}

/// The team's home space, rendered specially in search results
#[derive(Debug, Clone, PartialEq)]
pub struct PrimarySpace {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
}

impl SlackConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base_url: DEFAULT_SLACK_API_BASE_URL.to_string(),
            archive_base_url: DEFAULT_SLACK_ARCHIVE_BASE_URL.to_string(),
            page_delay: Duration::from_secs(1),
        }
    }
}

impl ConfluenceConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            email: None,
            default_spaces: String::new(),
            primary_space: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

pub fn load_settings() -> Result<Settings> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    settings_from(|key| std::env::var(key).ok())
}

/// Build settings from an arbitrary variable lookup.
///
/// A service section is only produced when its credentials are present; the
/// Confluence base URL and token must be supplied together.
pub fn settings_from<F>(lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let http = HttpConfig {
        timeout: Duration::from_secs(parse_or(&var, "HTTP_TIMEOUT_SECS", 30)?),
    };

    let slack = match var("SLACK_BOT_TOKEN") {
        Some(bot_token) => Some(SlackConfig {
            bot_token,
            api_base_url: var("SLACK_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SLACK_API_BASE_URL.to_string()),
            archive_base_url: var("SLACK_ARCHIVE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SLACK_ARCHIVE_BASE_URL.to_string()),
            page_delay: Duration::from_millis(parse_or(&var, "SLACK_PAGE_DELAY_MS", 1000)?),
        }),
        None => None,
    };

    let confluence = match (var("CONFLUENCE_BASE_URL"), var("CONFLUENCE_TOKEN")) {
        (Some(base_url), Some(token)) => {
            let default_spaces = var("CONFLUENCE_SPACES").unwrap_or_else(|| "OPR".to_string());
            let label = var("CONFLUENCE_PRIMARY_SPACE_LABEL")
                .unwrap_or_else(|| "SRE Operations".to_string());
            let primary_space = split_spaces(&default_spaces)
                .into_iter()
                .next()
                .map(|key| PrimarySpace { key, label });

            Some(ConfluenceConfig {
                base_url,
                token,
                email: var("CONFLUENCE_EMAIL"),
                default_spaces,
                primary_space,
            })
        }
        (Some(_), None) => {
            return Err(ToolsError::Config(
                "CONFLUENCE_TOKEN not set (required with CONFLUENCE_BASE_URL)".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(ToolsError::Config(
                "CONFLUENCE_BASE_URL not set (required with CONFLUENCE_TOKEN)".to_string(),
            ));
        }
        (None, None) => None,
    };

    if slack.is_none() && confluence.is_none() {
        return Err(ToolsError::Config(
            "Neither SLACK_BOT_TOKEN nor CONFLUENCE_BASE_URL/CONFLUENCE_TOKEN is set".to_string(),
        ));
    }

    Ok(Settings {
        slack,
        confluence,
        http,
    })
}

/// Split a comma-separated space list, trimming entries and dropping empties
pub fn split_spaces(spaces: &str) -> Vec<String> {
    spaces
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<F>(var: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ToolsError::Config(format!("Invalid {}", key))),
        None => Ok(default),
    }
}
