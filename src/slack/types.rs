use crate::error::{Result, ToolsError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Slack message as returned by `conversations.history` / `conversations.replies`.
///
/// Fields the tools depend on are typed; every other provider field is kept
/// verbatim in `extra`. `channel_name`, `url` and `thread_replies` are only
/// set by this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub ts: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_reply: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<Reaction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_replies: Option<Vec<Message>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn has_replies(&self) -> bool {
        self.reply_count.unwrap_or(0) > 0
    }

    /// Thread root timestamp, falling back to the message's own `ts`
    pub fn thread_root(&self) -> &str {
        self.thread_ts.as_deref().unwrap_or(&self.ts)
    }
}

/// An emoji reaction; `users` holds IDs from Slack, display names once resolved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub users: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Trimmed channel listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub id: String,
    pub name: String,
    pub member_count: u64,
    pub purpose: String,
}

/// A thread flattened for the agent: root metadata plus its replies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub channel_name: String,
    pub url: String,
    pub timestamp: String,
    pub formatted_timestamp: String,
    pub text_messages: Vec<ConversationReply>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_reply: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_latest_reply: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<Reaction>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationReply {
    pub text: String,
    pub ts: String,
    pub formatted_time: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<Reaction>>,
}

/// Inclusive time range for `conversations.history`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Parse window bounds; a missing end means "now".
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` (also with `T`) and RFC 3339.
    /// Values without an offset are taken as UTC. Bounds are not validated
    /// against each other.
    pub fn parse(start: &str, end: Option<&str>) -> Result<Self> {
        let start = parse_instant(start)?;
        let end = match end.map(str::trim).filter(|e| !e.is_empty()) {
            Some(end) => parse_instant(end)?,
            None => Utc::now(),
        };
        Ok(Self { start, end })
    }

    /// `oldest` parameter in Slack's `seconds.micros` timestamp form
    pub fn oldest(&self) -> String {
        to_slack_ts(&self.start)
    }

    pub fn latest(&self) -> String {
        to_slack_ts(&self.end)
    }
}

fn to_slack_ts(instant: &DateTime<Utc>) -> String {
    format!("{}.{:06}", instant.timestamp(), instant.timestamp_subsec_micros())
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ToolsError::InvalidArgument(format!("unrecognized date: {:?}", raw)))
}
