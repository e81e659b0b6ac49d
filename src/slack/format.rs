//! Shaping of raw Slack payloads for the agent

use crate::slack::types::ChannelSummary;
use chrono::DateTime;
use serde_json::Value;

const PURPOSE_MAX_CHARS: usize = 100;

/// Message permalink: `<archive base>/archives/<channel>/p<ts without dot>`
pub fn permalink(archive_base_url: &str, channel_id: &str, ts: &str) -> String {
    format!(
        "{}/archives/{}/p{}",
        archive_base_url.trim_end_matches('/'),
        channel_id,
        ts.replace('.', "")
    )
}

/// Render a Slack `ts` as `YYYY-MM-DD HH:MM` (UTC)
pub fn format_timestamp(ts: &str) -> String {
    let Ok(seconds) = ts.trim().parse::<f64>() else {
        return "Invalid timestamp".to_string();
    };
    if !seconds.is_finite() {
        return "Invalid timestamp".to_string();
    }

    let whole = seconds.trunc() as i64;
    let nanos = ((seconds - seconds.trunc()) * 1e9) as u32;
    match DateTime::from_timestamp(whole, nanos) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "Invalid timestamp".to_string(),
    }
}

/// Reduce a `conversations.list` entry to the fields the agent uses
pub fn channel_summary(channel: &Value) -> ChannelSummary {
    let text = |field: &str| {
        channel
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let purpose = channel
        .pointer("/purpose/value")
        .and_then(Value::as_str)
        .map(|p| p.chars().take(PURPOSE_MAX_CHARS).collect())
        .unwrap_or_default();

    ChannelSummary {
        id: text("id"),
        name: text("name"),
        member_count: channel
            .get("num_members")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        purpose,
    }
}
