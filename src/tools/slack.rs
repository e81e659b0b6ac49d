//! Slack tools exposed to the agent

use crate::error::Result;
use crate::slack::{Message, TimeWindow};
use crate::storage::save_json;
use crate::tools::registry::{Tool, ToolContext, ToolDefinition, parse_args, to_json};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

fn default_true() -> bool {
    true
}

fn default_channel_limit() -> usize {
    50
}

fn default_history_page_size() -> usize {
    100
}

fn definition(name: &str, description: &str, parameters: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    }
}

pub struct GetSlackChannels;

#[derive(Deserialize)]
struct ChannelsArgs {
    #[serde(default = "default_true")]
    exclude_archived: bool,
    #[serde(default = "default_channel_limit")]
    limit: usize,
}

#[async_trait]
impl Tool for GetSlackChannels {
    fn definition(&self) -> ToolDefinition {
        definition(
            "get_slack_channels",
            "Fetch public Slack channels the bot can see, with id, name, member count and purpose.",
            json!({
                "type": "object",
                "properties": {
                    "exclude_archived": { "type": "boolean", "default": true, "description": "Skip archived channels" },
                    "limit": { "type": "integer", "default": 50, "minimum": 0, "description": "Maximum number of channels to return" }
                }
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value> {
        let client = ctx.slack()?;
        let args: ChannelsArgs = parse_args(args)?;
        let channels = client.list_channels(args.exclude_archived, args.limit).await?;
        to_json(&channels)
    }
}

pub struct GetSlackMessages;

#[derive(Deserialize)]
struct MessagesArgs {
    channel_id: String,
    start_date: String,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default = "default_history_page_size")]
    limit: usize,
}

#[async_trait]
impl Tool for GetSlackMessages {
    fn definition(&self) -> ToolDefinition {
        definition(
            "get_slack_messages",
            "Fetch messages from a Slack channel within an inclusive date range. Each message carries channel_name and a permalink url.",
            json!({
                "type": "object",
                "properties": {
                    "channel_id": { "type": "string", "description": "Slack channel ID" },
                    "start_date": { "type": "string", "description": "Start of the window, e.g. 2025-09-15 or 2025-09-15T08:00:00Z" },
                    "end_date": { "type": "string", "description": "End of the window; defaults to now" },
                    "limit": { "type": "integer", "default": 100, "minimum": 1, "description": "Messages requested per API call" }
                },
                "required": ["channel_id", "start_date"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value> {
        let client = ctx.slack()?;
        let args: MessagesArgs = parse_args(args)?;
        let window = TimeWindow::parse(&args.start_date, args.end_date.as_deref())?;
        let messages = client
            .get_messages(&args.channel_id, &window, args.limit)
            .await?;
        to_json(&messages)
    }
}

pub struct GetSlackThreadReplies;

#[derive(Deserialize)]
struct ThreadArgs {
    channel_id: String,
    thread_ts: String,
}

#[async_trait]
impl Tool for GetSlackThreadReplies {
    fn definition(&self) -> ToolDefinition {
        definition(
            "get_slack_thread_replies",
            "Fetch all replies in a Slack thread, parent message included.",
            json!({
                "type": "object",
                "properties": {
                    "channel_id": { "type": "string", "description": "Slack channel ID" },
                    "thread_ts": { "type": "string", "description": "Timestamp of the parent message" }
                },
                "required": ["channel_id", "thread_ts"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value> {
        let client = ctx.slack()?;
        let args: ThreadArgs = parse_args(args)?;
        let replies = client
            .get_thread_replies(&args.channel_id, &args.thread_ts)
            .await?;
        to_json(&replies)
    }
}

pub struct GetSlackUserInfo;

#[derive(Deserialize)]
struct UserArgs {
    user_id: String,
}

#[async_trait]
impl Tool for GetSlackUserInfo {
    fn definition(&self) -> ToolDefinition {
        definition(
            "get_slack_user_info",
            "Get the Slack profile of a user.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": { "type": "string", "description": "Slack user ID" }
                },
                "required": ["user_id"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value> {
        let client = ctx.slack()?;
        let args: UserArgs = parse_args(args)?;
        client.get_user_info(&args.user_id).await
    }
}

pub struct GetSlackChannelInfo;

#[derive(Deserialize)]
struct ChannelArgs {
    channel_id: String,
}

#[async_trait]
impl Tool for GetSlackChannelInfo {
    fn definition(&self) -> ToolDefinition {
        definition(
            "get_slack_channel_info",
            "Get information about a Slack channel.",
            json!({
                "type": "object",
                "properties": {
                    "channel_id": { "type": "string", "description": "Slack channel ID" }
                },
                "required": ["channel_id"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value> {
        let client = ctx.slack()?;
        let args: ChannelArgs = parse_args(args)?;
        client.get_channel_info(&args.channel_id).await
    }
}

pub struct FetchSlackMessagesWithThreads;

#[derive(Deserialize)]
struct ThreadedMessagesArgs {
    channel_id: String,
    start_date: String,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default = "default_true")]
    include_thread_replies: bool,
    #[serde(default = "default_true")]
    resolve_mentions: bool,
}

#[async_trait]
impl Tool for FetchSlackMessagesWithThreads {
    fn definition(&self) -> ToolDefinition {
        definition(
            "fetch_slack_messages_with_threads",
            "Fetch channel messages in a date range with their thread replies attached and @-mentions rewritten to display names.",
            json!({
                "type": "object",
                "properties": {
                    "channel_id": { "type": "string", "description": "Slack channel ID" },
                    "start_date": { "type": "string", "description": "Start of the window" },
                    "end_date": { "type": "string", "description": "End of the window; defaults to now" },
                    "include_thread_replies": { "type": "boolean", "default": true },
                    "resolve_mentions": { "type": "boolean", "default": true }
                },
                "required": ["channel_id", "start_date"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value> {
        let client = ctx.slack()?;
        let args: ThreadedMessagesArgs = parse_args(args)?;
        let window = TimeWindow::parse(&args.start_date, args.end_date.as_deref())?;
        let messages = client
            .fetch_messages_with_threads(
                &args.channel_id,
                &window,
                args.include_thread_replies,
                args.resolve_mentions,
            )
            .await?;
        to_json(&messages)
    }
}

pub struct ExtractSlackConversations;

#[derive(Deserialize)]
struct ConversationsArgs {
    messages: Vec<Message>,
    #[serde(default = "default_true")]
    resolve_reactions: bool,
}

#[async_trait]
impl Tool for ExtractSlackConversations {
    fn definition(&self) -> ToolDefinition {
        definition(
            "extract_slack_conversations",
            "Turn messages returned by fetch_slack_messages_with_threads into conversations with readable user names and timestamps.",
            json!({
                "type": "object",
                "properties": {
                    "messages": { "type": "array", "items": { "type": "object" } },
                    "resolve_reactions": { "type": "boolean", "default": true }
                },
                "required": ["messages"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value> {
        let client = ctx.slack()?;
        let args: ConversationsArgs = parse_args(args)?;
        let conversations = client
            .extract_conversations(&args.messages, args.resolve_reactions)
            .await;
        to_json(&conversations)
    }
}

pub struct SaveSlackDataToJson;

#[derive(Deserialize)]
struct SaveArgs {
    data: Value,
    filename: String,
}

#[async_trait]
impl Tool for SaveSlackDataToJson {
    fn definition(&self) -> ToolDefinition {
        definition(
            "save_slack_data_to_json",
            "Save Slack data (messages, conversations, ...) to a JSON file.",
            json!({
                "type": "object",
                "properties": {
                    "data": { "description": "Data to save" },
                    "filename": { "type": "string", "description": "Output file path" }
                },
                "required": ["data", "filename"]
            }),
        )
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<Value> {
        let args: SaveArgs = parse_args(args)?;
        let message = save_json(&args.data, &args.filename).await?;
        Ok(Value::String(message))
    }
}
