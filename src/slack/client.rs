use crate::config::{HttpConfig, SlackConfig};
use crate::error::{Result, ToolsError};
use crate::http::{ApiClient, Auth};
use crate::logging::Timer;
use crate::metadata::{EntityKind, NameCache, NameSource, resolve_mentions, user_display_name};
use crate::pagination::{Page, PageOptions, paginate};
use crate::slack::format::{channel_summary, format_timestamp, permalink};
use crate::slack::types::{
    ChannelSummary, Conversation, ConversationReply, Message, Reaction, TimeWindow,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::time::Duration;

const SERVICE: &str = "Slack";
const CHANNEL_PAGE_SIZE: usize = 100;

/// Slack Web API client owning the user, usergroup and channel name caches
pub struct SlackClient {
    api: ApiClient,
    archive_base_url: String,
    page_delay: Duration,
    names: NameCache,
}

impl SlackClient {
    pub fn new(config: &SlackConfig, http: &HttpConfig) -> Result<Self> {
        let auth = Auth::Bearer(config.bot_token.clone());
        let api = ApiClient::new(SERVICE, &config.api_base_url, &auth, http.timeout)?
            .with_success_flag("ok");

        tracing::debug!(base_url = %api.base_url(), "Slack client created");

        Ok(Self {
            api,
            archive_base_url: config.archive_base_url.clone(),
            page_delay: config.page_delay,
            names: NameCache::new(),
        })
    }

    pub fn names(&self) -> &NameCache {
        &self.names
    }

    /// List public channels, following cursors until `limit` channels are collected
    pub async fn list_channels(
        &self,
        exclude_archived: bool,
        limit: usize,
    ) -> Result<Vec<ChannelSummary>> {
        let options = PageOptions::new(CHANNEL_PAGE_SIZE).with_max_items(limit);

        paginate("conversations.list", &options, |cursor, page_size| {
            let mut params = vec![
                ("types", "public_channel".to_string()),
                ("exclude_archived", exclude_archived.to_string()),
                ("limit", page_size.to_string()),
            ];
            if let Some(cursor) = cursor {
                params.push(("cursor", cursor));
            }

            async move {
                let payload = self.api.get("conversations.list", &params).await?;
                let channels = payload
                    .get("channels")
                    .and_then(Value::as_array)
                    .map(|channels| channels.iter().map(channel_summary).collect())
                    .unwrap_or_default();
                Ok(slack_page(&payload, channels))
            }
        })
        .await
    }

    /// Fetch channel history inside `window`, adding channel name and permalink to each message
    pub async fn get_messages(
        &self,
        channel_id: &str,
        window: &TimeWindow,
        page_size: usize,
    ) -> Result<Vec<Message>> {
        let oldest = window.oldest();
        let latest = window.latest();
        let options = PageOptions::new(page_size).with_delay(self.page_delay);

        let mut messages = paginate("conversations.history", &options, |cursor, page_size| {
            let mut params = vec![
                ("channel", channel_id.to_string()),
                ("oldest", oldest.clone()),
                ("latest", latest.clone()),
                ("limit", page_size.to_string()),
                ("inclusive", "true".to_string()),
            ];
            if let Some(cursor) = cursor {
                params.push(("cursor", cursor));
            }

            async move {
                let payload = self.api.get("conversations.history", &params).await?;
                let messages: Vec<Message> = decode_list(&payload, "messages")?;
                Ok(slack_page(&payload, messages))
            }
        })
        .await?;

        // Drop repeats that straddle a page boundary
        let mut seen = HashSet::new();
        messages.retain(|m| m.ts.is_empty() || seen.insert(m.ts.clone()));

        let channel_name = self.channel_name(channel_id).await;
        for message in &mut messages {
            message.channel_name = Some(channel_name.clone());
            message.url = Some(permalink(&self.archive_base_url, channel_id, &message.ts));
        }

        Ok(messages)
    }

    /// All messages of a thread in a single call; the root is usually the first entry
    pub async fn get_thread_replies(&self, channel_id: &str, thread_ts: &str) -> Result<Vec<Message>> {
        let params = [
            ("channel", channel_id.to_string()),
            ("ts", thread_ts.to_string()),
        ];
        let payload = self.api.get("conversations.replies", &params).await?;
        decode_list(&payload, "messages")
    }

    /// Raw `users.info` user object, `{}` when absent
    pub async fn get_user_info(&self, user_id: &str) -> Result<Value> {
        let payload = self
            .api
            .get("users.info", &[("user", user_id.to_string())])
            .await?;
        Ok(payload.get("user").cloned().unwrap_or_else(|| json!({})))
    }

    /// Raw `conversations.info` channel object, `{}` when absent
    pub async fn get_channel_info(&self, channel_id: &str) -> Result<Value> {
        let payload = self
            .api
            .get("conversations.info", &[("channel", channel_id.to_string())])
            .await?;
        Ok(payload.get("channel").cloned().unwrap_or_else(|| json!({})))
    }

    /// History with thread replies attached and mentions rewritten to names
    pub async fn fetch_messages_with_threads(
        &self,
        channel_id: &str,
        window: &TimeWindow,
        include_thread_replies: bool,
        resolve_mentions: bool,
    ) -> Result<Vec<Message>> {
        let mut timer = Timer::new("fetch_messages_with_threads");
        let mut messages = self.get_messages(channel_id, window, 100).await?;

        for message in &mut messages {
            if include_thread_replies && message.has_replies() {
                tracing::info!(
                    channel_id = %channel_id,
                    thread_ts = %message.thread_root(),
                    reply_count = message.reply_count.unwrap_or(0),
                    "Fetching thread replies"
                );
                let mut replies = self
                    .get_thread_replies(channel_id, message.thread_root())
                    .await?;

                if resolve_mentions {
                    for reply in &mut replies {
                        self.resolve_text(reply).await;
                    }
                }
                message.thread_replies = Some(replies);
            }

            if resolve_mentions {
                self.resolve_text(message).await;
            }
        }

        timer.record_items(messages.len());
        Ok(messages)
    }

    /// Flatten threaded messages into conversations with names in place of user IDs.
    ///
    /// Messages without `thread_replies` are skipped, as are entries missing a `ts`.
    pub async fn extract_conversations(
        &self,
        messages: &[Message],
        resolve_reactions: bool,
    ) -> Vec<Conversation> {
        let mut conversations = Vec::new();

        for message in messages {
            let Some(replies) = &message.thread_replies else {
                continue;
            };
            if message.ts.is_empty() {
                tracing::warn!("Skipping thread root without ts");
                continue;
            }

            let mut text_messages = Vec::with_capacity(replies.len());
            for reply in replies {
                if reply.ts.is_empty() {
                    tracing::warn!(thread_ts = %message.ts, "Skipping reply without ts");
                    continue;
                }

                let user = match &reply.user {
                    Some(user_id) => Some(self.user_display_name(user_id).await),
                    None => None,
                };
                let reactions = if resolve_reactions && !reply.reactions.is_empty() {
                    Some(self.resolve_reactions(&reply.reactions).await)
                } else {
                    None
                };

                text_messages.push(ConversationReply {
                    text: reply.text.clone().unwrap_or_default(),
                    ts: reply.ts.clone(),
                    formatted_time: format_timestamp(&reply.ts),
                    user,
                    reactions,
                });
            }

            let reactions = if resolve_reactions && !message.reactions.is_empty() {
                Some(self.resolve_reactions(&message.reactions).await)
            } else {
                None
            };

            conversations.push(Conversation {
                channel_name: message.channel_name.clone().unwrap_or_default(),
                url: message.url.clone().unwrap_or_default(),
                timestamp: message.ts.clone(),
                formatted_timestamp: format_timestamp(&message.ts),
                text_messages,
                latest_reply: message.latest_reply.clone(),
                formatted_latest_reply: message.latest_reply.as_deref().map(format_timestamp),
                reactions,
            });
        }

        conversations
    }

    pub async fn user_display_name(&self, user_id: &str) -> String {
        self.names.resolve(self, EntityKind::User, user_id).await
    }

    pub async fn subteam_display_name(&self, subteam_id: &str) -> String {
        self.names.resolve(self, EntityKind::Subteam, subteam_id).await
    }

    pub async fn channel_name(&self, channel_id: &str) -> String {
        self.names.resolve(self, EntityKind::Channel, channel_id).await
    }

    pub async fn resolve_mentions(&self, text: &str) -> String {
        resolve_mentions(&self.names, self, text).await
    }

    async fn resolve_text(&self, message: &mut Message) {
        if let Some(text) = message.text.take() {
            message.text = Some(self.resolve_mentions(&text).await);
        }
    }

    async fn resolve_reactions(&self, reactions: &[Reaction]) -> Vec<Reaction> {
        let mut resolved = Vec::with_capacity(reactions.len());
        for reaction in reactions {
            let mut users = Vec::with_capacity(reaction.users.len());
            for user_id in &reaction.users {
                users.push(self.user_display_name(user_id).await);
            }
            resolved.push(Reaction {
                users,
                ..reaction.clone()
            });
        }
        resolved
    }
}

#[async_trait]
impl NameSource for SlackClient {
    async fn lookup_user(&self, user_id: &str) -> Result<Option<String>> {
        let user = self.get_user_info(user_id).await?;
        Ok(user_display_name(&user))
    }

    async fn lookup_channel(&self, channel_id: &str) -> Result<Option<String>> {
        let channel = self.get_channel_info(channel_id).await?;
        Ok(channel
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string))
    }

    async fn list_subteams(&self) -> Result<Vec<(String, String)>> {
        let payload = self.api.get("usergroups.list", &[]).await?;
        let groups = payload
            .get("usergroups")
            .and_then(Value::as_array)
            .map(|groups| {
                groups
                    .iter()
                    .filter_map(|group| {
                        let id = group.get("id").and_then(Value::as_str)?;
                        let handle = group
                            .get("handle")
                            .and_then(Value::as_str)
                            .filter(|h| !h.is_empty())
                            .unwrap_or(id);
                        Some((id.to_string(), handle.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(groups)
    }
}

fn slack_page<T>(payload: &Value, items: Vec<T>) -> Page<T> {
    Page {
        items,
        has_more: payload
            .get("has_more")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        next_cursor: payload
            .pointer("/response_metadata/next_cursor")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn decode_list<T: DeserializeOwned>(payload: &Value, field: &str) -> Result<Vec<T>> {
    match payload.get(field) {
        Some(list) => serde_json::from_value(list.clone())
            .map_err(|e| ToolsError::Decode(format!("{} in Slack response: {}", field, e))),
        None => Ok(Vec::new()),
    }
}
