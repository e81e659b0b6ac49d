mod client;
mod format;
mod types;

pub use client::SlackClient;
pub use format::{channel_summary, format_timestamp, permalink};
pub use types::{
    ChannelSummary, Conversation, ConversationReply, Message, Reaction, TimeWindow,
};
