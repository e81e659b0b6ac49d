//! Agent-facing tool surface over the Slack and Confluence clients

mod confluence;
mod registry;
mod slack;

pub use confluence::{GetConfluencePageContent, SearchConfluenceByTitle, SearchConfluenceContent};
pub use registry::{Tool, ToolContext, ToolDefinition, ToolRegistry};
pub use slack::{
    ExtractSlackConversations, FetchSlackMessagesWithThreads, GetSlackChannelInfo,
    GetSlackChannels, GetSlackMessages, GetSlackThreadReplies, GetSlackUserInfo,
    SaveSlackDataToJson,
};

use std::sync::Arc;

/// Registry holding every Slack and Confluence tool
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(GetSlackChannels));
    registry.register(Arc::new(GetSlackMessages));
    registry.register(Arc::new(GetSlackThreadReplies));
    registry.register(Arc::new(GetSlackUserInfo));
    registry.register(Arc::new(GetSlackChannelInfo));
    registry.register(Arc::new(FetchSlackMessagesWithThreads));
    registry.register(Arc::new(ExtractSlackConversations));
    registry.register(Arc::new(SaveSlackDataToJson));

    registry.register(Arc::new(SearchConfluenceContent));
    registry.register(Arc::new(GetConfluencePageContent));
    registry.register(Arc::new(SearchConfluenceByTitle));

    registry
}
