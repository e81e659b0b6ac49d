use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolsError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{service} API error: {message}")]
    Service {
        service: &'static str,
        message: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("{0} client not initialized")]
    Uninitialized(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ToolsError {
    fn from(error: reqwest::Error) -> Self {
        ToolsError::Transport(error.to_string())
    }
}

impl ToolsError {
    pub fn service(service: &'static str, message: impl Into<String>) -> Self {
        ToolsError::Service {
            service,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = ToolsError::service("Slack", "channel_not_found");
        assert_eq!(err.to_string(), "Slack API error: channel_not_found");
    }

    #[test]
    fn test_uninitialized_display() {
        let err = ToolsError::Uninitialized("Confluence");
        assert_eq!(err.to_string(), "Confluence client not initialized");
    }
}
