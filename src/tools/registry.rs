use crate::config::Settings;
use crate::confluence::ConfluenceClient;
use crate::error::{Result, ToolsError};
use crate::logging::Timer;
use crate::slack::SlackClient;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// What the agent framework sees: name, description and a JSON schema for the arguments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value>;

    fn name(&self) -> String {
        self.definition().name
    }
}

/// Clients handed to every tool call.
///
/// A service left unconfigured makes its tools fail with
/// [`ToolsError::Uninitialized`].
#[derive(Clone, Default)]
pub struct ToolContext {
    slack: Option<Arc<SlackClient>>,
    confluence: Option<Arc<ConfluenceClient>>,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the clients for every service present in `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut ctx = Self::new();
        if let Some(slack) = &settings.slack {
            ctx = ctx.with_slack(Arc::new(SlackClient::new(slack, &settings.http)?));
        }
        if let Some(confluence) = &settings.confluence {
            ctx = ctx.with_confluence(Arc::new(ConfluenceClient::new(confluence, &settings.http)?));
        }
        Ok(ctx)
    }

    pub fn with_slack(mut self, client: Arc<SlackClient>) -> Self {
        self.slack = Some(client);
        self
    }

    pub fn with_confluence(mut self, client: Arc<ConfluenceClient>) -> Self {
        self.confluence = Some(client);
        self
    }

    pub fn slack(&self) -> Result<&SlackClient> {
        self.slack.as_deref().ok_or(ToolsError::Uninitialized("Slack"))
    }

    pub fn confluence(&self) -> Result<&ConfluenceClient> {
        self.confluence
            .as_deref()
            .ok_or(ToolsError::Uninitialized("Confluence"))
    }
}

/// Name → tool lookup used to dispatch agent calls
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions sorted by tool name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub async fn execute(&self, name: &str, args: Value, ctx: &ToolContext) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolsError::UnknownTool(name.to_string()))?;

        let span = tracing::info_span!("tool_call", tool = %name, call_id = %Uuid::new_v4());
        async move {
            let _timer = Timer::new(name);
            tracing::info!("Executing tool");

            let result = tool.execute(args, ctx).await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "Tool call failed");
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Deserialize tool arguments, treating `null` as an empty object
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolsError::InvalidArgument(e.to_string()))
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "echo".to_string(),
                description: "Return the arguments".to_string(),
                parameters: json!({ "type": "object" }),
            }
        }

        async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<Value> {
            Ok(args)
        }
    }

    #[tokio::test]
    async fn test_registry_dispatch() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo));

        let result = registry
            .execute("echo", json!({ "x": 1 }), &ToolContext::new())
            .await
            .unwrap();
        assert_eq!(result, json!({ "x": 1 }));
    }

    #[tokio::test]
    async fn test_registry_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry
            .execute("nope", Value::Null, &ToolContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolsError::UnknownTool(ref name) if name == "nope"));
    }

    #[test]
    fn test_empty_context_is_uninitialized() {
        let ctx = ToolContext::new();
        assert!(matches!(ctx.slack(), Err(ToolsError::Uninitialized("Slack"))));
        assert!(matches!(ctx.confluence(), Err(ToolsError::Uninitialized("Confluence"))));
    }

    #[derive(Debug, Deserialize)]
    struct LimitArgs {
        #[serde(default)]
        limit: usize,
    }

    #[test]
    fn test_parse_args_null_is_empty_object() {
        let args: LimitArgs = parse_args(Value::Null).unwrap();
        assert_eq!(args.limit, 0);

        let err = parse_args::<LimitArgs>(json!({ "limit": "ten" })).unwrap_err();
        assert!(matches!(err, ToolsError::InvalidArgument(_)));
    }
}
