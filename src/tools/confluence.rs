//! Confluence tools exposed to the agent

use crate::confluence::parse_spaces;
use crate::error::Result;
use crate::tools::registry::{Tool, ToolContext, ToolDefinition, parse_args, to_json};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

fn default_search_limit() -> usize {
    10
}

fn default_title_limit() -> usize {
    5
}

pub struct SearchConfluenceContent;

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default = "default_search_limit")]
    limit: usize,
    /// Absent means the configured default spaces; blank means every space
    #[serde(default)]
    spaces: Option<String>,
}

#[async_trait]
impl Tool for SearchConfluenceContent {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "search_confluence_content".to_string(),
            description: "Full-text search of Confluence pages. Returns title, URL, space and an excerpt for each hit.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search terms" },
                    "limit": { "type": "integer", "default": 10, "minimum": 0, "description": "Maximum number of results" },
                    "spaces": { "type": "string", "description": "Comma-separated space keys; defaults to the team space, empty string searches all spaces" }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value> {
        let client = ctx.confluence()?;
        let args: SearchArgs = parse_args(args)?;

        let spaces = parse_spaces(Some(
            args.spaces.as_deref().unwrap_or(client.default_spaces()),
        ));
        let results: Vec<_> = client
            .search_content(&args.query, args.limit, &spaces)
            .await
            .iter()
            .map(|content| client.formatter().search_result(content))
            .collect();

        to_json(&results)
    }
}

pub struct GetConfluencePageContent;

#[derive(Deserialize)]
struct PageArgs {
    page_id: String,
}

#[async_trait]
impl Tool for GetConfluencePageContent {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_confluence_page_content".to_string(),
            description: "Get the full content of a Confluence page, including body HTML, space and version. Returns null if the page cannot be read.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "page_id": { "type": "string", "description": "Confluence page ID" }
                },
                "required": ["page_id"]
            }),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value> {
        let client = ctx.confluence()?;
        let args: PageArgs = parse_args(args)?;

        match client.get_page_content(&args.page_id).await {
            Some(page) => to_json(&client.formatter().page_content(&page)),
            None => Ok(Value::Null),
        }
    }
}

pub struct SearchConfluenceByTitle;

#[derive(Deserialize)]
struct TitleArgs {
    title_query: String,
    #[serde(default = "default_title_limit")]
    limit: usize,
}

#[async_trait]
impl Tool for SearchConfluenceByTitle {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "search_confluence_by_title".to_string(),
            description: "Search Confluence pages whose title matches a pattern.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "title_query": { "type": "string", "description": "Title pattern" },
                    "limit": { "type": "integer", "default": 5, "minimum": 0, "description": "Maximum number of results" }
                },
                "required": ["title_query"]
            }),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value> {
        let client = ctx.confluence()?;
        let args: TitleArgs = parse_args(args)?;

        let results: Vec<_> = client
            .search_by_title(&args.title_query, args.limit)
            .await
            .iter()
            .map(|content| client.formatter().title_result(content))
            .collect();

        to_json(&results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolsError;

    #[tokio::test]
    async fn test_confluence_tools_need_client() {
        let err = SearchConfluenceByTitle
            .execute(json!({ "title_query": "runbook" }), &ToolContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolsError::Uninitialized("Confluence")));
    }

    #[test]
    fn test_search_args_defaults() {
        let args: SearchArgs = parse_args(json!({ "query": "vm" })).unwrap();
        assert_eq!(args.limit, 10);
        assert!(args.spaces.is_none());
    }
}
