//! Shaping of raw Confluence content records for the agent

use crate::config::PrimarySpace;
use crate::confluence::types::{PageContent, SearchResult, SpaceRef, TitleSearchResult};
use serde_json::Value;

const UNTITLED: &str = "Untitled";
const OTHER_CONTEXT: &str = "Other";

/// Builds output records from flat `content/search` and `content/{id}` entries.
///
/// Output records are fresh values; the raw payload is never modified.
#[derive(Debug, Clone)]
pub struct PageFormatter {
    base_url: String,
    primary_space: Option<PrimarySpace>,
}

impl PageFormatter {
    pub fn new(base_url: &str, primary_space: Option<PrimarySpace>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            primary_space,
        }
    }

    /// `<base>/wiki<_links.webui>`
    pub fn page_url(&self, content: &Value) -> String {
        let webui = content
            .pointer("/_links/webui")
            .and_then(Value::as_str)
            .unwrap_or_default();
        format!("{}/wiki{}", self.base_url, webui)
    }

    pub fn search_result(&self, content: &Value) -> SearchResult {
        let key = space_field(content, "key");
        let name = space_field(content, "name");
        let primary_label = self.primary_label(key.as_deref());

        let display = match primary_label {
            Some(label) => key.as_ref().map(|k| format!("{} ({})", label, k)),
            None => name.clone().or_else(|| key.clone()),
        };

        SearchResult {
            id: content_id(content),
            title: title(content),
            url: self.page_url(content),
            space: SpaceRef {
                key,
                name,
                display,
            },
            content_type: string_field(content, "/type"),
            last_modified: string_field(content, "/version/when"),
            excerpt: string_field(content, "/excerpt").unwrap_or_default(),
            team_context: primary_label.unwrap_or(OTHER_CONTEXT).to_string(),
        }
    }

    pub fn title_result(&self, content: &Value) -> TitleSearchResult {
        TitleSearchResult {
            id: content_id(content),
            title: title(content),
            url: self.page_url(content),
            space: SpaceRef {
                key: space_field(content, "key"),
                name: space_field(content, "name"),
                display: None,
            },
            content_type: string_field(content, "/type"),
            last_modified: string_field(content, "/version/when"),
        }
    }

    pub fn page_content(&self, page: &Value) -> PageContent {
        PageContent {
            id: content_id(page),
            title: title(page),
            url: self.page_url(page),
            space: SpaceRef {
                key: space_field(page, "key"),
                name: space_field(page, "name"),
                display: None,
            },
            content: string_field(page, "/body/view/value").unwrap_or_default(),
            last_modified: string_field(page, "/version/when"),
            version: page.pointer("/version/number").and_then(Value::as_u64),
        }
    }

    fn primary_label(&self, key: Option<&str>) -> Option<&str> {
        match (&self.primary_space, key) {
            (Some(primary), Some(key)) if primary.key == key => Some(primary.label.as_str()),
            _ => None,
        }
    }
}

fn string_field(content: &Value, pointer: &str) -> Option<String> {
    content
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn space_field(content: &Value, field: &str) -> Option<String> {
    string_field(content, &format!("/space/{}", field))
}

/// Content IDs are strings in the REST API, but tolerate numbers
fn content_id(content: &Value) -> Option<String> {
    match content.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn title(content: &Value) -> String {
    string_field(content, "/title").unwrap_or_else(|| UNTITLED.to_string())
}
