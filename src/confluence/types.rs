use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpaceRef {
    pub key: Option<String>,
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// Full-text search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: Option<String>,
    pub title: String,
    pub url: String,
    pub space: SpaceRef,

    #[serde(rename = "type")]
    pub content_type: Option<String>,

    #[serde(rename = "lastModified")]
    pub last_modified: Option<String>,

    pub excerpt: String,
    pub team_context: String,
}

/// Title search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleSearchResult {
    pub id: Option<String>,
    pub title: String,
    pub url: String,
    pub space: SpaceRef,

    #[serde(rename = "type")]
    pub content_type: Option<String>,

    #[serde(rename = "lastModified")]
    pub last_modified: Option<String>,
}

/// A page with its rendered body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageContent {
    pub id: Option<String>,
    pub title: String,
    pub url: String,
    pub space: SpaceRef,

    /// `body.view` HTML
    pub content: String,

    #[serde(rename = "lastModified")]
    pub last_modified: Option<String>,

    pub version: Option<u64>,
}
