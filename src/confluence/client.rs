use crate::config::{ConfluenceConfig, HttpConfig, split_spaces};
use crate::confluence::format::PageFormatter;
use crate::error::Result;
use crate::http::{ApiClient, Auth};
use crate::pagination::{Page, PageOptions, paginate};
use serde_json::Value;

const SERVICE: &str = "Confluence";

/// Upper bound the search endpoint accepts per call
pub const MAX_RESULTS_PER_CALL: usize = 100;

const SEARCH_EXPAND: &str = "space,version,body.view";
const TITLE_EXPAND: &str = "space,version";
const PAGE_EXPAND: &str = "body.view,space,version,ancestors";

/// Confluence REST client.
///
/// Search operations degrade to an empty list and page fetches to `None` on
/// failure; the error itself is logged by the request executor.
pub struct ConfluenceClient {
    api: ApiClient,
    formatter: PageFormatter,
    default_spaces: String,
}

impl ConfluenceClient {
    pub fn new(config: &ConfluenceConfig, http: &HttpConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/');
        let auth = Auth::from_credentials(config.token.clone(), config.email.as_deref());
        let api = ApiClient::new(
            SERVICE,
            &format!("{}/wiki/rest/api", base_url),
            &auth,
            http.timeout,
        )?;

        tracing::debug!(
            base_url = %api.base_url(),
            basic_auth = config.email.is_some(),
            "Confluence client created"
        );

        Ok(Self {
            api,
            formatter: PageFormatter::new(base_url, config.primary_space.clone()),
            default_spaces: config.default_spaces.clone(),
        })
    }

    pub fn formatter(&self) -> &PageFormatter {
        &self.formatter
    }

    /// Comma-separated space keys used when a search names none
    pub fn default_spaces(&self) -> &str {
        &self.default_spaces
    }

    /// Full-text search, optionally restricted to `spaces`
    pub async fn search_content(&self, query: &str, limit: usize, spaces: &[String]) -> Vec<Value> {
        let cql = text_query(query, spaces);
        match self.search(&cql, SEARCH_EXPAND, limit).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!(query = %query, error = %e, "Search failed");
                Vec::new()
            }
        }
    }

    /// Search pages whose title matches `title_query`
    pub async fn search_by_title(&self, title_query: &str, limit: usize) -> Vec<Value> {
        let cql = format!("title ~ {}", cql_string(title_query));
        match self.search(&cql, TITLE_EXPAND, limit).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!(title_query = %title_query, error = %e, "Title search failed");
                Vec::new()
            }
        }
    }

    /// Full page with body, space, version and ancestors
    pub async fn get_page_content(&self, page_id: &str) -> Option<Value> {
        let params = [("expand", PAGE_EXPAND.to_string())];
        match self.api.get_segments(&["content", page_id], &params).await {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::error!(page_id = %page_id, error = %e, "Failed to get page");
                None
            }
        }
    }

    /// Search following the `_links.next` link of each page, stopping at `limit` results
    async fn search(&self, cql: &str, expand: &str, limit: usize) -> Result<Vec<Value>> {
        let options = PageOptions::new(MAX_RESULTS_PER_CALL).with_max_items(limit);

        paginate("content/search", &options, |next, page_size| {
            let mut params = vec![
                ("cql", cql.to_string()),
                ("limit", page_size.to_string()),
                ("expand", expand.to_string()),
            ];
            match next.as_deref() {
                Some(link) => params.extend(next_page_params(link)),
                None => params.push(("start", "0".to_string())),
            }

            async move {
                let payload = self.api.get("content/search", &params).await?;
                let results = payload
                    .get("results")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();

                let next = payload
                    .pointer("/_links/next")
                    .and_then(Value::as_str)
                    .filter(|_| !results.is_empty())
                    .map(str::to_string);
                Ok(Page {
                    items: results,
                    has_more: next.is_some(),
                    next_cursor: next,
                })
            }
        })
        .await
    }
}

/// `cursor` and `start` carried by a search `_links.next` link.
///
/// Other parameters of the link are rebuilt by the caller so the page size
/// can shrink towards the limit.
fn next_page_params(link: &str) -> Vec<(&'static str, String)> {
    let query = link.split_once('?').map(|(_, q)| q).unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .filter_map(|(key, value)| match key.as_ref() {
            "cursor" => Some(("cursor", value.into_owned())),
            "start" => Some(("start", value.into_owned())),
            _ => None,
        })
        .collect()
}

/// `text ~ "<query>"`, AND-ed with an OR of the given spaces
pub fn text_query(query: &str, spaces: &[String]) -> String {
    let mut parts = vec![format!("text ~ {}", cql_string(query))];
    if !spaces.is_empty() {
        let filter = spaces
            .iter()
            .map(|space| format!("space = {}", cql_string(space)))
            .collect::<Vec<_>>()
            .join(" OR ");
        parts.push(format!("({})", filter));
    }
    parts.join(" AND ")
}

/// Parse a comma-separated space list; `None` or blank means all spaces
pub fn parse_spaces(spaces: Option<&str>) -> Vec<String> {
    spaces.map(split_spaces).unwrap_or_default()
}

/// Double-quoted CQL literal with quotes and backslashes escaped
fn cql_string(raw: &str) -> String {
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}
