mod client;
mod format;
mod types;

pub use client::{ConfluenceClient, MAX_RESULTS_PER_CALL, parse_spaces, text_query};
pub use format::PageFormatter;
pub use types::{PageContent, SearchResult, SpaceRef, TitleSearchResult};
