//! Cursor-driven pagination shared by the Slack and Confluence clients

use crate::error::Result;
use crate::logging::Timer;
use std::future::Future;
use std::time::Duration;

/// One page returned by a service
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    /// Opaque token for the following page; empty or absent ends the stream
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            has_more: false,
            next_cursor: None,
        }
    }

    pub fn more(items: Vec<T>, next_cursor: impl Into<String>) -> Self {
        Self {
            items,
            has_more: true,
            next_cursor: Some(next_cursor.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Items requested per call
    pub page_size: usize,
    /// Stop once this many items have been collected
    pub max_items: Option<usize>,
    /// Fixed pause between page requests for rate-limited endpoints
    pub delay_between_pages: Option<Duration>,
}

impl PageOptions {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            max_items: None,
            delay_between_pages: None,
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_between_pages = Some(delay).filter(|d| !d.is_zero());
        self
    }
}

/// Collect every page into a single `Vec<T>` in the order the service returned them.
///
/// `fetch` receives the cursor of the page to load (`None` for the first) and
/// the number of items to ask for. The loop ends when the service reports no
/// more pages, when it claims more pages but hands back no cursor, or when
/// `max_items` have been collected. Errors from `fetch` are returned as-is.
pub async fn paginate<T, F, Fut>(label: &str, options: &PageOptions, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>, usize) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut timer = Timer::new(format!("paginate:{}", label));
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    if options.max_items == Some(0) {
        timer.record_items(0);
        return Ok(all);
    }

    loop {
        let page_size = match options.max_items {
            Some(max) => options.page_size.min(max - all.len()),
            None => options.page_size,
        };

        let page = fetch(cursor.take(), page_size).await?;
        pages += 1;

        let received = page.items.len();
        all.extend(page.items);
        tracing::info!(
            label = %label,
            page = pages,
            received = received,
            total = all.len(),
            "Fetched page"
        );

        if let Some(max) = options.max_items {
            if all.len() >= max {
                all.truncate(max);
                break;
            }
        }

        if !page.has_more {
            break;
        }

        match page.next_cursor.filter(|c| !c.is_empty()) {
            Some(next) => cursor = Some(next),
            None => {
                tracing::debug!(
                    label = %label,
                    page = pages,
                    "Service reported more pages without a cursor, stopping"
                );
                break;
            }
        }

        if let Some(delay) = options.delay_between_pages {
            tokio::time::sleep(delay).await;
        }
    }

    timer.record_items(all.len());
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolsError;
    use std::collections::VecDeque;

    struct Script {
        pages: VecDeque<Result<Page<u32>>>,
        calls: Vec<(Option<String>, usize)>,
    }

    impl Script {
        fn new(pages: Vec<Result<Page<u32>>>) -> Self {
            Self {
                pages: pages.into(),
                calls: Vec::new(),
            }
        }

        fn next(&mut self, cursor: Option<String>, size: usize) -> Result<Page<u32>> {
            self.calls.push((cursor, size));
            self.pages.pop_front().expect("fetched past the scripted pages")
        }
    }

    #[tokio::test]
    async fn test_stops_at_terminal_page() {
        let mut script = Script::new(vec![
            Ok(Page::more(vec![1, 2], "c1")),
            Ok(Page::more(vec![3, 4], "c2")),
            Ok(Page::last(vec![5])),
        ]);

        let items = paginate("numbers", &PageOptions::new(2), |cursor, size| {
            let page = script.next(cursor, size);
            async move { page }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            script.calls,
            vec![
                (None, 2),
                (Some("c1".to_string()), 2),
                (Some("c2".to_string()), 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_cursor_ends_stream() {
        let mut script = Script::new(vec![Ok(Page {
            items: vec![1],
            has_more: true,
            next_cursor: Some(String::new()),
        })]);

        let items = paginate("numbers", &PageOptions::new(10), |cursor, size| {
            let page = script.next(cursor, size);
            async move { page }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1]);
        assert_eq!(script.calls.len(), 1);
    }

    #[tokio::test]
    async fn test_max_items_shrinks_last_request_and_truncates() {
        let mut script = Script::new(vec![
            Ok(Page::more(vec![1, 2, 3], "c1")),
            Ok(Page::more(vec![4, 5, 6], "c2")),
        ]);

        let options = PageOptions::new(3).with_max_items(5);
        let items = paginate("numbers", &options, |cursor, size| {
            let page = script.next(cursor, size);
            async move { page }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(script.calls[1], (Some("c1".to_string()), 2));
    }

    #[tokio::test]
    async fn test_zero_max_items_makes_no_calls() {
        let mut script = Script::new(vec![]);
        let options = PageOptions::new(3).with_max_items(0);

        let items = paginate("numbers", &options, |cursor, size| {
            let page = script.next(cursor, size);
            async move { page }
        })
        .await
        .unwrap();

        assert!(items.is_empty());
        assert!(script.calls.is_empty());
    }

    #[tokio::test]
    async fn test_error_propagates_unchanged() {
        let mut script = Script::new(vec![
            Ok(Page::more(vec![1], "c1")),
            Err(ToolsError::service("Slack", "ratelimited")),
        ]);

        let result = paginate("numbers", &PageOptions::new(1), |cursor, size| {
            let page = script.next(cursor, size);
            async move { page }
        })
        .await;

        assert!(matches!(
            result,
            Err(ToolsError::Service { ref message, .. }) if message == "ratelimited"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_applied_between_pages_only() {
        let mut script = Script::new(vec![
            Ok(Page::more(vec![1], "c1")),
            Ok(Page::more(vec![2], "c2")),
            Ok(Page::last(vec![3])),
        ]);

        let options = PageOptions::new(1).with_delay(Duration::from_secs(1));
        let started = tokio::time::Instant::now();
        let items = paginate("numbers", &options, |cursor, size| {
            let page = script.next(cursor, size);
            async move { page }
        })
        .await
        .unwrap();

        assert_eq!(items.len(), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }
}
