//! Bounded, cursor-driven collection of raw reviews from one store.
//!
//! Every source follows the same stop policy: no next cursor, an empty page,
//! `max_pages` reached, or a provider error. Errors end the walk but keep what
//! was collected so far.

use std::future::Future;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::ProviderResult;
use crate::types::{PageCursor, ReviewPage, StoreKind};

/// A paginated source of raw store reviews.
pub trait ReviewSource {
    fn store(&self) -> StoreKind;

    /// Cursor for the first request (`None` when the first call takes none).
    fn first_cursor(&self) -> Option<PageCursor>;

    fn fetch_page(
        &self,
        cursor: Option<&PageCursor>,
    ) -> impl Future<Output = ProviderResult<ReviewPage>> + Send;
}

/// Reviews gathered from one store plus how the walk ended.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub reviews: Vec<Value>,
    pub pages_fetched: usize,
    /// Message of the provider error that stopped the walk, if any.
    pub error: Option<String>,
}

/// Walks pages of `source`, tagging each raw review with the store's device
/// and the given `country` (existing values are overwritten).
pub async fn collect_reviews<S>(source: &S, max_pages: usize, country: &str) -> Harvest
where
    S: ReviewSource + Sync,
{
    let store = source.store();
    let mut harvest = Harvest::default();
    let mut cursor = source.first_cursor();

    while harvest.pages_fetched < max_pages {
        let page = match source.fetch_page(cursor.as_ref()).await {
            Ok(p) => p,
            Err(e) => {
                warn!(store = store.as_str(), page = harvest.pages_fetched + 1, error = %e, "review fetch stopped");
                harvest.error = Some(e.to_string());
                break;
            }
        };
        harvest.pages_fetched += 1;

        if page.reviews.is_empty() {
            debug!(store = store.as_str(), "empty page");
            break;
        }

        harvest.reviews.extend(
            page.reviews
                .into_iter()
                .filter_map(|r| tag_review(r, store.device_tag(), country)),
        );

        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    info!(
        store = store.as_str(),
        pages = harvest.pages_fetched,
        reviews = harvest.reviews.len(),
        "store reviews collected"
    );
    harvest
}

fn tag_review(review: Value, device: &str, country: &str) -> Option<Value> {
    match review {
        Value::Object(mut map) => {
            map.insert("device".into(), Value::String(device.to_string()));
            map.insert("country".into(), Value::String(country.to_string()));
            Some(Value::Object(map))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves scripted pages and records the cursors it was called with.
    struct ScriptedSource {
        pages: Mutex<Vec<ProviderResult<ReviewPage>>>,
        seen: Mutex<Vec<Option<PageCursor>>>,
    }

    impl ScriptedSource {
        fn new(mut pages: Vec<ProviderResult<ReviewPage>>) -> Self {
            pages.reverse();
            Self {
                pages: Mutex::new(pages),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ReviewSource for ScriptedSource {
        fn store(&self) -> StoreKind {
            StoreKind::GooglePlay
        }

        fn first_cursor(&self) -> Option<PageCursor> {
            None
        }

        async fn fetch_page(&self, cursor: Option<&PageCursor>) -> ProviderResult<ReviewPage> {
            self.seen.lock().unwrap().push(cursor.cloned());
            self.pages
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(ReviewPage::default()))
        }
    }

    fn page(n: usize, next: Option<&str>) -> ProviderResult<ReviewPage> {
        Ok(ReviewPage {
            reviews: (0..n).map(|i| json!({"title": format!("r{i}"), "device": "web"})).collect(),
            next: next.map(|t| PageCursor::Token(t.into())),
        })
    }

    #[tokio::test]
    async fn follows_tokens_until_exhausted() {
        let src = ScriptedSource::new(vec![page(2, Some("t2")), page(1, None)]);
        let h = collect_reviews(&src, 10, "India").await;
        assert_eq!(h.reviews.len(), 3);
        assert_eq!(h.pages_fetched, 2);
        assert!(h.error.is_none());
        let seen = src.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![None, Some(PageCursor::Token("t2".into()))]);
    }

    #[tokio::test]
    async fn tags_overwrite_device_and_country() {
        let src = ScriptedSource::new(vec![page(1, None)]);
        let h = collect_reviews(&src, 1, "India").await;
        assert_eq!(h.reviews[0]["device"], "Android");
        assert_eq!(h.reviews[0]["country"], "India");
    }

    #[tokio::test]
    async fn max_pages_bounds_the_walk() {
        let src = ScriptedSource::new(vec![page(1, Some("a")), page(1, Some("b")), page(1, Some("c"))]);
        let h = collect_reviews(&src, 2, "India").await;
        assert_eq!(h.pages_fetched, 2);
        assert_eq!(h.reviews.len(), 2);
    }

    #[tokio::test]
    async fn error_keeps_collected_reviews() {
        let src = ScriptedSource::new(vec![
            page(2, Some("t2")),
            Err(ProviderError::Upstream("Invalid API key".into())),
        ]);
        let h = collect_reviews(&src, 5, "India").await;
        assert_eq!(h.reviews.len(), 2);
        assert!(h.error.as_deref().unwrap_or_default().contains("Invalid API key"));
    }

    #[tokio::test]
    async fn empty_page_stops_even_with_cursor() {
        let src = ScriptedSource::new(vec![page(0, Some("next"))]);
        let h = collect_reviews(&src, 5, "India").await;
        assert!(h.reviews.is_empty());
        assert_eq!(h.pages_fetched, 1);
    }

    #[test]
    fn non_objects_are_dropped() {
        assert!(tag_review(json!("text"), "iOS", "India").is_none());
    }
}
