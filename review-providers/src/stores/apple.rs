//! Apple App Store reviews via the SerpAPI `apple_reviews` engine.
//!
//! Pages are numbered from 1; a non-empty page implies there may be another.

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{get_serpapi_json, reviews_array};
use crate::errors::ProviderResult;
use crate::types::{PageCursor, ReviewPage};

#[derive(Debug, Clone)]
pub struct AppleClient {
    http: Client,
    base_url: String,
    api_key: String,
    product_id: String,
    country: String,
}

impl AppleClient {
    pub fn new(
        http: Client,
        base_url: String,
        api_key: String,
        product_id: String,
        country: String,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
            product_id,
            country,
        }
    }

    /// Fetches one page sorted by helpfulness.
    pub async fn fetch_page(&self, cursor: Option<&PageCursor>) -> ProviderResult<ReviewPage> {
        let page = page_number(cursor);
        debug!(product = %self.product_id, page, "apple page");
        let params = vec![
            ("engine", "apple_reviews".to_string()),
            ("product_id", self.product_id.clone()),
            ("country", self.country.clone()),
            ("sort", "mosthelpful".to_string()),
            ("page", page.to_string()),
            ("api_key", self.api_key.clone()),
        ];
        let body = get_serpapi_json(&self.http, &self.base_url, &params).await?;
        parse_page(&body, page)
    }
}

fn page_number(cursor: Option<&PageCursor>) -> u32 {
    match cursor {
        Some(PageCursor::Page(n)) => (*n).max(1),
        _ => 1,
    }
}

pub(crate) fn parse_page(body: &Value, page: u32) -> ProviderResult<ReviewPage> {
    let reviews = reviews_array(body)?;
    let next = (!reviews.is_empty()).then(|| PageCursor::Page(page + 1));
    Ok(ReviewPage { reviews, next })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_empty_page_points_to_the_next_number() {
        let page = parse_page(&json!({"reviews": [{"title": "x"}]}), 3).unwrap();
        assert_eq!(page.next, Some(PageCursor::Page(4)));
    }

    #[test]
    fn empty_page_stops() {
        let page = parse_page(&json!({"reviews": []}), 2).unwrap();
        assert!(page.next.is_none());
    }

    #[test]
    fn token_cursor_falls_back_to_first_page() {
        assert_eq!(page_number(Some(&PageCursor::Token("t".into()))), 1);
        assert_eq!(page_number(None), 1);
        assert_eq!(page_number(Some(&PageCursor::Page(0))), 1);
    }
}
