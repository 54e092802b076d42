//! Provider-agnostic types shared by all store sources.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// App store a review page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreKind {
    GooglePlay,
    Apple,
}

impl StoreKind {
    /// Device tag attached to every raw review fetched from this store.
    pub fn device_tag(self) -> &'static str {
        match self {
            StoreKind::GooglePlay => "Android",
            StoreKind::Apple => "iOS",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::GooglePlay => "google_play",
            StoreKind::Apple => "apple",
        }
    }
}

/// Paging cursor. Google Play pages by opaque token, Apple by page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    Token(String),
    Page(u32),
}

/// One page of raw reviews plus the cursor of the next page, if any.
#[derive(Debug, Clone, Default)]
pub struct ReviewPage {
    pub reviews: Vec<Value>,
    pub next: Option<PageCursor>,
}
