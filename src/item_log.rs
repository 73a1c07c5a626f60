//! Append-only log of submitted request records.
//!
//! Every read and write goes through one mutex, so a page is always a
//! consistent view of the log and never observes a half-finished append.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Page size used when the caller asks for zero or fewer items per page.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Placeholder stored instead of the peer address.
pub const REDACTED_REMOTE_IP: &str = "[demo_redact]";

/// Status recorded on every logged item.
pub const LOGGED_STATUS: u16 = 200;

/// One logged request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogItem {
    pub id: String,
    pub created: DateTime<Local>,
    pub url: String,
    pub method: String,
    pub status: u16,
    pub user_ip: String,
    pub remote_ip: String,
    pub referer: String,
    pub user_agent: String,
    pub meta: Value,
}

/// Request metadata captured by the submission handler.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub url: String,
    pub method: String,
    pub user_ip: String,
    pub referer: String,
    pub user_agent: String,
}

/// A window into the log together with its totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
    pub total_items: usize,
    pub total_pages: usize,
    pub items: Vec<LogItem>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemLog {
    items: Arc<Mutex<Vec<LogItem>>>,
}

impl ItemLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already built item to the end of the log.
    pub async fn append(&self, item: LogItem) {
        self.items.lock().await.push(item);
    }

    /// Build a new item from request metadata and append it.
    ///
    /// The id is the 1-based position of the item, computed under the same
    /// lock acquisition as the append so concurrent submissions never share
    /// an id.
    pub async fn record(&self, request: RequestMeta, meta: Value) -> LogItem {
        let mut items = self.items.lock().await;

        let item = LogItem {
            id: (items.len() + 1).to_string(),
            created: Local::now(),
            url: request.url,
            method: request.method,
            status: LOGGED_STATUS,
            user_ip: request.user_ip,
            remote_ip: REDACTED_REMOTE_IP.to_string(),
            referer: request.referer,
            user_agent: request.user_agent,
            meta,
        };

        items.push(item.clone());
        item
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    /// Return one page of the log.
    ///
    /// `page <= 0` is read as 1 and `per_page <= 0` as [`DEFAULT_PER_PAGE`].
    /// A page past the end of a non-empty log is anchored on the last item
    /// instead of coming back empty; an empty log always yields no items.
    pub async fn page(&self, page: i64, per_page: i64) -> Page {
        let page = if page <= 0 { 1 } else { page };
        let per_page = if per_page <= 0 { DEFAULT_PER_PAGE } else { per_page };

        let items = self.items.lock().await;
        let total_items = items.len();
        let window = page_window(total_items, page, per_page);

        Page {
            page,
            per_page,
            total_items,
            total_pages: total_pages(total_items, per_page),
            items: items[window].to_vec(),
        }
    }
}

/// Index range for a normalized page request against a log of `len` items.
fn page_window(len: usize, page: i64, per_page: i64) -> Range<usize> {
    if len == 0 {
        return 0..0;
    }

    let start = usize::try_from((page - 1).saturating_mul(per_page)).unwrap_or(usize::MAX);
    let per_page = usize::try_from(per_page).unwrap_or(usize::MAX);
    let end = start.saturating_add(per_page).min(len);
    let start = if start >= len { len - 1 } else { start };

    start..end
}

fn total_pages(total_items: usize, per_page: i64) -> usize {
    let per_page = usize::try_from(per_page).unwrap_or(usize::MAX);
    total_items.div_ceil(per_page)
}
