use axum::{
    body::Bytes,
    extract::{ConnectInfo, MatchedPath, RawQuery, State},
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::item_log::{ItemLog, Page, RequestMeta};
use crate::middleware::client_ip;
use crate::request_counter::{RequestCount, RequestCounter};

/// Body returned when an item has been logged.
pub const ITEM_ADDED_MESSAGE: &str = "Item adicionado com sucesso";

/// Shared application state
pub type SharedState = Arc<AppState>;

/// The two in-memory stores, each behind its own lock.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub items: ItemLog,
    pub counter: RequestCounter,
}

impl AppState {
    pub fn shared() -> SharedState {
        Arc::new(Self::default())
    }
}

/// Raw pagination parameters. Anything that is not an integer counts as 0.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl PageQuery {
    /// Parse a query string, keeping the first value of a repeated key.
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "page" => &mut parsed.page,
                "perPage" => &mut parsed.per_page,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        parsed
    }

    fn page(&self) -> i64 {
        lenient_int(self.page.as_deref())
    }

    fn per_page(&self) -> i64 {
        lenient_int(self.per_page.as_deref())
    }
}

fn lenient_int(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.parse().ok()).unwrap_or(0)
}

/// Log an arbitrary JSON payload together with the request metadata
pub async fn submit_item(
    State(state): State<SharedState>,
    path: MatchedPath,
    method: Method,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let meta = decode_payload(&body)?;

    let request = RequestMeta {
        url: path.as_str().to_string(),
        method: method.to_string(),
        user_ip: client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr)),
        referer: header_string(&headers, header::REFERER),
        user_agent: header_string(&headers, header::USER_AGENT),
    };

    let item = state.items.record(request, meta).await;
    debug!(id = %item.id, user_ip = %item.user_ip, "Item logged");

    Ok((StatusCode::OK, ITEM_ADDED_MESSAGE))
}

/// List logged items page by page
pub async fn list_items(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Json<Page> {
    let query = PageQuery::parse(query.as_deref().unwrap_or_default());
    Json(state.items.page(query.page(), query.per_page()).await)
}

/// Per-minute request totals
pub async fn request_stats(State(state): State<SharedState>) -> Json<Vec<RequestCount>> {
    Json(state.counter.snapshot().await)
}

/// An empty body is logged as `null`; anything else must be valid JSON.
fn decode_payload(body: &[u8]) -> Result<Value> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoggerError;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_decode_payload_accepts_any_json_value() {
        assert_eq!(decode_payload(br#"{"x":1}"#).unwrap(), json!({ "x": 1 }));
        assert_eq!(decode_payload(b"[1,2]").unwrap(), json!([1, 2]));
        assert_eq!(decode_payload(b"\"text\"").unwrap(), json!("text"));
        assert_eq!(decode_payload(b"42").unwrap(), json!(42));
    }

    #[test]
    fn test_decode_payload_empty_body_is_null() {
        assert_eq!(decode_payload(b"").unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_payload_rejects_malformed_body() {
        assert!(matches!(decode_payload(b"not json"), Err(LoggerError::Decode(_))));
        assert!(matches!(decode_payload(b"{\"a\":"), Err(LoggerError::Decode(_))));
    }

    #[test]
    fn test_lenient_int() {
        assert_eq!(lenient_int(Some("3")), 3);
        assert_eq!(lenient_int(Some("-2")), -2);
        assert_eq!(lenient_int(Some("abc")), 0);
        assert_eq!(lenient_int(Some("")), 0);
        assert_eq!(lenient_int(Some(" 3")), 0);
        assert_eq!(lenient_int(Some("3 ")), 0);
        assert_eq!(lenient_int(None), 0);
    }

    #[test]
    fn test_page_query_keeps_first_repeated_value() {
        let query = PageQuery::parse("page=2&page=1&perPage=10&perPage=50&other=x");
        assert_eq!(query.page(), 2);
        assert_eq!(query.per_page(), 10);
    }

    #[test]
    fn test_page_query_decodes_values() {
        let query = PageQuery::parse("page=%203&perPage=%2B5");
        assert_eq!(query.page, Some(" 3".to_string()));
        assert_eq!(query.page(), 0);
        assert_eq!(query.per_page(), 5);
        assert_eq!(PageQuery::parse(""), PageQuery::default());
    }

    #[test]
    fn test_header_string_missing_is_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));

        assert_eq!(header_string(&headers, header::USER_AGENT), "curl/8.0");
        assert_eq!(header_string(&headers, header::REFERER), "");
    }
}
