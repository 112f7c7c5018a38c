//! HTTP request handlers for the mock server.
//!
//! Shared helpers here reproduce Shopify's response conventions: envelope
//! bodies, `{"errors": ...}` failures and `Link` header pagination.

pub mod fulfillments;
pub mod themes;

pub use fulfillments::*;
pub use themes::*;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::mock_server::state::MockState;
use crate::ACCESS_TOKEN_HEADER;

pub(crate) type SharedState = Arc<RwLock<MockState>>;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 250;

/// Query parameters accepted by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub since_id: Option<u64>,
    pub page_info: Option<String>,
    pub fields: Option<String>,
}

/// Query parameters accepted by single-entity reads.
#[derive(Debug, Default, Deserialize)]
pub struct FieldsQuery {
    pub fields: Option<String>,
}

/// Build a Shopify-style error response.
pub(crate) fn error(status: StatusCode, errors: Value) -> Response {
    (status, Json(json!({ "errors": errors }))).into_response()
}

pub(crate) fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, json!("Not Found"))
}

/// Wrap `value` under `key`, keeping only `fields` when given.
pub(crate) fn envelope<T: Serialize>(key: &str, value: &T, fields: Option<&str>) -> Response {
    let value = select_fields(serde_json::to_value(value).unwrap_or(Value::Null), fields);
    (StatusCode::OK, Json(json!({ key: value }))).into_response()
}

fn select_fields(value: Value, fields: Option<&str>) -> Value {
    let Some(fields) = fields.filter(|f| !f.is_empty()) else {
        return value;
    };
    let wanted: Vec<&str> = fields.split(',').map(str::trim).collect();
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| wanted.contains(&k.as_str()))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| select_fields(item, Some(fields)))
                .collect(),
        ),
        other => other,
    }
}

/// Pull the entity under `key` out of a request body.
pub(crate) fn unwrap_body<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T, Response> {
    body.get(key)
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .ok_or_else(|| {
            error(
                StatusCode::BAD_REQUEST,
                json!({ key: "Required parameter missing or invalid" }),
            )
        })
}

/// Convert a `{id}.json` path segment into the ID.
pub(crate) fn parse_id(file: &str) -> Option<u64> {
    file.strip_suffix(".json")?.parse().ok()
}

/// Position inside a listing, carried in `page_info`.
///
/// Shopify's cursors are opaque; the mock encodes the filter and offset so
/// follow-up pages need no other parameters.
struct Cursor {
    since_id: u64,
    offset: usize,
}

impl Cursor {
    fn encode(&self) -> String {
        urlencoding::encode(&format!("{}:{}", self.since_id, self.offset)).into_owned()
    }

    fn decode(raw: &str) -> Option<Self> {
        let (since_id, offset) = raw.split_once(':')?;
        Some(Self {
            since_id: since_id.parse().ok()?,
            offset: offset.parse().ok()?,
        })
    }
}

/// One page of a listing plus the `Link` header pointing around it.
pub(crate) struct Paged<T> {
    pub items: Vec<T>,
    pub link: Option<String>,
}

impl<T> Paged<T> {
    pub(crate) fn into_response(self, key: &str, fields: Option<&str>) -> Response
    where
        T: Serialize,
    {
        let mut response = envelope(key, &self.items, fields);
        if let Some(link) = self.link.and_then(|l| HeaderValue::from_str(&l).ok()) {
            response.headers_mut().insert(header::LINK, link);
        }
        response
    }
}

/// Slice a listing the way Shopify does.
///
/// `list` receives the effective `since_id` and returns every matching item
/// in ID order. `link_base` is the absolute URL of the endpoint.
pub(crate) fn paginate<T, F>(query: &ListQuery, link_base: &str, list: F) -> Result<Paged<T>, Response>
where
    F: FnOnce(Option<u64>) -> Vec<T>,
{
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(error(
            StatusCode::BAD_REQUEST,
            json!({ "limit": [format!("must be between 1 and {MAX_LIMIT}")] }),
        ));
    }

    let cursor = match query.page_info.as_deref() {
        Some(raw) => Cursor::decode(raw).ok_or_else(|| {
            error(StatusCode::BAD_REQUEST, json!("page_info - Invalid value."))
        })?,
        None => Cursor {
            since_id: query.since_id.unwrap_or(0),
            offset: 0,
        },
    };

    let since_id = (cursor.since_id > 0).then_some(cursor.since_id);
    let all = list(since_id);
    let end = (cursor.offset + limit).min(all.len());
    let has_next = end < all.len();
    let has_previous = cursor.offset > 0;

    let mut links = Vec::new();
    if has_previous {
        let previous = Cursor {
            since_id: cursor.since_id,
            offset: cursor.offset.saturating_sub(limit),
        };
        links.push(format!(
            "<{link_base}?limit={limit}&page_info={}>; rel=\"previous\"",
            previous.encode()
        ));
    }
    if has_next {
        let next = Cursor {
            since_id: cursor.since_id,
            offset: end,
        };
        links.push(format!(
            "<{link_base}?limit={limit}&page_info={}>; rel=\"next\"",
            next.encode()
        ));
    }

    let items = all
        .into_iter()
        .skip(cursor.offset)
        .take(limit)
        .collect();

    Ok(Paged {
        items,
        link: (!links.is_empty()).then(|| links.join(", ")),
    })
}

/// Middleware applied to every API route.
///
/// Counts the request, then answers with 429 while injected rate limiting
/// lasts and with 401 when the access token does not match.
pub(crate) async fn gate(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    {
        let mut state = state.write().await;
        state.request_count += 1;

        if state.rate_limited_requests > 0 {
            state.rate_limited_requests -= 1;
            let mut response = error(
                StatusCode::TOO_MANY_REQUESTS,
                json!("Exceeded 2 calls per second for api client. Reduce request rates to resume uninterrupted service."),
            );
            if let Some(retry_after) = state
                .retry_after
                .and_then(|d| HeaderValue::from_str(&d.as_secs_f64().to_string()).ok())
            {
                response.headers_mut().insert(header::RETRY_AFTER, retry_after);
            }
            return response;
        }

        if let Some(required) = state.required_token.as_deref() {
            if !token_matches(request.headers(), required) {
                return error(
                    StatusCode::UNAUTHORIZED,
                    json!("[API] Invalid API key or access token (unrecognized login or wrong password)"),
                );
            }
        }
    }

    next.run(request).await
}

fn token_matches(headers: &HeaderMap, required: &str) -> bool {
    headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == required)
}
