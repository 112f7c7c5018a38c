//! Request execution engine.
//!
//! [`RequestExecutor`] is the capability every resource service works
//! through. Implementors provide a single raw [`send`](RequestExecutor::send);
//! the provided methods layer retry, status handling, envelope decoding and
//! pagination on top of it.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, LINK, RETRY_AFTER};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::envelope;
use crate::error::{ApiErrors, FailureReason, RequestFailure, Result, ShopifyError};
use crate::pagination::{parse_link_header, LinkCursors, ListStream, Page, PAGE_INFO_PARAM};
use crate::request::RequestDescriptor;
use crate::retry::{parse_retry_after, CancellationToken, RetryPolicy};

/// Status Shopify uses when the call bucket is full.
const TOO_MANY_REQUESTS: u16 = 429;

/// An HTTP response as plain data.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Delay suggested by a `Retry-After` header.
    pub fn retry_after(&self) -> Option<Duration> {
        self.headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after)
    }

    /// Pagination cursors from the `Link` header.
    pub fn link_cursors(&self) -> LinkCursors {
        self.headers
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(parse_link_header)
            .unwrap_or_default()
    }
}

/// Executes [`RequestDescriptor`]s against the Shopify API.
///
/// # Example
///
/// ```no_run
/// use shopapi::{Method, RequestDescriptor, RequestExecutor, ShopifyClient, Theme};
///
/// # async fn example() -> shopapi::Result<()> {
/// let client = ShopifyClient::from_env()?;
/// let request = RequestDescriptor::builder(Method::Get, "themes/828155753.json")
///     .envelope("theme")
///     .build()?;
/// let theme: Theme = client.execute(request).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Send one attempt of `request` and return the raw response.
    ///
    /// Implementations must not retry or interpret the status; transport
    /// failures map to [`ShopifyError::TransportError`].
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse>;

    /// Retry policy for 429 responses and transport failures of GETs.
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
    }

    /// Token that aborts in-flight calls when cancelled.
    fn cancellation(&self) -> Option<&CancellationToken> {
        None
    }

    /// Execute a single-resource call and decode the enveloped entity.
    ///
    /// Without an envelope key the whole body is decoded.
    async fn execute<T>(&self, request: RequestDescriptor) -> Result<T>
    where
        Self: Sized,
        T: DeserializeOwned + Send,
    {
        let response = dispatch(self, &request).await?;
        match request.envelope_key() {
            Some(key) => envelope::decode(&response.body, key),
            None => envelope::decode_bare(&response.body),
        }
    }

    /// Execute a call whose response body is ignored, such as a DELETE.
    async fn execute_empty(&self, request: RequestDescriptor) -> Result<()>
    where
        Self: Sized,
    {
        dispatch(self, &request).await.map(|_| ())
    }

    /// Fetch exactly one page of a list call.
    async fn execute_page<T>(&self, request: RequestDescriptor) -> Result<Page<T>>
    where
        Self: Sized,
        T: DeserializeOwned + Send,
    {
        fetch_page(self, &request).await
    }

    /// Lazily stream every item of a list call, following `Link` cursors.
    fn execute_list<'a, T>(&'a self, request: RequestDescriptor) -> ListStream<'a, T>
    where
        Self: Sized,
        T: DeserializeOwned + Send + 'a,
    {
        list_stream(self, request)
    }

    /// Fetch every page of a list call and collect the items.
    async fn execute_all<T>(&self, request: RequestDescriptor) -> Result<Vec<T>>
    where
        Self: Sized,
        T: DeserializeOwned + Send,
    {
        self.execute_list(request).try_collect().await
    }
}

/// Where the list stream stands between pages.
enum ListState {
    Pending(RequestDescriptor),
    Done,
}

fn list_stream<'a, E, T>(executor: &'a E, request: RequestDescriptor) -> ListStream<'a, T>
where
    E: RequestExecutor + ?Sized,
    T: DeserializeOwned + Send + 'a,
{
    stream::try_unfold(ListState::Pending(request), move |state| {
        next_page::<E, T>(executor, state)
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, ShopifyError>)))
    .try_flatten()
    .boxed()
}

async fn next_page<E, T>(
    executor: &E,
    state: ListState,
) -> Result<Option<(Vec<T>, ListState)>>
where
    E: RequestExecutor + ?Sized,
    T: DeserializeOwned,
{
    let request = match state {
        ListState::Pending(request) => request,
        ListState::Done => return Ok(None),
    };

    let page: Page<T> = fetch_page(executor, &request).await?;
    let next_state = match &page.next {
        Some(cursor) if request.query().iter().any(|(k, v)| {
            k == PAGE_INFO_PARAM && v == cursor.page_info()
        }) =>
        {
            return Err(ShopifyError::ProtocolMismatch(format!(
                "{} returned its own page cursor as the next page",
                request.path()
            )));
        }
        Some(cursor) => ListState::Pending(request.with_cursor(cursor)),
        None => ListState::Done,
    };

    Ok(Some((page.items, next_state)))
}

async fn fetch_page<E, T>(executor: &E, request: &RequestDescriptor) -> Result<Page<T>>
where
    E: RequestExecutor + ?Sized,
    T: DeserializeOwned,
{
    let response = dispatch(executor, request).await?;
    let items: Vec<T> = match request.envelope_key() {
        Some(key) => envelope::decode_list(&response.body, key)?,
        None => envelope::decode_bare(&response.body)?,
    };
    let cursors = response.link_cursors();

    tracing::debug!(
        path = request.path(),
        items = items.len(),
        has_next = cursors.next.is_some(),
        "fetched page"
    );

    Ok(Page::new(items, cursors))
}

/// Send with bounded retry, then turn non-2xx responses into errors.
async fn dispatch<E>(executor: &E, request: &RequestDescriptor) -> Result<RawResponse>
where
    E: RequestExecutor + ?Sized,
{
    let policy = executor.retry_policy();
    let cancellation = executor.cancellation();
    let mut attempt = 1;

    loop {
        let outcome = cancellable(cancellation, executor.send(request)).await?;

        let delay = match outcome {
            Ok(response) if response.status == TOO_MANY_REQUESTS => {
                if !policy.allows_retry(attempt) {
                    tracing::warn!(
                        method = %request.method(),
                        path = request.path(),
                        attempts = attempt,
                        "rate limited, giving up"
                    );
                    return Err(failure(&response, FailureReason::RateLimited).into());
                }
                policy.delay_for(attempt, response.retry_after())
            }
            Ok(response) if response.is_success() => return Ok(response),
            Ok(response) => return Err(failure(&response, FailureReason::Api).into()),
            Err(ShopifyError::TransportError(e))
                if request.method().is_safe() && policy.allows_retry(attempt) =>
            {
                tracing::warn!(
                    method = %request.method(),
                    path = request.path(),
                    error = %e,
                    "transport error, retrying"
                );
                policy.backoff(attempt)
            }
            Err(e) => return Err(e),
        };

        tracing::warn!(
            method = %request.method(),
            path = request.path(),
            attempt,
            delay_ms = delay.as_millis() as u64,
            "backing off before retry"
        );
        cancellable(cancellation, tokio::time::sleep(delay)).await?;
        attempt += 1;
    }
}

/// Race `future` against the cancellation token, if any.
async fn cancellable<F: Future>(
    cancellation: Option<&CancellationToken>,
    future: F,
) -> Result<F::Output> {
    match cancellation {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(ShopifyError::Cancelled),
                output = future => Ok(output),
            }
        }
        None => Ok(future.await),
    }
}

/// Build the typed failure for a non-2xx response.
fn failure(response: &RawResponse, reason: FailureReason) -> RequestFailure {
    RequestFailure {
        status: response.status,
        reason,
        errors: parse_error_body(&response.body),
    }
}

/// Parse Shopify's error body.
///
/// Known shapes: `{"errors": "msg"}`, `{"errors": ["msg"]}`,
/// `{"errors": {"field": ["msg"]}}` and `{"error": "msg"}`. Anything else is
/// kept verbatim.
pub(crate) fn parse_error_body(body: &str) -> ApiErrors {
    let raw = || ApiErrors::Raw(body.to_string());

    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(body) else {
        return raw();
    };

    match object.remove("errors") {
        Some(Value::String(message)) => ApiErrors::Message(message),
        Some(Value::Array(items)) => match strings(items) {
            Some(messages) => ApiErrors::Messages(messages),
            None => raw(),
        },
        Some(Value::Object(fields)) => {
            let mut parsed = BTreeMap::new();
            for (field, messages) in fields {
                let messages = match messages {
                    Value::String(message) => vec![message],
                    Value::Array(items) => match strings(items) {
                        Some(messages) => messages,
                        None => return raw(),
                    },
                    _ => return raw(),
                };
                parsed.insert(field, messages);
            }
            ApiErrors::Fields(parsed)
        }
        Some(_) => raw(),
        None => match object.remove("error") {
            Some(Value::String(message)) => ApiErrors::Message(message),
            _ => raw(),
        },
    }
}

fn strings(items: Vec<Value>) -> Option<Vec<String>> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use reqwest::header::HeaderValue;
    use serde::Deserialize;

    use super::*;
    use crate::request::Method;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u64,
    }

    /// Replays canned responses and records what was sent.
    struct Scripted {
        responses: Mutex<VecDeque<RawResponse>>,
        sent: Mutex<Vec<RequestDescriptor>>,
        calls: AtomicUsize,
        policy: RetryPolicy,
    }

    impl Scripted {
        fn new(responses: Vec<RawResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                sent: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                policy: RetryPolicy {
                    max_attempts: 3,
                    base_delay: Duration::from_millis(5),
                    max_delay: Duration::from_millis(50),
                },
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RequestExecutor for Scripted {
        async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().unwrap().push(request.clone());
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left"))
        }

        fn retry_policy(&self) -> RetryPolicy {
            self.policy
        }
    }

    fn ok(body: &str) -> RawResponse {
        RawResponse::new(200, HeaderMap::new(), body)
    }

    fn ok_with_next(body: &str, page_info: &str) -> RawResponse {
        let mut headers = HeaderMap::new();
        let link = format!(
            "<https://acme.myshopify.com/admin/api/2024-01/items.json?limit=2&page_info={page_info}>; rel=\"next\""
        );
        headers.insert(LINK, HeaderValue::from_str(&link).unwrap());
        RawResponse::new(200, headers, body)
    }

    fn list_request() -> RequestDescriptor {
        RequestDescriptor::builder(Method::Get, "items.json")
            .envelope("items")
            .query("limit", 2)
            .query("status", "any")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_concatenates_pages_with_one_call_each() {
        let executor = Scripted::new(vec![
            ok_with_next(r#"{"items": [{"id": 1}, {"id": 2}]}"#, "p2"),
            ok_with_next(r#"{"items": [{"id": 3}, {"id": 4}]}"#, "p3"),
            ok(r#"{"items": [{"id": 5}]}"#),
        ]);

        let items: Vec<Item> = executor.execute_all(list_request()).await.unwrap();

        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(executor.calls(), 3);

        let sent = executor.sent.lock().unwrap();
        assert_eq!(sent[0].query().len(), 2);
        assert_eq!(
            sent[1].query(),
            &[
                ("limit".to_string(), "2".to_string()),
                ("page_info".to_string(), "p2".to_string()),
            ]
        );
        assert_eq!(sent[2].query()[1].1, "p3");
    }

    #[tokio::test]
    async fn test_list_is_lazy() {
        let executor = Scripted::new(vec![
            ok_with_next(r#"{"items": [{"id": 1}, {"id": 2}]}"#, "p2"),
            ok(r#"{"items": [{"id": 3}]}"#),
        ]);

        let mut stream = executor.execute_list::<Item>(list_request());
        assert_eq!(executor.calls(), 0);

        assert_eq!(stream.next().await.unwrap().unwrap().id, 1);
        assert_eq!(stream.next().await.unwrap().unwrap().id, 2);
        assert_eq!(executor.calls(), 1);

        assert_eq!(stream.next().await.unwrap().unwrap().id, 3);
        assert_eq!(executor.calls(), 2);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_repeated_cursor_is_protocol_mismatch() {
        let executor = Scripted::new(vec![
            ok_with_next(r#"{"items": [{"id": 1}]}"#, "same"),
            ok_with_next(r#"{"items": [{"id": 2}]}"#, "same"),
        ]);

        let err = executor
            .execute_all::<Item>(list_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ShopifyError::ProtocolMismatch(_)));
        assert_eq!(executor.calls(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("0.02"));
        let executor = Scripted::new(vec![
            RawResponse::new(429, headers, r#"{"errors": "Exceeded 2 calls per second"}"#),
            ok(r#"{"item": {"id": 9}}"#),
        ]);

        let request = RequestDescriptor::builder(Method::Get, "items/9.json")
            .envelope("item")
            .build()
            .unwrap();

        let started = std::time::Instant::now();
        let item: Item = executor.execute(request).await.unwrap();

        assert_eq!(item, Item { id: 9 });
        assert_eq!(executor.calls(), 2);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_rate_limit_exhausted() {
        let limited = || RawResponse::new(429, HeaderMap::new(), "");
        let executor = Scripted::new(vec![limited(), limited(), limited()]);

        let request = RequestDescriptor::builder(Method::Get, "items/9.json")
            .envelope("item")
            .build()
            .unwrap();

        let err = executor.execute::<Item>(request).await.unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(err.status(), Some(429));
        assert_eq!(executor.calls(), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_request_failed() {
        let executor = Scripted::new(vec![RawResponse::new(
            404,
            HeaderMap::new(),
            r#"{"errors":"Not Found"}"#,
        )]);

        let request = RequestDescriptor::builder(Method::Get, "items/1.json")
            .envelope("item")
            .build()
            .unwrap();

        let err = executor.execute::<Item>(request).await.unwrap_err();
        let failure = err.failure().expect("request failure");
        assert_eq!(failure.status, 404);
        assert_eq!(failure.messages(), vec!["Not Found".to_string()]);
        assert_eq!(executor.calls(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        struct Cancelled {
            inner: Scripted,
            token: CancellationToken,
        }

        #[async_trait]
        impl RequestExecutor for Cancelled {
            async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse> {
                std::future::pending::<()>().await;
                self.inner.send(request).await
            }

            fn cancellation(&self) -> Option<&CancellationToken> {
                Some(&self.token)
            }
        }

        let executor = Cancelled {
            inner: Scripted::new(vec![]),
            token: CancellationToken::new(),
        };
        executor.token.cancel();

        let err = executor.execute_all::<Item>(list_request()).await.unwrap_err();
        assert!(matches!(err, ShopifyError::Cancelled));
    }

    /// Fails every send at the transport layer.
    struct Unreachable {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RequestExecutor for Unreachable {
        async fn send(&self, _request: &RequestDescriptor) -> Result<RawResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let err = reqwest::Client::new()
                .get("not a url")
                .build()
                .unwrap_err();
            Err(err.into())
        }

        fn retry_policy(&self) -> RetryPolicy {
            RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
            }
        }
    }

    #[tokio::test]
    async fn test_get_transport_error_retried_until_exhausted() {
        let executor = Unreachable {
            calls: AtomicUsize::new(0),
        };

        let request = RequestDescriptor::builder(Method::Get, "items/9.json")
            .envelope("item")
            .build()
            .unwrap();

        let err = executor.execute::<Item>(request).await.unwrap_err();
        assert!(matches!(err, ShopifyError::TransportError(_)));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_post_transport_error_sent_once() {
        let executor = Unreachable {
            calls: AtomicUsize::new(0),
        };

        let request = RequestDescriptor::builder(Method::Post, "items.json")
            .envelope("item")
            .body(&serde_json::json!({"name": "Lemongrass"}))
            .build()
            .unwrap();

        let err = executor.execute::<Item>(request).await.unwrap_err();
        assert!(matches!(err, ShopifyError::TransportError(_)));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_error_body_shapes() {
        assert_eq!(
            parse_error_body(r#"{"errors":"Not Found"}"#),
            ApiErrors::Message("Not Found".to_string())
        );
        assert_eq!(
            parse_error_body(r#"{"errors":["a","b"]}"#),
            ApiErrors::Messages(vec!["a".to_string(), "b".to_string()])
        );

        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), vec!["can't be blank".to_string()]);
        fields.insert("role".to_string(), vec!["is invalid".to_string()]);
        assert_eq!(
            parse_error_body(r#"{"errors":{"name":["can't be blank"],"role":"is invalid"}}"#),
            ApiErrors::Fields(fields)
        );

        assert_eq!(
            parse_error_body(r#"{"error":"invalid_request"}"#),
            ApiErrors::Message("invalid_request".to_string())
        );
    }

    #[test]
    fn test_parse_error_body_falls_back_to_raw() {
        assert_eq!(
            parse_error_body("<html>Bad Gateway</html>"),
            ApiErrors::Raw("<html>Bad Gateway</html>".to_string())
        );
        assert_eq!(
            parse_error_body(r#"{"errors": 42}"#),
            ApiErrors::Raw(r#"{"errors": 42}"#.to_string())
        );
    }
}
