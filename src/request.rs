//! Request descriptors and the builder that validates them.
//!
//! A [`RequestDescriptor`] is plain data: it describes one call to the API
//! without touching the network. Resource services build one per operation
//! and hand it to a [`RequestExecutor`](crate::RequestExecutor).

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::envelope;
use crate::error::{Result, ShopifyError};
use crate::pagination::PageCursor;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Whether requests with this method must carry a body.
    pub fn requires_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    /// Whether a failed send can be repeated without side effects.
    pub fn is_safe(self) -> bool {
        self == Self::Get
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A validated, immutable description of one API call.
///
/// The path is relative to the versioned API root, e.g. `themes/12.json`.
/// When a body is present it is already wrapped in its envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    envelope_key: Option<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl RequestDescriptor {
    /// Start building a request.
    pub fn builder(method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, path)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Key the response body is wrapped under, if any.
    pub fn envelope_key(&self) -> Option<&str> {
        self.envelope_key.as_deref()
    }

    /// Query parameters in the order they will be sent.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Enveloped JSON body.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Derive the request for the page `cursor` points at.
    ///
    /// Method, path and envelope key are kept; the query is replaced by the
    /// cursor's parameters since Shopify rejects filters alongside `page_info`.
    pub fn with_cursor(&self, cursor: &PageCursor) -> Self {
        Self {
            method: self.method,
            path: self.path.clone(),
            envelope_key: self.envelope_key.clone(),
            query: cursor.params().to_vec(),
            body: self.body.clone(),
        }
    }
}

/// Builder for [`RequestDescriptor`].
///
/// Validation is deferred to [`RequestBuilder::build`] so calls can be
/// chained.
///
/// # Example
///
/// ```
/// use shopapi::{Method, RequestDescriptor};
///
/// # fn main() -> shopapi::Result<()> {
/// let request = RequestDescriptor::builder(Method::Get, "themes.json")
///     .envelope("themes")
///     .query("fields", "id,name")
///     .build()?;
///
/// assert_eq!(request.query().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    envelope_key: Option<String>,
    query: Vec<(String, String)>,
    body: Option<Result<Map<String, Value>>>,
    extra: Vec<(String, Result<Value>)>,
}

impl RequestBuilder {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            envelope_key: None,
            query: Vec::new(),
            body: None,
            extra: Vec::new(),
        }
    }

    /// Key used to wrap the body and unwrap the response.
    pub fn envelope(mut self, key: impl Into<String>) -> Self {
        self.envelope_key = Some(key.into());
        self
    }

    /// Append a query parameter. Repeated keys are kept.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append several query parameters in order.
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the entity sent as the request body.
    pub fn body<T: Serialize + ?Sized>(mut self, entity: &T) -> Self {
        self.body = Some(envelope::to_object(entity));
        self
    }

    /// Add a member next to the entity's own fields inside the envelope.
    ///
    /// `None`-like values (`null`) are skipped like any other unset field.
    pub fn body_field<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Self {
        let value = serde_json::to_value(value).map_err(|e| {
            ShopifyError::InvalidArgument(format!("body field could not be serialized: {e}"))
        });
        self.extra.push((name.into(), value));
        self
    }

    /// Validate and produce the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::InvalidArgument`] if the path is empty, the
    /// method and body disagree, a body has no envelope key, or the body does
    /// not serialize to a JSON object.
    pub fn build(self) -> Result<RequestDescriptor> {
        let path = self.path.trim_start_matches('/').to_string();
        if path.is_empty() {
            return Err(ShopifyError::InvalidArgument(
                "request path must not be empty".to_string(),
            ));
        }

        if self.body.is_none() && !self.extra.is_empty() {
            return Err(ShopifyError::InvalidArgument(format!(
                "{} {path}: body fields were given without a body",
                self.method
            )));
        }

        match (self.method.requires_body(), self.body.is_some()) {
            (true, false) => {
                return Err(ShopifyError::InvalidArgument(format!(
                    "{} {path} requires a body",
                    self.method
                )))
            }
            (false, true) => {
                return Err(ShopifyError::InvalidArgument(format!(
                    "{} {path} must not carry a body",
                    self.method
                )))
            }
            _ => {}
        }

        let body = match self.body {
            Some(object) => {
                let key = self.envelope_key.as_deref().ok_or_else(|| {
                    ShopifyError::InvalidArgument(format!(
                        "{} {path}: a body requires an envelope key",
                        self.method
                    ))
                })?;

                let mut object = object?;
                for (name, value) in self.extra {
                    let value = value?;
                    if !value.is_null() {
                        object.insert(name, value);
                    }
                }
                Some(envelope::wrap(object, key)?)
            }
            None => None,
        };

        Ok(RequestDescriptor {
            method: self.method,
            path,
            envelope_key: self.envelope_key,
            query: self.query,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_without_body() {
        let request = RequestDescriptor::builder(Method::Get, "themes/1.json")
            .envelope("theme")
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.path(), "themes/1.json");
        assert_eq!(request.envelope_key(), Some("theme"));
        assert!(request.body().is_none());
    }

    #[test]
    fn test_query_keeps_order_and_duplicates() {
        let request = RequestDescriptor::builder(Method::Get, "themes.json")
            .query("ids", 3)
            .query("role", "main")
            .query_pairs([("ids", "1")])
            .build()
            .unwrap();

        let keys: Vec<&str> = request.query().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["ids", "role", "ids"]);
        assert_eq!(request.query()[2].1, "1");
    }

    #[test]
    fn test_put_without_body_is_invalid() {
        let err = RequestDescriptor::builder(Method::Put, "themes/1.json")
            .envelope("theme")
            .build()
            .unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidArgument(_)));

        let err = RequestDescriptor::builder(Method::Post, "themes.json")
            .envelope("theme")
            .build()
            .unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidArgument(_)));
    }

    #[test]
    fn test_delete_with_body_is_invalid() {
        let err = RequestDescriptor::builder(Method::Delete, "themes/1.json")
            .envelope("theme")
            .body(&json!({"id": 1}))
            .build()
            .unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidArgument(_)));
    }

    #[test]
    fn test_body_requires_envelope_key() {
        let err = RequestDescriptor::builder(Method::Post, "themes.json")
            .body(&json!({"name": "Dawn"}))
            .build()
            .unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidArgument(_)));
    }

    #[test]
    fn test_body_is_enveloped_with_extra_fields() {
        let request = RequestDescriptor::builder(Method::Post, "themes.json")
            .envelope("theme")
            .body(&json!({"name": "Dawn", "role": null}))
            .body_field("src", "https://example.com/dawn.zip")
            .body_field("skipped", Option::<String>::None)
            .build()
            .unwrap();

        assert_eq!(
            request.body(),
            Some(&json!({
                "theme": { "name": "Dawn", "src": "https://example.com/dawn.zip" }
            }))
        );
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let err = RequestDescriptor::builder(Method::Get, "/").build().unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidArgument(_)));
    }

    #[test]
    fn test_with_cursor_replaces_query() {
        let request = RequestDescriptor::builder(Method::Get, "themes.json")
            .envelope("themes")
            .query("role", "main")
            .query("limit", 2)
            .build()
            .unwrap();

        let cursor = PageCursor::new("abc", vec![("limit".into(), "2".into())]);
        let next = request.with_cursor(&cursor);

        assert_eq!(next.path(), "themes.json");
        assert_eq!(next.envelope_key(), Some("themes"));
        assert_eq!(
            next.query(),
            &[
                ("limit".to_string(), "2".to_string()),
                ("page_info".to_string(), "abc".to_string()),
            ]
        );
    }
}
