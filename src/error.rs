//! Error types for Shopify API operations.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Errors that can occur during Shopify API operations.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// Configuration is missing or incomplete.
    #[error("Shopify configuration required: {0}")]
    ConfigMissing(String),

    /// Caller input was rejected before any request was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The response did not have the expected envelope or shape.
    #[error("Unexpected response shape: {0}")]
    ProtocolMismatch(String),

    /// The API answered with a non-2xx status.
    #[error("{0}")]
    RequestFailed(Box<RequestFailure>),

    /// HTTP transport error (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    TransportError(#[from] reqwest::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The caller cancelled the operation.
    #[error("Request cancelled")]
    Cancelled,

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

impl ShopifyError {
    /// HTTP status of a failed request, if the failure came from the API.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed(failure) => Some(failure.status),
            _ => None,
        }
    }

    /// Whether the request gave up after repeated 429 responses.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RequestFailed(f) if f.reason == FailureReason::RateLimited)
    }

    /// Whether the API answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The structured failure, if any.
    pub fn failure(&self) -> Option<&RequestFailure> {
        match self {
            Self::RequestFailed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<RequestFailure> for ShopifyError {
    fn from(failure: RequestFailure) -> Self {
        Self::RequestFailed(Box::new(failure))
    }
}

/// Why a request ended in [`ShopifyError::RequestFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The API rejected the request.
    Api,
    /// Every attempt was answered with 429 and the retry budget ran out.
    RateLimited,
}

/// A non-2xx response from the Shopify API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    /// HTTP status code.
    pub status: u16,
    /// Why the request failed.
    pub reason: FailureReason,
    /// Error payload parsed from the response body.
    pub errors: ApiErrors,
}

impl RequestFailure {
    /// All messages flattened, field errors rendered as `field: message`.
    pub fn messages(&self) -> Vec<String> {
        match &self.errors {
            ApiErrors::Message(message) => vec![message.clone()],
            ApiErrors::Messages(messages) => messages.clone(),
            ApiErrors::Fields(fields) => fields
                .iter()
                .flat_map(|(field, messages)| {
                    messages.iter().map(move |m| format!("{field}: {m}"))
                })
                .collect(),
            ApiErrors::Raw(_) => Vec::new(),
        }
    }

    /// Messages reported against a single field.
    pub fn field_errors(&self, field: &str) -> &[String] {
        match &self.errors {
            ApiErrors::Fields(fields) => fields.get(field).map(Vec::as_slice).unwrap_or(&[]),
            _ => &[],
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            FailureReason::Api => write!(f, "Shopify API error ({})", self.status)?,
            FailureReason::RateLimited => {
                write!(f, "Shopify API rate limited ({}), retries exhausted", self.status)?
            }
        }

        match &self.errors {
            ApiErrors::Raw(body) if body.is_empty() => Ok(()),
            ApiErrors::Raw(body) => write!(f, ": {body}"),
            _ => write!(f, ": {}", self.messages().join("; ")),
        }
    }
}

/// The `errors` payload of a failed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrors {
    /// `{"errors": "message"}`
    Message(String),
    /// `{"errors": ["message", ...]}`
    Messages(Vec<String>),
    /// `{"errors": {"field": ["message", ...]}}`
    Fields(BTreeMap<String, Vec<String>>),
    /// Body that matched none of the known shapes.
    Raw(String),
}

/// Result type alias for Shopify operations.
pub type Result<T> = core::result::Result<T, ShopifyError>;
