//! Shopify Admin REST API client library.
//!
//! A Rust library for the Shopify Admin REST API using a trait-based
//! architecture where each operation (Get, List, Create, Update, Delete,
//! Count) is defined as a trait that entity types implement. All of them
//! run through one request engine that handles the JSON envelope, cursor
//! pagination, rate-limit retry and error decoding.
//!
//! # Quick Start
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use shopapi::{Fulfillment, Get, List, ListOptions, ShopifyClient, Theme};
//!
//! #[tokio::main]
//! async fn main() -> shopapi::Result<()> {
//!     // Create client from environment variables
//!     let client = ShopifyClient::from_env()?;
//!
//!     // Get a theme by ID, restricted to a few fields
//!     let theme = Theme::get(&client, 828155753, Some("id,name,role")).await?;
//!     println!("Theme: {:?}", theme.name);
//!
//!     // List all themes
//!     let themes = Theme::list_all(&client, &ListOptions::default()).await?;
//!     println!("Found {} themes", themes.len());
//!
//!     // Stream an order's fulfillments, fetching pages on demand
//!     let query = (450789469, ListOptions::with_limit(50));
//!     let mut fulfillments = Fulfillment::list(&client, &query)?;
//!     while let Some(fulfillment) = fulfillments.try_next().await? {
//!         println!("{:?} {:?}", fulfillment.id, fulfillment.status);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`RequestDescriptor`] - an immutable, validated description of one call,
//!   built with [`RequestDescriptor::builder`]
//! - [`envelope`] - wraps bodies as `{"theme": {...}}` and unwraps responses
//! - [`RequestExecutor`] - sends descriptors; retries 429s, decodes
//!   envelopes, follows `Link` pagination lazily
//! - [`ShopifyClient`] - the reqwest-backed executor
//!
//! Each entity type (like [`Theme`] or [`Fulfillment`]) implements the
//! operation traits its endpoints support.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `SHOPIFY_SHOP` (required) - Shop name, domain, or origin URL
//! - `SHOPIFY_ACCESS_TOKEN` (required) - Admin API access token
//! - `SHOPIFY_API_VERSION` (optional) - API version (defaults to `2024-01`)

mod client;
pub mod envelope;
mod error;
mod executor;
mod models;
mod pagination;
mod request;
mod retry;
mod traits;

pub mod cli;
pub mod output;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::{ShopifyClient, ACCESS_TOKEN_HEADER, DEFAULT_API_VERSION};
pub use error::{ApiErrors, FailureReason, RequestFailure, Result, ShopifyError};
pub use executor::{RawResponse, RequestExecutor};
pub use pagination::{
    parse_link_header, LinkCursors, ListStream, Page, PageCursor, MAX_PAGE_SIZE, PAGE_INFO_PARAM,
};
pub use request::{Method, RequestBuilder, RequestDescriptor};
pub use retry::{CancellationToken, RetryPolicy};

// Re-export traits
pub use traits::{Count, Create, Delete, Get, List, Update};

// Re-export models
pub use models::{
    // Shared
    ListOptions,
    // Theme types
    Theme,
    ThemeCreate,
    ThemeRole,
    // Fulfillment types
    Fulfillment,
    FulfillmentCreate,
    FulfillmentQuery,
    FulfillmentStatus,
    LineItem,
};
