//! Mock Shopify Admin API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the Shopify
//! Admin REST API for integration and end-to-end testing. Unlike wiremock
//! which mocks at the HTTP level per-test, this server maintains state across
//! requests, enabling realistic workflow testing.
//!
//! # Example
//!
//! ```ignore
//! use shopapi::mock_server::MockServer;
//! use shopapi::{Get, ShopifyClient, Theme};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = ShopifyClient::new(server.url(), "test-token").unwrap();
//!
//!     // Server comes with default fixtures
//!     let theme = Theme::get(&client, 828155753, None).await.unwrap();
//!     assert_eq!(theme.name.as_deref(), Some("Comfort"));
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures, DEFAULT_ORDER_ID};
pub use server::MockServer;
pub use state::MockState;
