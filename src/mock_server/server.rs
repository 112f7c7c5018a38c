//! Mock Shopify Admin API server.
//!
//! Provides an axum-based HTTP server that simulates the Shopify Admin REST API.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::MockState;

/// A mock Shopify Admin API server for testing.
///
/// The server runs in the background and can be used to test the Shopify
/// client against a realistic API implementation, including `Link` header
/// pagination and injected rate limiting.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's origin.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(mut state: MockState) -> Self {
        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");
        let url = format!("http://{}", addr);

        state.origin = url.clone();
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url,
            handle,
            state: shared_state,
        }
    }

    /// Get the origin of the mock server, e.g. `http://127.0.0.1:53211`.
    ///
    /// Pass it as the shop when creating a `ShopifyClient` for testing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Number of API requests received so far, including rejected ones.
    pub async fn request_count(&self) -> u64 {
        self.state.read().await.request_count
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        Self::state_from_scenario(Fixtures::default_scenario())
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let state = scenario
            .themes
            .into_iter()
            .fold(MockState::new(), MockState::with_theme);
        scenario
            .fulfillments
            .into_iter()
            .fold(state, MockState::with_fulfillment)
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // Theme routes
            .route(
                "/admin/api/:version/themes.json",
                get(handlers::list_themes).post(handlers::create_theme),
            )
            .route(
                "/admin/api/:version/themes/:file",
                get(handlers::get_theme)
                    .put(handlers::update_theme)
                    .delete(handlers::delete_theme),
            )
            // Fulfillment routes
            .route(
                "/admin/api/:version/orders/:order_id/fulfillments.json",
                get(handlers::list_fulfillments).post(handlers::create_fulfillment),
            )
            .route(
                "/admin/api/:version/orders/:order_id/fulfillments/:file",
                get(handlers::get_fulfillment).put(handlers::update_fulfillment),
            )
            .route(
                "/admin/api/:version/orders/:order_id/fulfillments/:id/:action",
                post(handlers::transition_fulfillment),
            )
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                handlers::gate,
            ))
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Get, List, ListOptions, ShopifyClient, Theme};

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        // Server should be accessible
        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");
        assert_eq!(server.request_count().await, 0);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_get_theme_with_shopify_client() {
        let server = MockServer::start().await;
        let client = ShopifyClient::new(server.url(), "test-token").unwrap();

        let theme = Theme::get(&client, 828155753, None)
            .await
            .expect("Failed to get theme");

        assert_eq!(theme.name.as_deref(), Some("Comfort"));
        assert!(theme.is_main());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_list_themes_with_shopify_client() {
        let server = MockServer::start().await;
        let client = ShopifyClient::new(server.url(), "test-token").unwrap();

        let page = Theme::list_page(&client, &ListOptions::with_limit(2))
            .await
            .expect("Failed to list themes");

        assert_eq!(page.len(), 2);
        assert!(page.has_more());
        assert_eq!(page.items[0].name.as_deref(), Some("Comfort"));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server() {
        let server = MockServer::start_empty().await;
        let client = ShopifyClient::new(server.url(), "test-token").unwrap();

        let err = Theme::get(&client, 828155753, None).await.unwrap_err();

        assert!(err.is_not_found());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_custom_state() {
        let state = MockState::new().with_theme(Fixtures::minimal_theme(
            42,
            "My Custom Theme",
            crate::ThemeRole::Development,
        ));

        let server = MockServer::with_state(state).await;
        let client = ShopifyClient::new(server.url(), "test-token").unwrap();

        let theme = Theme::get(&client, 42, None)
            .await
            .expect("Failed to get theme");

        assert_eq!(theme.name.as_deref(), Some("My Custom Theme"));

        server.shutdown().await;
    }
}
