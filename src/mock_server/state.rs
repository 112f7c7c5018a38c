//! Mock server state management.
//!
//! Provides the in-memory shop backing the mock Shopify Admin API server.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::{Fulfillment, FulfillmentStatus, Theme, ThemeRole};

/// Shared state for the mock server.
///
/// Holds the shop's data plus knobs that shape how requests are answered.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Themes indexed by ID.
    pub themes: BTreeMap<u64, Theme>,

    /// Fulfillments indexed by ID. Each carries its `order_id`.
    pub fulfillments: BTreeMap<u64, Fulfillment>,

    /// Optional access token. If set, requests must send it in
    /// `X-Shopify-Access-Token`.
    pub required_token: Option<String>,

    /// Number of upcoming requests to answer with 429.
    pub rate_limited_requests: u32,

    /// `Retry-After` value sent with injected 429s.
    pub retry_after: Option<Duration>,

    /// Total number of API requests received.
    pub request_count: u64,

    /// Origin the server is reachable at, used to build `Link` headers.
    pub origin: String,

    next_id: u64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self {
            next_id: 2_000_000_000,
            ..Default::default()
        }
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a theme to the state.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        let id = theme.id.unwrap_or_else(|| self.allocate_id());
        self.themes.insert(id, Theme { id: Some(id), ..theme });
        self
    }

    /// Add a fulfillment to the state.
    pub fn with_fulfillment(mut self, fulfillment: Fulfillment) -> Self {
        let id = fulfillment.id.unwrap_or_else(|| self.allocate_id());
        self.fulfillments.insert(
            id,
            Fulfillment {
                id: Some(id),
                ..fulfillment
            },
        );
        self
    }

    /// Set the required access token.
    pub fn with_required_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    /// Answer the next `requests` calls with 429 Too Many Requests.
    pub fn with_rate_limit(mut self, requests: u32, retry_after: Option<Duration>) -> Self {
        self.rate_limited_requests = requests;
        self.retry_after = retry_after;
        self
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Get a theme by ID.
    pub fn get_theme(&self, id: u64) -> Option<&Theme> {
        self.themes.get(&id)
    }

    /// List themes in ID order, starting after `since_id`.
    pub fn list_themes(&self, since_id: Option<u64>) -> Vec<&Theme> {
        let after = since_id.unwrap_or(0);
        self.themes
            .range((Excluded(after), Unbounded))
            .map(|(_, t)| t)
            .collect()
    }

    /// Store a new theme. New themes always start unpublished.
    pub fn create_theme(&mut self, theme: Theme) -> Theme {
        let id = self.allocate_id();
        let theme = Theme {
            id: Some(id),
            role: Some(ThemeRole::Unpublished),
            previewable: Some(true),
            processing: Some(false),
            ..theme
        };
        self.themes.insert(id, theme.clone());
        theme
    }

    /// Apply the set fields of `patch` to a stored theme.
    ///
    /// Promoting a theme to `main` demotes the previous main theme.
    pub fn update_theme(&mut self, id: u64, patch: Theme) -> Option<Theme> {
        if !self.themes.contains_key(&id) {
            return None;
        }
        if patch.role == Some(ThemeRole::Main) {
            for theme in self.themes.values_mut() {
                if theme.is_main() {
                    theme.role = Some(ThemeRole::Unpublished);
                }
            }
        }

        let theme = self.themes.get_mut(&id)?;
        if let Some(name) = patch.name {
            theme.name = Some(name);
        }
        if let Some(role) = patch.role {
            theme.role = Some(role);
        }
        Some(theme.clone())
    }

    /// Remove a theme, returning it.
    pub fn delete_theme(&mut self, id: u64) -> Option<Theme> {
        self.themes.remove(&id)
    }

    /// Get a fulfillment that belongs to `order_id`.
    pub fn get_fulfillment(&self, order_id: u64, id: u64) -> Option<&Fulfillment> {
        self.fulfillments
            .get(&id)
            .filter(|f| f.order_id == Some(order_id))
    }

    /// List an order's fulfillments in ID order, starting after `since_id`.
    pub fn list_fulfillments(&self, order_id: u64, since_id: Option<u64>) -> Vec<&Fulfillment> {
        let after = since_id.unwrap_or(0);
        self.fulfillments
            .range((Excluded(after), Unbounded))
            .map(|(_, f)| f)
            .filter(|f| f.order_id == Some(order_id))
            .collect()
    }

    /// Store a new fulfillment under `order_id`.
    pub fn create_fulfillment(&mut self, order_id: u64, fulfillment: Fulfillment) -> Fulfillment {
        let id = self.allocate_id();
        let sequence = self.list_fulfillments(order_id, None).len() + 1;
        let fulfillment = Fulfillment {
            id: Some(id),
            order_id: Some(order_id),
            name: Some(format!("#{order_id}.{sequence}")),
            status: Some(FulfillmentStatus::Success),
            ..fulfillment
        };
        self.fulfillments.insert(id, fulfillment.clone());
        fulfillment
    }

    /// Apply the tracking fields of `patch` to a stored fulfillment.
    pub fn update_fulfillment(
        &mut self,
        order_id: u64,
        id: u64,
        patch: Fulfillment,
    ) -> Option<Fulfillment> {
        let fulfillment = self
            .fulfillments
            .get_mut(&id)
            .filter(|f| f.order_id == Some(order_id))?;

        if let Some(company) = patch.tracking_company {
            fulfillment.tracking_company = Some(company);
        }
        if let Some(number) = patch.tracking_number {
            fulfillment.tracking_numbers = Some(vec![number.clone()]);
            fulfillment.tracking_number = Some(number);
        }
        if let Some(numbers) = patch.tracking_numbers {
            fulfillment.tracking_number = numbers.first().cloned();
            fulfillment.tracking_numbers = Some(numbers);
        }
        if let Some(url) = patch.tracking_url {
            fulfillment.tracking_url = Some(url);
        }
        Some(fulfillment.clone())
    }

    /// Move a fulfillment to `status`.
    pub fn set_fulfillment_status(
        &mut self,
        order_id: u64,
        id: u64,
        status: FulfillmentStatus,
    ) -> Option<Fulfillment> {
        let fulfillment = self
            .fulfillments
            .get_mut(&id)
            .filter(|f| f.order_id == Some(order_id))?;
        fulfillment.status = Some(status);
        Some(fulfillment.clone())
    }
}
