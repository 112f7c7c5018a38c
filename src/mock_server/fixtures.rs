//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use chrono::{DateTime, FixedOffset};

use crate::{Fulfillment, FulfillmentStatus, LineItem, Theme, ThemeRole};

/// Order that owns the default fulfillments.
pub const DEFAULT_ORDER_ID: u64 = 450789469;

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Theme Fixtures
    // =========================================================================

    /// Create a theme with only an ID, name and role.
    pub fn minimal_theme(id: u64, name: &str, role: ThemeRole) -> Theme {
        Theme {
            id: Some(id),
            name: Some(name.to_string()),
            role: Some(role),
            ..Default::default()
        }
    }

    /// Create a fully populated, previewable theme.
    pub fn theme(id: u64, name: &str, role: ThemeRole) -> Theme {
        Theme {
            previewable: Some(true),
            processing: Some(false),
            created_at: Some(timestamp("2024-01-02T11:44:56-05:00")),
            updated_at: Some(timestamp("2024-01-02T11:44:56-05:00")),
            ..Self::minimal_theme(id, name, role)
        }
    }

    // =========================================================================
    // Fulfillment Fixtures
    // =========================================================================

    /// Create a fulfillment with only IDs and a status.
    pub fn minimal_fulfillment(order_id: u64, id: u64, status: FulfillmentStatus) -> Fulfillment {
        Fulfillment {
            id: Some(id),
            order_id: Some(order_id),
            status: Some(status),
            ..Default::default()
        }
    }

    /// Create a shipped fulfillment with tracking and one line item.
    pub fn shipped_fulfillment(
        order_id: u64,
        id: u64,
        sequence: u32,
        tracking_number: &str,
    ) -> Fulfillment {
        Fulfillment {
            name: Some(format!("#{order_id}.{sequence}")),
            location_id: Some(24826418),
            service: Some("manual".to_string()),
            tracking_company: Some("UPS".to_string()),
            tracking_number: Some(tracking_number.to_string()),
            tracking_numbers: Some(vec![tracking_number.to_string()]),
            tracking_url: Some(format!(
                "https://www.ups.com/WebTracking?loc=en_US&requester=ST&trackNums={tracking_number}"
            )),
            line_items: Some(vec![Self::line_item(466157049, "IPod Nano - 8gb", 1)]),
            created_at: Some(timestamp("2024-01-02T11:44:56-05:00")),
            updated_at: Some(timestamp("2024-01-02T11:44:56-05:00")),
            ..Self::minimal_fulfillment(order_id, id, FulfillmentStatus::Success)
        }
    }

    /// Create a line item.
    pub fn line_item(id: u64, title: &str, quantity: u32) -> LineItem {
        LineItem {
            id: Some(id),
            title: Some(title.to_string()),
            quantity: Some(quantity),
            price: Some("199.00".to_string()),
            requires_shipping: Some(true),
            ..Default::default()
        }
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    /// A small shop: three themes and two fulfillments on one order.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario::new()
    }
}

fn timestamp(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).unwrap_or_default()
}

/// Pre-built shop data used by [`MockServer::start`](super::MockServer::start).
pub struct DefaultScenario {
    pub themes: Vec<Theme>,
    pub fulfillments: Vec<Fulfillment>,
}

impl DefaultScenario {
    fn new() -> Self {
        Self {
            themes: vec![
                Fixtures::theme(828155753, "Comfort", ThemeRole::Main),
                Fixtures::theme(976877075, "Speed", ThemeRole::Unpublished),
                Fixtures::minimal_theme(1_000_000_001, "Preview", ThemeRole::Demo),
            ],
            fulfillments: vec![
                Fixtures::shipped_fulfillment(DEFAULT_ORDER_ID, 255858046, 1, "1Z2345"),
                Fixtures::shipped_fulfillment(DEFAULT_ORDER_ID, 255858047, 2, "1Z6789"),
            ],
        }
    }
}
