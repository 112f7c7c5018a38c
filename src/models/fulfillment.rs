//! Fulfillment model and trait implementations.
//!
//! Fulfillments live under orders, so every call is scoped by an order ID.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, ShopifyError};
use crate::executor::RequestExecutor;
use crate::models::options::ListOptions;
use crate::request::{Method, RequestDescriptor};
use crate::traits::{Count, Create, Get, List, Update};

/// A shipment of some or all line items of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fulfillment {
    /// Unique numeric identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// The order this fulfillment belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<u64>,

    /// Human-readable reference, e.g. `#1001.1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FulfillmentStatus>,

    /// Location the items ship from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<u64>,

    /// Fulfillment service handle, e.g. `manual`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Latest carrier status, e.g. `in_transit` or `delivered`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_status: Option<String>,

    /// The items shipped by this fulfillment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Vec<LineItem>>,

    /// Name of the shipping company.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_company: Option<String>,

    /// First tracking number when several exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_numbers: Option<Vec<String>>,

    /// First tracking URL when several exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_urls: Option<Vec<String>>,

    /// Receipt details from the fulfillment service.
    ///
    /// Shopify documents this only as "a text field with information about
    /// the receipt"; in practice it is an object such as
    /// `{"testcase": true, "authorization": "123456"}` but its members vary by
    /// service, so it is kept as raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Fulfillment {
    /// All tracking numbers, falling back to the single one.
    pub fn all_tracking_numbers(&self) -> Vec<&str> {
        match (&self.tracking_numbers, &self.tracking_number) {
            (Some(numbers), _) if !numbers.is_empty() => {
                numbers.iter().map(String::as_str).collect()
            }
            (_, Some(number)) => vec![number.as_str()],
            _ => Vec::new(),
        }
    }

    /// Mark a pending fulfillment as complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn complete<E: RequestExecutor>(
        client: &E,
        order_id: u64,
        id: u64,
    ) -> Result<Self> {
        Self::transition(client, order_id, id, "complete").await
    }

    /// Cancel a fulfillment.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn cancel<E: RequestExecutor>(client: &E, order_id: u64, id: u64) -> Result<Self> {
        Self::transition(client, order_id, id, "cancel").await
    }

    /// Move a fulfillment back to `open`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn open<E: RequestExecutor>(client: &E, order_id: u64, id: u64) -> Result<Self> {
        Self::transition(client, order_id, id, "open").await
    }

    #[tracing::instrument(skip(client))]
    async fn transition<E: RequestExecutor>(
        client: &E,
        order_id: u64,
        id: u64,
        action: &str,
    ) -> Result<Self> {
        let path = format!("{}/{action}.json", Self::base_path(order_id, id)?);
        let request = RequestDescriptor::builder(Method::Post, path)
            .envelope("fulfillment")
            .body(&Map::new())
            .build()?;
        client.execute(request).await
    }

    fn collection_path(order_id: u64) -> Result<String> {
        if order_id == 0 {
            return Err(ShopifyError::InvalidArgument(
                "order id is required for fulfillments".to_string(),
            ));
        }
        Ok(format!("orders/{order_id}/fulfillments"))
    }

    fn base_path(order_id: u64, id: u64) -> Result<String> {
        Ok(format!("{}/{id}", Self::collection_path(order_id)?))
    }
}

/// Status of a fulfillment.
///
/// Unrecognized statuses are kept verbatim in [`FulfillmentStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FulfillmentStatus {
    Pending,
    Open,
    Success,
    Cancelled,
    Error,
    Failure,
    Other(String),
}

impl From<String> for FulfillmentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "open" => Self::Open,
            "success" => Self::Success,
            "cancelled" => Self::Cancelled,
            "error" => Self::Error,
            "failure" => Self::Failure,
            _ => Self::Other(value),
        }
    }
}

impl From<FulfillmentStatus> for String {
    fn from(status: FulfillmentStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Open => "open",
            Self::Success => "success",
            Self::Cancelled => "cancelled",
            Self::Error => "error",
            Self::Failure => "failure",
            Self::Other(other) => other.as_str(),
        })
    }
}

/// A line item as it appears inside a fulfillment.
///
/// Only commonly used members are typed. Everything else Shopify sends
/// (tax lines, discount allocations, properties, ...) is preserved in
/// `extra`, whose shape is not guaranteed between API versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    /// Unit price as the decimal string Shopify sends, e.g. `"199.00"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grams: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_shipping: Option<bool>,

    /// Unmodelled members, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Query type for listing fulfillments: `(order_id, options)`.
pub type FulfillmentQuery = (u64, ListOptions);

/// Parameters for creating a fulfillment.
#[derive(Debug, Clone, Default)]
pub struct FulfillmentCreate {
    /// The order to fulfill.
    pub order_id: u64,
    /// Tracking details and, optionally, the line items to fulfill.
    /// Without line items every remaining item is fulfilled.
    pub fulfillment: Fulfillment,
    /// Whether Shopify emails the customer about the shipment.
    pub notify_customer: Option<bool>,
}

#[async_trait]
impl Get for Fulfillment {
    type Id = (u64, u64); // (order_id, fulfillment_id)

    #[tracing::instrument(skip(client))]
    async fn get<E: RequestExecutor>(
        client: &E,
        id: (u64, u64),
        fields: Option<&str>,
    ) -> Result<Self> {
        let (order_id, id) = id;
        let path = format!("{}.json", Self::base_path(order_id, id)?);
        let mut builder = RequestDescriptor::builder(Method::Get, path).envelope("fulfillment");
        if let Some(fields) = fields.filter(|f| !f.is_empty()) {
            builder = builder.query("fields", fields);
        }
        client.execute(builder.build()?).await
    }
}

#[async_trait]
impl List for Fulfillment {
    type Query = FulfillmentQuery;

    fn list_request((order_id, options): &FulfillmentQuery) -> Result<RequestDescriptor> {
        let path = format!("{}.json", Self::collection_path(*order_id)?);
        RequestDescriptor::builder(Method::Get, path)
            .envelope("fulfillments")
            .query_pairs(options.to_query()?)
            .build()
    }
}

#[async_trait]
impl Count for Fulfillment {
    type Scope = u64; // order_id

    #[tracing::instrument(skip(client))]
    async fn count<E: RequestExecutor>(client: &E, order_id: u64) -> Result<u64> {
        let path = format!("{}/count.json", Self::collection_path(order_id)?);
        let request = RequestDescriptor::builder(Method::Get, path)
            .envelope("count")
            .build()?;
        client.execute(request).await
    }
}

#[async_trait]
impl Create for Fulfillment {
    type Params = FulfillmentCreate;

    #[tracing::instrument(skip(client, params), fields(order_id = params.order_id))]
    async fn create<E: RequestExecutor>(client: &E, params: FulfillmentCreate) -> Result<Self> {
        let path = format!("{}.json", Self::collection_path(params.order_id)?);
        let request = RequestDescriptor::builder(Method::Post, path)
            .envelope("fulfillment")
            .body(&params.fulfillment)
            .body_field("notify_customer", params.notify_customer)
            .build()?;
        client.execute(request).await
    }
}

#[async_trait]
impl Update for Fulfillment {
    #[tracing::instrument(skip(client, entity), fields(id = ?entity.id, order_id = ?entity.order_id))]
    async fn update<E: RequestExecutor>(client: &E, entity: &Self) -> Result<Self> {
        let (Some(order_id), Some(id)) = (entity.order_id, entity.id) else {
            return Err(ShopifyError::InvalidArgument(
                "fulfillment id and order_id are required for update".to_string(),
            ));
        };
        let path = format!("{}.json", Self::base_path(order_id, id)?);
        let request = RequestDescriptor::builder(Method::Put, path)
            .envelope("fulfillment")
            .body(entity)
            .build()?;
        client.execute(request).await
    }
}
