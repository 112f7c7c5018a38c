//! Query options shared by list endpoints.

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::error::{Result, ShopifyError};
use crate::pagination::MAX_PAGE_SIZE;

/// Filters accepted by Shopify list endpoints.
///
/// Unset fields are not sent. Shopify ignores filters on follow-up pages,
/// where only the cursor and page size apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Page size, 1 to 250. Shopify defaults to 50.
    pub limit: Option<u32>,
    /// Only return entities with an ID greater than this.
    pub since_id: Option<u64>,
    /// Comma-separated list of fields to return.
    pub fields: Option<String>,
    pub created_at_min: Option<DateTime<FixedOffset>>,
    pub created_at_max: Option<DateTime<FixedOffset>>,
    pub updated_at_min: Option<DateTime<FixedOffset>>,
    pub updated_at_max: Option<DateTime<FixedOffset>>,
}

impl ListOptions {
    /// Options with only a page size.
    #[must_use]
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Render the options as ordered query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::InvalidArgument`] if `limit` is outside 1..=250.
    pub fn to_query(&self) -> Result<Vec<(String, String)>> {
        let mut query = Vec::new();

        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_PAGE_SIZE {
                return Err(ShopifyError::InvalidArgument(format!(
                    "limit must be between 1 and {MAX_PAGE_SIZE}, got {limit}"
                )));
            }
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(since_id) = self.since_id {
            query.push(("since_id".to_string(), since_id.to_string()));
        }
        if let Some(fields) = self.fields.as_deref().filter(|f| !f.is_empty()) {
            query.push(("fields".to_string(), fields.to_string()));
        }

        let dates = [
            ("created_at_min", &self.created_at_min),
            ("created_at_max", &self.created_at_max),
            ("updated_at_min", &self.updated_at_min),
            ("updated_at_max", &self.updated_at_max),
        ];
        for (name, value) in dates {
            if let Some(value) = value {
                query.push((
                    name.to_string(),
                    value.to_rfc3339_opts(SecondsFormat::Secs, false),
                ));
            }
        }

        Ok(query)
    }
}
