//! Update trait for modifying entities.

use async_trait::async_trait;

use crate::error::Result;
use crate::executor::RequestExecutor;

/// Update an existing entity.
///
/// The entity carries its own identifier; only the fields that are set are
/// sent, so a mostly-empty value acts as a partial update.
///
/// # Example
///
/// ```ignore
/// use shopapi::{ShopifyClient, Theme, Update};
///
/// let client = ShopifyClient::from_env()?;
/// let updated = Theme::update(
///     &client,
///     &Theme { id: Some(828155753), name: Some("Renamed".into()), ..Default::default() },
/// ).await?;
/// ```
#[async_trait]
pub trait Update: Sized + Sync {
    /// Update the entity and return the updated version.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::InvalidArgument`](crate::ShopifyError::InvalidArgument)
    /// if the entity lacks an identifier, or an error if the request fails.
    async fn update<E: RequestExecutor>(client: &E, entity: &Self) -> Result<Self>;
}
