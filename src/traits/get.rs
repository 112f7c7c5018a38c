//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::error::Result;
use crate::executor::RequestExecutor;

/// Fetch a single entity by ID.
///
/// # Example
///
/// ```ignore
/// use shopapi::{ShopifyClient, Theme, Get};
///
/// let client = ShopifyClient::from_env()?;
/// let theme = Theme::get(&client, 828155753, Some("id,name,role")).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this entity.
    type Id: Send;

    /// Fetch the entity by ID.
    ///
    /// # Arguments
    ///
    /// * `client` - The request executor
    /// * `id` - The entity identifier
    /// * `fields` - Optional comma-separated list of fields to return
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn get<E: RequestExecutor>(
        client: &E,
        id: Self::Id,
        fields: Option<&str>,
    ) -> Result<Self>;
}
