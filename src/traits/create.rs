//! Create trait for new entities.

use async_trait::async_trait;

use crate::error::Result;
use crate::executor::RequestExecutor;

/// Create a new entity.
///
/// # Example
///
/// ```ignore
/// use shopapi::{ShopifyClient, Theme, ThemeCreate, Create};
///
/// let client = ShopifyClient::from_env()?;
/// let theme = Theme::create(
///     &client,
///     ThemeCreate {
///         theme: Theme { name: Some("Lemongrass".into()), ..Default::default() },
///         src: Some("https://example.com/lemongrass.zip".into()),
///     },
/// ).await?;
/// ```
#[async_trait]
pub trait Create: Sized {
    /// Everything the create call needs besides the client.
    type Params: Send;

    /// Create the entity and return it as stored by Shopify.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    async fn create<E: RequestExecutor>(client: &E, params: Self::Params) -> Result<Self>;
}
