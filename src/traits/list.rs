//! List trait for fetching collections of entities.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::pagination::{ListStream, Page, PageCursor};
use crate::request::RequestDescriptor;

/// List entities with cursor pagination.
///
/// Implementors only describe the first request; paging is shared.
///
/// # Example
///
/// ```ignore
/// use shopapi::{ShopifyClient, Theme, List};
///
/// let client = ShopifyClient::from_env()?;
///
/// // Fetch a single page
/// let page = Theme::list_page(&client, &Default::default()).await?;
///
/// // Stream every theme, one page at a time
/// let mut themes = Theme::list(&client, &Default::default())?;
/// while let Some(theme) = themes.try_next().await? {
///     println!("{:?}", theme.name);
/// }
/// ```
#[async_trait]
pub trait List: DeserializeOwned + Send + Sized {
    /// Query parameters for filtering.
    type Query: Default + Send + Sync;

    /// Describe the request for the first page.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is invalid.
    fn list_request(query: &Self::Query) -> Result<RequestDescriptor>;

    /// Fetch the first page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page<E: RequestExecutor>(client: &E, query: &Self::Query) -> Result<Page<Self>> {
        client.execute_page(Self::list_request(query)?).await
    }

    /// Fetch the page `cursor` points at.
    ///
    /// `query` must be the one the cursor came from; it supplies the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn next_page<E: RequestExecutor>(
        client: &E,
        query: &Self::Query,
        cursor: &PageCursor,
    ) -> Result<Page<Self>> {
        let request = Self::list_request(query)?.with_cursor(cursor);
        client.execute_page(request).await
    }

    /// Lazily stream every entity matching the query.
    ///
    /// Each call starts over from the first page.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is invalid; request failures surface
    /// through the stream.
    fn list<'a, E: RequestExecutor>(
        client: &'a E,
        query: &Self::Query,
    ) -> Result<ListStream<'a, Self>>
    where
        Self: 'a,
    {
        Ok(client.execute_list(Self::list_request(query)?))
    }

    /// List all entities matching the query (fetches all pages).
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    async fn list_all<E: RequestExecutor>(client: &E, query: &Self::Query) -> Result<Vec<Self>> {
        client.execute_all(Self::list_request(query)?).await
    }
}
