//! Count trait for collection sizes.

use async_trait::async_trait;

use crate::error::Result;
use crate::executor::RequestExecutor;

/// Count the entities in a collection.
#[async_trait]
pub trait Count {
    /// Identifies the collection (e.g. the parent order ID).
    type Scope: Send;

    /// Return the number of entities in the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn count<E: RequestExecutor>(client: &E, scope: Self::Scope) -> Result<u64>;
}
