//! Delete trait for removing entities.

use async_trait::async_trait;

use crate::error::Result;
use crate::executor::RequestExecutor;

/// Delete an entity by ID.
#[async_trait]
pub trait Delete {
    /// The ID type for this entity.
    type Id: Send;

    /// Delete the entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn delete<E: RequestExecutor>(client: &E, id: Self::Id) -> Result<()>;
}
