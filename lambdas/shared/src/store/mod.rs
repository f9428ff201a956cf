//! Store traits
//!
//! Handlers depend on these traits rather than on [`crate::DynamoClient`]
//! directly, so the same business logic runs against DynamoDB in Lambda and
//! against the in-memory stores in tests. Every operation is a single-key
//! read or write; no operation spans more than one item.

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{Connection, Group, Image};

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

/// Persistence for groups
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// All groups, order unspecified
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Insert a group
    async fn put_group(&self, group: &Group) -> Result<()>;

    /// Point lookup by id
    async fn group_exists(&self, group_id: &str) -> Result<bool>;
}

/// Persistence for image records
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Insert an image keyed by (group_id, timestamp). An occupied key is
    /// [`Error::ImageAlreadyExists`](crate::errors::Error::ImageAlreadyExists)
    /// and leaves the stored image untouched.
    async fn put_image(&self, image: &Image) -> Result<()>;

    /// Images of a group, newest first
    async fn images_for_group(&self, group_id: &str) -> Result<Vec<Image>>;

    /// Lookup through the image id index
    async fn get_image(&self, image_id: &str) -> Result<Option<Image>>;
}

/// Registry of open WebSocket connections
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Insert or overwrite a connection
    async fn put_connection(&self, connection: &Connection) -> Result<()>;

    /// Remove a connection; removing an unknown id succeeds
    async fn delete_connection(&self, connection_id: &str) -> Result<()>;

    async fn get_connection(&self, connection_id: &str) -> Result<Option<Connection>>;

    async fn list_connections(&self) -> Result<Vec<Connection>>;
}
