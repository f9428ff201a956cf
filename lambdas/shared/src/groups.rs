//! Group business logic

use tracing::info;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{CreateGroupRequest, Group};
use crate::store::GroupStore;

/// All groups, order unspecified
pub async fn list_groups(store: &dyn GroupStore) -> Result<Vec<Group>> {
    store.list_groups().await
}

/// Create a group under a fresh id, owned by `user_id` when the caller
/// presented a token
pub async fn create_group(
    store: &dyn GroupStore,
    request: CreateGroupRequest,
    user_id: Option<String>,
) -> Result<Group> {
    let group = Group {
        id: Uuid::new_v4().to_string(),
        user_id,
        name: request.name,
        description: request.description,
    };

    store.put_group(&group).await?;

    info!(group_id = %group.id, "Created group");
    Ok(group)
}
