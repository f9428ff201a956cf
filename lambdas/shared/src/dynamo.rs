//! DynamoDB operations for Udagram
//!
//! One table per entity:
//!
//! | Table       | Partition key | Sort key    | Index                      |
//! |-------------|---------------|-------------|----------------------------|
//! | Groups      | id            |             |                            |
//! | Images      | groupId       | timestamp   | ImageIdIndex (imageId)     |
//! | Connections | id            |             |                            |

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_item};
use std::collections::HashMap;

use crate::config::Config;
use crate::errors::{Error, Result};
use crate::models::*;
use crate::store::{ConnectionStore, GroupStore, ImageStore};

/// DynamoDB client for Udagram operations
#[derive(Clone)]
pub struct DynamoClient {
    client: Client,
    groups_table: String,
    images_table: String,
    connections_table: String,
    image_id_index: String,
}

impl DynamoClient {
    /// Create a new DynamoDB client using the configured table names
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            groups_table: config.groups_table.clone(),
            images_table: config.images_table.clone(),
            connections_table: config.connections_table.clone(),
            image_id_index: config.image_id_index.clone(),
        }
    }

    async fn put(&self, table: &str, item: HashMap<String, AttributeValue>) -> Result<()> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }
}

fn items_from<T: serde::de::DeserializeOwned>(
    items: Option<Vec<HashMap<String, AttributeValue>>>,
) -> Result<Vec<T>> {
    items
        .unwrap_or_default()
        .into_iter()
        .map(|item| from_item(item).map_err(|e| Error::DynamoSerialization(e.to_string())))
        .collect()
}

// =========================================================================
// Group Operations
// =========================================================================

#[async_trait]
impl GroupStore for DynamoClient {
    async fn list_groups(&self) -> Result<Vec<Group>> {
        let result = self
            .client
            .scan()
            .table_name(&self.groups_table)
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        items_from(result.items)
    }

    async fn put_group(&self, group: &Group) -> Result<()> {
        let item: HashMap<String, AttributeValue> =
            to_item(group).map_err(|e| Error::DynamoSerialization(e.to_string()))?;

        self.put(&self.groups_table, item).await
    }

    async fn group_exists(&self, group_id: &str) -> Result<bool> {
        let result = self
            .client
            .get_item()
            .table_name(&self.groups_table)
            .key("id", AttributeValue::S(group_id.to_string()))
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(result.item.is_some())
    }
}

// =========================================================================
// Image Operations
// =========================================================================

#[async_trait]
impl ImageStore for DynamoClient {
    async fn put_image(&self, image: &Image) -> Result<()> {
        let item: HashMap<String, AttributeValue> =
            to_item(image).map_err(|e| Error::DynamoSerialization(e.to_string()))?;

        // Same group and millisecond must not replace an earlier upload
        self.client
            .put_item()
            .table_name(&self.images_table)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(groupId)")
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("ConditionalCheckFailed") {
                    Error::ImageAlreadyExists(format!("{}@{}", image.group_id, image.timestamp))
                } else {
                    Error::Database(e.to_string())
                }
            })?;

        Ok(())
    }

    async fn images_for_group(&self, group_id: &str) -> Result<Vec<Image>> {
        let result = self
            .client
            .query()
            .table_name(&self.images_table)
            .key_condition_expression("groupId = :groupId")
            .expression_attribute_values(":groupId", AttributeValue::S(group_id.to_string()))
            .scan_index_forward(false)
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        items_from(result.items)
    }

    async fn get_image(&self, image_id: &str) -> Result<Option<Image>> {
        let result = self
            .client
            .query()
            .table_name(&self.images_table)
            .index_name(&self.image_id_index)
            .key_condition_expression("imageId = :imageId")
            .expression_attribute_values(":imageId", AttributeValue::S(image_id.to_string()))
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        match result.items.and_then(|items| items.into_iter().next()) {
            Some(item) => Ok(Some(
                from_item(item).map_err(|e| Error::DynamoSerialization(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }
}

// =========================================================================
// Connection Operations
// =========================================================================

#[async_trait]
impl ConnectionStore for DynamoClient {
    async fn put_connection(&self, connection: &Connection) -> Result<()> {
        let item: HashMap<String, AttributeValue> =
            to_item(connection).map_err(|e| Error::DynamoSerialization(e.to_string()))?;

        self.put(&self.connections_table, item).await
    }

    async fn delete_connection(&self, connection_id: &str) -> Result<()> {
        // DeleteItem on a missing key is a no-op
        self.client
            .delete_item()
            .table_name(&self.connections_table)
            .key("id", AttributeValue::S(connection_id.to_string()))
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    async fn get_connection(&self, connection_id: &str) -> Result<Option<Connection>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.connections_table)
            .key("id", AttributeValue::S(connection_id.to_string()))
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        match result.item {
            Some(item) => Ok(Some(
                from_item(item).map_err(|e| Error::DynamoSerialization(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    async fn list_connections(&self) -> Result<Vec<Connection>> {
        let result = self
            .client
            .scan()
            .table_name(&self.connections_table)
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        items_from(result.items)
    }
}
