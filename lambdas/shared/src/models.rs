//! Domain models for Udagram
//!
//! These types represent the core entities in the system:
//! - Groups: Named collections owned by a user
//! - Images: Records describing uploaded photos, keyed by group and time
//! - Connections: Open WebSocket channels for push notifications
//!
//! Field names on the wire and in DynamoDB are camelCase.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Image attributes owned by the system, never taken from a request body
pub const RESERVED_IMAGE_FIELDS: [&str; 4] = ["groupId", "timestamp", "imageId", "imageUrl"];

/// Current instant as ISO-8601 with millisecond precision, e.g.
/// `2024-03-01T12:00:00.000Z`. Used as the images table sort key.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A named collection of images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Unique group identifier (UUID v4)
    pub id: String,
    /// Subject of the token that created the group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub description: String,
}

/// Request to create a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: String,
}

/// An image record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Group the image belongs to (partition key)
    pub group_id: String,
    /// Creation time, ISO-8601 (sort key)
    pub timestamp: String,
    /// Unique image identifier (secondary index key)
    pub image_id: String,
    /// Public URL of the original object
    pub image_url: String,
    /// Caller-supplied fields, e.g. `title`
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Response after creating an image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageResponse {
    pub new_item: Image,
    /// Pre-signed PUT URL for the original object
    pub upload_url: String,
}

/// An open WebSocket connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// API Gateway connection id
    pub id: String,
    /// Connect time, ISO-8601
    pub timestamp: String,
}

impl Connection {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: iso_timestamp(),
        }
    }
}

/// Collection response body, `{"items": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

impl<T> ItemsResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
