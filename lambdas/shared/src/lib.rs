//! Udagram Core Library
//!
//! Shared functionality for the Udagram Lambda functions including:
//! - Domain models
//! - Configuration
//! - DynamoDB and S3 access behind store traits
//! - Identity extraction for bearer tokens
//! - Group, image and connection business logic
//! - Thumbnail generation
//! - Error types

pub mod auth;
pub mod config;
pub mod connections;
pub mod dynamo;
pub mod errors;
pub mod groups;
pub mod images;
pub mod models;
pub mod schema;
pub mod storage;
pub mod store;
pub mod thumbnail;
pub mod trigger;

pub use config::{AuthPolicy, Config};
pub use dynamo::DynamoClient;
pub use errors::{Error, Result};
pub use images::ImageService;
pub use models::*;
pub use storage::{ObjectStore, S3Storage};
pub use store::{ConnectionStore, GroupStore, ImageStore};
