//! Error types for Udagram

use thiserror::Error;

/// Result type alias using Udagram Error
pub type Result<T> = std::result::Result<T, Error>;

/// Udagram error types
#[derive(Error, Debug)]
pub enum Error {
    /// No Authorization header on the request
    #[error("No authorization header")]
    MissingHeader,

    /// Authorization header without the bearer scheme
    #[error("Invalid authorization header: {0}")]
    MalformedHeader(String),

    /// Token failed verification
    #[error("Invalid token signature: {0}")]
    InvalidSignature(String),

    /// Group not found
    #[error("Group does not exist: {0}")]
    GroupNotFound(String),

    /// Image not found
    #[error("Image does not exist: {0}")]
    ImageNotFound(String),

    /// An image already occupies the (group, timestamp) slot
    #[error("Image already exists: {0}")]
    ImageAlreadyExists(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// DynamoDB error
    #[error("Database error: {0}")]
    Database(String),

    /// JSON Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// DynamoDB serialization error
    #[error("DynamoDB serialization error: {0}")]
    DynamoSerialization(String),

    /// S3 error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Image decode or encode failure
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Secrets Manager error
    #[error("Secret store error: {0}")]
    SecretStore(String),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingHeader => "missing_header",
            Error::MalformedHeader(_) => "malformed_header",
            Error::InvalidSignature(_) => "invalid_signature",
            Error::GroupNotFound(_) => "group_not_found",
            Error::ImageNotFound(_) => "image_not_found",
            Error::ImageAlreadyExists(_) => "image_already_exists",
            Error::Validation(_) => "validation_error",
            Error::Database(_) => "database_error",
            Error::Serialization(_) => "serialization_error",
            Error::DynamoSerialization(_) => "serialization_error",
            Error::Storage(_) => "storage_error",
            Error::Image(_) => "image_error",
            Error::SecretStore(_) => "secret_store_error",
            Error::Config(_) => "config_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingHeader => 401,
            Error::MalformedHeader(_) => 401,
            Error::InvalidSignature(_) => 401,
            Error::GroupNotFound(_) => 404,
            Error::ImageNotFound(_) => 404,
            Error::ImageAlreadyExists(_) => 409,
            Error::Validation(_) => 400,
            Error::Database(_) => 500,
            Error::Serialization(_) => 400,
            Error::DynamoSerialization(_) => 500,
            Error::Storage(_) => 500,
            Error::Image(_) => 500,
            Error::SecretStore(_) => 500,
            Error::Config(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// True for the identity extraction failures
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::MissingHeader | Error::MalformedHeader(_) | Error::InvalidSignature(_)
        )
    }
}
