//! Image records and the upload flow
//!
//! Creating an image writes its record and hands back a pre-signed URL for
//! the original object. Nothing checks that the client ever uploads; the
//! record exists either way.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{Error, Result};
use crate::models::{iso_timestamp, CreateImageResponse, Image, RESERVED_IMAGE_FIELDS};
use crate::schema::{self, RequestSchema};
use crate::storage::ObjectStore;
use crate::store::{GroupStore, ImageStore};

/// Image operations over the group, image and object stores
#[derive(Clone)]
pub struct ImageService {
    groups: Arc<dyn GroupStore>,
    images: Arc<dyn ImageStore>,
    objects: Arc<dyn ObjectStore>,
    config: Arc<Config>,
}

impl ImageService {
    pub fn new(
        groups: Arc<dyn GroupStore>,
        images: Arc<dyn ImageStore>,
        objects: Arc<dyn ObjectStore>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            groups,
            images,
            objects,
            config,
        }
    }

    /// Create an image record in `group_id` from a request body, then issue
    /// its upload URL. A missing group is rejected before any write.
    pub async fn create_image(&self, group_id: &str, body: Value) -> Result<CreateImageResponse> {
        schema::validate(RequestSchema::CreateImage, &body)?;

        let mut attributes = match body {
            Value::Object(map) => map,
            _ => return Err(Error::Validation("request body must be a JSON object".to_string())),
        };
        for field in RESERVED_IMAGE_FIELDS {
            attributes.remove(field);
        }

        if !self.groups.group_exists(group_id).await? {
            return Err(Error::GroupNotFound(group_id.to_string()));
        }

        let image_id = Uuid::new_v4().to_string();
        let image = Image {
            group_id: group_id.to_string(),
            timestamp: iso_timestamp(),
            image_url: self.config.image_url(&image_id),
            image_id,
            attributes,
        };

        self.images.put_image(&image).await?;
        info!(group_id = %group_id, image_id = %image.image_id, "Stored new image");

        let upload_url = self.issue_upload_url(&image.image_id).await?;

        Ok(CreateImageResponse {
            new_item: image,
            upload_url,
        })
    }

    /// Pre-signed PUT URL for the original object named `image_id`
    pub async fn issue_upload_url(&self, image_id: &str) -> Result<String> {
        self.objects
            .presign_put(&self.config.images_bucket, image_id, self.url_expiration())
            .await
    }

    /// Images of an existing group, newest first
    pub async fn images_for_group(&self, group_id: &str) -> Result<Vec<Image>> {
        if !self.groups.group_exists(group_id).await? {
            return Err(Error::GroupNotFound(group_id.to_string()));
        }

        self.images.images_for_group(group_id).await
    }

    pub async fn get_image(&self, image_id: &str) -> Result<Image> {
        self.images
            .get_image(image_id)
            .await?
            .ok_or_else(|| Error::ImageNotFound(image_id.to_string()))
    }

    fn url_expiration(&self) -> Duration {
        self.config.signed_url_expiration
    }
}
