//! Thumbnail generation
//!
//! One object-created notification produces one thumbnail: fetch the
//! original, scale it to a fixed width keeping the aspect ratio, re-encode in
//! the original format and write it to the thumbnails bucket.
//!
//! The thumbnail key always ends in `.jpeg`, even when the re-encoded format
//! is PNG or GIF. Existing clients build thumbnail URLs from that suffix, so
//! the object's content type is the only reliable indicator of its format.

use std::io::Cursor;
use std::sync::Arc;

use image::imageops::FilterType;
use image::ImageFormat;
use tracing::info;

use crate::config::Config;
use crate::errors::{Error, Result};
use crate::storage::ObjectStore;

/// Suffix appended to the original key
pub const THUMBNAIL_SUFFIX: &str = ".jpeg";

/// Key of the thumbnail derived from `original_key`
pub fn thumbnail_key(original_key: &str) -> String {
    format!("{}{}", original_key, THUMBNAIL_SUFFIX)
}

/// An encoded thumbnail
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Height matching `target_width` for a `width` x `height` source, rounded,
/// at least one pixel
fn scaled_height(width: u32, height: u32, target_width: u32) -> Result<u32> {
    if width == 0 || height == 0 {
        return Err(Error::Validation("image has no pixels".to_string()));
    }

    let (w, h, t) = (u64::from(width), u64::from(height), u64::from(target_width));
    let scaled = ((h * t + w / 2) / w).max(1);
    u32::try_from(scaled).map_err(|_| Error::Validation(format!("scaled height {} too large", scaled)))
}

/// Decode `source`, resize to `target_width` and re-encode in the source
/// format
pub fn resize_to_width(source: &[u8], target_width: u32) -> Result<Thumbnail> {
    let format = image::guess_format(source)?;
    let original = image::load_from_memory_with_format(source, format)?;

    let height = scaled_height(original.width(), original.height(), target_width)?;
    let resized = original.resize_exact(target_width, height, FilterType::Triangle);

    let mut bytes = Cursor::new(Vec::new());
    resized.write_to(&mut bytes, format)?;

    Ok(Thumbnail {
        bytes: bytes.into_inner(),
        format,
        width: target_width,
        height,
    })
}

/// Turns uploaded originals into thumbnails
#[derive(Clone)]
pub struct ResizeWorker {
    objects: Arc<dyn ObjectStore>,
    images_bucket: String,
    thumbnails_bucket: String,
    width: u32,
}

impl ResizeWorker {
    pub fn new(objects: Arc<dyn ObjectStore>, config: &Config) -> Self {
        Self {
            objects,
            images_bucket: config.images_bucket.clone(),
            thumbnails_bucket: config.thumbnails_bucket.clone(),
            width: config.thumbnail_width,
        }
    }

    /// Produce the thumbnail for the original object `key` and return the
    /// thumbnail key. Errors propagate so the platform can redeliver.
    pub async fn process(&self, key: &str) -> Result<String> {
        info!(key = %key, bucket = %self.images_bucket, "Fetching original image");
        let original = self.objects.get_object(&self.images_bucket, key).await?;

        let width = self.width;
        let thumbnail = tokio::task::spawn_blocking(move || resize_to_width(&original, width))
            .await
            .map_err(|e| Error::Internal(format!("resize task failed: {}", e)))??;
        info!(
            key = %key,
            width = thumbnail.width,
            height = thumbnail.height,
            content_type = thumbnail.content_type(),
            "Resized image"
        );

        let target = thumbnail_key(key);
        let content_type = thumbnail.content_type();
        self.objects
            .put_object(&self.thumbnails_bucket, &target, thumbnail.bytes, content_type)
            .await?;

        info!(key = %target, bucket = %self.thumbnails_bucket, "Wrote thumbnail");
        Ok(target)
    }
}
