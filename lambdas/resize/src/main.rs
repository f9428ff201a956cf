//! Udagram Resize Lambda
//!
//! Triggered when an original image lands in the images bucket, either
//! directly or through the images SNS topic. Writes a fixed-width thumbnail
//! for every created object. Keys are processed one at a time and the first
//! failure fails the invocation so the platform retries the batch.

use std::sync::Arc;

use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;
use udagram_core::thumbnail::ResizeWorker;
use udagram_core::trigger::ObjectCreatedTrigger;
use udagram_core::{Config, S3Storage};

async fn handler(worker: &ResizeWorker, event: LambdaEvent<ObjectCreatedTrigger>) -> Result<(), LambdaError> {
    let (trigger, _context) = event.into_parts();
    let keys = trigger.object_keys()?;

    info!(object_count = keys.len(), "Processing object-created batch");

    for key in &keys {
        let thumbnail = worker.process(key).await?;
        info!(key = %key, thumbnail = %thumbnail, "Processed image");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .without_time()
        .init();

    let config = Config::from_env()?;
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let objects = Arc::new(S3Storage::new(aws_sdk_s3::Client::new(&sdk_config)));
    let worker = ResizeWorker::new(objects, &config);
    let worker = &worker;

    run(service_fn(move |event| handler(worker, event))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage};
    use lambda_runtime::Context;
    use serde_json::json;
    use std::io::Cursor;
    use udagram_core::store::memory::MemoryObjectStore;

    const IMAGES_BUCKET: &str = "serverless-udagram-grammea-image-dev";
    const THUMBNAILS_BUCKET: &str = "serverless-udagram-thumbnaila-dev";

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn setup() -> (ResizeWorker, Arc<MemoryObjectStore>) {
        let config = Config::from_lookup(|_| None).unwrap();
        let objects = Arc::new(MemoryObjectStore::new());
        (ResizeWorker::new(objects.clone(), &config), objects)
    }

    fn s3_record(key: &str) -> serde_json::Value {
        json!({
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "us-east-1",
            "eventTime": "2024-01-01T00:00:00.000Z",
            "eventName": "ObjectCreated:Put",
            "userIdentity": {"principalId": "EXAMPLE"},
            "requestParameters": {"sourceIPAddress": "127.0.0.1"},
            "responseElements": {
                "x-amz-request-id": "C3D13FE58DE4C810",
                "x-amz-id-2": "FMyUVURIY8/IgAtTv8xRjskZQpcIZ9KG4V5Wp6S7S/JRWeUWerMUE5JgHvANOjpD"
            },
            "s3": {
                "s3SchemaVersion": "1.0",
                "configurationId": "ImagesUpload",
                "bucket": {
                    "name": IMAGES_BUCKET,
                    "ownerIdentity": {"principalId": "EXAMPLE"},
                    "arn": format!("arn:aws:s3:::{}", IMAGES_BUCKET)
                },
                "object": {
                    "key": key,
                    "size": 1024,
                    "eTag": "d41d8cd98f00b204e9800998ecf8427e",
                    "sequencer": "0A1B2C3D4E5F678901"
                }
            }
        })
    }

    fn sns_event(keys: &[&str]) -> LambdaEvent<ObjectCreatedTrigger> {
        let message = json!({ "Records": keys.iter().map(|k| s3_record(k)).collect::<Vec<_>>() });
        let payload = json!({
            "Records": [{
                "EventSource": "aws:sns",
                "EventVersion": "1.0",
                "EventSubscriptionArn": "arn:aws:sns:us-east-1:123456789012:ImagesTopic-dev:sub",
                "Sns": {
                    "Type": "Notification",
                    "MessageId": "95df01b4-ee98-5cb9-9903-4c221d41eb5e",
                    "TopicArn": "arn:aws:sns:us-east-1:123456789012:ImagesTopic-dev",
                    "Subject": "Amazon S3 Notification",
                    "Message": message.to_string(),
                    "Timestamp": "2024-01-01T00:00:00.000Z",
                    "SignatureVersion": "1",
                    "Signature": "EXAMPLE",
                    "SigningCertUrl": "EXAMPLE",
                    "UnsubscribeUrl": "EXAMPLE",
                    "MessageAttributes": {}
                }
            }]
        });
        let trigger: ObjectCreatedTrigger = serde_json::from_value(payload).unwrap();
        LambdaEvent::new(trigger, Context::default())
    }

    #[tokio::test]
    async fn test_sns_batch_writes_thumbnails() {
        let (worker, objects) = setup();
        objects.insert(IMAGES_BUCKET, "img-1", png(1000, 2000));
        objects.insert(IMAGES_BUCKET, "img-2", png(300, 150));

        handler(&worker, sns_event(&["img-1", "img-2"])).await.unwrap();

        assert_eq!(objects.keys(THUMBNAILS_BUCKET), vec!["img-1.jpeg", "img-2.jpeg"]);
        let first = objects.object(THUMBNAILS_BUCKET, "img-1.jpeg").unwrap();
        assert_eq!(image::load_from_memory(&first.body).unwrap().dimensions(), (150, 300));
        let second = objects.object(THUMBNAILS_BUCKET, "img-2.jpeg").unwrap();
        assert_eq!(image::load_from_memory(&second.body).unwrap().dimensions(), (150, 75));
    }

    #[tokio::test]
    async fn test_direct_s3_event() {
        let (worker, objects) = setup();
        objects.insert(IMAGES_BUCKET, "img-3", png(600, 600));

        let trigger: ObjectCreatedTrigger =
            serde_json::from_value(json!({ "Records": [s3_record("img-3")] })).unwrap();
        handler(&worker, LambdaEvent::new(trigger, Context::default()))
            .await
            .unwrap();

        assert!(objects.object(THUMBNAILS_BUCKET, "img-3.jpeg").is_some());
    }

    #[tokio::test]
    async fn test_missing_original_fails_invocation() {
        let (worker, objects) = setup();
        objects.insert(IMAGES_BUCKET, "img-2", png(300, 150));

        let result = handler(&worker, sns_event(&["img-1", "img-2"])).await;

        assert!(result.is_err());
        assert!(objects.keys(THUMBNAILS_BUCKET).is_empty());
    }
}
