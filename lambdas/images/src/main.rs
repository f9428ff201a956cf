//! Udagram Images Lambda
//!
//! - POST /groups/{groupId}/images - Create an image record, get an upload URL
//! - GET /groups/{groupId}/images - List images of a group, newest first
//! - GET /images/{imageId} - Get one image

use std::sync::Arc;

use aws_config::BehaviorVersion;
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, RequestExt, Response};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use udagram_core::schema;
use udagram_core::{Config, DynamoClient, Error, ErrorResponse, ImageService, ItemsResponse, S3Storage};

async fn handler(service: &ImageService, event: Request) -> Result<Response<Body>, LambdaError> {
    let method = event.method().as_str();
    let path_params = event.path_parameters();
    let group_id = path_params.first("groupId").map(|s| s.to_string());
    let image_id = path_params.first("imageId").map(|s| s.to_string());

    info!(method = %method, path = %event.uri().path(), "Processing images request");

    match (method, group_id, image_id) {
        ("GET", _, Some(image_id)) => match service.get_image(&image_id).await {
            Ok(image) => json_response(200, &image),
            Err(e) => error_response(e),
        },

        ("GET", Some(group_id), None) => match service.images_for_group(&group_id).await {
            Ok(items) => {
                info!(group_id = %group_id, count = items.len(), "Listed images");
                json_response(200, &ItemsResponse::new(items))
            }
            Err(e) => error_response(e),
        },

        ("POST", Some(group_id), None) => {
            let result = match schema::parse_body(event.body()) {
                Ok(body) => service.create_image(&group_id, body).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(created) => json_response(201, &created),
                Err(e) => error_response(e),
            }
        }

        _ => json_response(404, &ErrorResponse::new("not_found", "Endpoint not found")),
    }
}

fn json_response<T: Serialize>(status: u16, body: &T) -> Result<Response<Body>, LambdaError> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::from(serde_json::to_string(body)?))?)
}

fn error_response(e: Error) -> Result<Response<Body>, LambdaError> {
    error!(error = %e, "Request failed");
    json_response(e.status_code(), &ErrorResponse::new(e.code(), e.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .without_time()
        .init();

    let config = Arc::new(Config::from_env()?);
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo = Arc::new(DynamoClient::new(aws_sdk_dynamodb::Client::new(&sdk_config), &config));
    let objects = Arc::new(S3Storage::new(aws_sdk_s3::Client::new(&sdk_config)));

    let service = ImageService::new(dynamo.clone(), dynamo, objects, config);
    let service = &service;

    run(service_fn(move |event| handler(service, event))).await
}
