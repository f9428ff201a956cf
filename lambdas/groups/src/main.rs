//! Udagram Groups Lambda
//!
//! - GET /groups - List all groups
//! - POST /groups - Create a group
//!
//! POST sits behind the token authorizer, so the token in the Authorization
//! header has already been verified by the time it gets here. The handler
//! only reads its subject to record the group owner.

use aws_config::BehaviorVersion;
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, Response};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use udagram_core::auth::{authenticate, UnsignedDecode};
use udagram_core::schema::{self, RequestSchema};
use udagram_core::{groups, Config, CreateGroupRequest, DynamoClient, Error, ErrorResponse, GroupStore, ItemsResponse};

async fn handler(store: &dyn GroupStore, event: Request) -> Result<Response<Body>, LambdaError> {
    let method = event.method().as_str();
    info!(method = %method, path = %event.uri().path(), "Processing groups request");

    match method {
        "GET" => match groups::list_groups(store).await {
            Ok(items) => {
                info!(count = items.len(), "Listed groups");
                json_response(200, &ItemsResponse::new(items))
            }
            Err(e) => error_response(e),
        },

        "POST" => match create_group(store, &event).await {
            Ok(group) => json_response(201, &group),
            Err(e) => error_response(e),
        },

        _ => json_response(404, &ErrorResponse::new("not_found", "Endpoint not found")),
    }
}

async fn create_group(store: &dyn GroupStore, event: &Request) -> udagram_core::Result<udagram_core::Group> {
    let user_id = match authorization_header(event) {
        Some(header) => Some(authenticate(&UnsignedDecode, Some(header)).await?),
        None => None,
    };

    let body = schema::parse_body(event.body())?;
    schema::validate(RequestSchema::CreateGroup, &body)?;
    let request: CreateGroupRequest = serde_json::from_value(body)?;

    groups::create_group(store, request, user_id).await
}

fn authorization_header(event: &Request) -> Option<&str> {
    event
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
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

    let config = Config::from_env()?;
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = DynamoClient::new(aws_sdk_dynamodb::Client::new(&sdk_config), &config);
    let client = &client;

    run(service_fn(move |event| handler(client, event))).await
}
