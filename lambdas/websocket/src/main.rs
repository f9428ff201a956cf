//! Udagram WebSocket Lambda
//!
//! Handles the `$connect` and `$disconnect` routes of the notifications
//! WebSocket API by keeping the connections table in sync. Other routes are
//! acknowledged and ignored.

use aws_config::BehaviorVersion;
use aws_lambda_events::apigw::{ApiGatewayProxyResponse, ApiGatewayWebsocketProxyRequest};
use aws_lambda_events::encodings::Body;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use udagram_core::{connections, Config, ConnectionStore, DynamoClient};

const CONNECT_ROUTE: &str = "$connect";
const DISCONNECT_ROUTE: &str = "$disconnect";

fn response(status_code: i64) -> ApiGatewayProxyResponse {
    ApiGatewayProxyResponse {
        status_code,
        body: Some(Body::Text(String::new())),
        ..Default::default()
    }
}

async fn handler(
    store: &dyn ConnectionStore,
    event: LambdaEvent<ApiGatewayWebsocketProxyRequest>,
) -> Result<ApiGatewayProxyResponse, LambdaError> {
    let (request, _context) = event.into_parts();
    let context = request.request_context;

    info!(route_key = ?context.route_key, connection_id = ?context.connection_id, "WebSocket event");

    let Some(connection_id) = context.connection_id.as_deref() else {
        warn!("WebSocket event without connection id");
        return Ok(response(400));
    };

    match context.route_key.as_deref() {
        Some(CONNECT_ROUTE) => {
            connections::on_connect(store, connection_id).await?;
        }
        Some(DISCONNECT_ROUTE) => {
            connections::on_disconnect(store, connection_id).await?;
        }
        other => {
            warn!(route_key = ?other, "Ignoring unsupported route");
        }
    }

    Ok(response(200))
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
