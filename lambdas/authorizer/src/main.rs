//! Udagram Token Authorizer Lambda
//!
//! API Gateway custom authorizer for the write routes. Answers every request
//! with an IAM policy: Allow for the token subject when the token verifies,
//! Deny for principal "user" otherwise. The verification strategy is chosen
//! by AUTH_POLICY.

use aws_config::BehaviorVersion;
use aws_lambda_events::event::apigw::ApiGatewayCustomAuthorizerRequest;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;
use udagram_core::auth::{self, AuthorizerResponse, TokenVerifier};
use udagram_core::Config;

async fn handler(
    verifier: &dyn TokenVerifier,
    event: LambdaEvent<ApiGatewayCustomAuthorizerRequest>,
) -> Result<AuthorizerResponse, LambdaError> {
    let (request, _context) = event.into_parts();

    info!(method_arn = ?request.method_arn, "Authorizing request");

    Ok(auth::authorize(verifier, request.authorization_token.as_deref()).await)
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
    let verifier = auth::verifier_from_config(&config, &sdk_config)?;
    let verifier = verifier.as_ref();

    info!(policy = ?config.auth_policy, "Authorizer ready");

    run(service_fn(move |event| handler(verifier, event))).await
}
