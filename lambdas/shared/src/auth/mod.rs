//! Identity extraction from bearer tokens
//!
//! A [`TokenVerifier`] turns a raw JWT into [`Claims`]. Three strategies exist
//! and are chosen by [`AuthPolicy`]:
//!
//! - [`UnsignedDecode`]: reads the claims without checking the signature.
//!   Only safe behind a gateway authorizer that already verified the token.
//! - [`CertificateVerifier`]: RS256 against a fixed X.509 certificate.
//! - [`SharedSecretVerifier`]: HS256 against a secret fetched from Secrets
//!   Manager and cached for a bounded time.
//!
//! Callers go through [`authenticate`] or [`authorize`] and never see which
//! strategy is active.

mod certificate;
mod secret;
mod unsigned;

use async_trait::async_trait;
use aws_config::SdkConfig;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::{AuthPolicy, Config};
use crate::errors::{Error, Result};

pub use certificate::CertificateVerifier;
pub use secret::{SecretCache, SecretSource, SecretsManagerSource, SharedSecretVerifier};
pub use unsigned::UnsignedDecode;

const BEARER_PREFIX: &str = "bearer ";
const POLICY_VERSION: &str = "2012-10-17";
const INVOKE_ACTION: &str = "execute-api:Invoke";
/// Principal reported on denied requests
const ANONYMOUS_PRINCIPAL: &str = "user";

/// Claims read from a verified token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, used as the user id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// A token verification strategy
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` (without the scheme prefix) and return its claims.
    /// Any verification failure is [`Error::InvalidSignature`].
    async fn verify(&self, token: &str) -> Result<Claims>;
}

/// Build the verifier selected by `config.auth_policy`
pub fn verifier_from_config(config: &Config, sdk_config: &SdkConfig) -> Result<Box<dyn TokenVerifier>> {
    match config.auth_policy {
        AuthPolicy::Unsigned => {
            warn!("Token signatures are not verified (AUTH_POLICY=unsigned)");
            Ok(Box::new(UnsignedDecode))
        }
        AuthPolicy::Rs256 => Ok(Box::new(CertificateVerifier::from_pem(&config.auth_certificate)?)),
        AuthPolicy::Secret => {
            let source = SecretsManagerSource::new(
                aws_sdk_secretsmanager::Client::new(sdk_config),
                config.secret_id.clone(),
                config.secret_field.clone(),
            );
            Ok(Box::new(SharedSecretVerifier::new(
                Box::new(source),
                SecretCache::new(config.secret_cache_ttl),
            )))
        }
    }
}

/// Extract the token from an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
    let header = match header {
        Some(h) if !h.trim().is_empty() => h,
        _ => return Err(Error::MissingHeader),
    };

    if !header.to_ascii_lowercase().starts_with(BEARER_PREFIX) {
        return Err(Error::MalformedHeader("expected Bearer scheme".to_string()));
    }

    match header.split(' ').nth(1) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(Error::MalformedHeader("empty bearer token".to_string())),
    }
}

/// Verify an `Authorization` header and return the user id (token subject)
pub async fn authenticate(verifier: &dyn TokenVerifier, header: Option<&str>) -> Result<String> {
    let token = bearer_token(header)?;
    let claims = verifier.verify(token).await?;
    Ok(claims.sub)
}

/// IAM policy effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

/// Token authorizer result returned to API Gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
}

impl AuthorizerResponse {
    fn new(principal_id: impl Into<String>, effect: Effect) -> Self {
        Self {
            principal_id: principal_id.into(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![PolicyStatement {
                    action: INVOKE_ACTION.to_string(),
                    effect,
                    resource: "*".to_string(),
                }],
            },
        }
    }

    pub fn allow(principal_id: impl Into<String>) -> Self {
        Self::new(principal_id, Effect::Allow)
    }

    pub fn deny() -> Self {
        Self::new(ANONYMOUS_PRINCIPAL, Effect::Deny)
    }

    pub fn effect(&self) -> Effect {
        self.policy_document
            .statement
            .first()
            .map(|s| s.effect)
            .unwrap_or(Effect::Deny)
    }
}

/// Decide an authorizer request. Every failure becomes a Deny policy.
pub async fn authorize(verifier: &dyn TokenVerifier, authorization_token: Option<&str>) -> AuthorizerResponse {
    match authenticate(verifier, authorization_token).await {
        Ok(user_id) => {
            info!(user_id = %user_id, "User was authorized");
            AuthorizerResponse::allow(user_id)
        }
        Err(e) if e.is_auth_failure() => {
            warn!(error = %e, "User was not authorized");
            AuthorizerResponse::deny()
        }
        Err(e) => {
            error!(error = %e, "Authorization failed");
            AuthorizerResponse::deny()
        }
    }
}
