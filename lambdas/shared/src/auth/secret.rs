use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{Claims, TokenVerifier};
use crate::errors::{Error, Result};

/// Where the shared signing secret comes from
#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;
}

/// Reads one field of a JSON secret stored in Secrets Manager
pub struct SecretsManagerSource {
    client: aws_sdk_secretsmanager::Client,
    secret_id: String,
    field: String,
}

impl SecretsManagerSource {
    pub fn new(client: aws_sdk_secretsmanager::Client, secret_id: String, field: String) -> Self {
        Self {
            client,
            secret_id,
            field,
        }
    }
}

/// Extract `field` from a secret string shaped like `{"field": "value"}`
fn secret_field(secret_string: &str, field: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(secret_string)
        .map_err(|e| Error::SecretStore(format!("secret is not JSON: {}", e)))?;

    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| Error::SecretStore(format!("secret has no string field {}", field)))
}

#[async_trait]
impl SecretSource for SecretsManagerSource {
    async fn fetch(&self) -> Result<String> {
        info!(secret_id = %self.secret_id, "Fetching signing secret");

        let output = self
            .client
            .get_secret_value()
            .secret_id(&self.secret_id)
            .send()
            .await
            .map_err(|e| Error::SecretStore(e.to_string()))?;

        let secret_string = output
            .secret_string()
            .ok_or_else(|| Error::SecretStore(format!("{} has no SecretString", self.secret_id)))?;

        secret_field(secret_string, &self.field)
    }
}

struct CachedSecret {
    value: String,
    fetched_at: Instant,
}

/// Secret value cached for a fixed time. Callers arriving while a fetch is in
/// flight wait for it instead of fetching again.
pub struct SecretCache {
    ttl: Duration,
    entry: Mutex<Option<CachedSecret>>,
}

impl SecretCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Cached value, or a fresh one from `source` once the entry expired
    pub async fn get(&self, source: &dyn SecretSource) -> Result<String> {
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                debug!("Using cached signing secret");
                return Ok(cached.value.clone());
            }
        }

        let value = source.fetch().await?;
        *entry = Some(CachedSecret {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }
}

/// Verifies HS256 tokens against a cached shared secret
pub struct SharedSecretVerifier {
    source: Box<dyn SecretSource>,
    cache: SecretCache,
    validation: Validation,
}

impl SharedSecretVerifier {
    pub fn new(source: Box<dyn SecretSource>, cache: SecretCache) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            source,
            cache,
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for SharedSecretVerifier {
    async fn verify(&self, token: &str) -> Result<Claims> {
        let secret = self.cache.get(self.source.as_ref()).await?;

        decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| Error::InvalidSignature(e.to_string()))
    }
}
