//! Environment configuration
//!
//! Every function reads the same set of variables once at cold start. Defaults
//! match the `dev` stage of the deployment.

use std::str::FromStr;
use std::time::Duration;

use crate::errors::{Error, Result};

const DEFAULT_GROUPS_TABLE: &str = "Groups-dev";
const DEFAULT_IMAGES_TABLE: &str = "Images-dev";
const DEFAULT_CONNECTIONS_TABLE: &str = "Connections-dev";
const DEFAULT_IMAGE_ID_INDEX: &str = "ImageIdIndex";
const DEFAULT_IMAGES_BUCKET: &str = "serverless-udagram-grammea-image-dev";
const DEFAULT_THUMBNAILS_BUCKET: &str = "serverless-udagram-thumbnaila-dev";
const DEFAULT_SIGNED_URL_EXPIRATION_SECS: u64 = 300;
const DEFAULT_SECRET_ID: &str = "Auth0Secret-dev";
const DEFAULT_SECRET_FIELD: &str = "auth0Secret";
const DEFAULT_SECRET_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_THUMBNAIL_WIDTH: u32 = 150;

/// Signing certificate of the Auth0 tenant the dev stage trusts
pub const DEFAULT_AUTH_CERTIFICATE: &str = include_str!("../certs/auth0-dev.pem");

/// Token verification strategy used by the authorizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Decode claims without checking the signature
    Unsigned,
    /// RS256 against a fixed X.509 certificate
    Rs256,
    /// HS256 against a shared secret from Secrets Manager
    Secret,
}

impl FromStr for AuthPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "unsigned" => Ok(AuthPolicy::Unsigned),
            "rs256" => Ok(AuthPolicy::Rs256),
            "secret" => Ok(AuthPolicy::Secret),
            other => Err(Error::Config(format!("unknown AUTH_POLICY: {}", other))),
        }
    }
}

/// Runtime configuration shared by all functions
#[derive(Debug, Clone)]
pub struct Config {
    pub groups_table: String,
    pub images_table: String,
    pub connections_table: String,
    pub image_id_index: String,
    pub images_bucket: String,
    pub thumbnails_bucket: String,
    pub signed_url_expiration: Duration,
    pub auth_policy: AuthPolicy,
    /// PEM certificate used by [`AuthPolicy::Rs256`]
    pub auth_certificate: String,
    pub secret_id: String,
    pub secret_field: String,
    pub secret_cache_ttl: Duration,
    pub thumbnail_width: u32,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup (for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let signed_url_secs = parse_number(&lookup, "SIGNED_URL_EXPIRATION", DEFAULT_SIGNED_URL_EXPIRATION_SECS)?;
        if signed_url_secs == 0 {
            return Err(Error::Config("SIGNED_URL_EXPIRATION must be positive".to_string()));
        }

        let thumbnail_width = parse_number(&lookup, "THUMBNAIL_WIDTH", DEFAULT_THUMBNAIL_WIDTH)?;
        if thumbnail_width == 0 {
            return Err(Error::Config("THUMBNAIL_WIDTH must be positive".to_string()));
        }

        let auth_policy = match lookup("AUTH_POLICY") {
            Some(value) => value.parse()?,
            None => AuthPolicy::Rs256,
        };

        Ok(Self {
            groups_table: string("GROUPS_TABLE", DEFAULT_GROUPS_TABLE),
            images_table: string("IMAGES_TABLE", DEFAULT_IMAGES_TABLE),
            connections_table: string("CONNECTIONS_TABLE", DEFAULT_CONNECTIONS_TABLE),
            image_id_index: string("IMAGE_ID_INDEX", DEFAULT_IMAGE_ID_INDEX),
            images_bucket: string("IMAGES_S3_BUCKET", DEFAULT_IMAGES_BUCKET),
            thumbnails_bucket: string("THUMBNAILS_S3_BUCKET", DEFAULT_THUMBNAILS_BUCKET),
            signed_url_expiration: Duration::from_secs(signed_url_secs),
            auth_policy,
            auth_certificate: string("AUTH_0_CERTIFICATE", DEFAULT_AUTH_CERTIFICATE),
            secret_id: string("AUTH_0_SECRET_ID", DEFAULT_SECRET_ID),
            secret_field: string("AUTH_0_SECRET_FIELD", DEFAULT_SECRET_FIELD),
            secret_cache_ttl: Duration::from_secs(parse_number(
                &lookup,
                "SECRET_CACHE_TTL_SECS",
                DEFAULT_SECRET_CACHE_TTL_SECS,
            )?),
            thumbnail_width,
        })
    }

    /// Public URL of an original image object
    pub fn image_url(&self, image_id: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.images_bucket, image_id)
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid number: {}", key, raw))),
        None => Ok(default),
    }
}
