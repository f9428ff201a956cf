//! Test fixtures and utilities

use uuid::Uuid;

pub const API_URL_VAR: &str = "UDAGRAM_API_URL";
pub const TOKEN_VAR: &str = "UDAGRAM_TOKEN";

/// Load `.env` once; later calls are no-ops
pub fn load_env() {
    let _ = dotenvy::dotenv();
}

/// Unique group name for testing
pub fn unique_group_name() -> String {
    format!("test-group-{}", &Uuid::new_v4().to_string()[..8])
}

/// Check if API URL is configured
pub fn api_url_configured() -> bool {
    load_env();
    std::env::var(API_URL_VAR).is_ok()
}

/// Bearer token for the authenticated routes, if configured
pub fn token() -> Option<String> {
    load_env();
    std::env::var(TOKEN_VAR).ok().filter(|t| !t.is_empty())
}

/// A minimal valid PNG (1x1, black)
pub fn tiny_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x00, 0x00, 0x00, 0x00, 0x3A,
        0x7E, 0x9B, 0x55, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x60,
        0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x48, 0xAF, 0xA4, 0x71, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Skip test if API URL is not configured
#[macro_export]
macro_rules! skip_if_no_api {
    () => {
        if !$crate::fixtures::api_url_configured() {
            eprintln!("Skipping test: UDAGRAM_API_URL not set");
            return;
        }
    };
}
