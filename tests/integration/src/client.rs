//! Udagram API Client for testing

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// API client for Udagram
pub struct UdagramClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

// Request/Response types

#[derive(Debug, Clone, Serialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub group_id: String,
    pub image_id: String,
    pub timestamp: String,
    pub image_url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageResponse {
    pub new_item: Image,
    pub upload_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Result type for API responses
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// HTTP error with status code and body
    Http { status: StatusCode, body: String },
    /// Network or serialization error
    Request(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(status.as_u16()),
            ApiError::Request(_) => None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            ApiError::Request(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl UdagramClient {
    /// Create a new client with the given base URL
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Create a client from environment variables
    pub fn from_env() -> Self {
        let base_url = std::env::var(crate::fixtures::API_URL_VAR)
            .expect("UDAGRAM_API_URL environment variable not set");
        Self::new(&base_url, crate::fixtures::token())
    }

    /// Same endpoint, no Authorization header
    pub fn anonymous(&self) -> Self {
        Self::new(&self.base_url, None)
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // =========================================================================
    // Group Operations
    // =========================================================================

    pub async fn list_groups(&self) -> ApiResult<Items<Group>> {
        self.get("/groups").await
    }

    pub async fn create_group(&self, req: &CreateGroupRequest) -> ApiResult<Group> {
        self.post("/groups", req).await
    }

    /// POST an arbitrary body, for validation tests
    pub async fn create_group_raw(&self, body: &serde_json::Value) -> ApiResult<Group> {
        self.post("/groups", body).await
    }

    // =========================================================================
    // Image Operations
    // =========================================================================

    pub async fn list_images(&self, group_id: &str) -> ApiResult<Items<Image>> {
        self.get(&format!("/groups/{}/images", group_id)).await
    }

    pub async fn create_image(&self, group_id: &str, title: &str) -> ApiResult<CreateImageResponse> {
        let body = serde_json::json!({ "title": title });
        self.post(&format!("/groups/{}/images", group_id), &body).await
    }

    pub async fn get_image(&self, image_id: &str) -> ApiResult<Image> {
        self.get(&format!("/images/{}", image_id)).await
    }

    /// PUT the original bytes to a pre-signed upload URL
    pub async fn upload(&self, upload_url: &str, body: Vec<u8>) -> ApiResult<()> {
        let response = self
            .client
            .put(upload_url)
            .body(body)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Http { status, body })
        }
    }

    // =========================================================================
    // HTTP Helpers
    // =========================================================================

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .authorized(self.client.post(&url).json(body))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| ApiError::Request(e.to_string()))
        } else {
            Err(ApiError::Http { status, body })
        }
    }
}
