//! Integration tests for the Udagram API
//!
//! Run with: UDAGRAM_API_URL=https://your-api.execute-api.us-east-1.amazonaws.com/dev cargo test
//!
//! These tests require a deployed Udagram stage. Tests that write need
//! UDAGRAM_TOKEN as well and skip without it.

use udagram_integration_tests::{
    client::{ApiError, CreateGroupRequest, UdagramClient},
    fixtures::{tiny_png, unique_group_name},
    skip_if_no_api,
};
use pretty_assertions::assert_eq;
use serde_json::json;

/// Client for the public routes, or None to skip
fn get_client() -> Option<UdagramClient> {
    if !udagram_integration_tests::api_url_configured() {
        eprintln!("Skipping: UDAGRAM_API_URL not set");
        return None;
    }
    Some(UdagramClient::from_env())
}

/// Client with a bearer token, or None to skip
fn get_authorized_client() -> Option<UdagramClient> {
    let client = get_client()?;
    if !client.has_token() {
        eprintln!("Skipping: UDAGRAM_TOKEN not set");
        return None;
    }
    Some(client)
}

async fn create_group(client: &UdagramClient) -> udagram_integration_tests::client::Group {
    client
        .create_group(&CreateGroupRequest {
            name: unique_group_name(),
            description: "Created by the integration tests".to_string(),
        })
        .await
        .expect("Failed to create group")
}

// ============================================================================
// Group Tests
// ============================================================================

#[tokio::test]
async fn test_list_groups() {
    skip_if_no_api!();
    let client = UdagramClient::from_env();

    let response = client.list_groups().await.expect("Failed to list groups");
    for group in &response.items {
        assert!(!group.id.is_empty());
    }
}

#[tokio::test]
async fn test_create_group_appears_in_list() {
    let Some(client) = get_authorized_client() else { return };

    let group = create_group(&client).await;
    assert_eq!(group.id.len(), 36);
    assert!(group.user_id.is_some());

    let response = client.list_groups().await.expect("Failed to list groups");
    assert!(response.items.contains(&group));
}

#[tokio::test]
async fn test_create_group_requires_token() {
    let Some(client) = get_client() else { return };

    let result = client
        .anonymous()
        .create_group(&CreateGroupRequest {
            name: unique_group_name(),
            description: "d".to_string(),
        })
        .await;

    // Rejected by the authorizer before reaching the function
    assert!(matches!(result.as_ref().map_err(ApiError::status), Err(Some(401 | 403))));
}

#[tokio::test]
async fn test_create_group_invalid_body() {
    let Some(client) = get_authorized_client() else { return };

    let result = client.create_group_raw(&json!({ "name": "" })).await;

    assert_eq!(result.unwrap_err().status(), Some(400));
}

// ============================================================================
// Image Tests
// ============================================================================

#[tokio::test]
async fn test_list_images_of_missing_group() {
    let Some(client) = get_client() else { return };

    let result = client.list_images("00000000-0000-0000-0000-000000000000").await;

    assert!(result.is_err());
    if let Err(ApiError::Http { status, body }) = result {
        assert_eq!(status.as_u16(), 404);
        assert!(body.contains("group_not_found"));
    }
}

#[tokio::test]
async fn test_get_missing_image() {
    let Some(client) = get_client() else { return };

    let result = client.get_image("00000000-0000-0000-0000-000000000000").await;

    assert_eq!(result.unwrap_err().status(), Some(404));
}

#[tokio::test]
async fn test_create_image_in_missing_group() {
    let Some(client) = get_authorized_client() else { return };

    let result = client
        .create_image("00000000-0000-0000-0000-000000000000", "Lost")
        .await;

    assert!(result.is_err());
    if let Err(ApiError::Http { status, body }) = result {
        assert_eq!(status.as_u16(), 404);
        assert!(body.contains("does not exist"));
    }
}

#[tokio::test]
async fn test_full_upload_cycle() {
    let Some(client) = get_authorized_client() else { return };

    let group = create_group(&client).await;

    let created = client
        .create_image(&group.id, "Integration")
        .await
        .expect("Failed to create image");
    let image = created.new_item;
    assert_eq!(image.group_id, group.id);
    assert_eq!(image.title.as_deref(), Some("Integration"));
    assert!(image.image_url.ends_with(&image.image_id));
    assert!(created.upload_url.contains(&image.image_id));

    client
        .upload(&created.upload_url, tiny_png())
        .await
        .expect("Failed to upload to pre-signed URL");

    let listed = client
        .list_images(&group.id)
        .await
        .expect("Failed to list images");
    assert_eq!(listed.items, vec![image.clone()]);

    let fetched = client
        .get_image(&image.image_id)
        .await
        .expect("Failed to get image");
    assert_eq!(fetched, image);
}
