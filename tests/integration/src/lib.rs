//! Udagram Integration Tests
//!
//! These tests run against a deployed API. Set UDAGRAM_API_URL to the stage
//! URL, and UDAGRAM_TOKEN to a bearer token accepted by the authorizer to
//! exercise the authenticated routes. A `.env` file is read if present.
//!
//! Run with: cargo test --package udagram-integration-tests

pub mod client;
pub mod fixtures;

pub use client::UdagramClient;
pub use fixtures::*;
