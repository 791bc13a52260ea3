//! Registry authorization module
//!
//! Resolves short-lived docker-compatible credentials from an ECR-style
//! "get authorization token" API.

pub mod auth;

pub use auth::{AuthClient, Credential};
