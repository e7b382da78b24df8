//! Test helper utilities
//!
//! Shared utilities for testing jcm-ai

pub mod http;
pub mod mock_backend;

pub use http::{extract_json, json_request, multipart_request, test_app, test_request};
pub use mock_backend::MockBackend;
