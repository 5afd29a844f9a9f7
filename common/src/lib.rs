/// Shared utilities for the transaction enrichment service
///
/// This crate provides functionality used across the workspace:
///
/// - Service configuration loading (YAML file + environment overrides)
/// - Shared test fixtures and helpers

pub mod config;

// Test helpers module - available for both development and test builds
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export commonly used test utilities for easier access
#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::{generate_unique_id, sample_record, sample_request_body, TestResult};
