//! Utility modules supporting retrieval operations.
//!
//! - [`HttpClient`]: shared HTTP client with timeouts and a retried text-GET helper
//! - [`RetryConfig`] / [`with_retry`]: bounded retry with exponential backoff for transient upstream failures
//! - [`cite`]: best-effort citation formatting from normalized summary fields

pub mod cite;
mod http;
mod retry;

pub use http::HttpClient;
pub use retry::{with_retry, RetryConfig, TransientError};
