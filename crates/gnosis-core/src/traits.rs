//! Core trait definitions for generation backends.
//!
//! The `gnosis-client` crate implements [`GenerationClient`] over HTTP; tests
//! and offline tools use its mock implementation.

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::model::{GenerationRequest, GenerationResult};

/// A backend that turns a learning request into a quiz or notes.
///
/// Each call is a single in-flight request with no retries. A failed call
/// has no effect on any quiz session; callers reset a session only with a
/// successful result.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Submit a request and wait for the result.
    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationResult, GenerationError>;
}
