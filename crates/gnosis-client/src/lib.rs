//! gnosis-client — Generation API integration.
//!
//! Implements the `GenerationClient` trait over HTTP, loads client
//! configuration, and provides a mock client for tests.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{load_config, load_config_from, GnosisConfig};
pub use gnosis_core::error::GenerationError;
pub use http::HttpGenerationClient;
pub use mock::MockGenerationClient;
