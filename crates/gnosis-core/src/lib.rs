//! gnosis-core — Quiz model, answer evaluation, and scoring.
//!
//! This crate defines the data model returned by the generation API, the
//! answer evaluator, and the quiz session state that the `gnosis` front end
//! drives. It performs no network I/O.

pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod report;
pub mod session;
pub mod traits;
