//! Subcommand implementations.

pub mod generate;
pub mod grade;
pub mod init;
pub mod take;
pub mod validate;
