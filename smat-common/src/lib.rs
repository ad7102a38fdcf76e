//! # SMAT Common Library
//!
//! Shared code for the sustainability maturity assessment tool:
//! - Error types and the crate-wide `Result` alias
//! - Bootstrap configuration loading (TOML + environment + CLI overrides)
//! - Time and date formatting helpers

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
