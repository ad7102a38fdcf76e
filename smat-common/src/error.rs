//! Common error types for SMAT

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for SMAT operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading and validating configuration
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration file could not be read
    #[error("Read {} failed: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration parsing or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
