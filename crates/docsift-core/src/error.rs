use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::report::ReportError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot list input directory {path}: {source}")]
    ListInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
