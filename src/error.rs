// Error types for mirrorprobe

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Problems with user-supplied settings. Raised before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("source path [-s, --src] {path}: {source}")]
    SourceMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("source path [-s, --src] {0} is not a directory")]
    SourceNotDirectory(PathBuf),

    #[error("endpoint [-u, --url] {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("unsupported HTTP method [-m, --method]: {0}")]
    UnsupportedMethod(String),
}

/// Failure of one probe. Never fatal to the walk.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("reading response body: {0}")]
    Body(#[from] io::Error),
}

/// Failure that ends the walk.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("local directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("writing report: {0}")]
    Report(#[from] io::Error),
}
