//! Error types for a sync run.

use std::path::PathBuf;

use notesync_core::CoreError;
use thiserror::Error;

/// Result type alias using SyncError.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Problems with the token or config files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} not found, looked in: {}", format_paths(.candidates))]
    NotFound {
        name: &'static str,
        candidates: Vec<PathBuf>,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON decoder error: {source}. Please check '{}' syntax", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no root folders configured in {}", .path.display())]
    NoFolders { path: PathBuf },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot connect to {service} ({origin})")]
    Connection {
        service: &'static str,
        origin: String,
    },

    #[error("{service} returned HTTP {status} for {url}")]
    Http {
        service: &'static str,
        url: String,
        status: u16,
    },

    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: Box<reqwest::Error>,
    },

    #[error("{service} listing {path} still had more items after {pages} pages")]
    Pagination {
        service: &'static str,
        path: String,
        pages: u32,
    },

    #[error("AnkiConnect action '{action}' failed: {message}")]
    Anki { action: String, message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SyncError {
    /// Classify a transport error: refused connections get their own kind.
    ///
    /// The URL is dropped from the kept error since Joplin requests carry the
    /// API token in their query string.
    pub fn from_reqwest(service: &'static str, origin: &str, error: reqwest::Error) -> Self {
        if error.is_connect() {
            Self::Connection {
                service,
                origin: origin.to_string(),
            }
        } else {
            Self::Request {
                service,
                source: Box::new(error.without_url()),
            }
        }
    }
}
