//! Error types for notesync-core.

use thiserror::Error;

use crate::types::{CollisionKind, TitleCollision};

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by folder resolution and title validation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed folder graph: folder {id} is reachable from itself")]
    FolderCycle { id: String },

    #[error("ambiguous {kind} title: {title}")]
    AmbiguousTitle { kind: CollisionKind, title: String },
}

impl From<TitleCollision> for CoreError {
    fn from(collision: TitleCollision) -> Self {
        Self::AmbiguousTitle {
            kind: collision.kind,
            title: collision.title,
        }
    }
}
