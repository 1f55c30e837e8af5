//! Core logic for turning notes into flashcards.
//!
//! Provides:
//! - Markdown sectionizer (header sections, sub-header labels, math rewriting)
//! - Folder tree resolution for selected root folders
//! - Reconciliation plan between stored cards and extracted cards
//! - Shared types (FolderRecord, Section, ExistingCard, etc.)
//!
//! Nothing here performs I/O.

pub mod error;
pub mod folders;
pub mod parser;
pub mod reconcile;
pub mod types;

pub use error::{CoreError, Result};
pub use folders::{resolve, FolderResolution};
pub use parser::{rewrite_math, sectionize, Sectionized};
pub use reconcile::{plan, CardDeletion, CardUpdate, NewCard, SyncPlan};
pub use types::{
    CollisionKind, DesiredCard, ExistingCard, FolderRecord, NoteRecord, ResolvedFolder, Section,
    TitleCollision,
};
