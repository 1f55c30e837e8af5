//! Core types shared by the extraction and reconciliation steps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Folder as listed by the notes store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub id: String,
    pub title: String,
    /// Top-level folders carry `null` or an empty string here.
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl FolderRecord {
    /// Parent id, with the store's empty-string convention mapped to `None`.
    pub fn parent(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Folder reachable from a selected root, tagged with that root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFolder {
    pub id: String,
    pub title: String,
    /// Title of the owning root folder; doubles as the destination deck name.
    pub root_title: String,
}

/// Note listed inside a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: String,
    pub title: String,
}

/// Top-level markdown section extracted from a note body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Header text with the `# ` marker removed.
    pub header: String,
    /// Deeper header labels in encounter order.
    pub labels: Vec<String>,
    /// Concatenated body lines after math rewriting.
    pub body: String,
}

impl Section {
    /// Card front for this section: `"<note> / <header>"`, followed by the
    /// label list when the section has sub-headers.
    pub fn card_title(&self, note_title: &str) -> String {
        if self.labels.is_empty() {
            format!("{} / {}", note_title, self.header)
        } else {
            format!(
                "{} / {} {}",
                note_title,
                self.header,
                format_labels(&self.labels)
            )
        }
    }
}

/// Render labels as a list literal, e.g. `['Detail A', 'Detail B']`.
///
/// Quoting follows the Python `repr` rules the card fronts were originally
/// written with, so existing cards keep their titles.
pub fn format_labels(labels: &[String]) -> String {
    let items: Vec<String> = labels.iter().map(|l| quote_label(l)).collect();
    format!("[{}]", items.join(", "))
}

fn quote_label(label: &str) -> String {
    let quote = if label.contains('\'') && !label.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(label.len() + 2);
    out.push(quote);
    for ch in label.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Card content produced from the notes, bound for one deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredCard {
    pub back: String,
    pub deck: String,
}

/// Card as currently stored in the flashcard application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingCard {
    pub id: u64,
    pub front: String,
    pub back: String,
}

/// Where a title collision was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    /// Two folders share a title.
    Folder,
    /// Two sections in one note share a header.
    Section,
    /// Two notes produced the same card title.
    Card,
    /// Two stored cards share a front.
    ExistingCard,
}

impl CollisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Section => "section",
            Self::Card => "card",
            Self::ExistingCard => "existing card",
        }
    }
}

impl fmt::Display for CollisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A title that mapped to more than one item; only one of them was kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleCollision {
    pub kind: CollisionKind,
    pub title: String,
}

impl TitleCollision {
    pub fn new(kind: CollisionKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
        }
    }
}
