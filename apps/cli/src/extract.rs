//! Turn the notes of resolved folders into desired cards.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use notesync_core::{
    sectionize, CollisionKind, DesiredCard, FolderResolution, Sectionized, TitleCollision,
};

use crate::config::Config;
use crate::error::Result;
use crate::joplin::JoplinClient;

/// Cards extracted from every selected note, keyed by card front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub cards: BTreeMap<String, DesiredCard>,
    pub collisions: Vec<TitleCollision>,
    pub notes_read: usize,
    pub notes_skipped: usize,
}

impl Extraction {
    /// Add one note's sections, bound for `deck`. A title already present is
    /// overwritten and reported as a card collision.
    pub fn merge(&mut self, note: Sectionized, deck: &str) {
        self.collisions.extend(note.collisions);

        for (title, back) in note.cards {
            let card = DesiredCard {
                back,
                deck: deck.to_string(),
            };
            match self.cards.entry(title) {
                Entry::Vacant(slot) => {
                    slot.insert(card);
                }
                Entry::Occupied(mut slot) => {
                    self.collisions
                        .push(TitleCollision::new(CollisionKind::Card, slot.key().clone()));
                    slot.insert(card);
                }
            }
        }
    }
}

/// True when the note title starts with an excluded prefix.
pub fn is_excluded_note(title: &str, excluded: &[String]) -> bool {
    excluded.iter().any(|prefix| title.starts_with(prefix.as_str()))
}

/// List, fetch and sectionize the notes of every resolved folder.
pub async fn extract(
    joplin: &JoplinClient,
    folders: &FolderResolution,
    config: &Config,
) -> Result<Extraction> {
    let mut extraction = Extraction::default();

    for folder in folders.folders.values() {
        let notes = joplin.folder_notes(&folder.id).await?;
        tracing::info!(folder = %folder.title, deck = %folder.root_title, notes = notes.len(), "reading folder");

        for note in notes {
            if is_excluded_note(&note.title, &config.exclude_notes) {
                tracing::debug!(note = %note.title, "skipping excluded note");
                extraction.notes_skipped += 1;
                continue;
            }

            let body = joplin.note_body(&note.id).await?;
            let sections = sectionize(&note.title, &body, &config.exclude_headers);
            tracing::debug!(note = %note.title, sections = sections.cards.len(), "sectionized");

            extraction.merge(sections, &folder.root_title);
            extraction.notes_read += 1;
        }
    }

    Ok(extraction)
}
