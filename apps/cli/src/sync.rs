//! One-way sync run from notes to flashcards.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use notesync_core::{
    plan, resolve, CollisionKind, CoreError, ExistingCard, SyncPlan, TitleCollision,
};
use serde::Serialize;

use crate::anki::{self, AnkiClient};
use crate::config::Config;
use crate::error::Result;
use crate::extract::extract;
use crate::joplin::{self, JoplinClient};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub deleted: usize,
    pub created: usize,
    pub updated: usize,
    /// Cards the flashcard store refused to add.
    pub failed: usize,
    pub collisions: usize,
    pub dry_run: bool,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Outcome of a run: what was planned and what happened.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub plan: SyncPlan,
    pub stats: SyncStats,
}

/// Stored cards of the selected decks, keyed by front.
#[derive(Debug, Clone, Default)]
pub struct CurrentCards {
    pub cards: BTreeMap<String, ExistingCard>,
    pub collisions: Vec<TitleCollision>,
}

/// Runs a sync between one notes store and one flashcard store.
pub struct SyncEngine {
    config: Config,
    joplin: JoplinClient,
    anki: AnkiClient,
}

impl SyncEngine {
    /// Create a sync engine with clients built from `config`.
    pub fn new(config: Config) -> Result<Self> {
        let joplin = JoplinClient::new(&config.joplin_origin, &config.token, config.timeout)?;
        let anki = AnkiClient::new(&config.anki_origin, &config.model_name, config.timeout)?;
        Ok(Self {
            config,
            joplin,
            anki,
        })
    }

    /// Run full sync operation.
    ///
    /// All reads happen before the first write, so configuration and
    /// connectivity failures leave the flashcard store untouched. With
    /// `dry_run` the plan is computed but never applied.
    pub async fn run(&self, dry_run: bool) -> Result<SyncReport> {
        // 1. Both stores must answer before anything else happens
        let all_folders = self.joplin.folders().await?;
        tracing::info!(service = joplin::SERVICE, folders = all_folders.len(), "connected");

        let version = self.anki.version().await?;
        tracing::info!(service = anki::SERVICE, version, "connected");

        // 2. Folders
        let resolution = resolve(&all_folders, &self.config.folders)?;
        for root in &resolution.missing_roots {
            tracing::warn!(folder = %root, "configured folder not found");
        }

        // 3. Desired cards
        let extraction = extract(&self.joplin, &resolution, &self.config).await?;
        tracing::info!(
            notes = extraction.notes_read,
            skipped = extraction.notes_skipped,
            cards = extraction.cards.len(),
            "extracted cards"
        );

        // 4. Current cards
        let current = self.current_cards(resolution.decks()).await?;

        // 5. Collisions
        let collisions: Vec<TitleCollision> = resolution
            .collisions
            .into_iter()
            .chain(extraction.collisions)
            .chain(current.collisions)
            .collect();
        self.check_collisions(&collisions)?;

        // 6. Plan and apply
        let plan = plan(&current.cards, &extraction.cards);
        tracing::info!(
            delete = plan.delete.len(),
            create = plan.create.len(),
            update = plan.update.len(),
            "planned"
        );

        let mut stats = if dry_run {
            SyncStats {
                deleted: plan.delete.len(),
                created: plan.create.len(),
                updated: plan.update.len(),
                dry_run: true,
                ..SyncStats::default()
            }
        } else {
            self.apply(&plan).await?
        };
        stats.collisions = collisions.len();
        stats.finished_at = Some(Utc::now());

        Ok(SyncReport { plan, stats })
    }

    /// Gather stored cards for every deck with one batched lookup per deck.
    pub async fn current_cards<'a, I>(&self, decks: I) -> Result<CurrentCards>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = CurrentCards::default();

        for deck in decks {
            let cards = self.anki.deck_cards(deck).await?;
            tracing::info!(deck, cards = cards.len(), "read deck");

            for card in cards {
                if let Some(previous) = current.cards.get(&card.front) {
                    if previous.id != card.id {
                        current
                            .collisions
                            .push(TitleCollision::new(CollisionKind::ExistingCard, card.front.clone()));
                    }
                }
                current.cards.insert(card.front.clone(), card);
            }
        }

        Ok(current)
    }

    fn check_collisions(&self, collisions: &[TitleCollision]) -> Result<()> {
        for collision in collisions {
            tracing::warn!(kind = %collision.kind, title = %collision.title, "title collision, last write wins");
        }

        if self.config.strict {
            if let Some(first) = collisions.first() {
                return Err(CoreError::from(first.clone()).into());
            }
        }
        Ok(())
    }

    /// Deletes, then creates, then updates.
    async fn apply(&self, plan: &SyncPlan) -> Result<SyncStats> {
        let mut stats = SyncStats::default();

        let ids = plan.delete_ids();
        self.anki.delete_notes(&ids).await?;
        for deletion in &plan.delete {
            tracing::debug!(id = deletion.id, front = %deletion.front, "deleted");
        }
        stats.deleted = ids.len();

        let added = self.anki.add_notes(&plan.create).await?;
        for (card, id) in plan.create.iter().zip(&added) {
            match id {
                Some(id) => {
                    tracing::debug!(id, front = %card.front, deck = %card.deck, "created");
                    stats.created += 1;
                }
                None => {
                    tracing::warn!(front = %card.front, deck = %card.deck, "card was not added");
                    stats.failed += 1;
                }
            }
        }

        for update in &plan.update {
            self.anki.update_note(update).await?;
            tracing::debug!(id = update.id, front = %update.front, "updated");
            stats.updated += 1;
        }

        Ok(stats)
    }
}
