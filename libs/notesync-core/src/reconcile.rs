//! Three-way diff between stored cards and cards extracted from notes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{DesiredCard, ExistingCard};

/// Card to add to a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub front: String,
    pub back: String,
    pub deck: String,
}

/// Stored card whose back changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardUpdate {
    pub id: u64,
    pub front: String,
    pub back: String,
}

/// Stored card with no counterpart in the notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDeletion {
    pub id: u64,
    pub front: String,
}

/// Mutations needed to bring the flashcard store in line with the notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    pub delete: Vec<CardDeletion>,
    pub create: Vec<NewCard>,
    pub update: Vec<CardUpdate>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.create.is_empty() && self.update.is_empty()
    }

    /// Ids of every card scheduled for deletion.
    pub fn delete_ids(&self) -> Vec<u64> {
        self.delete.iter().map(|d| d.id).collect()
    }
}

/// Compute the plan. Both maps are keyed by card front.
///
/// - fronts only in `current` are deleted
/// - fronts only in `desired` are created in their deck
/// - fronts in both are updated only when the back differs
pub fn plan(
    current: &BTreeMap<String, ExistingCard>,
    desired: &BTreeMap<String, DesiredCard>,
) -> SyncPlan {
    let mut plan = SyncPlan::default();

    for (front, card) in current {
        match desired.get(front) {
            None => plan.delete.push(CardDeletion {
                id: card.id,
                front: front.clone(),
            }),
            Some(wanted) if wanted.back != card.back => plan.update.push(CardUpdate {
                id: card.id,
                front: front.clone(),
                back: wanted.back.clone(),
            }),
            Some(_) => {}
        }
    }

    for (front, wanted) in desired {
        if !current.contains_key(front) {
            plan.create.push(NewCard {
                front: front.clone(),
                back: wanted.back.clone(),
                deck: wanted.deck.clone(),
            });
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn existing(id: u64, front: &str, back: &str) -> (String, ExistingCard) {
        (
            front.to_string(),
            ExistingCard {
                id,
                front: front.to_string(),
                back: back.to_string(),
            },
        )
    }

    fn desired(front: &str, back: &str, deck: &str) -> (String, DesiredCard) {
        (
            front.to_string(),
            DesiredCard {
                back: back.to_string(),
                deck: deck.to_string(),
            },
        )
    }

    #[test]
    fn deletes_creates_and_skips_unchanged() {
        let current: BTreeMap<_, _> = [existing(1, "A", "x"), existing(2, "B", "y")].into();
        let wanted: BTreeMap<_, _> = [desired("B", "y", "Deck1"), desired("C", "z", "Deck1")].into();

        let plan = plan(&current, &wanted);

        assert_eq!(
            plan,
            SyncPlan {
                delete: vec![CardDeletion {
                    id: 1,
                    front: "A".to_string()
                }],
                create: vec![NewCard {
                    front: "C".to_string(),
                    back: "z".to_string(),
                    deck: "Deck1".to_string(),
                }],
                update: vec![],
            }
        );
        assert_eq!(plan.delete_ids(), vec![1]);
    }

    #[test]
    fn changed_back_is_updated() {
        let current: BTreeMap<_, _> = [existing(7, "A", "old")].into();
        let wanted: BTreeMap<_, _> = [desired("A", "new", "Deck")].into();

        let plan = plan(&current, &wanted);

        assert!(plan.delete.is_empty());
        assert!(plan.create.is_empty());
        assert_eq!(
            plan.update,
            vec![CardUpdate {
                id: 7,
                front: "A".to_string(),
                back: "new".to_string(),
            }]
        );
    }

    #[test]
    fn identical_sets_need_nothing() {
        let current: BTreeMap<_, _> = [existing(1, "A", "x")].into();
        let wanted: BTreeMap<_, _> = [desired("A", "x", "Deck")].into();
        assert!(plan(&current, &wanted).is_empty());
    }

    #[test]
    fn empty_store_creates_everything() {
        let wanted: BTreeMap<_, _> = [desired("A", "x", "D1"), desired("B", "y", "D2")].into();
        let plan = plan(&BTreeMap::new(), &wanted);
        assert_eq!(plan.create.len(), 2);
        assert_eq!(plan.create[1].deck, "D2");
    }

    #[test]
    fn empty_notes_delete_everything() {
        let current: BTreeMap<_, _> = [existing(1, "A", "x"), existing(2, "B", "y")].into();
        let plan = plan(&current, &BTreeMap::new());
        assert_eq!(plan.delete_ids(), vec![1, 2]);
    }
}
