//! Resolve selected root folders into every folder of their subtrees.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::error::{CoreError, Result};
use crate::types::{CollisionKind, FolderRecord, ResolvedFolder, TitleCollision};

/// Folders to synchronize, keyed by folder title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderResolution {
    pub folders: BTreeMap<String, ResolvedFolder>,
    /// Titles shared by different folders; the later visit won.
    pub collisions: Vec<TitleCollision>,
    /// Selected root titles that matched no folder.
    pub missing_roots: Vec<String>,
}

impl FolderResolution {
    /// Distinct destination decks, one per matched root.
    pub fn decks(&self) -> BTreeSet<&str> {
        self.folders
            .values()
            .map(|f| f.root_title.as_str())
            .collect()
    }
}

/// Walk the subtree of every folder whose title is a selected root.
///
/// Each visited folder is tagged with its root's title. A folder reached
/// twice within one walk means the graph is not a forest, and fails with
/// [`CoreError::FolderCycle`].
pub fn resolve(all_folders: &[FolderRecord], selected_roots: &[String]) -> Result<FolderResolution> {
    let selected: BTreeSet<&str> = selected_roots.iter().map(String::as_str).collect();

    let mut children: HashMap<&str, Vec<&FolderRecord>> = HashMap::new();
    for folder in all_folders {
        if let Some(parent) = folder.parent() {
            children.entry(parent).or_default().push(folder);
        }
    }

    let mut resolution = FolderResolution::default();
    let mut matched: BTreeSet<&str> = BTreeSet::new();

    for root in all_folders.iter().filter(|f| selected.contains(f.title.as_str())) {
        matched.insert(root.title.as_str());

        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !visited.insert(node.id.as_str()) {
                return Err(CoreError::FolderCycle {
                    id: node.id.clone(),
                });
            }

            let resolved = ResolvedFolder {
                id: node.id.clone(),
                title: node.title.clone(),
                root_title: root.title.clone(),
            };
            if let Some(previous) = resolution.folders.insert(node.title.clone(), resolved) {
                if previous.id != node.id {
                    resolution
                        .collisions
                        .push(TitleCollision::new(CollisionKind::Folder, node.title.clone()));
                }
            }

            if let Some(kids) = children.get(node.id.as_str()) {
                stack.extend(kids.iter().copied());
            }
        }
    }

    resolution.missing_roots = selected
        .difference(&matched)
        .map(|title| title.to_string())
        .collect();

    Ok(resolution)
}
