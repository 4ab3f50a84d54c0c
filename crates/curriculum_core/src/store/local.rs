//! Local-first store persisting the whole tree as one key-value document.
//!
//! # Invariants
//! - The in-memory tree is authoritative; persistence failures never roll
//!   it back.
//! - Every applied mutation rewrites the full `curriculums` document.

use crate::model::curriculum::Curriculum;
use crate::repo::kv_repo::KvRepository;
use crate::store::CurriculumStore;
use crate::tree::arena::CurriculumTree;
use crate::tree::mutation::{Mutation, MutationOutcome};
use log::{error, info, warn};

/// Key holding the serialized curriculum array.
pub const CURRICULA_KEY: &str = "curriculums";

/// Store backed by a synchronous key-value repository.
pub struct LocalCurriculumStore<R: KvRepository> {
    repo: R,
    tree: CurriculumTree,
}

impl<R: KvRepository> LocalCurriculumStore<R> {
    /// Opens the store and loads the persisted tree.
    ///
    /// An unreadable or malformed document is logged and the store starts
    /// empty.
    pub fn new(repo: R) -> Self {
        let tree = load_tree(&repo);
        Self { repo, tree }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    fn persist(&self) {
        let curricula = self.tree.to_curricula();
        let blob = match serde_json::to_string(&curricula) {
            Ok(blob) => blob,
            Err(err) => {
                error!("event=store_persist module=store status=error stage=encode error={err}");
                return;
            }
        };
        match self.repo.put(CURRICULA_KEY, &blob) {
            Ok(()) => info!(
                "event=store_persist module=store status=ok curricula={} bytes={}",
                curricula.len(),
                blob.len()
            ),
            Err(err) => {
                error!("event=store_persist module=store status=error stage=write error={err}")
            }
        }
    }
}

impl<R: KvRepository> CurriculumStore for LocalCurriculumStore<R> {
    fn tree(&self) -> &CurriculumTree {
        &self.tree
    }

    fn apply(&mut self, mutation: Mutation) -> MutationOutcome {
        let outcome = self.tree.apply(&mutation);
        if !outcome.is_ignored() {
            self.persist();
        }
        outcome
    }

    fn reload(&mut self) {
        self.tree = load_tree(&self.repo);
    }

    /// Local failures are logged only; there is never a pending message.
    fn last_error(&self) -> Option<&str> {
        None
    }

    fn clear_error(&mut self) {}
}

fn load_tree(repo: &impl KvRepository) -> CurriculumTree {
    let blob = match repo.get(CURRICULA_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return CurriculumTree::new(),
        Err(err) => {
            error!("event=store_load module=store status=error stage=read error={err}");
            return CurriculumTree::new();
        }
    };

    // Missing `standards`/`activityTypes` arrays default to empty on decode.
    match serde_json::from_str::<Vec<Curriculum>>(&blob) {
        Ok(curricula) => {
            let tree = CurriculumTree::from_curricula(&curricula);
            info!(
                "event=store_load module=store status=ok curricula={} nodes={}",
                curricula.len(),
                tree.len()
            );
            tree
        }
        Err(err) => {
            warn!("event=store_load module=store status=error stage=decode error={err}");
            CurriculumTree::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LocalCurriculumStore, CURRICULA_KEY};
    use crate::db::open_db_in_memory;
    use crate::model::node::NodeFields;
    use crate::repo::kv_repo::{KvRepository, SqliteKvRepository};
    use crate::store::CurriculumStore;

    #[test]
    fn malformed_blob_starts_empty() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteKvRepository::try_new(&conn).unwrap();
        repo.put(CURRICULA_KEY, "{not json").unwrap();

        let store = LocalCurriculumStore::new(repo);
        assert!(store.tree().is_empty());
    }

    #[test]
    fn ignored_mutation_does_not_write() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteKvRepository::try_new(&conn).unwrap();
        let mut store = LocalCurriculumStore::new(repo);

        let path = crate::tree::path::NodePath::curriculum("missing");
        assert!(store.add_grade(&path, "G1", NodeFields::default()).is_none());
        assert_eq!(store.repo().get(CURRICULA_KEY).unwrap(), None);
    }
}
