//! Remote store: one REST request per mutation, then a full reload.
//!
//! # Invariants
//! - The in-memory tree only changes through `reload()`.
//! - Failures set `last_error()`; the previous tree is kept.
//! - A sent request or a successful reload clears the previous failure.
//! - No retry, rollback or request fencing.

use crate::store::api::{request_for, ApiError, CurriculumApi};
use crate::store::CurriculumStore;
use crate::tree::arena::CurriculumTree;
use crate::tree::mutation::{Mutation, MutationOutcome};
use log::{debug, error, info};

/// Store mirroring a REST backend.
pub struct RemoteCurriculumStore<A: CurriculumApi> {
    api: A,
    tree: CurriculumTree,
    last_error: Option<String>,
}

impl<A: CurriculumApi> RemoteCurriculumStore<A> {
    /// Creates the store and performs the initial fetch.
    pub fn new(api: A) -> Self {
        let mut store = Self {
            api,
            tree: CurriculumTree::new(),
            last_error: None,
        };
        store.reload();
        store
    }

    fn record_failure(&mut self, what: &str, err: &ApiError) {
        error!("event=remote_sync module=store status=error action={what} error={err}");
        self.last_error = Some(format!("Failed to {what}: {err}"));
    }
}

impl<A: CurriculumApi> CurriculumStore for RemoteCurriculumStore<A> {
    fn tree(&self) -> &CurriculumTree {
        &self.tree
    }

    fn apply(&mut self, mutation: Mutation) -> MutationOutcome {
        let what = describe(&mutation);
        let request = match request_for(&self.tree, &mutation) {
            Ok(Some(request)) => request,
            Ok(None) => {
                debug!("event=remote_sync module=store status=ignored action={what}");
                return MutationOutcome::Ignored;
            }
            Err(err) => {
                self.record_failure(&what, &err);
                return MutationOutcome::Ignored;
            }
        };

        self.last_error = None;
        info!(
            "event=remote_sync module=store status=start action={what} method={} path={}",
            request.method.as_str(),
            request.path
        );
        if let Err(err) = self.api.send(&request) {
            self.record_failure(&what, &err);
            return MutationOutcome::Ignored;
        }

        self.reload();
        match mutation {
            Mutation::AddNode { data, .. } => MutationOutcome::Created(data.id),
            Mutation::Catalog { change, .. } => match change.created_id() {
                Some(id) => MutationOutcome::Created(id.to_string()),
                None => MutationOutcome::Applied,
            },
            _ => MutationOutcome::Applied,
        }
    }

    fn reload(&mut self) {
        match self.api.fetch_curricula() {
            Ok(curricula) => {
                self.tree = CurriculumTree::from_curricula(&curricula);
                self.last_error = None;
                info!(
                    "event=remote_reload module=store status=ok curricula={}",
                    curricula.len()
                );
            }
            Err(err) => self.record_failure("load curricula", &err),
        }
    }

    fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn clear_error(&mut self) {
        self.last_error = None;
    }
}

fn describe(mutation: &Mutation) -> String {
    match mutation.level() {
        Some(level) => format!("{} {}", mutation.action(), level.as_str()),
        None => mutation.action().to_string(),
    }
}
