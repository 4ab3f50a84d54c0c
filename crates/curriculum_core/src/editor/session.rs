//! Editor session: current location, breadcrumbs and debounced duration input.
//!
//! # Invariants
//! - Navigating anywhere cancels a pending duration commit.
//! - A duration commit targets the node that was current when it was typed.

use crate::config::CoreConfig;
use crate::duration::{normalize_input, DurationUnit};
use crate::editor::debounce::Debouncer;
use crate::model::node::{NodeFields, NodeId, NodePatch};
use crate::store::CurriculumStore;
use crate::tree::navigator::{breadcrumbs, crumb_target, resolve, Breadcrumb, ViewState};
use crate::tree::path::{NodePath, PathParseError};
use log::debug;
use std::time::{Duration, Instant};

/// Normalized duration waiting for the quiet period; `None` clears the field.
type PendingDuration = (NodePath, Option<String>);

pub struct EditorSession<S: CurriculumStore> {
    store: S,
    path: NodePath,
    pending_duration: Debouncer<PendingDuration>,
}

impl<S: CurriculumStore> EditorSession<S> {
    pub fn new(store: S, quiet_period: Duration) -> Self {
        Self {
            store,
            path: NodePath::root(),
            pending_duration: Debouncer::new(quiet_period),
        }
    }

    /// Session using the configured debounce quiet period.
    pub fn from_config(store: S, config: &CoreConfig) -> Self {
        Self::new(store, config.debounce)
    }

    pub fn quiet_period(&self) -> Duration {
        self.pending_duration.quiet_period()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn navigate(&mut self, path: NodePath) {
        if self.pending_duration.cancel() {
            debug!("event=duration_cancel module=editor reason=navigate");
        }
        self.path = path;
    }

    /// Navigates to a flat `[kind, id, ...]` path.
    pub fn navigate_flat<T: AsRef<str>>(&mut self, flat: &[T]) -> Result<(), PathParseError> {
        let path = NodePath::from_flat(flat)?;
        self.navigate(path);
        Ok(())
    }

    /// Jumps to the ancestor shown at breadcrumb `index` (0 is home).
    pub fn navigate_to_crumb(&mut self, index: usize) {
        let target = crumb_target(&self.path, index);
        self.navigate(target);
    }

    pub fn current_view(&self) -> ViewState<'_> {
        resolve(self.store.tree(), &self.path)
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        breadcrumbs(self.store.tree(), &self.path)
    }

    /// Records duration input for the current node.
    ///
    /// The value is normalized now and committed by [`Self::tick`] once no
    /// further input arrives for the quiet period. Returns `false` when the
    /// current path does not address a node with a duration.
    pub fn type_duration(&mut self, raw: &str, unit: DurationUnit, now: Instant) -> bool {
        let Some(node) = self.store.tree().get(&self.path) else {
            return false;
        };
        if node.level.parent().is_none() {
            return false;
        }
        let normalized = normalize_input(raw, unit);
        self.pending_duration.push((self.path.clone(), normalized), now);
        true
    }

    pub fn has_pending_duration(&self) -> bool {
        self.pending_duration.is_pending()
    }

    /// Commits a pending duration whose quiet period has elapsed.
    ///
    /// Returns `true` when a value was written.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some((path, duration)) = self.pending_duration.poll(now) else {
            return false;
        };
        let Some(level) = path.level() else {
            return false;
        };
        debug!(
            "event=duration_commit module=editor level={} cleared={}",
            level.as_str(),
            duration.is_none()
        );
        self.store.update_node(level, &path, NodePatch::duration(duration))
    }

    /// Creates a curriculum and opens its detail view.
    pub fn add_curriculum_and_open(&mut self, name: &str) -> Option<NodeId> {
        let id = self.store.add_curriculum(name, NodeFields::default())?;
        self.navigate(NodePath::curriculum(id.clone()));
        Some(id)
    }
}
