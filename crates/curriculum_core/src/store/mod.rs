//! Curriculum tree store contract and its persistence variants.
//!
//! # Responsibility
//! - Expose path-addressed add/update/delete operations per hierarchy level.
//! - Route every write through one `apply(Mutation)` entry point.
//!
//! # Invariants
//! - Typed operations addressed at the wrong level are ignored.
//! - A path whose ids do not all resolve is ignored; no error is raised.
//! - Store failures surface through `last_error()`, never as panics.

use crate::model::curriculum::{
    ActivityType, ActivityTypePatch, Curriculum, Standard, StandardCode, StandardCodePatch,
    StandardPatch,
};
use crate::model::node::{generate_id, Level, NodeData, NodeFields, NodeId, NodePatch};
use crate::tree::arena::CurriculumTree;
use crate::tree::mutation::{CatalogChange, Mutation, MutationOutcome};
use crate::tree::path::NodePath;

pub mod api;
pub mod local;
mod open;
pub mod remote;

pub use open::{with_store, StoreOpenError};

/// Canonical curriculum tree plus a mirrored persistence layer.
///
/// Implementors provide `apply` and the read/refresh methods; the typed
/// operations are built on top of `apply`.
pub trait CurriculumStore {
    /// Current in-memory tree.
    fn tree(&self) -> &CurriculumTree;

    /// Applies one mutation and mirrors it to the backing layer.
    fn apply(&mut self, mutation: Mutation) -> MutationOutcome;

    /// Replaces the in-memory tree with the persisted one.
    fn reload(&mut self);

    /// User-facing message for the last failed backing operation.
    fn last_error(&self) -> Option<&str>;

    fn clear_error(&mut self);

    /// Nested snapshot of every curriculum.
    fn curricula(&self) -> Vec<Curriculum> {
        self.tree().to_curricula()
    }

    /// Adds a node of `level` under `parent`, returning the generated id.
    fn add_node(
        &mut self,
        level: Level,
        parent: &NodePath,
        name: &str,
        fields: NodeFields,
    ) -> Option<NodeId> {
        let data = NodeData::create(name, fields);
        self.apply(Mutation::AddNode {
            parent: parent.clone(),
            level,
            data,
        })
        .created_id()
    }

    /// Merges `patch` into the node at `path` if it sits at `level`.
    fn update_node(&mut self, level: Level, path: &NodePath, patch: NodePatch) -> bool {
        if path.level() != Some(level) {
            return false;
        }
        !self
            .apply(Mutation::UpdateNode {
                path: path.clone(),
                patch,
            })
            .is_ignored()
    }

    /// Removes the node at `path` and its subtree if it sits at `level`.
    fn delete_node(&mut self, level: Level, path: &NodePath) -> bool {
        if path.level() != Some(level) {
            return false;
        }
        !self
            .apply(Mutation::DeleteNode { path: path.clone() })
            .is_ignored()
    }

    fn add_curriculum(&mut self, name: &str, fields: NodeFields) -> Option<NodeId> {
        self.add_node(Level::Curriculum, &NodePath::root(), name, fields)
    }

    fn update_curriculum(&mut self, path: &NodePath, patch: NodePatch) -> bool {
        self.update_node(Level::Curriculum, path, patch)
    }

    fn delete_curriculum(&mut self, path: &NodePath) -> bool {
        self.delete_node(Level::Curriculum, path)
    }

    fn add_grade(&mut self, curriculum: &NodePath, name: &str, fields: NodeFields) -> Option<NodeId> {
        self.add_node(Level::Grade, curriculum, name, fields)
    }

    fn update_grade(&mut self, path: &NodePath, patch: NodePatch) -> bool {
        self.update_node(Level::Grade, path, patch)
    }

    fn delete_grade(&mut self, path: &NodePath) -> bool {
        self.delete_node(Level::Grade, path)
    }

    fn add_book(&mut self, grade: &NodePath, name: &str, fields: NodeFields) -> Option<NodeId> {
        self.add_node(Level::Book, grade, name, fields)
    }

    fn update_book(&mut self, path: &NodePath, patch: NodePatch) -> bool {
        self.update_node(Level::Book, path, patch)
    }

    fn delete_book(&mut self, path: &NodePath) -> bool {
        self.delete_node(Level::Book, path)
    }

    fn add_unit(&mut self, book: &NodePath, name: &str, fields: NodeFields) -> Option<NodeId> {
        self.add_node(Level::Unit, book, name, fields)
    }

    fn update_unit(&mut self, path: &NodePath, patch: NodePatch) -> bool {
        self.update_node(Level::Unit, path, patch)
    }

    fn delete_unit(&mut self, path: &NodePath) -> bool {
        self.delete_node(Level::Unit, path)
    }

    fn add_lesson(&mut self, unit: &NodePath, name: &str, fields: NodeFields) -> Option<NodeId> {
        self.add_node(Level::Lesson, unit, name, fields)
    }

    fn update_lesson(&mut self, path: &NodePath, patch: NodePatch) -> bool {
        self.update_node(Level::Lesson, path, patch)
    }

    fn delete_lesson(&mut self, path: &NodePath) -> bool {
        self.delete_node(Level::Lesson, path)
    }

    fn add_stage(&mut self, lesson: &NodePath, name: &str, fields: NodeFields) -> Option<NodeId> {
        self.add_node(Level::Stage, lesson, name, fields)
    }

    fn update_stage(&mut self, path: &NodePath, patch: NodePatch) -> bool {
        self.update_node(Level::Stage, path, patch)
    }

    fn delete_stage(&mut self, path: &NodePath) -> bool {
        self.delete_node(Level::Stage, path)
    }

    fn add_activity(&mut self, stage: &NodePath, name: &str, fields: NodeFields) -> Option<NodeId> {
        self.add_node(Level::Activity, stage, name, fields)
    }

    fn update_activity(&mut self, path: &NodePath, patch: NodePatch) -> bool {
        self.update_node(Level::Activity, path, patch)
    }

    fn delete_activity(&mut self, path: &NodePath) -> bool {
        self.delete_node(Level::Activity, path)
    }

    /// Applies a catalog change to one curriculum; `true` when it took effect.
    fn change_catalog(&mut self, curriculum_id: &str, change: CatalogChange) -> bool {
        !self
            .apply(Mutation::Catalog {
                curriculum_id: curriculum_id.to_string(),
                change,
            })
            .is_ignored()
    }

    fn add_standard(
        &mut self,
        curriculum_id: &str,
        name: &str,
        description: Option<String>,
    ) -> Option<NodeId> {
        let standard = Standard {
            id: generate_id(),
            name: name.to_string(),
            description,
            codes: Vec::new(),
        };
        self.apply(Mutation::Catalog {
            curriculum_id: curriculum_id.to_string(),
            change: CatalogChange::AddStandard(standard),
        })
        .created_id()
    }

    fn update_standard(&mut self, curriculum_id: &str, standard_id: &str, patch: StandardPatch) -> bool {
        self.change_catalog(
            curriculum_id,
            CatalogChange::UpdateStandard {
                standard_id: standard_id.to_string(),
                patch,
            },
        )
    }

    fn delete_standard(&mut self, curriculum_id: &str, standard_id: &str) -> bool {
        self.change_catalog(
            curriculum_id,
            CatalogChange::DeleteStandard {
                standard_id: standard_id.to_string(),
            },
        )
    }

    /// Codes are identified by `code`; a duplicate within the standard is ignored.
    fn add_standard_code(&mut self, curriculum_id: &str, standard_id: &str, code: StandardCode) -> bool {
        self.change_catalog(
            curriculum_id,
            CatalogChange::AddStandardCode {
                standard_id: standard_id.to_string(),
                code,
            },
        )
    }

    fn update_standard_code(
        &mut self,
        curriculum_id: &str,
        standard_id: &str,
        code: &str,
        patch: StandardCodePatch,
    ) -> bool {
        self.change_catalog(
            curriculum_id,
            CatalogChange::UpdateStandardCode {
                standard_id: standard_id.to_string(),
                code: code.to_string(),
                patch,
            },
        )
    }

    fn delete_standard_code(&mut self, curriculum_id: &str, standard_id: &str, code: &str) -> bool {
        self.change_catalog(
            curriculum_id,
            CatalogChange::DeleteStandardCode {
                standard_id: standard_id.to_string(),
                code: code.to_string(),
            },
        )
    }

    fn add_activity_type(
        &mut self,
        curriculum_id: &str,
        name: &str,
        color: &str,
        icon: &str,
    ) -> Option<NodeId> {
        let activity_type = ActivityType {
            id: generate_id(),
            name: name.to_string(),
            description: None,
            color: color.to_string(),
            icon: icon.to_string(),
        };
        self.apply(Mutation::Catalog {
            curriculum_id: curriculum_id.to_string(),
            change: CatalogChange::AddActivityType(activity_type),
        })
        .created_id()
    }

    fn update_activity_type(
        &mut self,
        curriculum_id: &str,
        activity_type_id: &str,
        patch: ActivityTypePatch,
    ) -> bool {
        self.change_catalog(
            curriculum_id,
            CatalogChange::UpdateActivityType {
                activity_type_id: activity_type_id.to_string(),
                patch,
            },
        )
    }

    fn delete_activity_type(&mut self, curriculum_id: &str, activity_type_id: &str) -> bool {
        self.change_catalog(
            curriculum_id,
            CatalogChange::DeleteActivityType {
                activity_type_id: activity_type_id.to_string(),
            },
        )
    }

    /// Bulk-adds parsed curricula. Curricula reusing an existing id are skipped.
    fn import_curricula(&mut self, curricula: Vec<Curriculum>) -> bool {
        if curricula.is_empty() {
            return false;
        }
        !self.apply(Mutation::Import { curricula }).is_ignored()
    }
}

impl<S: CurriculumStore + ?Sized> CurriculumStore for &mut S {
    fn tree(&self) -> &CurriculumTree {
        (**self).tree()
    }

    fn apply(&mut self, mutation: Mutation) -> MutationOutcome {
        (**self).apply(mutation)
    }

    fn reload(&mut self) {
        (**self).reload()
    }

    fn last_error(&self) -> Option<&str> {
        (**self).last_error()
    }

    fn clear_error(&mut self) {
        (**self).clear_error()
    }
}
