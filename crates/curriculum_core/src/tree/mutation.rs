//! Store mutations as values.
//!
//! # Responsibility
//! - Describe every write the editor can issue as one `Mutation` value.
//! - Apply mutations to the in-memory tree and catalogs.
//!
//! # Invariants
//! - A mutation whose address does not resolve is ignored, never an error.
//! - Applying a mutation never changes nodes outside its target subtree.

use crate::model::curriculum::{
    ActivityType, ActivityTypePatch, Curriculum, Standard, StandardCode, StandardCodePatch,
    StandardPatch,
};
use crate::model::node::{Level, NodeData, NodeId, NodePatch};
use crate::tree::arena::{Catalog, CurriculumTree};
use crate::tree::path::NodePath;
use log::debug;

/// One write against the curriculum tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Appends `data` (id already generated) under `parent`.
    AddNode {
        parent: NodePath,
        level: Level,
        data: NodeData,
    },
    UpdateNode {
        path: NodePath,
        patch: NodePatch,
    },
    DeleteNode {
        path: NodePath,
    },
    /// Edits the Standard/ActivityType catalogs of one curriculum.
    Catalog {
        curriculum_id: NodeId,
        change: CatalogChange,
    },
    /// Bulk add of pre-parsed curricula (CSV import).
    Import {
        curricula: Vec<Curriculum>,
    },
}

/// Catalog-level edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogChange {
    AddStandard(Standard),
    UpdateStandard {
        standard_id: NodeId,
        patch: StandardPatch,
    },
    DeleteStandard {
        standard_id: NodeId,
    },
    AddStandardCode {
        standard_id: NodeId,
        code: StandardCode,
    },
    UpdateStandardCode {
        standard_id: NodeId,
        code: String,
        patch: StandardCodePatch,
    },
    DeleteStandardCode {
        standard_id: NodeId,
        code: String,
    },
    AddActivityType(ActivityType),
    UpdateActivityType {
        activity_type_id: NodeId,
        patch: ActivityTypePatch,
    },
    DeleteActivityType {
        activity_type_id: NodeId,
    },
}

/// Which catalog a change rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Standards,
    ActivityTypes,
}

impl CatalogChange {
    pub fn kind(&self) -> CatalogKind {
        match self {
            Self::AddStandard(_)
            | Self::UpdateStandard { .. }
            | Self::DeleteStandard { .. }
            | Self::AddStandardCode { .. }
            | Self::UpdateStandardCode { .. }
            | Self::DeleteStandardCode { .. } => CatalogKind::Standards,
            Self::AddActivityType(_)
            | Self::UpdateActivityType { .. }
            | Self::DeleteActivityType { .. } => CatalogKind::ActivityTypes,
        }
    }

    /// Id the change creates, if it is an add.
    pub fn created_id(&self) -> Option<&str> {
        match self {
            Self::AddStandard(standard) => Some(&standard.id),
            Self::AddStandardCode { code, .. } => Some(&code.code),
            Self::AddActivityType(activity_type) => Some(&activity_type.id),
            _ => None,
        }
    }
}

/// Result of applying one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// A node or catalog entry was created with this id.
    Created(NodeId),
    Applied,
    /// Address did not resolve or the write would break sibling uniqueness.
    Ignored,
}

impl MutationOutcome {
    pub fn created_id(self) -> Option<NodeId> {
        match self {
            Self::Created(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

impl Mutation {
    /// Short operation name used in log lines and error messages.
    pub fn action(&self) -> &'static str {
        match self {
            Self::AddNode { .. } => "add",
            Self::UpdateNode { .. } => "update",
            Self::DeleteNode { .. } => "delete",
            Self::Catalog { .. } => "update catalog",
            Self::Import { .. } => "import",
        }
    }

    /// Level the mutation targets; `None` for catalog and import writes.
    pub fn level(&self) -> Option<Level> {
        match self {
            Self::AddNode { level, .. } => Some(*level),
            Self::UpdateNode { path, .. } | Self::DeleteNode { path } => path.level(),
            Self::Catalog { .. } | Self::Import { .. } => None,
        }
    }
}

impl CurriculumTree {
    /// Applies `mutation` in place.
    pub fn apply(&mut self, mutation: &Mutation) -> MutationOutcome {
        let outcome = match mutation {
            Mutation::AddNode {
                parent,
                level,
                data,
            } => match self.insert(parent, *level, data.clone()) {
                Some(id) => MutationOutcome::Created(id),
                None => MutationOutcome::Ignored,
            },
            Mutation::UpdateNode { path, patch } => applied_if(self.update(path, patch)),
            Mutation::DeleteNode { path } => applied_if(self.remove(path)),
            Mutation::Catalog {
                curriculum_id,
                change,
            } => match self.catalog_mut(curriculum_id) {
                Some(catalog) => catalog.apply(change),
                None => MutationOutcome::Ignored,
            },
            Mutation::Import { curricula } => {
                let mut inserted = 0usize;
                for curriculum in curricula {
                    if self.insert_curriculum_document(curriculum) {
                        inserted += 1;
                    } else {
                        debug!(
                            "event=import_skip module=tree status=ignored reason=duplicate_id id={}",
                            curriculum.id
                        );
                    }
                }
                applied_if(inserted > 0)
            }
        };

        if outcome.is_ignored() {
            debug!(
                "event=mutation_ignored module=tree action={} level={}",
                mutation.action(),
                mutation.level().map_or("catalog", Level::as_str)
            );
        }
        outcome
    }

    /// Whether `mutation` would change the tree, without applying it.
    pub fn accepts(&self, mutation: &Mutation) -> bool {
        match mutation {
            Mutation::AddNode {
                parent,
                level,
                data,
            } => self.can_insert(parent, *level, &data.id),
            Mutation::UpdateNode { path, .. } | Mutation::DeleteNode { path } => {
                self.contains(path)
            }
            Mutation::Catalog {
                curriculum_id,
                change,
            } => match self.catalog(curriculum_id) {
                Some(catalog) => !catalog.clone().apply(change).is_ignored(),
                None => false,
            },
            Mutation::Import { curricula } => !curricula.is_empty(),
        }
    }
}

impl Catalog {
    /// Applies one catalog change in place.
    pub fn apply(&mut self, change: &CatalogChange) -> MutationOutcome {
        match change {
            CatalogChange::AddStandard(standard) => {
                if self.standards.iter().any(|item| item.id == standard.id) {
                    return MutationOutcome::Ignored;
                }
                self.standards.push(standard.clone());
                MutationOutcome::Created(standard.id.clone())
            }
            CatalogChange::UpdateStandard { standard_id, patch } => {
                match self.standard_mut(standard_id) {
                    Some(standard) => {
                        patch.apply_to(standard);
                        MutationOutcome::Applied
                    }
                    None => MutationOutcome::Ignored,
                }
            }
            CatalogChange::DeleteStandard { standard_id } => {
                let before = self.standards.len();
                self.standards.retain(|item| &item.id != standard_id);
                applied_if(self.standards.len() != before)
            }
            CatalogChange::AddStandardCode { standard_id, code } => {
                let Some(standard) = self.standard_mut(standard_id) else {
                    return MutationOutcome::Ignored;
                };
                if standard.codes.iter().any(|item| item.code == code.code) {
                    return MutationOutcome::Ignored;
                }
                standard.codes.push(code.clone());
                MutationOutcome::Created(code.code.clone())
            }
            CatalogChange::UpdateStandardCode {
                standard_id,
                code,
                patch,
            } => {
                let Some(standard) = self.standard_mut(standard_id) else {
                    return MutationOutcome::Ignored;
                };
                let renamed_onto_sibling = patch.code.as_ref().is_some_and(|new_code| {
                    new_code != code && standard.codes.iter().any(|item| &item.code == new_code)
                });
                if renamed_onto_sibling {
                    return MutationOutcome::Ignored;
                }
                match standard.codes.iter_mut().find(|item| &item.code == code) {
                    Some(item) => {
                        patch.apply_to(item);
                        MutationOutcome::Applied
                    }
                    None => MutationOutcome::Ignored,
                }
            }
            CatalogChange::DeleteStandardCode { standard_id, code } => {
                let Some(standard) = self.standard_mut(standard_id) else {
                    return MutationOutcome::Ignored;
                };
                let before = standard.codes.len();
                standard.codes.retain(|item| &item.code != code);
                applied_if(standard.codes.len() != before)
            }
            CatalogChange::AddActivityType(activity_type) => {
                if self
                    .activity_types
                    .iter()
                    .any(|item| item.id == activity_type.id)
                {
                    return MutationOutcome::Ignored;
                }
                self.activity_types.push(activity_type.clone());
                MutationOutcome::Created(activity_type.id.clone())
            }
            CatalogChange::UpdateActivityType {
                activity_type_id,
                patch,
            } => match self
                .activity_types
                .iter_mut()
                .find(|item| &item.id == activity_type_id)
            {
                Some(activity_type) => {
                    patch.apply_to(activity_type);
                    MutationOutcome::Applied
                }
                None => MutationOutcome::Ignored,
            },
            CatalogChange::DeleteActivityType { activity_type_id } => {
                let before = self.activity_types.len();
                self.activity_types
                    .retain(|item| &item.id != activity_type_id);
                applied_if(self.activity_types.len() != before)
            }
        }
    }

    fn standard_mut(&mut self, standard_id: &str) -> Option<&mut Standard> {
        self.standards
            .iter_mut()
            .find(|standard| standard.id == standard_id)
    }
}

fn applied_if(changed: bool) -> MutationOutcome {
    if changed {
        MutationOutcome::Applied
    } else {
        MutationOutcome::Ignored
    }
}
