//! Arena-backed curriculum tree.
//!
//! # Responsibility
//! - Store every hierarchy node once, with parent and ordered child links.
//! - Resolve ancestor-id paths by walking child lists level by level.
//! - Convert between the arena and nested `Curriculum` documents.
//!
//! # Invariants
//! - A node's children all sit exactly one level below it.
//! - Sibling ids are unique; inserts that would duplicate one are refused.
//! - Removing a node frees its whole subtree.

use crate::model::curriculum::{ActivityType, Curriculum, DocumentNode, Standard};
use crate::model::node::{Level, NodeData, NodeId, NodePatch};
use crate::tree::path::NodePath;
use generational_arena::{Arena, Index};

/// Standards and activity-type catalogs owned by one curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    pub standards: Vec<Standard>,
    pub activity_types: Vec<ActivityType>,
}

#[derive(Debug)]
struct Slot {
    level: Level,
    data: NodeData,
    parent: Option<Index>,
    children: Vec<Index>,
    /// Populated for curriculum slots only.
    catalog: Catalog,
}

/// Borrowed view of one resolved node.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub level: Level,
    pub data: &'a NodeData,
    pub child_count: usize,
}

/// In-memory curriculum hierarchy.
#[derive(Debug, Default)]
pub struct CurriculumTree {
    nodes: Arena<Slot>,
    roots: Vec<Index>,
}

impl CurriculumTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from nested documents, keeping document order.
    ///
    /// A curriculum whose id repeats an earlier one is skipped, as is any
    /// nested child repeating a sibling id.
    pub fn from_curricula(curricula: &[Curriculum]) -> Self {
        let mut tree = Self::new();
        for curriculum in curricula {
            tree.insert_curriculum_document(curriculum);
        }
        tree
    }

    /// Exports the whole tree as nested documents.
    pub fn to_curricula(&self) -> Vec<Curriculum> {
        self.roots
            .iter()
            .filter_map(|&index| self.export_curriculum(index))
            .collect()
    }

    /// Exports one curriculum by id.
    pub fn curriculum(&self, curriculum_id: &str) -> Option<Curriculum> {
        let index = self.find_among(&self.roots, curriculum_id)?;
        self.export_curriculum(index)
    }

    /// Total number of hierarchy nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolves `path` to the addressed node.
    pub fn get(&self, path: &NodePath) -> Option<NodeRef<'_>> {
        let index = self.locate(path)?;
        let slot = self.nodes.get(index)?;
        Some(NodeRef {
            level: slot.level,
            data: &slot.data,
            child_count: slot.children.len(),
        })
    }

    /// Returns whether `path` resolves to a node.
    pub fn contains(&self, path: &NodePath) -> bool {
        self.locate(path).is_some()
    }

    /// Children of the addressed node in display order; the home path lists
    /// curricula. `None` when the path does not resolve.
    pub fn children(&self, path: &NodePath) -> Option<Vec<NodeRef<'_>>> {
        let child_indexes = if path.is_root() {
            &self.roots
        } else {
            let index = self.locate(path)?;
            &self.nodes.get(index)?.children
        };
        Some(
            child_indexes
                .iter()
                .filter_map(|&index| self.nodes.get(index))
                .map(|slot| NodeRef {
                    level: slot.level,
                    data: &slot.data,
                    child_count: slot.children.len(),
                })
                .collect(),
        )
    }

    /// Catalog of one curriculum.
    pub fn catalog(&self, curriculum_id: &str) -> Option<&Catalog> {
        let index = self.find_among(&self.roots, curriculum_id)?;
        self.nodes.get(index).map(|slot| &slot.catalog)
    }

    pub fn catalog_mut(&mut self, curriculum_id: &str) -> Option<&mut Catalog> {
        let index = self.find_among(&self.roots, curriculum_id)?;
        self.nodes.get_mut(index).map(|slot| &mut slot.catalog)
    }

    /// Appends `data` as a `level` child of `parent`.
    ///
    /// Returns the new id, or `None` when the parent does not resolve, the
    /// level is not the parent's child level, or a sibling already uses the id.
    pub fn insert(&mut self, parent: &NodePath, level: Level, data: NodeData) -> Option<NodeId> {
        if child_level_of(parent) != Some(level) {
            return None;
        }
        let parent_index = if parent.is_root() {
            None
        } else {
            Some(self.locate(parent)?)
        };
        if self.sibling_exists(parent_index, &data.id) {
            return None;
        }

        let id = data.id.clone();
        self.attach(parent_index, level, data, Catalog::default());
        Some(id)
    }

    /// Whether `insert(parent, level, data)` would succeed.
    pub fn can_insert(&self, parent: &NodePath, level: Level, id: &str) -> bool {
        if child_level_of(parent) != Some(level) {
            return false;
        }
        let parent_index = if parent.is_root() {
            None
        } else {
            match self.locate(parent) {
                Some(index) => Some(index),
                None => return false,
            }
        };
        !self.sibling_exists(parent_index, id)
    }

    /// Appends a nested curriculum document with its whole subtree and
    /// catalogs. Returns `false` when a curriculum with the same id exists.
    pub fn insert_curriculum_document(&mut self, curriculum: &Curriculum) -> bool {
        if self.sibling_exists(None, &curriculum.id) {
            return false;
        }
        let catalog = Catalog {
            standards: curriculum.standards.clone(),
            activity_types: curriculum.activity_types.clone(),
        };
        let index = self.attach(None, Level::Curriculum, curriculum.node_data(), catalog);
        self.insert_children(index, curriculum.children());
        true
    }

    /// Shallow-merges `patch` into the addressed node.
    pub fn update(&mut self, path: &NodePath, patch: &NodePatch) -> bool {
        let Some(index) = self.locate(path) else {
            return false;
        };
        match self.nodes.get_mut(index) {
            Some(slot) => {
                patch.apply_to(&mut slot.data);
                true
            }
            None => false,
        }
    }

    /// Removes the addressed node and its entire subtree.
    pub fn remove(&mut self, path: &NodePath) -> bool {
        let Some(index) = self.locate(path) else {
            return false;
        };
        let parent = self.nodes.get(index).and_then(|slot| slot.parent);
        match parent.and_then(|parent_index| self.nodes.get_mut(parent_index)) {
            Some(parent_slot) => parent_slot.children.retain(|&child| child != index),
            None => self.roots.retain(|&root| root != index),
        }

        let mut pending = vec![index];
        while let Some(current) = pending.pop() {
            if let Some(slot) = self.nodes.remove(current) {
                pending.extend(slot.children);
            }
        }
        true
    }

    fn locate(&self, path: &NodePath) -> Option<Index> {
        if path.is_root() || !path.is_well_formed() {
            return None;
        }
        let mut candidates = &self.roots;
        let mut found = None;
        for segment in path.segments() {
            let index = self.find_among(candidates, &segment.id)?;
            candidates = &self.nodes.get(index)?.children;
            found = Some(index);
        }
        found
    }

    fn find_among(&self, candidates: &[Index], id: &str) -> Option<Index> {
        candidates.iter().copied().find(|&index| {
            self.nodes
                .get(index)
                .is_some_and(|slot| slot.data.id == id)
        })
    }

    fn sibling_exists(&self, parent: Option<Index>, id: &str) -> bool {
        let siblings = match parent {
            Some(index) => match self.nodes.get(index) {
                Some(slot) => &slot.children,
                None => return false,
            },
            None => &self.roots,
        };
        self.find_among(siblings, id).is_some()
    }

    fn attach(
        &mut self,
        parent: Option<Index>,
        level: Level,
        data: NodeData,
        catalog: Catalog,
    ) -> Index {
        let index = self.nodes.insert(Slot {
            level,
            data,
            parent,
            children: Vec::new(),
            catalog,
        });
        match parent.and_then(|parent_index| self.nodes.get_mut(parent_index)) {
            Some(parent_slot) => parent_slot.children.push(index),
            None => self.roots.push(index),
        }
        index
    }

    fn insert_children<T: DocumentNode>(&mut self, parent: Index, children: &[T]) {
        for child in children {
            let data = child.node_data();
            if self.sibling_exists(Some(parent), &data.id) {
                continue;
            }
            let index = self.attach(Some(parent), T::LEVEL, data, Catalog::default());
            self.insert_children(index, child.children());
        }
    }

    fn export<T: DocumentNode>(&self, index: Index) -> Option<T> {
        let slot = self.nodes.get(index)?;
        let children = slot
            .children
            .iter()
            .filter_map(|&child| self.export::<T::Child>(child))
            .collect();
        Some(T::from_parts(slot.data.clone(), children))
    }

    fn export_curriculum(&self, index: Index) -> Option<Curriculum> {
        let mut curriculum = self.export::<Curriculum>(index)?;
        let catalog = &self.nodes.get(index)?.catalog;
        curriculum.standards = catalog.standards.clone();
        curriculum.activity_types = catalog.activity_types.clone();
        Some(curriculum)
    }
}

fn child_level_of(parent: &NodePath) -> Option<Level> {
    match parent.level() {
        None => Some(Level::Curriculum),
        Some(level) => level.child(),
    }
}

#[cfg(test)]
mod tests {
    use super::CurriculumTree;
    use crate::model::node::{Level, NodeData, NodeFields, NodePatch};
    use crate::tree::path::NodePath;

    fn node(id: &str, name: &str) -> NodeData {
        NodeData {
            id: id.to_string(),
            name: name.to_string(),
            ..NodeData::default()
        }
    }

    #[test]
    fn insert_requires_matching_child_level() {
        let mut tree = CurriculumTree::new();
        tree.insert(&NodePath::root(), Level::Curriculum, node("c1", "Math"))
            .unwrap();

        let wrong = tree.insert(&NodePath::curriculum("c1"), Level::Book, node("b1", "B1"));
        assert_eq!(wrong, None);
        let right = tree.insert(&NodePath::curriculum("c1"), Level::Grade, node("g1", "G1"));
        assert_eq!(right.as_deref(), Some("g1"));
    }

    #[test]
    fn insert_refuses_duplicate_sibling_id() {
        let mut tree = CurriculumTree::new();
        tree.insert(&NodePath::root(), Level::Curriculum, node("c1", "Math"))
            .unwrap();
        assert!(tree
            .insert(&NodePath::root(), Level::Curriculum, node("c1", "Again"))
            .is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn same_id_is_allowed_under_different_parents() {
        let mut tree = CurriculumTree::new();
        for id in ["c1", "c2"] {
            tree.insert(&NodePath::root(), Level::Curriculum, node(id, id))
                .unwrap();
            tree.insert(&NodePath::curriculum(id), Level::Grade, node("g", "G"))
                .unwrap();
        }
        tree.update(
            &NodePath::curriculum("c2").grade("g"),
            &NodePatch::name("Renamed"),
        );
        assert_eq!(
            tree.get(&NodePath::curriculum("c1").grade("g")).unwrap().data.name,
            "G"
        );
    }

    #[test]
    fn remove_frees_subtree_slots() {
        let mut tree = CurriculumTree::new();
        tree.insert(&NodePath::root(), Level::Curriculum, node("c1", "Math"))
            .unwrap();
        let grade = NodePath::curriculum("c1").grade("g1");
        tree.insert(&NodePath::curriculum("c1"), Level::Grade, node("g1", "G1"))
            .unwrap();
        tree.insert(&grade, Level::Book, NodeData::create("B1", NodeFields::default()))
            .unwrap();
        assert_eq!(tree.len(), 3);

        assert!(tree.remove(&grade));
        assert_eq!(tree.len(), 1);
        assert!(!tree.remove(&grade));
    }

    #[test]
    fn document_roundtrip_keeps_order_and_catalogs() {
        let json = r#"[{"id":"c1","name":"Math","grades":[
            {"id":"g1","name":"G1","books":[{"id":"b1","name":"B1","units":[
              {"id":"u1","name":"U1","totalTime":"2 Weeks","standardCodes":["1.1"]}]}]},
            {"id":"g2","name":"G2"}],
            "standards":[{"id":"s1","name":"ISTE","codes":[{"code":"1.1","title":"T","description":"D","level":"K"}]}]}]"#;
        let curricula: Vec<crate::model::curriculum::Curriculum> =
            serde_json::from_str(json).unwrap();

        let tree = CurriculumTree::from_curricula(&curricula);
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.to_curricula(), curricula);
    }
}
