//! Ancestor-chain addressing for hierarchy nodes.
//!
//! # Responsibility
//! - Represent the `[kind, id, kind, id, ...]` chain the editor navigates by.
//! - Parse and render the flat string form used across the UI boundary.
//!
//! # Invariants
//! - A well-formed path has segment `i` at hierarchy depth `i`.
//! - The empty path addresses the home view (the list of curricula).

use crate::model::node::{Level, NodeId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One `(level, id)` step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathSegment {
    pub level: Level,
    pub id: NodeId,
}

/// Explicit chain of ancestor ids, root first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodePath {
    segments: Vec<PathSegment>,
}

/// Errors from parsing the flat path form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Flat form must alternate kind and id.
    OddLength(usize),
    /// Segment kind is not a known level keyword.
    UnknownKind(String),
    /// Segment kind does not follow hierarchy order.
    OutOfOrder {
        position: usize,
        expected: Option<Level>,
        found: Level,
    },
    /// Segment id is blank.
    EmptyId(usize),
}

impl Display for PathParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddLength(len) => write!(f, "path must alternate kind and id, got {len} items"),
            Self::UnknownKind(kind) => write!(f, "unknown path kind `{kind}`"),
            Self::OutOfOrder {
                position,
                expected: Some(expected),
                found,
            } => write!(
                f,
                "path segment {position} must be `{}`, got `{}`",
                expected.as_str(),
                found.as_str()
            ),
            Self::OutOfOrder {
                position, found, ..
            } => write!(
                f,
                "path segment {position} `{}` is deeper than the hierarchy",
                found.as_str()
            ),
            Self::EmptyId(position) => write!(f, "path segment {position} has an empty id"),
        }
    }
}

impl Error for PathParseError {}

impl NodePath {
    /// Home path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn curriculum(id: impl Into<NodeId>) -> Self {
        Self::root().child(Level::Curriculum, id)
    }

    pub fn grade(self, id: impl Into<NodeId>) -> Self {
        self.child(Level::Grade, id)
    }

    pub fn book(self, id: impl Into<NodeId>) -> Self {
        self.child(Level::Book, id)
    }

    pub fn unit(self, id: impl Into<NodeId>) -> Self {
        self.child(Level::Unit, id)
    }

    pub fn lesson(self, id: impl Into<NodeId>) -> Self {
        self.child(Level::Lesson, id)
    }

    pub fn stage(self, id: impl Into<NodeId>) -> Self {
        self.child(Level::Stage, id)
    }

    pub fn activity(self, id: impl Into<NodeId>) -> Self {
        self.child(Level::Activity, id)
    }

    /// Appends one segment without validating hierarchy order.
    pub fn child(mut self, level: Level, id: impl Into<NodeId>) -> Self {
        self.segments.push(PathSegment {
            level,
            id: id.into(),
        });
        self
    }

    /// Parses `[kind, id, kind, id, ...]`.
    pub fn from_flat<S: AsRef<str>>(items: &[S]) -> Result<Self, PathParseError> {
        if items.len() % 2 != 0 {
            return Err(PathParseError::OddLength(items.len()));
        }

        let mut path = Self::root();
        for (position, pair) in items.chunks(2).enumerate() {
            let kind = pair[0].as_ref();
            let level =
                Level::parse(kind).ok_or_else(|| PathParseError::UnknownKind(kind.to_string()))?;
            let expected = Level::from_depth(position);
            if expected != Some(level) {
                return Err(PathParseError::OutOfOrder {
                    position,
                    expected,
                    found: level,
                });
            }
            let id = pair[1].as_ref().trim();
            if id.is_empty() {
                return Err(PathParseError::EmptyId(position));
            }
            path = path.child(level, id);
        }
        Ok(path)
    }

    /// Renders the flat `[kind, id, ...]` form.
    pub fn to_flat(&self) -> Vec<String> {
        self.segments
            .iter()
            .flat_map(|segment| [segment.level.as_str().to_string(), segment.id.clone()])
            .collect()
    }

    /// Length of the flat form (twice the segment count).
    pub fn flat_len(&self) -> usize {
        self.segments.len() * 2
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn leaf(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Level of the addressed node; `None` for the home path.
    pub fn level(&self) -> Option<Level> {
        self.leaf().map(|segment| segment.level)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(self.truncate(self.depth() - 1))
    }

    /// Keeps the first `depth` segments.
    pub fn truncate(&self, depth: usize) -> Self {
        Self {
            segments: self.segments.iter().take(depth).cloned().collect(),
        }
    }

    /// Id addressed at `level`, when the path reaches that deep.
    pub fn id_at(&self, level: Level) -> Option<&str> {
        self.segments
            .get(level.depth())
            .filter(|segment| segment.level == level)
            .map(|segment| segment.id.as_str())
    }

    /// Every segment sits at the depth its level demands.
    pub fn is_well_formed(&self) -> bool {
        self.segments
            .iter()
            .enumerate()
            .all(|(depth, segment)| segment.level.depth() == depth)
    }
}

impl Display for NodePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}:{}", segment.level.as_str(), segment.id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{NodePath, PathParseError};
    use crate::model::node::Level;

    #[test]
    fn flat_form_roundtrips() {
        let path = NodePath::curriculum("c1").grade("g1").book("b1");
        let flat = path.to_flat();
        assert_eq!(flat, vec!["curriculum", "c1", "grade", "g1", "book", "b1"]);
        assert_eq!(NodePath::from_flat(&flat).unwrap(), path);
        assert_eq!(path.flat_len(), 6);
    }

    #[test]
    fn from_flat_rejects_malformed_input() {
        assert_eq!(
            NodePath::from_flat(&["curriculum"]),
            Err(PathParseError::OddLength(1))
        );
        assert!(matches!(
            NodePath::from_flat(&["grade", "g1"]),
            Err(PathParseError::OutOfOrder { position: 0, .. })
        ));
        assert!(matches!(
            NodePath::from_flat(&["curriculum", "c1", "chapter", "x"]),
            Err(PathParseError::UnknownKind(_))
        ));
        assert_eq!(
            NodePath::from_flat(&["curriculum", "  "]),
            Err(PathParseError::EmptyId(0))
        );
    }

    #[test]
    fn truncate_and_parent_walk_up_the_chain() {
        let path = NodePath::curriculum("c1").grade("g1").book("b1");
        assert_eq!(path.truncate(1), NodePath::curriculum("c1"));
        assert_eq!(path.parent(), Some(NodePath::curriculum("c1").grade("g1")));
        assert_eq!(NodePath::root().parent(), None);
        assert_eq!(path.id_at(Level::Grade), Some("g1"));
        assert_eq!(path.id_at(Level::Unit), None);
    }

    #[test]
    fn builder_paths_can_be_ill_formed() {
        let skipped = NodePath::curriculum("c1").book("b1");
        assert!(!skipped.is_well_formed());
        assert!(NodePath::curriculum("c1").grade("g1").is_well_formed());
    }
}
