//! Read-only summaries of a curriculum subtree.

use crate::model::node::Level;
use crate::tree::arena::CurriculumTree;
use crate::tree::path::NodePath;

/// Node counts per level below (and including) one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    counts: [usize; 7],
}

impl TreeStats {
    pub fn count(&self, level: Level) -> usize {
        self.counts[level.depth()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Counts nodes in the subtree at `path`; the home path counts everything.
pub fn stats(tree: &CurriculumTree, path: &NodePath) -> TreeStats {
    let mut stats = TreeStats::default();
    for current in walk(tree, path) {
        if let Some(level) = current.level() {
            stats.counts[level.depth()] += 1;
        }
    }
    stats
}

/// Indented text outline of the subtree at `path`, two spaces per level.
pub fn outline(tree: &CurriculumTree, path: &NodePath) -> String {
    let offset = if path.is_root() { 1 } else { path.depth() };
    let mut out = String::new();
    for current in walk(tree, path) {
        let Some(node) = tree.get(&current) else {
            continue;
        };
        let indent = "  ".repeat(current.depth().saturating_sub(offset));
        let line = match node.data.duration.as_deref() {
            Some(duration) => format!(
                "{indent}{}: {} ({duration})\n",
                node.level.label(),
                node.data.name
            ),
            None => format!("{indent}{}: {}\n", node.level.label(), node.data.name),
        };
        out.push_str(&line);
    }
    out
}

/// Pre-order walk in display order. The home path itself is not yielded.
fn walk(tree: &CurriculumTree, path: &NodePath) -> Vec<NodePath> {
    let mut visited = Vec::new();
    if !path.is_root() && !tree.contains(path) {
        return visited;
    }

    let mut stack = vec![path.clone()];
    while let Some(current) = stack.pop() {
        let children = tree.children(&current).unwrap_or_default();
        for child in children.iter().rev() {
            stack.push(current.clone().child(child.level, child.data.id.clone()));
        }
        if !current.is_root() {
            visited.push(current);
        }
    }
    visited
}

#[cfg(test)]
mod tests {
    use super::{outline, stats};
    use crate::model::node::{Level, NodeData};
    use crate::tree::arena::CurriculumTree;
    use crate::tree::path::NodePath;

    fn node(id: &str, name: &str) -> NodeData {
        NodeData {
            id: id.to_string(),
            name: name.to_string(),
            ..NodeData::default()
        }
    }

    fn sample_tree() -> CurriculumTree {
        let mut tree = CurriculumTree::new();
        tree.insert(&NodePath::root(), Level::Curriculum, node("c1", "Math"))
            .unwrap();
        let curriculum = NodePath::curriculum("c1");
        tree.insert(&curriculum, Level::Grade, node("g1", "G1")).unwrap();
        tree.insert(&curriculum, Level::Grade, node("g2", "G2")).unwrap();
        tree.insert(&curriculum.clone().grade("g1"), Level::Book, node("b1", "B1"))
            .unwrap();
        tree
    }

    #[test]
    fn stats_count_every_level() {
        let tree = sample_tree();
        let all = stats(&tree, &NodePath::root());
        assert_eq!(all.count(Level::Curriculum), 1);
        assert_eq!(all.count(Level::Grade), 2);
        assert_eq!(all.count(Level::Book), 1);
        assert_eq!(all.total(), 4);

        let grade = stats(&tree, &NodePath::curriculum("c1").grade("g1"));
        assert_eq!(grade.count(Level::Grade), 1);
        assert_eq!(grade.count(Level::Curriculum), 0);
        assert_eq!(grade.total(), 2);
    }

    #[test]
    fn outline_lists_nodes_in_display_order() {
        let tree = sample_tree();
        let text = outline(&tree, &NodePath::root());
        assert_eq!(
            text,
            "Curriculum: Math\n  Grade: G1\n    Book: B1\n  Grade: G2\n"
        );
    }

    #[test]
    fn outline_of_subtree_shows_durations() {
        let mut tree = sample_tree();
        let grade = NodePath::curriculum("c1").grade("g2");
        let mut book = node("b2", "B2");
        book.duration = Some("2 Weeks".to_string());
        tree.insert(&grade, Level::Book, book).unwrap();

        assert_eq!(outline(&tree, &grade), "Grade: G2\n  Book: B2 (2 Weeks)\n");
    }

    #[test]
    fn unresolved_path_yields_nothing() {
        let tree = sample_tree();
        assert_eq!(stats(&tree, &NodePath::curriculum("nope")).total(), 0);
        assert!(outline(&tree, &NodePath::curriculum("nope")).is_empty());
    }
}
