use curriculum_core::{
    CurriculumTree, Level, Mutation, MutationOutcome, NodeData, NodePatch, NodePath,
};
use proptest::prelude::*;

/// Small id pool so generated adds collide with existing siblings.
const IDS: [&str; 3] = ["a", "b", "c"];

#[derive(Debug, Clone)]
enum Step {
    Add { parent: usize, id: usize, name: String },
    Update { target: usize, patch: NodePatch },
    Delete { target: usize },
}

fn patch_strategy() -> impl Strategy<Value = NodePatch> {
    (
        proptest::option::of("[A-Za-z]{1,6}"),
        proptest::option::of(proptest::option::of("[1-9] (Minutes|Hours|Days)")),
        proptest::option::of(proptest::collection::vec("[a-z]{1,4}", 0..3)),
    )
        .prop_map(|(name, duration, learning_objectives)| NodePatch {
            name,
            duration,
            learning_objectives,
            ..NodePatch::default()
        })
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (any::<usize>(), 0..IDS.len(), "[A-Z][a-z]{0,4}")
            .prop_map(|(parent, id, name)| Step::Add { parent, id, name }),
        2 => (any::<usize>(), patch_strategy())
            .prop_map(|(target, patch)| Step::Update { target, patch }),
        1 => any::<usize>().prop_map(|target| Step::Delete { target }),
    ]
}

/// Every node in display order with its full path.
fn flatten(tree: &CurriculumTree) -> Vec<(NodePath, NodeData)> {
    let mut out = Vec::new();
    collect(tree, &NodePath::root(), &mut out);
    out
}

fn collect(tree: &CurriculumTree, path: &NodePath, out: &mut Vec<(NodePath, NodeData)>) {
    for child in tree.children(path).unwrap_or_default() {
        let child_path = path.clone().child(child.level, child.data.id.clone());
        out.push((child_path.clone(), child.data.clone()));
        collect(tree, &child_path, out);
    }
}

fn within(path: &NodePath, ancestor: &NodePath) -> bool {
    path.depth() >= ancestor.depth() && &path.truncate(ancestor.depth()) == ancestor
}

fn assert_unique_siblings(tree: &CurriculumTree, nodes: &[(NodePath, NodeData)]) {
    let parents = std::iter::once(NodePath::root()).chain(nodes.iter().map(|(path, _)| path.clone()));
    for parent in parents {
        let mut ids: Vec<String> = tree
            .children(&parent)
            .unwrap_or_default()
            .iter()
            .map(|child| child.data.id.clone())
            .collect();
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count, "duplicate sibling id under {:?}", parent.to_flat());
    }
}

proptest! {
    #[test]
    fn random_edit_sequences_keep_tree_invariants(
        steps in proptest::collection::vec(step_strategy(), 1..40)
    ) {
        let mut tree = CurriculumTree::new();
        for step in steps {
            let before = flatten(&tree);
            match step {
                Step::Add { parent, id, name } => {
                    let parents: Vec<NodePath> = std::iter::once(NodePath::root())
                        .chain(before.iter().map(|(path, _)| path.clone()))
                        .collect();
                    let parent = parents[parent % parents.len()].clone();
                    let Some(level) = parent.level().map_or(Some(Level::Curriculum), Level::child) else {
                        continue;
                    };
                    let id = IDS[id];
                    let taken = tree
                        .children(&parent)
                        .unwrap_or_default()
                        .iter()
                        .any(|child| child.data.id == id);
                    let data = NodeData {
                        id: id.to_string(),
                        name,
                        ..NodeData::default()
                    };
                    let outcome = tree.apply(&Mutation::AddNode {
                        parent: parent.clone(),
                        level,
                        data,
                    });

                    let after = flatten(&tree);
                    if taken {
                        prop_assert_eq!(outcome, MutationOutcome::Ignored);
                        prop_assert_eq!(after, before);
                    } else {
                        prop_assert_eq!(outcome, MutationOutcome::Created(id.to_string()));
                        let added = parent.child(level, id);
                        prop_assert_eq!(after.len(), before.len() + 1);
                        let rest: Vec<_> = after.into_iter().filter(|(path, _)| path != &added).collect();
                        prop_assert_eq!(rest, before);
                    }
                }
                Step::Update { target, patch } => {
                    if before.is_empty() {
                        continue;
                    }
                    let index = target % before.len();
                    let (path, old) = before[index].clone();
                    let outcome = tree.apply(&Mutation::UpdateNode {
                        path: path.clone(),
                        patch: patch.clone(),
                    });
                    prop_assert_eq!(outcome, MutationOutcome::Applied);

                    let after = flatten(&tree);
                    prop_assert_eq!(after.len(), before.len());
                    for ((after_path, after_data), (before_path, before_data)) in after.iter().zip(&before) {
                        prop_assert_eq!(after_path, before_path);
                        if after_path != &path {
                            prop_assert_eq!(after_data, before_data);
                        }
                    }

                    let updated = &after[index].1;
                    prop_assert_eq!(&updated.id, &old.id);
                    prop_assert_eq!(&updated.name, patch.name.as_ref().unwrap_or(&old.name));
                    prop_assert_eq!(&updated.duration, patch.duration.as_ref().unwrap_or(&old.duration));
                    prop_assert_eq!(
                        &updated.learning_objectives,
                        patch.learning_objectives.as_ref().unwrap_or(&old.learning_objectives)
                    );
                    prop_assert_eq!(&updated.description, &old.description);
                    prop_assert_eq!(&updated.standard_codes, &old.standard_codes);
                    prop_assert_eq!(&updated.activity_type, &old.activity_type);
                }
                Step::Delete { target } => {
                    if before.is_empty() {
                        continue;
                    }
                    let path = before[target % before.len()].0.clone();
                    let outcome = tree.apply(&Mutation::DeleteNode { path: path.clone() });
                    prop_assert_eq!(outcome, MutationOutcome::Applied);

                    let expected: Vec<_> = before
                        .iter()
                        .filter(|(node_path, _)| !within(node_path, &path))
                        .cloned()
                        .collect();
                    prop_assert_eq!(flatten(&tree), expected);
                    prop_assert!(!tree.contains(&path));
                }
            }
            assert_unique_siblings(&tree, &flatten(&tree));
        }
    }
}
