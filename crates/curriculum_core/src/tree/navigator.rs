//! Path navigation and breadcrumbs.
//!
//! # Responsibility
//! - Map a path to the detail view the editor renders.
//! - Derive the breadcrumb chain of named ancestors for a path.
//!
//! # Invariants
//! - Flat path length selects the view: 0 home, 2 curriculum, ... 12 stage.
//! - Any unresolved segment yields `ViewState::NotFound`.

use crate::model::node::Level;
use crate::tree::arena::{CurriculumTree, NodeRef};
use crate::tree::path::NodePath;

/// Detail view selected by path length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailView {
    Home,
    Curriculum,
    Grade,
    Book,
    Unit,
    Lesson,
    Stage,
}

impl DetailView {
    /// View for a flat `[kind, id, ...]` length; `None` for lengths with no
    /// detail view.
    pub fn for_flat_len(len: usize) -> Option<Self> {
        match len {
            0 => Some(Self::Home),
            2 => Some(Self::Curriculum),
            4 => Some(Self::Grade),
            6 => Some(Self::Book),
            8 => Some(Self::Unit),
            10 => Some(Self::Lesson),
            12 => Some(Self::Stage),
            _ => None,
        }
    }

    /// Level listed as children in this view.
    pub fn child_level(self) -> Level {
        match self {
            Self::Home => Level::Curriculum,
            Self::Curriculum => Level::Grade,
            Self::Grade => Level::Book,
            Self::Book => Level::Unit,
            Self::Unit => Level::Lesson,
            Self::Lesson => Level::Stage,
            Self::Stage => Level::Activity,
        }
    }
}

/// What the editor should render for a path.
#[derive(Debug, Clone)]
pub enum ViewState<'a> {
    Home {
        curricula: Vec<NodeRef<'a>>,
    },
    Detail {
        view: DetailView,
        node: NodeRef<'a>,
        children: Vec<NodeRef<'a>>,
    },
    /// Placeholder state for unresolvable paths.
    NotFound,
}

impl ViewState<'_> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// One breadcrumb entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    /// `None` for the home crumb.
    pub level: Option<Level>,
    /// Path navigated to when the crumb is chosen.
    pub path: NodePath,
}

/// Resolves `path` to a renderable view.
pub fn resolve<'a>(tree: &'a CurriculumTree, path: &NodePath) -> ViewState<'a> {
    let Some(view) = DetailView::for_flat_len(path.flat_len()) else {
        return ViewState::NotFound;
    };
    if view == DetailView::Home {
        return ViewState::Home {
            curricula: tree.children(path).unwrap_or_default(),
        };
    }

    match (tree.get(path), tree.children(path)) {
        (Some(node), Some(children)) => ViewState::Detail {
            view,
            node,
            children,
        },
        _ => ViewState::NotFound,
    }
}

/// Breadcrumbs for `path`: `Home`, then each resolved ancestor by name.
///
/// The chain stops at the first segment that does not resolve.
pub fn breadcrumbs(tree: &CurriculumTree, path: &NodePath) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb {
        label: "Home".to_string(),
        level: None,
        path: NodePath::root(),
    }];

    for depth in 1..=path.depth() {
        let prefix = path.truncate(depth);
        let Some(node) = tree.get(&prefix) else {
            break;
        };
        crumbs.push(Breadcrumb {
            label: node.data.name.clone(),
            level: Some(node.level),
            path: prefix,
        });
    }
    crumbs
}

/// Path selected by clicking crumb `index`; out-of-range indexes keep `path`.
pub fn crumb_target(path: &NodePath, index: usize) -> NodePath {
    if index >= path.depth() {
        return path.clone();
    }
    path.truncate(index)
}
