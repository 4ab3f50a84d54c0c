//! Uniform node record shared by every hierarchy level.
//!
//! # Responsibility
//! - Name the seven hierarchy levels and their wire vocabulary.
//! - Hold one flat field set per node so the arena stores a single slot type.
//! - Describe shallow-merge partial updates (`NodePatch`).
//!
//! # Invariants
//! - `NodeData::id` is generated once and never rewritten by a patch.
//! - Fields that do not apply to a level stay `None`/empty for that level.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Node identifier. Generated locally as UUID v4 text; remote ids are kept
/// verbatim.
pub type NodeId = String;

/// Generates a fresh node identifier.
pub fn generate_id() -> NodeId {
    Uuid::new_v4().to_string()
}

/// Hierarchy level, ordered from root to leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Curriculum,
    Grade,
    Book,
    Unit,
    Lesson,
    Stage,
    Activity,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Curriculum,
        Level::Grade,
        Level::Book,
        Level::Unit,
        Level::Lesson,
        Level::Stage,
        Level::Activity,
    ];

    /// Zero-based depth; a curriculum sits at depth 0.
    pub fn depth(self) -> usize {
        match self {
            Self::Curriculum => 0,
            Self::Grade => 1,
            Self::Book => 2,
            Self::Unit => 3,
            Self::Lesson => 4,
            Self::Stage => 5,
            Self::Activity => 6,
        }
    }

    pub fn from_depth(depth: usize) -> Option<Self> {
        Self::ALL.get(depth).copied()
    }

    /// Path segment keyword (`curriculum`, `grade`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Curriculum => "curriculum",
            Self::Grade => "grade",
            Self::Book => "book",
            Self::Unit => "unit",
            Self::Lesson => "lesson",
            Self::Stage => "stage",
            Self::Activity => "activity",
        }
    }

    /// Parses a path segment keyword, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
    }

    /// REST collection name for this level.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Curriculum => "curriculums",
            Self::Grade => "grades",
            Self::Book => "books",
            Self::Unit => "units",
            Self::Lesson => "lessons",
            Self::Stage => "stages",
            Self::Activity => "activities",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Curriculum => "Curriculum",
            Self::Grade => "Grade",
            Self::Book => "Book",
            Self::Unit => "Unit",
            Self::Lesson => "Lesson",
            Self::Stage => "Stage",
            Self::Activity => "Activity",
        }
    }

    pub fn child(self) -> Option<Self> {
        Self::from_depth(self.depth() + 1)
    }

    pub fn parent(self) -> Option<Self> {
        self.depth().checked_sub(1).and_then(Self::from_depth)
    }

    /// Key used for this level's id when it appears as an ancestor in an
    /// API payload (`curriculumId`, `gradeId`, ...).
    pub fn id_key(self) -> &'static str {
        match self {
            Self::Curriculum => "curriculumId",
            Self::Grade => "gradeId",
            Self::Book => "bookId",
            Self::Unit => "unitId",
            Self::Lesson => "lessonId",
            Self::Stage => "stageId",
            Self::Activity => "activityId",
        }
    }

    /// Whether nodes of this level carry `standardCodes`.
    pub fn has_standard_codes(self) -> bool {
        self.depth() >= Self::Unit.depth()
    }
}

/// Flat field set of one hierarchy node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeData {
    pub id: NodeId,
    pub name: String,
    /// Curriculum only.
    pub description: Option<String>,
    /// `"<number> <Unit>"` text; serialized as `totalTime` for units.
    pub duration: Option<String>,
    pub learning_objectives: Vec<String>,
    /// Unit and below.
    pub standard_codes: Vec<String>,
    /// Activity only.
    pub activity_type: Option<String>,
}

impl NodeData {
    /// Creates a node with a generated id and empty objectives/codes, then
    /// applies the optional creation fields.
    pub fn create(name: impl Into<String>, fields: NodeFields) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            description: fields.description,
            duration: fields.duration,
            learning_objectives: fields.learning_objectives,
            standard_codes: fields.standard_codes,
            activity_type: fields.activity_type,
        }
    }
}

/// Optional fields accepted by `add_*` operations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeFields {
    pub description: Option<String>,
    pub duration: Option<String>,
    pub learning_objectives: Vec<String>,
    pub standard_codes: Vec<String>,
    pub activity_type: Option<String>,
}

impl NodeFields {
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_activity_type(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = Some(activity_type.into());
        self
    }

    pub fn with_objectives<I, S>(mut self, objectives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.learning_objectives = objectives.into_iter().map(Into::into).collect();
        self
    }
}

/// Shallow-merge partial update for one node.
///
/// Outer `None` leaves a field untouched; for clearable fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_objectives: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_codes: Option<Vec<String>>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_type: Option<Option<String>>,
}

impl NodePatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// `None` clears the duration.
    pub fn duration(duration: Option<String>) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn learning_objectives(objectives: Vec<String>) -> Self {
        Self {
            learning_objectives: Some(objectives),
            ..Self::default()
        }
    }

    pub fn standard_codes(codes: Vec<String>) -> Self {
        Self {
            standard_codes: Some(codes),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merges the named fields into `data`; `data.id` is never touched.
    pub fn apply_to(&self, data: &mut NodeData) {
        if let Some(name) = &self.name {
            data.name = name.clone();
        }
        if let Some(description) = &self.description {
            data.description = description.clone();
        }
        if let Some(duration) = &self.duration {
            data.duration = duration.clone();
        }
        if let Some(objectives) = &self.learning_objectives {
            data.learning_objectives = objectives.clone();
        }
        if let Some(codes) = &self.standard_codes {
            data.standard_codes = codes.clone();
        }
        if let Some(activity_type) = &self.activity_type {
            data.activity_type = activity_type.clone();
        }
    }
}

/// Maps a present JSON field (including `null`) to `Some(..)` so that
/// `null` can be told apart from an absent field.
pub(crate) fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
