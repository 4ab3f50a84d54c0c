//! Nested curriculum document model.
//!
//! # Responsibility
//! - Define the nested JSON shape used by the local blob and the REST API.
//! - Define the curriculum-level Standard and ActivityType catalogs.
//! - Bridge nested documents to the flat `NodeData` record (`DocumentNode`).
//!
//! # Invariants
//! - Missing child/catalog arrays deserialize to empty vectors.
//! - `StandardCode::code` is the identifier of a code within its Standard.
//! - Dangling `standardCodes` references are tolerated and resolve to nothing.

use crate::model::node::{deserialize_some, Level, NodeData, NodeId};
use serde::{Deserialize, Serialize};

/// Stage name presets offered by the editor. Free text is also accepted.
pub const STAGE_PRESETS: &[&str] = &["Play", "Lead", "Apply", "Yield"];

/// Returns whether `name` matches one of the stage presets (case-insensitive).
pub fn is_stage_preset(name: &str) -> bool {
    let trimmed = name.trim();
    STAGE_PRESETS
        .iter()
        .any(|preset| preset.eq_ignore_ascii_case(trimmed))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curriculum {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub grades: Vec<Grade>,
    #[serde(default)]
    pub standards: Vec<Standard>,
    #[serde(default)]
    pub activity_types: Vec<ActivityType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub units: Vec<Unit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub standard_codes: Vec<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub standard_codes: Vec<String>,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub standard_codes: Vec<String>,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: NodeId,
    pub name: String,
    /// Free text or the name of a curriculum `ActivityType`.
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub standard_codes: Vec<String>,
}

/// Standards framework attached to one curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standard {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub codes: Vec<StandardCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardCode {
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityType {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}

impl StandardPatch {
    pub fn apply_to(&self, standard: &mut Standard) {
        if let Some(name) = &self.name {
            standard.name = name.clone();
        }
        if let Some(description) = &self.description {
            standard.description = description.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardCodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl StandardCodePatch {
    pub fn apply_to(&self, code: &mut StandardCode) {
        if let Some(value) = &self.code {
            code.code = value.clone();
        }
        if let Some(title) = &self.title {
            code.title = title.clone();
        }
        if let Some(description) = &self.description {
            code.description = description.clone();
        }
        if let Some(level) = &self.level {
            code.level = level.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTypePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ActivityTypePatch {
    pub fn apply_to(&self, activity_type: &mut ActivityType) {
        if let Some(name) = &self.name {
            activity_type.name = name.clone();
        }
        if let Some(description) = &self.description {
            activity_type.description = description.clone();
        }
        if let Some(color) = &self.color {
            activity_type.color = color.clone();
        }
        if let Some(icon) = &self.icon {
            activity_type.icon = icon.clone();
        }
    }
}

impl Curriculum {
    /// Resolves `codes` against this curriculum's standards catalog.
    ///
    /// Unknown codes are skipped; output follows input order.
    pub fn resolve_codes<'a>(&'a self, codes: &[String]) -> Vec<&'a StandardCode> {
        codes
            .iter()
            .filter_map(|wanted| {
                self.standards
                    .iter()
                    .flat_map(|standard| standard.codes.iter())
                    .find(|candidate| &candidate.code == wanted)
            })
            .collect()
    }
}

/// Nested document node convertible to and from the flat `NodeData` record.
///
/// Activities are leaves: their `Child` is `Activity` itself with an
/// always-empty child list.
pub trait DocumentNode: Sized {
    type Child: DocumentNode;
    const LEVEL: Level;

    fn node_data(&self) -> NodeData;
    fn children(&self) -> &[Self::Child];
    fn from_parts(data: NodeData, children: Vec<Self::Child>) -> Self;
}

impl DocumentNode for Curriculum {
    type Child = Grade;
    const LEVEL: Level = Level::Curriculum;

    fn node_data(&self) -> NodeData {
        NodeData {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            ..NodeData::default()
        }
    }

    fn children(&self) -> &[Grade] {
        &self.grades
    }

    /// Catalogs start empty; the arena attaches them separately.
    fn from_parts(data: NodeData, children: Vec<Grade>) -> Self {
        Self {
            id: data.id,
            name: data.name,
            description: data.description,
            grades: children,
            standards: Vec::new(),
            activity_types: Vec::new(),
        }
    }
}

impl DocumentNode for Grade {
    type Child = Book;
    const LEVEL: Level = Level::Grade;

    fn node_data(&self) -> NodeData {
        NodeData {
            id: self.id.clone(),
            name: self.name.clone(),
            duration: self.duration.clone(),
            learning_objectives: self.learning_objectives.clone(),
            ..NodeData::default()
        }
    }

    fn children(&self) -> &[Book] {
        &self.books
    }

    fn from_parts(data: NodeData, children: Vec<Book>) -> Self {
        Self {
            id: data.id,
            name: data.name,
            duration: data.duration,
            learning_objectives: data.learning_objectives,
            books: children,
        }
    }
}

impl DocumentNode for Book {
    type Child = Unit;
    const LEVEL: Level = Level::Book;

    fn node_data(&self) -> NodeData {
        NodeData {
            id: self.id.clone(),
            name: self.name.clone(),
            duration: self.duration.clone(),
            learning_objectives: self.learning_objectives.clone(),
            ..NodeData::default()
        }
    }

    fn children(&self) -> &[Unit] {
        &self.units
    }

    fn from_parts(data: NodeData, children: Vec<Unit>) -> Self {
        Self {
            id: data.id,
            name: data.name,
            duration: data.duration,
            learning_objectives: data.learning_objectives,
            units: children,
        }
    }
}

impl DocumentNode for Unit {
    type Child = Lesson;
    const LEVEL: Level = Level::Unit;

    fn node_data(&self) -> NodeData {
        NodeData {
            id: self.id.clone(),
            name: self.name.clone(),
            duration: self.total_time.clone(),
            learning_objectives: self.learning_objectives.clone(),
            standard_codes: self.standard_codes.clone(),
            ..NodeData::default()
        }
    }

    fn children(&self) -> &[Lesson] {
        &self.lessons
    }

    fn from_parts(data: NodeData, children: Vec<Lesson>) -> Self {
        Self {
            id: data.id,
            name: data.name,
            total_time: data.duration,
            learning_objectives: data.learning_objectives,
            standard_codes: data.standard_codes,
            lessons: children,
        }
    }
}

impl DocumentNode for Lesson {
    type Child = Stage;
    const LEVEL: Level = Level::Lesson;

    fn node_data(&self) -> NodeData {
        NodeData {
            id: self.id.clone(),
            name: self.name.clone(),
            duration: self.duration.clone(),
            learning_objectives: self.learning_objectives.clone(),
            standard_codes: self.standard_codes.clone(),
            ..NodeData::default()
        }
    }

    fn children(&self) -> &[Stage] {
        &self.stages
    }

    fn from_parts(data: NodeData, children: Vec<Stage>) -> Self {
        Self {
            id: data.id,
            name: data.name,
            duration: data.duration,
            learning_objectives: data.learning_objectives,
            standard_codes: data.standard_codes,
            stages: children,
        }
    }
}

impl DocumentNode for Stage {
    type Child = Activity;
    const LEVEL: Level = Level::Stage;

    fn node_data(&self) -> NodeData {
        NodeData {
            id: self.id.clone(),
            name: self.name.clone(),
            duration: self.duration.clone(),
            learning_objectives: self.learning_objectives.clone(),
            standard_codes: self.standard_codes.clone(),
            ..NodeData::default()
        }
    }

    fn children(&self) -> &[Activity] {
        &self.activities
    }

    fn from_parts(data: NodeData, children: Vec<Activity>) -> Self {
        Self {
            id: data.id,
            name: data.name,
            duration: data.duration,
            learning_objectives: data.learning_objectives,
            standard_codes: data.standard_codes,
            activities: children,
        }
    }
}

impl DocumentNode for Activity {
    type Child = Activity;
    const LEVEL: Level = Level::Activity;

    fn node_data(&self) -> NodeData {
        NodeData {
            id: self.id.clone(),
            name: self.name.clone(),
            duration: self.duration.clone(),
            learning_objectives: self.learning_objectives.clone(),
            standard_codes: self.standard_codes.clone(),
            activity_type: Some(self.activity_type.clone()),
            ..NodeData::default()
        }
    }

    fn children(&self) -> &[Activity] {
        &[]
    }

    fn from_parts(data: NodeData, _children: Vec<Activity>) -> Self {
        Self {
            id: data.id,
            name: data.name,
            activity_type: data.activity_type.unwrap_or_default(),
            duration: data.duration,
            learning_objectives: data.learning_objectives,
            standard_codes: data.standard_codes,
        }
    }
}
