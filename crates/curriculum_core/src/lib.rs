//! Core domain logic for the curriculum editor.
//! This crate is the single source of truth for tree invariants.

pub mod config;
pub mod csv_import;
pub mod db;
pub mod duration;
pub mod editor;
pub mod logging;
pub mod model;
pub mod repo;
pub mod settings;
pub mod store;
pub mod tree;

pub use config::{CoreConfig, StoreBackend};
pub use csv_import::{parse_curriculum_csv, parse_curriculum_csv_str, CsvImportError};
pub use duration::{normalize_input, DurationUnit, DurationValue};
pub use editor::debounce::Debouncer;
pub use editor::session::EditorSession;
pub use logging::{default_log_level, init_logging, logging_status, LoggingStatus};
pub use model::curriculum::{
    Activity, ActivityType, ActivityTypePatch, Book, Curriculum, Grade, Lesson, Stage, Standard,
    StandardCode, StandardCodePatch, StandardPatch, Unit,
};
pub use model::node::{Level, NodeData, NodeFields, NodeId, NodePatch};
pub use repo::kv_repo::{KvRepoError, KvRepository, KvResult, SqliteKvRepository};
pub use settings::{PortalSettings, SettingsError};
pub use store::api::{ApiError, ApiRequest, CurriculumApi, HttpCurriculumApi, HttpMethod};
pub use store::local::LocalCurriculumStore;
pub use store::remote::RemoteCurriculumStore;
pub use store::{with_store, CurriculumStore, StoreOpenError};
pub use tree::arena::{Catalog, CurriculumTree, NodeRef};
pub use tree::mutation::{CatalogChange, Mutation, MutationOutcome};
pub use tree::navigator::{Breadcrumb, DetailView, ViewState};
pub use tree::path::{NodePath, PathParseError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
