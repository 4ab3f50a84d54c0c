//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose curriculum editing use-cases to Dart via FRB.
//! - Translate paths and patches from flat strings and JSON.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each call opens the configured store, applies one use-case, and closes it.
//! - Store calls are serialized; the whole-tree document has a single writer.

use curriculum_core::db::open_db;
use curriculum_core::duration::change_unit;
use curriculum_core::tree::navigator::breadcrumbs;
use curriculum_core::tree::outline::outline;
use curriculum_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    normalize_input, parse_curriculum_csv_str, ping as ping_inner, with_store, CoreConfig,
    CurriculumStore, DurationUnit, Level, NodeFields, NodePatch, NodePath, PortalSettings,
    SqliteKvRepository,
};
use log::warn;
use std::sync::{Mutex, OnceLock};

static CORE_CONFIG: OnceLock<CoreConfig> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Action response envelope for tree mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeActionResponse {
    /// Whether the mutation took effect.
    pub ok: bool,
    /// Created node id for add operations.
    pub node_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TreeActionResponse {
    fn success(message: impl Into<String>, node_id: Option<String>) -> Self {
        Self {
            ok: true,
            node_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            node_id: None,
            message: message.into(),
        }
    }
}

/// JSON payload envelope for read calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonResponse {
    pub ok: bool,
    /// JSON document; empty on failure.
    pub json: String,
    pub message: String,
}

impl JsonResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            json: String::new(),
            message: message.into(),
        }
    }
}

/// One breadcrumb entry with the flat path it navigates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbItem {
    pub label: String,
    pub path: Vec<String>,
}

/// Returns the whole curriculum tree as nested JSON.
///
/// # FFI contract
/// - Sync call, store-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn tree_snapshot() -> JsonResponse {
    let result = with_configured_store(|store| {
        let curricula = store.curricula();
        let error = store.last_error().map(str::to_string);
        (curricula, error)
    });
    match result {
        Ok((_, Some(error))) => JsonResponse::failure(error),
        Ok((curricula, None)) => match serde_json::to_string(&curricula) {
            Ok(json) => JsonResponse {
                ok: true,
                json,
                message: format!("{} curricula", curricula.len()),
            },
            Err(err) => JsonResponse::failure(format!("tree_snapshot encode failed: {err}")),
        },
        Err(err) => JsonResponse::failure(err),
    }
}

/// Adds a node below `parent_path` (`[kind, id, ...]`; empty for a new
/// curriculum). The node level is the parent's child level.
#[flutter_rust_bridge::frb(sync)]
pub fn node_add(parent_path: Vec<String>, name: String, duration: Option<String>) -> TreeActionResponse {
    let parent = match NodePath::from_flat(&parent_path) {
        Ok(path) => path,
        Err(err) => return TreeActionResponse::failure(format!("invalid path: {err}")),
    };
    let level = match parent.level() {
        None => Level::Curriculum,
        Some(level) => match level.child() {
            Some(child) => child,
            None => return TreeActionResponse::failure("activities have no children"),
        },
    };
    let name = name.trim().to_string();
    if name.is_empty() {
        return TreeActionResponse::failure("name cannot be empty");
    }
    let mut fields = NodeFields::default();
    if let Some(duration) = duration.filter(|value| !value.trim().is_empty()) {
        fields = fields.with_duration(duration);
    }

    let result = with_configured_store(|store| {
        let created = store.add_node(level, &parent, &name, fields);
        (created, store.last_error().map(str::to_string))
    });
    match result {
        Ok((_, Some(error))) => TreeActionResponse::failure(error),
        Ok((Some(id), None)) => {
            TreeActionResponse::success(format!("{} added.", level.label()), Some(id))
        }
        Ok((None, None)) => TreeActionResponse::failure("parent not found"),
        Err(err) => TreeActionResponse::failure(err),
    }
}

/// Shallow-merges a JSON patch (camelCase fields) into the node at `path`.
#[flutter_rust_bridge::frb(sync)]
pub fn node_update(path: Vec<String>, patch_json: String) -> TreeActionResponse {
    let path = match NodePath::from_flat(&path) {
        Ok(path) => path,
        Err(err) => return TreeActionResponse::failure(format!("invalid path: {err}")),
    };
    let patch: NodePatch = match serde_json::from_str(&patch_json) {
        Ok(patch) => patch,
        Err(err) => return TreeActionResponse::failure(format!("invalid patch: {err}")),
    };
    let Some(level) = path.level() else {
        return TreeActionResponse::failure("path cannot be empty");
    };
    mutation_response(with_configured_store(|store| {
        let applied = store.update_node(level, &path, patch);
        (applied, store.last_error().map(str::to_string))
    }))
}

/// Deletes the node at `path` and its subtree.
#[flutter_rust_bridge::frb(sync)]
pub fn node_delete(path: Vec<String>) -> TreeActionResponse {
    let path = match NodePath::from_flat(&path) {
        Ok(path) => path,
        Err(err) => return TreeActionResponse::failure(format!("invalid path: {err}")),
    };
    let Some(level) = path.level() else {
        return TreeActionResponse::failure("path cannot be empty");
    };
    mutation_response(with_configured_store(|store| {
        let applied = store.delete_node(level, &path);
        (applied, store.last_error().map(str::to_string))
    }))
}

/// Breadcrumbs for `path`; an invalid path yields only `Home`.
#[flutter_rust_bridge::frb(sync)]
pub fn path_breadcrumbs(path: Vec<String>) -> Vec<BreadcrumbItem> {
    let path = NodePath::from_flat(&path).unwrap_or_default();
    let crumbs = with_configured_store(|store| breadcrumbs(store.tree(), &path))
        .unwrap_or_else(|err| {
            warn!("event=ffi_breadcrumbs module=ffi status=error error={err}");
            breadcrumbs(&Default::default(), &NodePath::root())
        });
    crumbs
        .into_iter()
        .map(|crumb| BreadcrumbItem {
            label: crumb.label,
            path: crumb.path.to_flat(),
        })
        .collect()
}

/// Plain-text outline of the subtree at `path`.
#[flutter_rust_bridge::frb(sync)]
pub fn tree_outline(path: Vec<String>) -> String {
    let Ok(path) = NodePath::from_flat(&path) else {
        return String::new();
    };
    with_configured_store(|store| outline(store.tree(), &path)).unwrap_or_default()
}

/// Normalizes a typed duration; returns an empty string to clear the field.
#[flutter_rust_bridge::frb(sync)]
pub fn duration_normalize(raw: String, unit: String) -> String {
    match DurationUnit::parse(&unit) {
        Some(unit) => normalize_input(&raw, unit).unwrap_or_default(),
        None => String::new(),
    }
}

/// Re-expresses stored duration text in another unit without normalizing.
#[flutter_rust_bridge::frb(sync)]
pub fn duration_change_unit(text: String, unit: String) -> String {
    DurationUnit::parse(&unit)
        .and_then(|unit| change_unit(&text, unit))
        .unwrap_or_default()
}

/// Parses CSV text and imports the resulting curricula in one mutation.
#[flutter_rust_bridge::frb(sync)]
pub fn csv_import(csv_text: String) -> TreeActionResponse {
    let curricula = match parse_curriculum_csv_str(&csv_text) {
        Ok(curricula) => curricula,
        Err(err) => return TreeActionResponse::failure(format!("csv_import failed: {err}")),
    };
    let count = curricula.len();
    let result = with_configured_store(|store| {
        let imported = store.import_curricula(curricula);
        (imported, store.last_error().map(str::to_string))
    });
    match result {
        Ok((_, Some(error))) => TreeActionResponse::failure(error),
        Ok((true, None)) => TreeActionResponse::success(format!("Imported {count} curricula."), None),
        Ok((false, None)) => TreeActionResponse::failure("nothing imported"),
        Err(err) => TreeActionResponse::failure(err),
    }
}

/// Loads portal settings as JSON from the local database.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_load() -> JsonResponse {
    let result = with_settings_repo(|repo| PortalSettings::load(repo).map_err(|err| err.to_string()))
        .and_then(|settings| serde_json::to_string(&settings).map_err(|err| err.to_string()));
    match result {
        Ok(json) => JsonResponse {
            ok: true,
            json,
            message: String::new(),
        },
        Err(err) => JsonResponse::failure(format!("settings_load failed: {err}")),
    }
}

/// Saves portal settings given as JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_save(settings_json: String) -> TreeActionResponse {
    let settings: PortalSettings = match serde_json::from_str(&settings_json) {
        Ok(settings) => settings,
        Err(err) => return TreeActionResponse::failure(format!("invalid settings: {err}")),
    };
    match with_settings_repo(|repo| settings.save(repo).map_err(|err| err.to_string())) {
        Ok(()) => TreeActionResponse::success("Settings saved.", None),
        Err(err) => TreeActionResponse::failure(format!("settings_save failed: {err}")),
    }
}

fn mutation_response(result: Result<(bool, Option<String>), String>) -> TreeActionResponse {
    match result {
        Ok((_, Some(error))) => TreeActionResponse::failure(error),
        Ok((true, None)) => TreeActionResponse::success("Saved.", None),
        Ok((false, None)) => TreeActionResponse::failure("node not found"),
        Err(err) => TreeActionResponse::failure(err),
    }
}

fn core_config() -> &'static CoreConfig {
    CORE_CONFIG.get_or_init(CoreConfig::from_env)
}

fn with_configured_store<T>(f: impl FnOnce(&mut dyn CurriculumStore) -> T) -> Result<T, String> {
    let _guard = STORE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    with_store(&core_config().backend(), f).map_err(|err| err.to_string())
}

fn with_settings_repo<T>(
    f: impl FnOnce(&SqliteKvRepository<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let _guard = STORE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let conn = open_db(&core_config().db_path).map_err(|err| format!("settings DB open failed: {err}"))?;
    let repo = SqliteKvRepository::try_new(&conn).map_err(|err| format!("settings repo init failed: {err}"))?;
    f(&repo)
}
