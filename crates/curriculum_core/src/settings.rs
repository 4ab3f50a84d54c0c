//! Portal-wide settings persisted beside the curriculum tree.
//!
//! Settings are loaded explicitly by the caller and passed where needed;
//! there is no process-global settings state.

use crate::model::curriculum::Standard;
use crate::repo::kv_repo::{KvRepoError, KvRepository};
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const SETTINGS_KEY: &str = "portal_settings";
pub const DEFAULT_PORTAL_NAME: &str = "Curriculum Portal";

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug)]
pub enum SettingsError {
    Repo(KvRepoError),
    Decode(serde_json::Error),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "invalid portal settings: {err}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Decode(err) => Some(err),
        }
    }
}

impl From<KvRepoError> for SettingsError {
    fn from(value: KvRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortalSettings {
    pub portal_name: String,
    /// `data:` URL of the uploaded logo image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_data_url: Option<String>,
    /// Reference standards offered when building curriculum catalogs.
    pub standards: Vec<Standard>,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            portal_name: DEFAULT_PORTAL_NAME.to_string(),
            logo_data_url: None,
            standards: Vec::new(),
        }
    }
}

impl PortalSettings {
    /// Loads stored settings, or defaults when none were saved yet.
    pub fn load(repo: &impl KvRepository) -> SettingsResult<Self> {
        match repo.get(SETTINGS_KEY)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, repo: &impl KvRepository) -> SettingsResult<()> {
        let blob = serde_json::to_string(self)?;
        repo.put(SETTINGS_KEY, &blob)?;
        info!(
            "event=settings_save module=settings status=ok standards={}",
            self.standards.len()
        );
        Ok(())
    }

    /// A blank name falls back to the default portal name.
    pub fn display_name(&self) -> &str {
        let trimmed = self.portal_name.trim();
        if trimmed.is_empty() {
            DEFAULT_PORTAL_NAME
        } else {
            trimmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PortalSettings, SettingsError, DEFAULT_PORTAL_NAME, SETTINGS_KEY};
    use crate::db::open_db_in_memory;
    use crate::repo::kv_repo::{KvRepository, SqliteKvRepository};

    #[test]
    fn missing_settings_load_defaults() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteKvRepository::try_new(&conn).unwrap();
        let settings = PortalSettings::load(&repo).unwrap();
        assert_eq!(settings.display_name(), DEFAULT_PORTAL_NAME);
    }

    #[test]
    fn saved_settings_load_back() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteKvRepository::try_new(&conn).unwrap();
        let settings = PortalSettings {
            portal_name: "Riverside Academy".to_string(),
            logo_data_url: Some("data:image/png;base64,AAAA".to_string()),
            standards: Vec::new(),
        };
        settings.save(&repo).unwrap();
        assert_eq!(PortalSettings::load(&repo).unwrap(), settings);
    }

    #[test]
    fn partial_document_fills_defaults_and_garbage_is_an_error() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteKvRepository::try_new(&conn).unwrap();
        repo.put(SETTINGS_KEY, r#"{"portalName":"  "}"#).unwrap();
        let settings = PortalSettings::load(&repo).unwrap();
        assert_eq!(settings.display_name(), DEFAULT_PORTAL_NAME);
        assert!(settings.standards.is_empty());

        repo.put(SETTINGS_KEY, "nope").unwrap();
        assert!(matches!(
            PortalSettings::load(&repo),
            Err(SettingsError::Decode(_))
        ));
    }
}
