//! Opens the configured store backend for the duration of one call.

use crate::config::StoreBackend;
use crate::db::{open_db, DbError};
use crate::repo::kv_repo::{KvRepoError, SqliteKvRepository};
use crate::store::api::{ApiError, HttpCurriculumApi};
use crate::store::local::LocalCurriculumStore;
use crate::store::remote::RemoteCurriculumStore;
use crate::store::CurriculumStore;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum StoreOpenError {
    Db(DbError),
    Repo(KvRepoError),
    Api(ApiError),
}

impl Display for StoreOpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "store DB open failed: {err}"),
            Self::Repo(err) => write!(f, "store repo init failed: {err}"),
            Self::Api(err) => write!(f, "store API client init failed: {err}"),
        }
    }
}

impl Error for StoreOpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Api(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreOpenError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<KvRepoError> for StoreOpenError {
    fn from(value: KvRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ApiError> for StoreOpenError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

/// Opens `backend`, runs `f` against the store, then closes it.
///
/// The local backend's connection lives only for this call.
pub fn with_store<T>(
    backend: &StoreBackend,
    f: impl FnOnce(&mut dyn CurriculumStore) -> T,
) -> Result<T, StoreOpenError> {
    match backend {
        StoreBackend::Local { db_path } => {
            let conn = open_db(db_path)?;
            let repo = SqliteKvRepository::try_new(&conn)?;
            let mut store = LocalCurriculumStore::new(repo);
            Ok(f(&mut store))
        }
        StoreBackend::Remote { api_url, timeout } => {
            let api = HttpCurriculumApi::new(api_url, *timeout)?;
            let mut store = RemoteCurriculumStore::new(api);
            Ok(f(&mut store))
        }
    }
}
