// src/history/mod.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::fetch::series::{parse_date, DATE_FORMAT};

pub mod file;
#[cfg(test)]
pub(crate) mod memory;
pub mod redis;

pub use file::FileStore;
#[cfg(test)]
pub(crate) use memory::MemoryStore;
pub use self::redis::RedisStore;

/// The job tracks a single series, so a single key holds its cursor.
pub const CURSOR_KEY: &str = "lastProcessedDay";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{op} `{}`: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("redis: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("stored value for {key:?} is not a date: {value:?}")]
    CorruptCursor { key: String, value: String },
}

/// Minimal string key-value store. `Ok(None)` means the key was never
/// written; any failure to reach the store is an `Err`.
#[async_trait]
pub trait CursorStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: CursorStore + ?Sized> CursorStore for Box<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }
}

/// Open the backend named by the configuration.
pub async fn open(config: &StoreConfig) -> Result<Box<dyn CursorStore>, StoreError> {
    match config {
        StoreConfig::Redis { url } => {
            info!(host = ?url.host_str(), "using redis cursor store");
            Ok(Box::new(RedisStore::connect(url).await?))
        }
        StoreConfig::File { dir } => {
            info!(dir = %dir.display(), "using file cursor store");
            Ok(Box::new(FileStore::new(dir).await?))
        }
    }
}

/// Read the last fully published day, if there is one.
pub async fn load_cursor(store: &dyn CursorStore) -> Result<Option<NaiveDate>, StoreError> {
    let Some(value) = store.get(CURSOR_KEY).await? else {
        debug!("no cursor stored");
        return Ok(None);
    };
    match parse_date(&value) {
        Some(date) => Ok(Some(date)),
        None => Err(StoreError::CorruptCursor {
            key: CURSOR_KEY.to_string(),
            value,
        }),
    }
}

pub async fn save_cursor(store: &dyn CursorStore, date: NaiveDate) -> Result<(), StoreError> {
    store
        .set(CURSOR_KEY, &date.format(DATE_FORMAT).to_string())
        .await
}
