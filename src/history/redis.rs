// src/history/redis.rs

use ::redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use async_trait::async_trait;
use url::Url;

use super::{CursorStore, StoreError};

/// Cursor store backed by a Redis server, database 0.
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to `url` (`redis://[:password@]host:port`). Connection
    /// failures surface here rather than on the first read.
    pub async fn connect(url: &Url) -> Result<Self, StoreError> {
        let client = Client::open(url.as_str())?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CursorStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }
}
