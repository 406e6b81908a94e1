use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tokio::sync::RwLock;
use tracing::debug;

/// Durable string key-value storage. Every write replaces the whole value,
/// concurrent writers to the same key are last-write-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, crate::Error>;
    async fn set(&self, key: &str, value: &str) -> Result<(), crate::Error>;
    async fn remove(&self, key: &str) -> Result<(), crate::Error>;
}

#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, crate::Error> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), crate::Error> {
        self.values
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), crate::Error> {
        self.values.write().await.remove(key);

        Ok(())
    }
}

pub struct SqliteStore {
    pub pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        debug!("Opening preference database at {path:?}");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::migrate!().run(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, crate::Error> {
        let value: Option<(String,)> = sqlx::query_as("SELECT value FROM preferences WHERE key = ?;")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), crate::Error> {
        sqlx::query(
            r#"
            INSERT INTO preferences(key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value;
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), crate::Error> {
        sqlx::query("DELETE FROM preferences WHERE key = ?;")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
