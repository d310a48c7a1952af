//! String key/value store backing the task snapshot and theme preference.
//!
//! Each key holds a complete serialized value; writers replace the whole value.

use sqlx::{
    migrate::MigrateDatabase, query, query_scalar, sqlite::SqlitePoolOptions, Pool, Sqlite,
};
use tracing::info;

pub const TASKS_KEY: &str = "tasks";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone)]
pub struct Storage {
    db: Pool<Sqlite>,
}

impl Storage {
    /// Opens (creating if needed) the database at `url` and ensures the table exists.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let in_memory = url.contains(":memory:");

        if !in_memory && !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database {url}");
            Sqlite::create_database(url).await?;
        }

        // every in-memory connection is its own database, so keep exactly one alive
        let options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(10)
        };

        let db = options.connect(url).await?;

        query(
            r#"CREATE TABLE IF NOT EXISTS storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );"#,
        )
        .execute(&db)
        .await?;

        info!("Storage ready at {url}");
        Ok(Self { db })
    }

    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        Self::connect("sqlite::memory:").await
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        query_scalar::<_, String>("SELECT value FROM storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        query(
            "INSERT INTO storage (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Closes the pool; later reads and writes fail with `PoolClosed`.
    pub async fn close(&self) {
        self.db.close().await;
        info!("Storage closed");
    }
}
