//! Persisted users and installations.
//!
//! An installation starts life as a pending row holding only the OAuth
//! `state` handed to the device platform. The callback attaches a user and
//! access token; the installation-success webhook records the platform's
//! installation id and clears the state.

mod error;
mod installations;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

pub use error::StoreError;
pub use installations::Installation;

/// Handle to the SQLite database.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect to the database at `url`, e.g. `sqlite:site.db?mode=rwc`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new().connect(url).await?;
        Ok(Self { pool })
    }

    /// A private in-memory database with the schema applied.
    ///
    /// Limited to one connection: every SQLite `:memory:` connection is a
    /// separate database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Apply embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let migrator = sqlx::migrate!("./migrations");
        info!(migrations = migrator.migrations.len(), "applying migrations");
        migrator.run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
