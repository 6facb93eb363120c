//! Installation store error types.

/// Errors from the installation store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query or connection failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}
