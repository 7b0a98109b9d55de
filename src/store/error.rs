use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Unsupported database URL: {0}")]
    UnsupportedUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Prediction {0} is already settled")]
    AlreadySettled(i64),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
