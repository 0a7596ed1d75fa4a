use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// Maps unique and foreign key violations raised by a write to
    /// `ConstraintViolation`, leaving every other error untouched.
    pub(crate) fn from_write(error: sqlx::Error, unique_message: &str) -> Self {
        let error = StorageError::from(error);

        if error.is_unique_violation() {
            StorageError::ConstraintViolation(unique_message.to_string())
        } else if error.is_foreign_key_violation() {
            StorageError::ConstraintViolation("Referenced record does not exist".to_string())
        } else {
            error
        }
    }

    /// Maps a foreign key violation raised by a delete, i.e. the record is
    /// still referenced elsewhere.
    pub(crate) fn from_delete(error: sqlx::Error) -> Self {
        let error = StorageError::from(error);

        if error.is_foreign_key_violation() {
            StorageError::ConstraintViolation("Record is still referenced by races".to_string())
        } else {
            error
        }
    }
}
