pub mod repository;
pub mod sqlite;

pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupted row: {0}")]
    Corrupted(String),
}

/// Constraint violations surface as `Conflict`, not as a generic storage
/// error — double-booked slots and duplicate licenses are part of the API
/// contract, not server faults.
impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, detail)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DatabaseError::Conflict(
                    detail
                        .clone()
                        .unwrap_or_else(|| "constraint violation".to_string()),
                )
            }
            _ => DatabaseError::Sqlite(err),
        }
    }
}
