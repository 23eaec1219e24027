//! Database-specific error types and conversions.

use sigil_core::error::SigilError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unique index violation: {entity}")]
    Conflict { entity: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for SigilError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict { entity } => SigilError::Conflict { entity },
            DbError::NotFound { entity, id } => SigilError::NotFound { entity, id },
            other => SigilError::Database(other.to_string()),
        }
    }
}
