//! Per-table repositories over the relational store.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `RepositoryError` as follows:
//!
//! | SQLx Error | `ErrorKind` | RepositoryError | Scenario |
//! |------------|-------------|-----------------|----------|
//! | Database | `UniqueViolation` | `ConstraintViolation` | Duplicate primary key on insert |
//! | Database | `ForeignKeyViolation` | `ConstraintViolation` | Stock row referencing a missing parent, or deleting a parent that still has stock |
//! | Database | `CheckViolation` / `NotNullViolation` | `ConstraintViolation` | Negative quantity, missing value |
//! | Database ("no such column") | `Other` | `MalformedRow` | Table lacks a column the record needs |
//! | Database | `Other` | `Storage` | Any other engine error |
//! | ColumnNotFound / ColumnDecode / Decode | N/A | `MalformedRow` | Row shape does not match the record |
//! | PoolClosed / Io / other | N/A | `Storage` | Connection closed, IO failures |
//!
//! ## Writes
//!
//! Every write runs one parameterized statement inside its own transaction.
//! The transaction is committed on success and explicitly rolled back on
//! failure; the failure is returned, never raised past the repository.

use sqlx::error::ErrorKind;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;
use tracing::warn;

use pharmastock_core::DomainError;

pub mod health_unit;
pub mod medication;
pub mod stock_lot;

pub use health_unit::HealthUnitRepository;
pub use medication::MedicationRepository;
pub use stock_lot::StockLotRepository;

/// Result type returned by every repository operation.
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No row matched the key.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The store rejected the statement (duplicate key, foreign key, check).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A withdrawal asked for more units than the lot holds. Nothing was written.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { available: u32, requested: u32 },

    /// A row could not be decoded into its record type.
    #[error("malformed row: {0}")]
    MalformedRow(String),

    /// Caller-supplied values were rejected before reaching the store.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// Connection or engine failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, key: impl core::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<DomainError> for RepositoryError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InsufficientStock {
                available,
                requested,
            } => Self::InsufficientStock {
                available,
                requested,
            },
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Invalid(msg),
        }
    }
}

/// Success payload of a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub message: String,
    pub rows_affected: u64,
}

impl WriteReceipt {
    pub fn new(message: impl Into<String>, rows_affected: u64) -> Self {
        Self {
            message: message.into(),
            rows_affected,
        }
    }
}

pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Run a single write statement in its own transaction.
///
/// Returns the number of affected rows after commit.
pub(crate) async fn execute_write(
    pool: &SqlitePool,
    operation: &'static str,
    query: SqliteQuery<'_>,
) -> RepoResult<u64> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| map_sqlx_error("begin_transaction", e))?;

    match query.execute(&mut *tx).await {
        Ok(result) => {
            tx.commit()
                .await
                .map_err(|e| map_sqlx_error("commit_transaction", e))?;
            Ok(result.rows_affected())
        }
        Err(err) => {
            rollback(tx, operation).await;
            Err(map_sqlx_error(operation, err))
        }
    }
}

/// Roll back `tx`, logging (not returning) a failed rollback so the original
/// error reaches the caller.
pub(crate) async fn rollback(tx: Transaction<'_, Sqlite>, operation: &'static str) {
    if let Err(err) = tx.rollback().await {
        warn!(operation, "rollback failed: {err}");
    }
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{} in {}", db_err.message(), operation);
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => RepositoryError::ConstraintViolation(msg),
                // SQLite validates the column list when preparing the statement.
                _ if db_err.message().starts_with("no such column") => {
                    RepositoryError::MalformedRow(msg)
                }
                _ => RepositoryError::Storage(msg),
            }
        }
        sqlx::Error::ColumnNotFound(column) => {
            RepositoryError::MalformedRow(format!("missing column '{column}' in {operation}"))
        }
        sqlx::Error::ColumnDecode { index, source } => RepositoryError::MalformedRow(format!(
            "cannot decode column {index} in {operation}: {source}"
        )),
        sqlx::Error::Decode(source) => {
            RepositoryError::MalformedRow(format!("cannot decode row in {operation}: {source}"))
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Storage(format!("connection closed in {operation}"))
        }
        other => RepositoryError::Storage(format!("{operation}: {other}")),
    }
}

/// Decode a key column that must hold a non-blank code.
pub(crate) fn decode_code<T>(
    column: &'static str,
    raw: String,
    parse: fn(&str) -> Result<T, DomainError>,
) -> RepoResult<T> {
    parse(&raw).map_err(|e| RepositoryError::MalformedRow(format!("column '{column}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_not_found_is_malformed_row() {
        let err = map_sqlx_error("get_medication", sqlx::Error::ColumnNotFound("quantity".into()));
        match err {
            RepositoryError::MalformedRow(msg) => {
                assert!(msg.contains("quantity"));
                assert!(msg.contains("get_medication"));
            }
            _ => panic!("Expected MalformedRow"),
        }
    }

    #[test]
    fn pool_closed_is_storage_error() {
        match map_sqlx_error("list", sqlx::Error::PoolClosed) {
            RepositoryError::Storage(_) => {}
            other => panic!("Expected Storage, got {other:?}"),
        }
    }

    #[test]
    fn insufficient_stock_survives_conversion() {
        let err: RepositoryError = DomainError::insufficient_stock(3, 5).into();
        assert_eq!(
            err,
            RepositoryError::InsufficientStock {
                available: 3,
                requested: 5
            }
        );
    }

    #[test]
    fn field_errors_convert_to_invalid() {
        let err: RepositoryError = DomainError::validation("quantity must be positive").into();
        assert_eq!(err, RepositoryError::Invalid("quantity must be positive".into()));

        let err: RepositoryError = DomainError::invalid_id("blank UnitCode").into();
        assert_eq!(err, RepositoryError::Invalid("blank UnitCode".into()));
    }

    #[test]
    fn blank_key_column_is_malformed_row() {
        let err = decode_code("unit_code", "  ".to_string(), pharmastock_core::UnitCode::parse)
            .unwrap_err();
        match err {
            RepositoryError::MalformedRow(msg) => assert!(msg.contains("unit_code")),
            _ => panic!("Expected MalformedRow"),
        }
    }
}
