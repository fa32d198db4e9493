//! `stock_lot` table access.
//!
//! Stock lots are never deleted; they are created by `insert` and drained by
//! `adjust_quantity`.

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::{info, instrument, warn};

use pharmastock_core::{Entity, LotNumber, RegistrationCode, UnitCode};
use pharmastock_supply::{StockLot, StockLotKey};

use super::{
    RepoResult, RepositoryError, SqliteQuery, WriteReceipt, decode_code, execute_write,
    map_sqlx_error, rollback,
};

const ENTITY: &str = "stock lot";

const SELECT_COLUMNS: &str = r#"
    SELECT
        lot_number,
        registration_code,
        unit_code,
        expiry_date,
        quantity
    FROM stock_lot
"#;

const UPDATE_QUANTITY: &str = r#"
    UPDATE stock_lot
    SET quantity = ?1
    WHERE lot_number = ?2 AND registration_code = ?3 AND unit_code = ?4
"#;

/// Repository for per-unit stock lots.
#[derive(Debug, Clone)]
pub struct StockLotRepository {
    pool: SqlitePool,
}

impl StockLotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every stock lot across all units.
    #[instrument(skip(self), err)]
    pub async fn list(&self) -> RepoResult<Vec<StockLot>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY unit_code, lot_number, registration_code");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_stock_lots", e))?;

        rows.iter().map(decode).collect()
    }

    /// Stock held by one unit. An unknown unit yields an empty list.
    #[instrument(skip(self), fields(unit_code = %unit_code), err)]
    pub async fn list_by_unit(&self, unit_code: &UnitCode) -> RepoResult<Vec<StockLot>> {
        let sql = format!("{SELECT_COLUMNS} WHERE unit_code = ?1 ORDER BY lot_number, registration_code");
        let rows = sqlx::query(&sql)
            .bind(unit_code.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_stock_lots_by_unit", e))?;

        rows.iter().map(decode).collect()
    }

    /// Look up one lot by its composite key. A missing row is `Ok(None)`.
    #[instrument(skip(self), fields(key = %key), err)]
    pub async fn get(&self, key: &StockLotKey) -> RepoResult<Option<StockLot>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE lot_number = ?1 AND registration_code = ?2 AND unit_code = ?3"
        );
        let row = sqlx::query(&sql)
            .bind(key.lot_number.as_str())
            .bind(key.registration_code.as_str())
            .bind(key.unit_code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_stock_lot", e))?;

        row.as_ref().map(decode).transpose()
    }

    /// Insert a new lot.
    ///
    /// The store rejects references to unknown medications or units
    /// (`ConstraintViolation`); callers are expected to check both parents
    /// first so the operator gets a precise message.
    #[instrument(skip(self, lot), fields(key = %lot.key, quantity = lot.quantity), err)]
    pub async fn insert(&self, lot: &StockLot) -> RepoResult<WriteReceipt> {
        let query = sqlx::query(
            r#"
            INSERT INTO stock_lot (
                lot_number,
                registration_code,
                unit_code,
                expiry_date,
                quantity
            )
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(lot.key.lot_number.as_str())
        .bind(lot.key.registration_code.as_str())
        .bind(lot.key.unit_code.as_str())
        .bind(lot.expiry_date)
        .bind(i64::from(lot.quantity));

        let rows = execute_write(&self.pool, "insert_stock_lot", query).await?;
        info!("stock lot added");
        Ok(WriteReceipt::new("Medication added to stock.", rows))
    }

    /// Overwrite the stored quantity of an existing lot with `lot.quantity`.
    #[instrument(skip(self, lot), fields(key = %lot.key, quantity = lot.quantity), err)]
    pub async fn update_quantity(&self, lot: &StockLot) -> RepoResult<WriteReceipt> {
        let query = set_quantity(&lot.key, lot.quantity);
        let rows = execute_write(&self.pool, "update_stock_quantity", query).await?;
        if rows == 0 {
            return Err(RepositoryError::not_found(ENTITY, lot.id()));
        }
        info!("stock quantity updated");
        Ok(WriteReceipt::new("Stock updated.", rows))
    }

    /// Withdraw `amount` units from a lot.
    ///
    /// Reads the current quantity and writes `current - amount` in one
    /// transaction. When `amount` exceeds the current quantity nothing is
    /// written and `InsufficientStock` is returned. Returns the lot as stored
    /// afterwards.
    #[instrument(skip(self), fields(key = %key), err)]
    pub async fn adjust_quantity(&self, key: &StockLotKey, amount: u32) -> RepoResult<StockLot> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let sql = format!(
            "{SELECT_COLUMNS} WHERE lot_number = ?1 AND registration_code = ?2 AND unit_code = ?3"
        );
        let row = sqlx::query(&sql)
            .bind(key.lot_number.as_str())
            .bind(key.registration_code.as_str())
            .bind(key.unit_code.as_str())
            .fetch_optional(&mut *tx)
            .await;

        let current = match row {
            Ok(Some(row)) => match decode(&row) {
                Ok(lot) => lot,
                Err(err) => {
                    rollback(tx, "adjust_stock_quantity").await;
                    return Err(err);
                }
            },
            Ok(None) => {
                rollback(tx, "adjust_stock_quantity").await;
                return Err(RepositoryError::not_found(ENTITY, key));
            }
            Err(err) => {
                rollback(tx, "adjust_stock_quantity").await;
                return Err(map_sqlx_error("adjust_stock_quantity", err));
            }
        };

        let updated = match current.withdraw(amount) {
            Ok(lot) => lot,
            Err(err) => {
                warn!(available = current.quantity, requested = amount, "withdrawal refused");
                rollback(tx, "adjust_stock_quantity").await;
                return Err(err.into());
            }
        };

        let result = set_quantity(key, updated.quantity).execute(&mut *tx).await;

        if let Err(err) = result {
            rollback(tx, "adjust_stock_quantity").await;
            return Err(map_sqlx_error("adjust_stock_quantity", err));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        info!(remaining = updated.quantity, "stock withdrawn");
        Ok(updated)
    }
}

fn set_quantity(key: &StockLotKey, quantity: u32) -> SqliteQuery<'_> {
    sqlx::query(UPDATE_QUANTITY)
        .bind(i64::from(quantity))
        .bind(key.lot_number.as_str())
        .bind(key.registration_code.as_str())
        .bind(key.unit_code.as_str())
}

// SQLx row types

#[derive(Debug)]
struct StockLotRow {
    lot_number: String,
    registration_code: String,
    unit_code: String,
    expiry_date: NaiveDate,
    quantity: i64,
}

impl<'r> FromRow<'r, SqliteRow> for StockLotRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(StockLotRow {
            lot_number: row.try_get("lot_number")?,
            registration_code: row.try_get("registration_code")?,
            unit_code: row.try_get("unit_code")?,
            expiry_date: row.try_get("expiry_date")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

impl TryFrom<StockLotRow> for StockLot {
    type Error = RepositoryError;

    fn try_from(row: StockLotRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::MalformedRow(format!(
                "column 'quantity' holds {} (expected a non-negative 32-bit value)",
                row.quantity
            ))
        })?;

        Ok(StockLot {
            key: StockLotKey {
                lot_number: decode_code("lot_number", row.lot_number, LotNumber::parse)?,
                registration_code: decode_code(
                    "registration_code",
                    row.registration_code,
                    RegistrationCode::parse,
                )?,
                unit_code: decode_code("unit_code", row.unit_code, UnitCode::parse)?,
            },
            expiry_date: row.expiry_date,
            quantity,
        })
    }
}

fn decode(row: &SqliteRow) -> RepoResult<StockLot> {
    StockLotRow::from_row(row)
        .map_err(|e| map_sqlx_error("decode_stock_lot", e))?
        .try_into()
}
