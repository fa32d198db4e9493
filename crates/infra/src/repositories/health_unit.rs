//! `health_unit` table access.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::{info, instrument};

use pharmastock_core::{Entity, UnitCode};
use pharmastock_supply::HealthUnit;

use super::{RepoResult, RepositoryError, WriteReceipt, decode_code, execute_write, map_sqlx_error};

const ENTITY: &str = "health unit";

const SELECT_COLUMNS: &str = r#"
    SELECT
        unit_code,
        name,
        phone,
        "type",
        street,
        number,
        neighborhood,
        postal_code
    FROM health_unit
"#;

/// Repository for health unit (facility) records.
#[derive(Debug, Clone)]
pub struct HealthUnitRepository {
    pool: SqlitePool,
}

impl HealthUnitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All health units, ordered by unit code.
    #[instrument(skip(self), err)]
    pub async fn list(&self) -> RepoResult<Vec<HealthUnit>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY unit_code");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_health_units", e))?;

        rows.iter().map(decode).collect()
    }

    /// Look up one health unit. A missing row is `Ok(None)`.
    #[instrument(skip(self), fields(unit_code = %code), err)]
    pub async fn get(&self, code: &UnitCode) -> RepoResult<Option<HealthUnit>> {
        let sql = format!("{SELECT_COLUMNS} WHERE unit_code = ?1");
        let row = sqlx::query(&sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_health_unit", e))?;

        row.as_ref().map(decode).transpose()
    }

    pub async fn exists(&self, code: &UnitCode) -> RepoResult<bool> {
        Ok(self.get(code).await?.is_some())
    }

    #[instrument(skip(self, unit), fields(unit_code = %unit.unit_code), err)]
    pub async fn insert(&self, unit: &HealthUnit) -> RepoResult<WriteReceipt> {
        let query = sqlx::query(
            r#"
            INSERT INTO health_unit (
                unit_code,
                name,
                phone,
                "type",
                street,
                number,
                neighborhood,
                postal_code
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(unit.unit_code.as_str())
        .bind(&unit.name)
        .bind(&unit.phone)
        .bind(&unit.kind)
        .bind(&unit.street)
        .bind(&unit.number)
        .bind(&unit.neighborhood)
        .bind(&unit.postal_code);

        let rows = execute_write(&self.pool, "insert_health_unit", query).await?;
        info!("health unit added");
        Ok(WriteReceipt::new("Health unit added.", rows))
    }

    /// Replace every mutable field of an existing health unit.
    #[instrument(skip(self, unit), fields(unit_code = %unit.unit_code), err)]
    pub async fn update(&self, unit: &HealthUnit) -> RepoResult<WriteReceipt> {
        let query = sqlx::query(
            r#"
            UPDATE health_unit
            SET name = ?1,
                phone = ?2,
                "type" = ?3,
                street = ?4,
                number = ?5,
                neighborhood = ?6,
                postal_code = ?7
            WHERE unit_code = ?8
            "#,
        )
        .bind(&unit.name)
        .bind(&unit.phone)
        .bind(&unit.kind)
        .bind(&unit.street)
        .bind(&unit.number)
        .bind(&unit.neighborhood)
        .bind(&unit.postal_code)
        .bind(unit.unit_code.as_str());

        let rows = execute_write(&self.pool, "update_health_unit", query).await?;
        if rows == 0 {
            return Err(RepositoryError::not_found(ENTITY, unit.id()));
        }
        info!("health unit updated");
        Ok(WriteReceipt::new("Health unit updated.", rows))
    }

    /// Delete a health unit. Fails with `ConstraintViolation` while stock
    /// lots still reference it.
    #[instrument(skip(self), fields(unit_code = %code), err)]
    pub async fn delete(&self, code: &UnitCode) -> RepoResult<WriteReceipt> {
        let query = sqlx::query("DELETE FROM health_unit WHERE unit_code = ?1").bind(code.as_str());

        let rows = execute_write(&self.pool, "delete_health_unit", query).await?;
        if rows == 0 {
            return Err(RepositoryError::not_found(ENTITY, code));
        }
        info!("health unit deleted");
        Ok(WriteReceipt::new("Health unit deleted.", rows))
    }
}

// SQLx row types

#[derive(Debug)]
struct HealthUnitRow {
    unit_code: String,
    name: String,
    phone: String,
    kind: String,
    street: String,
    number: String,
    neighborhood: String,
    postal_code: String,
}

impl<'r> FromRow<'r, SqliteRow> for HealthUnitRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(HealthUnitRow {
            unit_code: row.try_get("unit_code")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            kind: row.try_get("type")?,
            street: row.try_get("street")?,
            number: row.try_get("number")?,
            neighborhood: row.try_get("neighborhood")?,
            postal_code: row.try_get("postal_code")?,
        })
    }
}

impl TryFrom<HealthUnitRow> for HealthUnit {
    type Error = RepositoryError;

    fn try_from(row: HealthUnitRow) -> Result<Self, Self::Error> {
        Ok(HealthUnit {
            unit_code: decode_code("unit_code", row.unit_code, UnitCode::parse)?,
            name: row.name,
            phone: row.phone,
            kind: row.kind,
            street: row.street,
            number: row.number,
            neighborhood: row.neighborhood,
            postal_code: row.postal_code,
        })
    }
}

fn decode(row: &SqliteRow) -> RepoResult<HealthUnit> {
    HealthUnitRow::from_row(row)
        .map_err(|e| map_sqlx_error("decode_health_unit", e))?
        .try_into()
}
