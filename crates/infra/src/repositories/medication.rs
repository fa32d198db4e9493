//! `medication` table access.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::{info, instrument};

use pharmastock_core::{Entity, RegistrationCode};
use pharmastock_supply::Medication;

use super::{RepoResult, RepositoryError, WriteReceipt, decode_code, execute_write, map_sqlx_error};

const ENTITY: &str = "medication";

const SELECT_COLUMNS: &str = r#"
    SELECT
        registration_code,
        commercial_name,
        manufacturer,
        presentation,
        administration_form,
        active_ingredient
    FROM medication
"#;

/// Repository for the medication catalog.
#[derive(Debug, Clone)]
pub struct MedicationRepository {
    pool: SqlitePool,
}

impl MedicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All medications, ordered by registration code.
    #[instrument(skip(self), err)]
    pub async fn list(&self) -> RepoResult<Vec<Medication>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY registration_code");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_medications", e))?;

        rows.iter().map(decode).collect()
    }

    /// Look up one medication. A missing row is `Ok(None)`.
    #[instrument(skip(self), fields(registration_code = %code), err)]
    pub async fn get(&self, code: &RegistrationCode) -> RepoResult<Option<Medication>> {
        let sql = format!("{SELECT_COLUMNS} WHERE registration_code = ?1");
        let row = sqlx::query(&sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_medication", e))?;

        row.as_ref().map(decode).transpose()
    }

    pub async fn exists(&self, code: &RegistrationCode) -> RepoResult<bool> {
        Ok(self.get(code).await?.is_some())
    }

    #[instrument(skip(self, medication), fields(registration_code = %medication.registration_code), err)]
    pub async fn insert(&self, medication: &Medication) -> RepoResult<WriteReceipt> {
        let query = sqlx::query(
            r#"
            INSERT INTO medication (
                registration_code,
                commercial_name,
                manufacturer,
                presentation,
                administration_form,
                active_ingredient
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(medication.registration_code.as_str())
        .bind(&medication.commercial_name)
        .bind(&medication.manufacturer)
        .bind(&medication.presentation)
        .bind(&medication.administration_form)
        .bind(&medication.active_ingredient);

        let rows = execute_write(&self.pool, "insert_medication", query).await?;
        info!("medication added");
        Ok(WriteReceipt::new("Medication added.", rows))
    }

    /// Replace every mutable field of an existing medication.
    #[instrument(skip(self, medication), fields(registration_code = %medication.registration_code), err)]
    pub async fn update(&self, medication: &Medication) -> RepoResult<WriteReceipt> {
        let query = sqlx::query(
            r#"
            UPDATE medication
            SET commercial_name = ?1,
                manufacturer = ?2,
                presentation = ?3,
                administration_form = ?4,
                active_ingredient = ?5
            WHERE registration_code = ?6
            "#,
        )
        .bind(&medication.commercial_name)
        .bind(&medication.manufacturer)
        .bind(&medication.presentation)
        .bind(&medication.administration_form)
        .bind(&medication.active_ingredient)
        .bind(medication.registration_code.as_str());

        let rows = execute_write(&self.pool, "update_medication", query).await?;
        if rows == 0 {
            return Err(RepositoryError::not_found(ENTITY, medication.id()));
        }
        info!("medication updated");
        Ok(WriteReceipt::new("Medication updated.", rows))
    }

    #[instrument(skip(self), fields(registration_code = %code), err)]
    pub async fn delete(&self, code: &RegistrationCode) -> RepoResult<WriteReceipt> {
        let query = sqlx::query("DELETE FROM medication WHERE registration_code = ?1")
            .bind(code.as_str());

        let rows = execute_write(&self.pool, "delete_medication", query).await?;
        if rows == 0 {
            return Err(RepositoryError::not_found(ENTITY, code));
        }
        info!("medication deleted");
        Ok(WriteReceipt::new("Medication deleted.", rows))
    }
}

// SQLx row types

#[derive(Debug)]
struct MedicationRow {
    registration_code: String,
    commercial_name: String,
    manufacturer: String,
    presentation: String,
    administration_form: String,
    active_ingredient: String,
}

impl<'r> FromRow<'r, SqliteRow> for MedicationRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(MedicationRow {
            registration_code: row.try_get("registration_code")?,
            commercial_name: row.try_get("commercial_name")?,
            manufacturer: row.try_get("manufacturer")?,
            presentation: row.try_get("presentation")?,
            administration_form: row.try_get("administration_form")?,
            active_ingredient: row.try_get("active_ingredient")?,
        })
    }
}

impl TryFrom<MedicationRow> for Medication {
    type Error = RepositoryError;

    fn try_from(row: MedicationRow) -> Result<Self, Self::Error> {
        Ok(Medication {
            registration_code: decode_code(
                "registration_code",
                row.registration_code,
                RegistrationCode::parse,
            )?,
            commercial_name: row.commercial_name,
            manufacturer: row.manufacturer,
            presentation: row.presentation,
            administration_form: row.administration_form,
            active_ingredient: row.active_ingredient,
        })
    }
}

fn decode(row: &SqliteRow) -> RepoResult<Medication> {
    MedicationRow::from_row(row)
        .map_err(|e| map_sqlx_error("decode_medication", e))?
        .try_into()
}
