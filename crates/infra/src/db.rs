//! Store connection and schema bootstrap.
//!
//! The process talks to exactly one relational store through one long-lived
//! connection. `Database` is the session object: constructed once at startup,
//! handed by reference to every handler, closed at shutdown.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info};

use crate::repositories::{HealthUnitRepository, MedicationRepository, StockLotRepository};

/// URL of a private in-memory store (tests, dry runs).
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS medication (
        registration_code   TEXT PRIMARY KEY NOT NULL,
        commercial_name     TEXT NOT NULL,
        manufacturer        TEXT NOT NULL,
        presentation        TEXT NOT NULL,
        administration_form TEXT NOT NULL,
        active_ingredient   TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS health_unit (
        unit_code    TEXT PRIMARY KEY NOT NULL,
        name         TEXT NOT NULL,
        phone        TEXT NOT NULL,
        "type"       TEXT NOT NULL,
        street       TEXT NOT NULL,
        number       TEXT NOT NULL,
        neighborhood TEXT NOT NULL,
        postal_code  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stock_lot (
        lot_number        TEXT NOT NULL,
        registration_code TEXT NOT NULL REFERENCES medication (registration_code),
        unit_code         TEXT NOT NULL REFERENCES health_unit (unit_code),
        expiry_date       TEXT NOT NULL,
        quantity          INTEGER NOT NULL CHECK (quantity >= 0),
        PRIMARY KEY (lot_number, registration_code, unit_code)
    )
    "#,
];

/// Session over the relational store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the store at `url`.
    ///
    /// The pool is pinned to a single connection that never expires, which also
    /// keeps an in-memory store alive for the lifetime of the session.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        debug!(url, "store connection opened");
        Ok(Self { pool })
    }

    /// Open a fresh in-memory store with the schema in place.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let db = Self::connect(IN_MEMORY_URL).await?;
        db.ensure_schema().await?;
        Ok(db)
    }

    /// Create the three tables if they are missing. Existing tables are left as-is.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("store schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn medications(&self) -> MedicationRepository {
        MedicationRepository::new(self.pool.clone())
    }

    pub fn health_units(&self) -> HealthUnitRepository {
        HealthUnitRepository::new(self.pool.clone())
    }

    pub fn stock_lots(&self) -> StockLotRepository {
        StockLotRepository::new(self.pool.clone())
    }

    /// Release the connection. Outstanding repository handles become unusable.
    pub async fn close(self) {
        self.pool.close().await;
        debug!("store connection closed");
    }
}
