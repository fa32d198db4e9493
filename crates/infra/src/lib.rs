//! Infrastructure layer: configuration, store connection, repositories.

pub mod config;
pub mod db;
pub mod repositories;


pub use config::{AppConfig, ConfigError};
pub use db::Database;
pub use repositories::{
    HealthUnitRepository, MedicationRepository, RepoResult, RepositoryError, StockLotRepository,
    WriteReceipt,
};
