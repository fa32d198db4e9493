//! Medication supply domain module.
//!
//! This crate contains the record types stored by the system (medications,
//! health units, stock lots) and the rules that apply to them, implemented
//! purely as deterministic domain logic (no IO, no console, no storage).

pub mod health_unit;
pub mod medication;
pub mod patch;
pub mod stock_lot;

pub use health_unit::{HealthUnit, HealthUnitPatch};
pub use medication::{Medication, MedicationPatch};
pub use patch::non_blank;
pub use stock_lot::{StockLot, StockLotKey, parse_expiry_date, parse_quantity};
