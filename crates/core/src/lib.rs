//! `pharmastock-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod code;
pub mod entity;
pub mod error;

pub use code::{LotNumber, RegistrationCode, UnitCode};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
