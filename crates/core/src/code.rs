//! Strongly-typed identity codes used across the domain.
//!
//! All keys in this system are operator-supplied strings (regulatory
//! registration codes, facility codes, batch numbers), so the newtypes wrap a
//! trimmed, non-blank `String` instead of a generated identifier.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// National regulatory registration code (primary key of a medication).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationCode(String);

/// Health unit (facility) code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitCode(String);

/// Batch number of a stock lot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotNumber(String);

macro_rules! impl_code_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Parse a code, trimming surrounding whitespace.
            ///
            /// Blank input is rejected.
            pub fn parse(raw: &str) -> Result<Self, DomainError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{} cannot be blank", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

impl_code_newtype!(RegistrationCode, "RegistrationCode");
impl_code_newtype!(UnitCode, "UnitCode");
impl_code_newtype!(LotNumber, "LotNumber");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let code = RegistrationCode::parse("  A1 \n").unwrap();
        assert_eq!(code.as_str(), "A1");
        assert_eq!(code.to_string(), "A1");
    }

    #[test]
    fn parse_rejects_blank_codes() {
        let err = UnitCode::parse("   ").unwrap_err();
        match err {
            DomainError::InvalidId(msg) => assert!(msg.contains("UnitCode")),
            _ => panic!("Expected InvalidId error for blank code"),
        }
    }

    #[test]
    fn from_str_matches_parse() {
        let lot: LotNumber = "L1".parse().unwrap();
        assert_eq!(lot, LotNumber::parse("L1").unwrap());
    }
}
