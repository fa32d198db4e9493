use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pharmastock_core::{DomainError, DomainResult, Entity, LotNumber, RegistrationCode, UnitCode};

/// Input format for expiry dates.
pub const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Composite identity of a stock lot: one batch of one medication at one unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockLotKey {
    pub lot_number: LotNumber,
    pub registration_code: RegistrationCode,
    pub unit_code: UnitCode,
}

impl core::fmt::Display for StockLotKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}/{}@{}",
            self.lot_number, self.registration_code, self.unit_code
        )
    }
}

/// A batch of a medication held by a health unit.
///
/// `quantity` is unsigned: stock can never go negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLot {
    pub key: StockLotKey,
    pub expiry_date: NaiveDate,
    pub quantity: u32,
}

impl Entity for StockLot {
    type Id = StockLotKey;

    fn id(&self) -> &Self::Id {
        &self.key
    }
}

impl StockLot {
    /// Take `amount` units out of this lot.
    ///
    /// Returns the lot as it should be stored afterwards. `self` is left
    /// untouched, so a refused withdrawal has nothing to undo.
    pub fn withdraw(&self, amount: u32) -> DomainResult<StockLot> {
        if amount == 0 {
            return Err(DomainError::validation("withdrawal amount must be positive"));
        }
        if amount > self.quantity {
            return Err(DomainError::insufficient_stock(self.quantity, amount));
        }

        Ok(StockLot {
            key: self.key.clone(),
            expiry_date: self.expiry_date,
            quantity: self.quantity - amount,
        })
    }
}

/// Parse an operator-entered expiry date (`YYYY-MM-DD`).
pub fn parse_expiry_date(raw: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), EXPIRY_DATE_FORMAT).map_err(|e| {
        DomainError::validation(format!("expiry date must be YYYY-MM-DD ({e})"))
    })
}

/// Parse an operator-entered quantity (non-negative integer).
pub fn parse_quantity(raw: &str) -> DomainResult<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| DomainError::validation(format!("'{}' is not a valid quantity", raw.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot(quantity: u32) -> StockLot {
        StockLot {
            key: StockLotKey {
                lot_number: LotNumber::parse("L1").unwrap(),
                registration_code: RegistrationCode::parse("A1").unwrap(),
                unit_code: UnitCode::parse("U1").unwrap(),
            },
            expiry_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            quantity,
        }
    }

    #[test]
    fn withdraw_reduces_quantity() {
        let updated = lot(100).withdraw(30).unwrap();
        assert_eq!(updated.quantity, 70);
        assert_eq!(updated.key, lot(100).key);
    }

    #[test]
    fn withdraw_everything_leaves_zero() {
        assert_eq!(lot(5).withdraw(5).unwrap().quantity, 0);
    }

    #[test]
    fn withdraw_rejects_more_than_available() {
        let err = lot(10).withdraw(11).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(10, 11));
    }

    #[test]
    fn withdraw_rejects_zero() {
        match lot(10).withdraw(0).unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for zero withdrawal"),
        }
    }

    #[test]
    fn parse_expiry_date_accepts_iso_dates() {
        assert_eq!(
            parse_expiry_date(" 2025-01-01 ").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert!(parse_expiry_date("01/01/2025").is_err());
    }

    #[test]
    fn parse_quantity_rejects_negative_and_garbage() {
        assert_eq!(parse_quantity("100").unwrap(), 100);
        assert!(parse_quantity("-1").is_err());
        assert!(parse_quantity("ten").is_err());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: a withdrawal either yields `old - amount` or is refused
            /// with the original quantity reported back.
            #[test]
            fn withdraw_never_goes_negative(quantity in 0u32..10_000, amount in 1u32..20_000) {
                let original = lot(quantity);
                match original.withdraw(amount) {
                    Ok(updated) => {
                        prop_assert!(amount <= quantity);
                        prop_assert_eq!(updated.quantity, quantity - amount);
                    }
                    Err(err) => {
                        prop_assert!(amount > quantity);
                        prop_assert_eq!(err, DomainError::insufficient_stock(quantity, amount));
                    }
                }
                prop_assert_eq!(original.quantity, quantity);
            }
        }
    }
}
