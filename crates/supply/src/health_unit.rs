use serde::{Deserialize, Serialize};

use pharmastock_core::{Entity, UnitCode};

use crate::patch::{non_blank, pick};

/// A health facility (clinic, hospital) that stocks medications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthUnit {
    pub unit_code: UnitCode,
    pub name: String,
    pub phone: String,
    /// Facility type (stored in the `type` column).
    pub kind: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub postal_code: String,
}

impl Entity for HealthUnit {
    type Id = UnitCode;

    fn id(&self) -> &Self::Id {
        &self.unit_code
    }
}

/// Replacement values for a health unit's mutable fields.
///
/// `None` keeps the current value. The unit code is never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthUnitPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub kind: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub postal_code: Option<String>,
}

impl HealthUnitPatch {
    /// Build a patch from raw operator answers, in prompt order.
    pub fn from_answers(answers: [&str; 7]) -> Self {
        let [name, phone, kind, street, number, neighborhood, postal_code] = answers;
        Self {
            name: non_blank(name),
            phone: non_blank(phone),
            kind: non_blank(kind),
            street: non_blank(street),
            number: non_blank(number),
            neighborhood: non_blank(neighborhood),
            postal_code: non_blank(postal_code),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Produce the full replacement row for `current`.
    pub fn apply_to(&self, current: &HealthUnit) -> HealthUnit {
        HealthUnit {
            unit_code: current.unit_code.clone(),
            name: pick(&self.name, &current.name),
            phone: pick(&self.phone, &current.phone),
            kind: pick(&self.kind, &current.kind),
            street: pick(&self.street, &current.street),
            number: pick(&self.number, &current.number),
            neighborhood: pick(&self.neighborhood, &current.neighborhood),
            postal_code: pick(&self.postal_code, &current.postal_code),
        }
    }
}
