use serde::{Deserialize, Serialize};

use pharmastock_core::{Entity, RegistrationCode};

use crate::patch::{non_blank, pick};

/// Catalog entry for a registered medication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub registration_code: RegistrationCode,
    pub commercial_name: String,
    pub manufacturer: String,
    pub presentation: String,
    pub administration_form: String,
    pub active_ingredient: String,
}

impl Entity for Medication {
    type Id = RegistrationCode;

    fn id(&self) -> &Self::Id {
        &self.registration_code
    }
}

/// Replacement values for a medication's mutable fields.
///
/// `None` keeps the current value. The registration code is never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicationPatch {
    pub commercial_name: Option<String>,
    pub manufacturer: Option<String>,
    pub presentation: Option<String>,
    pub administration_form: Option<String>,
    pub active_ingredient: Option<String>,
}

impl MedicationPatch {
    /// Build a patch from raw operator answers, in field order.
    pub fn from_answers(
        commercial_name: &str,
        manufacturer: &str,
        presentation: &str,
        administration_form: &str,
        active_ingredient: &str,
    ) -> Self {
        Self {
            commercial_name: non_blank(commercial_name),
            manufacturer: non_blank(manufacturer),
            presentation: non_blank(presentation),
            administration_form: non_blank(administration_form),
            active_ingredient: non_blank(active_ingredient),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Produce the full replacement row for `current`.
    pub fn apply_to(&self, current: &Medication) -> Medication {
        Medication {
            registration_code: current.registration_code.clone(),
            commercial_name: pick(&self.commercial_name, &current.commercial_name),
            manufacturer: pick(&self.manufacturer, &current.manufacturer),
            presentation: pick(&self.presentation, &current.presentation),
            administration_form: pick(&self.administration_form, &current.administration_form),
            active_ingredient: pick(&self.active_ingredient, &current.active_ingredient),
        }
    }
}
