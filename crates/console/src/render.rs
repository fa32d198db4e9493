//! Fixed-width table rendering.

use std::io::{self, Write};

use chrono::NaiveDate;

use pharmastock_supply::{HealthUnit, Medication, StockLot};

/// Output format for expiry dates.
pub const EXPIRY_DISPLAY_FORMAT: &str = "%d/%m/%Y";

pub fn format_expiry(date: NaiveDate) -> String {
    date.format(EXPIRY_DISPLAY_FORMAT).to_string()
}

pub fn health_units<W: Write>(out: &mut W, units: &[HealthUnit]) -> io::Result<()> {
    writeln!(
        out,
        "{:<10} {:<30} {:<15} {:<25} {:<30} {:<10} {:<20} {:<10}",
        "Code", "Name", "Phone", "Type", "Street", "Number", "Neighborhood", "Postal code"
    )?;
    writeln!(out, "{}", "=".repeat(150))?;
    for unit in units {
        writeln!(
            out,
            "{:<10} {:<30} {:<15} {:<25} {:<30} {:<10} {:<20} {:<10}",
            unit.unit_code.as_str(),
            unit.name,
            unit.phone,
            unit.kind,
            unit.street,
            unit.number,
            unit.neighborhood,
            unit.postal_code
        )?;
    }
    Ok(())
}

pub fn medications<W: Write>(out: &mut W, medications: &[Medication]) -> io::Result<()> {
    writeln!(
        out,
        "{:<15} {:<30} {:<20} {:<30} {:<30} {:<30}",
        "Registration", "Commercial name", "Manufacturer", "Presentation", "Administration form",
        "Active ingredient"
    )?;
    writeln!(out, "{}", "=".repeat(150))?;
    for med in medications {
        writeln!(
            out,
            "{:<15} {:<30} {:<20} {:<30} {:<30} {:<30}",
            med.registration_code.as_str(),
            med.commercial_name,
            med.manufacturer,
            med.presentation,
            med.administration_form,
            med.active_ingredient
        )?;
    }
    Ok(())
}

pub fn stock_lots<W: Write>(out: &mut W, lots: &[StockLot]) -> io::Result<()> {
    writeln!(
        out,
        "{:<10} {:<15} {:<15} {:<15} {:<10}",
        "Lot", "Registration", "Unit", "Expiry", "Quantity"
    )?;
    writeln!(out, "{}", "=".repeat(70))?;
    for lot in lots {
        writeln!(
            out,
            "{:<10} {:<15} {:<15} {:<15} {:<10}",
            lot.key.lot_number.as_str(),
            lot.key.registration_code.as_str(),
            lot.key.unit_code.as_str(),
            format_expiry(lot.expiry_date),
            lot.quantity
        )?;
    }
    Ok(())
}
