//! One handler per menu entry.
//!
//! Each handler collects its fields, performs any dependent lookup, calls one
//! repository operation and prints a single status line. Store failures are
//! printed, never returned: only `ConsoleError` escapes.

use std::io::{BufRead, Write};

use pharmastock_core::{DomainResult, LotNumber, RegistrationCode, UnitCode};
use pharmastock_infra::{Database, RepoResult, RepositoryError, WriteReceipt};
use pharmastock_supply::{
    HealthUnit, HealthUnitPatch, Medication, MedicationPatch, StockLot, StockLotKey,
    parse_expiry_date, parse_quantity,
};

use crate::console::{Console, ConsoleError};
use crate::render;

type HandlerResult = Result<(), ConsoleError>;

/// Prompt for a value and parse it; a rejected value is reported and yields `None`.
fn ask<R, W, T>(
    console: &mut Console<R, W>,
    label: &str,
    parse: fn(&str) -> DomainResult<T>,
) -> Result<Option<T>, ConsoleError>
where
    R: BufRead,
    W: Write,
{
    let raw = console.prompt(label)?;
    match parse(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            console.say(format!("Invalid value: {err}"))?;
            Ok(None)
        }
    }
}

fn report<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    result: RepoResult<WriteReceipt>,
    failure: &str,
) -> HandlerResult {
    match result {
        Ok(receipt) => console.say(receipt.message),
        Err(err) => console.say(format!("Error {failure}: {err}")),
    }
}

fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "sim")
}

/// Prompt text for a field that keeps its value when left blank.
fn keep_prompt(label: &str, current: &str) -> String {
    format!("New {label} (blank keeps '{current}'): ")
}

/// Look up a unit by operator-entered code, reporting when it is unknown.
async fn find_unit<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
    label: &str,
) -> Result<Option<HealthUnit>, ConsoleError> {
    let Some(code) = ask(console, label, UnitCode::parse)? else {
        return Ok(None);
    };
    match db.health_units().get(&code).await {
        Ok(Some(unit)) => Ok(Some(unit)),
        Ok(None) => {
            console.say("Health unit not found.")?;
            Ok(None)
        }
        Err(err) => {
            console.say(format!("Error looking up health unit: {err}"))?;
            Ok(None)
        }
    }
}

async fn find_medication<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
    label: &str,
) -> Result<Option<Medication>, ConsoleError> {
    let Some(code) = ask(console, label, RegistrationCode::parse)? else {
        return Ok(None);
    };
    match db.medications().get(&code).await {
        Ok(Some(medication)) => Ok(Some(medication)),
        Ok(None) => {
            console.say("Medication not found.")?;
            Ok(None)
        }
        Err(err) => {
            console.say(format!("Error looking up medication: {err}"))?;
            Ok(None)
        }
    }
}

/// Presence-only check for a health unit; returns the parsed code when it exists.
async fn require_unit<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
    label: &str,
) -> Result<Option<UnitCode>, ConsoleError> {
    let Some(code) = ask(console, label, UnitCode::parse)? else {
        return Ok(None);
    };
    match db.health_units().exists(&code).await {
        Ok(true) => Ok(Some(code)),
        Ok(false) => {
            console.say("Health unit not found.")?;
            Ok(None)
        }
        Err(err) => {
            console.say(format!("Error looking up health unit: {err}"))?;
            Ok(None)
        }
    }
}

async fn require_medication<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
    label: &str,
) -> Result<Option<RegistrationCode>, ConsoleError> {
    let Some(code) = ask(console, label, RegistrationCode::parse)? else {
        return Ok(None);
    };
    match db.medications().exists(&code).await {
        Ok(true) => Ok(Some(code)),
        Ok(false) => {
            console.say("Medication not found.")?;
            Ok(None)
        }
        Err(err) => {
            console.say(format!("Error looking up medication: {err}"))?;
            Ok(None)
        }
    }
}

// Health units

pub async fn list_health_units<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
) -> HandlerResult {
    match db.health_units().list().await {
        Ok(units) if units.is_empty() => console.say("No health units found."),
        Ok(units) => Ok(render::health_units(console.out(), &units)?),
        Err(err) => console.say(format!("Error listing health units: {err}")),
    }
}

pub async fn add_health_unit<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
) -> HandlerResult {
    console.say("==== Add health unit ====")?;
    let Some(unit_code) = ask(console, "Health unit code: ", UnitCode::parse)? else {
        return Ok(());
    };
    let unit = HealthUnit {
        unit_code,
        name: console.prompt("Name: ")?,
        phone: console.prompt("Phone: ")?,
        kind: console.prompt("Type: ")?,
        street: console.prompt("Street: ")?,
        number: console.prompt("Number: ")?,
        neighborhood: console.prompt("Neighborhood: ")?,
        postal_code: console.prompt("Postal code: ")?,
    };

    let result = db.health_units().insert(&unit).await;
    report(console, result, "adding health unit")
}

pub async fn update_health_unit<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
) -> HandlerResult {
    let Some(current) = find_unit(db, console, "Code of the health unit to update: ").await? else {
        return Ok(());
    };
    console.say(format!("Health unit found: {} - {}", current.name, current.kind))?;

    let answers = [
        console.prompt(&keep_prompt("name", &current.name))?,
        console.prompt(&keep_prompt("phone", &current.phone))?,
        console.prompt(&keep_prompt("type", &current.kind))?,
        console.prompt(&keep_prompt("street", &current.street))?,
        console.prompt(&keep_prompt("number", &current.number))?,
        console.prompt(&keep_prompt("neighborhood", &current.neighborhood))?,
        console.prompt(&keep_prompt("postal code", &current.postal_code))?,
    ];
    let patch = HealthUnitPatch::from_answers(answers.each_ref().map(String::as_str));
    if patch.is_empty() {
        return console.say("Nothing to change.");
    }

    let result = db.health_units().update(&patch.apply_to(&current)).await;
    report(console, result, "updating health unit")
}

pub async fn delete_health_unit<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
) -> HandlerResult {
    let Some(unit) = find_unit(db, console, "Code of the health unit to delete: ").await? else {
        return Ok(());
    };

    let answer = console.prompt(&format!("Delete health unit {}? (y/n) ", unit.name))?;
    if !confirmed(&answer) {
        return console.say("Operation cancelled.");
    }

    match db.health_units().delete(&unit.unit_code).await {
        Ok(_) => console.say(format!("Health unit {} deleted.", unit.name)),
        Err(err) => console.say(format!("Error deleting health unit: {err}")),
    }
}

// Medications

pub async fn list_medications<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
) -> HandlerResult {
    match db.medications().list().await {
        Ok(medications) if medications.is_empty() => console.say("No medications found."),
        Ok(medications) => Ok(render::medications(console.out(), &medications)?),
        Err(err) => console.say(format!("Error listing medications: {err}")),
    }
}

pub async fn add_medication<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
) -> HandlerResult {
    console.say("==== Add medication ====")?;
    let Some(registration_code) = ask(console, "Registration code: ", RegistrationCode::parse)?
    else {
        return Ok(());
    };
    let medication = Medication {
        registration_code,
        commercial_name: console.prompt("Commercial name: ")?,
        manufacturer: console.prompt("Manufacturer: ")?,
        presentation: console.prompt("Presentation: ")?,
        administration_form: console.prompt("Administration form: ")?,
        active_ingredient: console.prompt("Active ingredient: ")?,
    };

    let result = db.medications().insert(&medication).await;
    report(console, result, "adding medication")
}

pub async fn update_medication<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
) -> HandlerResult {
    let Some(current) =
        find_medication(db, console, "Registration code of the medication to update: ").await?
    else {
        return Ok(());
    };
    console.say(format!(
        "Medication found: {} - {}",
        current.commercial_name, current.manufacturer
    ))?;

    let commercial_name = console.prompt(&keep_prompt("commercial name", &current.commercial_name))?;
    let manufacturer = console.prompt(&keep_prompt("manufacturer", &current.manufacturer))?;
    let presentation = console.prompt(&keep_prompt("presentation", &current.presentation))?;
    let administration_form =
        console.prompt(&keep_prompt("administration form", &current.administration_form))?;
    let active_ingredient =
        console.prompt(&keep_prompt("active ingredient", &current.active_ingredient))?;
    let patch = MedicationPatch::from_answers(
        &commercial_name,
        &manufacturer,
        &presentation,
        &administration_form,
        &active_ingredient,
    );
    if patch.is_empty() {
        return console.say("Nothing to change.");
    }

    let result = db.medications().update(&patch.apply_to(&current)).await;
    report(console, result, "updating medication")
}

pub async fn delete_medication<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
) -> HandlerResult {
    let Some(medication) =
        find_medication(db, console, "Registration code of the medication to delete: ").await?
    else {
        return Ok(());
    };

    let answer = console.prompt(&format!(
        "Delete medication {}? (y/n) ",
        medication.commercial_name
    ))?;
    if !confirmed(&answer) {
        return console.say("Operation cancelled.");
    }

    match db.medications().delete(&medication.registration_code).await {
        Ok(_) => console.say(format!("Medication {} deleted.", medication.commercial_name)),
        Err(err) => console.say(format!("Error deleting medication: {err}")),
    }
}

// Stock

pub async fn list_unit_stock<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
) -> HandlerResult {
    let Some(unit) = find_unit(db, console, "Health unit code: ").await? else {
        return Ok(());
    };
    console.say(format!("Health unit found: {} - {}", unit.name, unit.kind))?;

    match db.stock_lots().list_by_unit(&unit.unit_code).await {
        Ok(lots) if lots.is_empty() => console.say("No medication in stock at this health unit."),
        Ok(lots) => Ok(render::stock_lots(console.out(), &lots)?),
        Err(err) => console.say(format!("Error listing stock: {err}")),
    }
}

/// Add a lot to a unit's stock. Both the unit and the medication must exist
/// before anything is written.
pub async fn add_stock_lot<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
) -> HandlerResult {
    let Some(unit_code) = require_unit(db, console, "Health unit code: ").await? else {
        return Ok(());
    };
    let Some(lot_number) = ask(console, "Lot number: ", LotNumber::parse)? else {
        return Ok(());
    };
    let Some(registration_code) =
        require_medication(db, console, "Registration code: ").await?
    else {
        return Ok(());
    };
    let Some(expiry_date) = ask(console, "Expiry date (YYYY-MM-DD): ", parse_expiry_date)? else {
        return Ok(());
    };
    let Some(quantity) = ask(console, "Quantity: ", parse_quantity)? else {
        return Ok(());
    };

    let lot = StockLot {
        key: StockLotKey {
            lot_number,
            registration_code,
            unit_code,
        },
        expiry_date,
        quantity,
    };

    let result = db.stock_lots().insert(&lot).await;
    report(console, result, "adding medication to stock")
}

pub async fn withdraw_stock<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
) -> HandlerResult {
    let Some(unit_code) = require_unit(db, console, "Health unit code: ").await? else {
        return Ok(());
    };
    let Some(lot_number) = ask(console, "Lot number: ", LotNumber::parse)? else {
        return Ok(());
    };
    let Some(registration_code) = ask(console, "Registration code: ", RegistrationCode::parse)?
    else {
        return Ok(());
    };
    let Some(amount) = ask(console, "Quantity to withdraw: ", parse_quantity)? else {
        return Ok(());
    };

    let key = StockLotKey {
        lot_number,
        registration_code,
        unit_code,
    };

    match db.stock_lots().adjust_quantity(&key, amount).await {
        Ok(lot) => console.say(format!("Stock updated. Remaining quantity: {}", lot.quantity)),
        Err(RepositoryError::NotFound { .. }) => {
            console.say("Medication not found in this health unit's stock.")
        }
        Err(RepositoryError::InsufficientStock {
            available,
            requested,
        }) => console.say(format!(
            "Requested quantity ({requested}) exceeds available stock ({available})."
        )),
        Err(err) => console.say(format!("Error withdrawing stock: {err}")),
    }
}
