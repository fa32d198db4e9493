//! Scripted operator sessions against an in-memory store.

use pharmastock_console::{Console, run};
use pharmastock_core::{LotNumber, RegistrationCode, UnitCode};
use pharmastock_infra::Database;
use pharmastock_supply::StockLotKey;

const ADD_PARACETAMOL: &str = "6\nA1\nParacetamol\nEMS\n500mg x 20\nOral\nParacetamol\n";
const ADD_UNIT_U1: &str = "2\nU1\nUBS Centro\n3333-0000\nUBS\nRua A\n10\nCentro\n70000-000\n";
const ADD_LOT_L1: &str = "10\nU1\nL1\nA1\n2025-01-01\n100\n";

async fn store() -> Database {
    Database::in_memory().await.expect("in-memory store")
}

/// Run one console session over `script` and return everything printed.
async fn session(db: &Database, script: &str) -> String {
    let mut console = Console::new(script.as_bytes(), Vec::new());
    run(db, &mut console).await.expect("console session");
    String::from_utf8(console.into_output()).expect("utf-8 output")
}

fn lot_key() -> StockLotKey {
    StockLotKey {
        lot_number: LotNumber::parse("L1").unwrap(),
        registration_code: RegistrationCode::parse("A1").unwrap(),
        unit_code: UnitCode::parse("U1").unwrap(),
    }
}

/// Cells of the first table row whose first cell is `first`.
fn row_cells<'a>(output: &'a str, first: &str) -> Option<Vec<&'a str>> {
    output
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|cells| cells.first() == Some(&first))
}

#[tokio::test]
async fn end_to_end_stock_scenario() {
    let db = store().await;
    let script = format!("{ADD_PARACETAMOL}{ADD_UNIT_U1}{ADD_LOT_L1}11\nU1\nL1\nA1\n30\n9\nU1\n0\n");

    let out = session(&db, &script).await;

    assert!(out.contains("Medication added."));
    assert!(out.contains("Health unit added."));
    assert!(out.contains("Medication added to stock."));
    assert!(out.contains("Remaining quantity: 70"));

    let cells = row_cells(&out, "L1").expect("stock row for L1");
    assert_eq!(cells, vec!["L1", "A1", "U1", "01/01/2025", "70"]);

    let stock = db
        .stock_lots()
        .list_by_unit(&UnitCode::parse("U1").unwrap())
        .await
        .unwrap();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0].quantity, 70);
}

#[tokio::test]
async fn invalid_option_redisplays_menu() {
    let db = store().await;
    let out = session(&db, "42\n0\n").await;

    assert!(out.contains("Invalid option. Try again."));
    assert_eq!(out.matches("Main menu:").count(), 2);
    assert!(out.trim_end().ends_with("Exiting..."));
}

#[tokio::test]
async fn end_of_input_exits_cleanly() {
    let db = store().await;
    let out = session(&db, "").await;
    assert!(out.trim_end().ends_with("Exiting..."));
}

#[tokio::test]
async fn end_of_input_mid_handler_exits_without_writing() {
    let db = store().await;
    let out = session(&db, "2\nU1\nUBS Centro\n").await;

    assert!(out.trim_end().ends_with("Exiting..."));
    assert!(db.health_units().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_lists_say_nothing_found() {
    let db = store().await;
    let out = session(&db, "1\n5\n0\n").await;

    assert!(out.contains("No health units found."));
    assert!(out.contains("No medications found."));
}

#[tokio::test]
async fn stock_for_unknown_unit_is_rejected_before_any_write() {
    let db = store().await;
    session(&db, ADD_PARACETAMOL).await;

    let out = session(&db, "10\nU404\n0\n").await;

    assert!(out.contains("Health unit not found."));
    assert!(!out.contains("Lot number:"));
    assert!(db.stock_lots().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn stock_for_unknown_medication_is_rejected_before_any_write() {
    let db = store().await;
    session(&db, ADD_UNIT_U1).await;

    let out = session(&db, "10\nU1\nL1\nX404\n0\n").await;

    assert!(out.contains("Medication not found."));
    assert!(!out.contains("Expiry date"));
    assert!(db.stock_lots().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_quantity_aborts_stock_insert() {
    let db = store().await;
    session(&db, &format!("{ADD_PARACETAMOL}{ADD_UNIT_U1}")).await;

    let out = session(&db, "10\nU1\nL1\nA1\n2025-01-01\n-3\n0\n").await;

    assert!(out.contains("Invalid value"));
    assert!(db.stock_lots().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_with_blank_answers_keeps_previous_values() {
    let db = store().await;
    session(&db, ADD_UNIT_U1).await;

    let out = session(&db, "3\nU1\nHospital Regional\n\n\n  \n\n\n70999-000\n0\n").await;

    assert!(out.contains("Health unit found: UBS Centro - UBS"));
    assert!(out.contains("blank keeps '3333-0000'"));
    assert!(out.contains("Health unit updated."));

    let unit = db
        .health_units()
        .get(&UnitCode::parse("U1").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unit.name, "Hospital Regional");
    assert_eq!(unit.phone, "3333-0000");
    assert_eq!(unit.kind, "UBS");
    assert_eq!(unit.street, "Rua A");
    assert_eq!(unit.number, "10");
    assert_eq!(unit.neighborhood, "Centro");
    assert_eq!(unit.postal_code, "70999-000");
}

#[tokio::test]
async fn update_of_unknown_medication_reports_not_found() {
    let db = store().await;
    let out = session(&db, "7\nZZ\n0\n").await;
    assert!(out.contains("Medication not found."));
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let db = store().await;
    session(&db, ADD_PARACETAMOL).await;
    let code = RegistrationCode::parse("A1").unwrap();

    let out = session(&db, "8\nA1\nn\n0\n").await;
    assert!(out.contains("Operation cancelled."));
    assert!(db.medications().exists(&code).await.unwrap());

    let out = session(&db, "8\nA1\ny\n0\n").await;
    assert!(out.contains("Medication Paracetamol deleted."));
    assert_eq!(db.medications().get(&code).await.unwrap(), None);
}

#[tokio::test]
async fn deleting_unit_with_stock_reports_constraint_violation() {
    let db = store().await;
    session(&db, &format!("{ADD_PARACETAMOL}{ADD_UNIT_U1}{ADD_LOT_L1}")).await;

    let out = session(&db, "4\nU1\ns\n0\n").await;

    assert!(out.contains("Error deleting health unit: constraint violation"));
    assert!(
        db.health_units()
            .exists(&UnitCode::parse("U1").unwrap())
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn duplicate_unit_reports_error_and_menu_continues() {
    let db = store().await;
    let out = session(&db, &format!("{ADD_UNIT_U1}{ADD_UNIT_U1}1\n0\n")).await;

    assert!(out.contains("Error adding health unit: constraint violation"));
    assert!(row_cells(&out, "U1").is_some());
    assert_eq!(db.health_units().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn withdrawal_beyond_stock_is_refused() {
    let db = store().await;
    session(&db, &format!("{ADD_PARACETAMOL}{ADD_UNIT_U1}{ADD_LOT_L1}")).await;

    let out = session(&db, "11\nU1\nL1\nA1\n101\n0\n").await;

    assert!(out.contains("Requested quantity (101) exceeds available stock (100)."));
    let lot = db.stock_lots().get(&lot_key()).await.unwrap().unwrap();
    assert_eq!(lot.quantity, 100);
}

#[tokio::test]
async fn withdrawal_from_unknown_lot_reports_not_in_stock() {
    let db = store().await;
    session(&db, &format!("{ADD_PARACETAMOL}{ADD_UNIT_U1}")).await;

    let out = session(&db, "11\nU1\nL9\nA1\n1\n0\n").await;

    assert!(out.contains("Medication not found in this health unit's stock."));
}

#[tokio::test]
async fn all_blank_update_writes_nothing() {
    let db = store().await;
    session(&db, ADD_PARACETAMOL).await;

    let out = session(&db, "7\nA1\n\n\n\n\n\n0\n").await;

    assert!(out.contains("Nothing to change."));
    assert!(!out.contains("Medication updated."));
    let med = db
        .medications()
        .get(&RegistrationCode::parse("A1").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(med.commercial_name, "Paracetamol");
}

#[tokio::test]
async fn non_utf8_input_does_not_end_the_session() {
    let db = store().await;
    let mut console = Console::new(&b"\xff\xfe\n1\n0\n"[..], Vec::new());

    let result = run(&db, &mut console).await;

    assert!(result.is_ok());
    let out = String::from_utf8(console.into_output()).unwrap();
    assert!(out.contains("Invalid option. Try again."));
    assert!(out.contains("No health units found."));
    assert!(out.trim_end().ends_with("Exiting..."));
}
