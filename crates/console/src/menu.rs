//! Selection tokens and the dispatch loop.

use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::debug;

use pharmastock_infra::Database;

use crate::console::{Console, ConsoleError};
use crate::handlers;

/// An operator's token did not name any menu entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid option '{0}'")]
pub struct InvalidSelection(pub String);

/// Every entry of the main menu, in display order (exit last).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MenuOption {
    ListHealthUnits,
    AddHealthUnit,
    UpdateHealthUnit,
    DeleteHealthUnit,
    ListMedications,
    AddMedication,
    UpdateMedication,
    DeleteMedication,
    ListUnitStock,
    AddStockLot,
    WithdrawStock,
    Exit,
}

impl MenuOption {
    pub const ALL: [MenuOption; 12] = [
        MenuOption::ListHealthUnits,
        MenuOption::AddHealthUnit,
        MenuOption::UpdateHealthUnit,
        MenuOption::DeleteHealthUnit,
        MenuOption::ListMedications,
        MenuOption::AddMedication,
        MenuOption::UpdateMedication,
        MenuOption::DeleteMedication,
        MenuOption::ListUnitStock,
        MenuOption::AddStockLot,
        MenuOption::WithdrawStock,
        MenuOption::Exit,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            MenuOption::ListHealthUnits => "1",
            MenuOption::AddHealthUnit => "2",
            MenuOption::UpdateHealthUnit => "3",
            MenuOption::DeleteHealthUnit => "4",
            MenuOption::ListMedications => "5",
            MenuOption::AddMedication => "6",
            MenuOption::UpdateMedication => "7",
            MenuOption::DeleteMedication => "8",
            MenuOption::ListUnitStock => "9",
            MenuOption::AddStockLot => "10",
            MenuOption::WithdrawStock => "11",
            MenuOption::Exit => "0",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuOption::ListHealthUnits => "List health units",
            MenuOption::AddHealthUnit => "Add health unit",
            MenuOption::UpdateHealthUnit => "Update health unit",
            MenuOption::DeleteHealthUnit => "Delete health unit",
            MenuOption::ListMedications => "List medications",
            MenuOption::AddMedication => "Add medication",
            MenuOption::UpdateMedication => "Update medication",
            MenuOption::DeleteMedication => "Delete medication",
            MenuOption::ListUnitStock => "List stock of a health unit",
            MenuOption::AddStockLot => "Add medication lot to a health unit's stock",
            MenuOption::WithdrawStock => "Withdraw medication from a health unit's stock",
            MenuOption::Exit => "Exit",
        }
    }

    /// Resolve an operator token (surrounding whitespace ignored).
    pub fn from_token(token: &str) -> Result<MenuOption, InvalidSelection> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|option| option.token() == token)
            .ok_or_else(|| InvalidSelection(token.to_string()))
    }
}

fn print_menu<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<(), ConsoleError> {
    console.say("")?;
    console.say("Main menu:")?;
    for option in MenuOption::ALL {
        console.say(format!("{}. {}", option.token(), option.label()))?;
    }
    console.say("")
}

/// Route one selection to its handler.
pub async fn dispatch<R: BufRead, W: Write>(
    option: MenuOption,
    db: &Database,
    console: &mut Console<R, W>,
) -> Result<(), ConsoleError> {
    debug!(?option, "dispatching menu option");
    match option {
        MenuOption::ListHealthUnits => handlers::list_health_units(db, console).await,
        MenuOption::AddHealthUnit => handlers::add_health_unit(db, console).await,
        MenuOption::UpdateHealthUnit => handlers::update_health_unit(db, console).await,
        MenuOption::DeleteHealthUnit => handlers::delete_health_unit(db, console).await,
        MenuOption::ListMedications => handlers::list_medications(db, console).await,
        MenuOption::AddMedication => handlers::add_medication(db, console).await,
        MenuOption::UpdateMedication => handlers::update_medication(db, console).await,
        MenuOption::DeleteMedication => handlers::delete_medication(db, console).await,
        MenuOption::ListUnitStock => handlers::list_unit_stock(db, console).await,
        MenuOption::AddStockLot => handlers::add_stock_lot(db, console).await,
        MenuOption::WithdrawStock => handlers::withdraw_stock(db, console).await,
        MenuOption::Exit => Ok(()),
    }
}

/// Run the menu loop until the exit token or end of input.
///
/// Only console I/O failures escape; store and input problems are reported
/// to the operator and the menu is shown again.
pub async fn run<R: BufRead, W: Write>(
    db: &Database,
    console: &mut Console<R, W>,
) -> Result<(), ConsoleError> {
    loop {
        print_menu(console)?;

        let choice = match console.prompt("Choose an option: ") {
            Ok(choice) => choice,
            Err(ConsoleError::InputClosed) => break,
            Err(err) => return Err(err),
        };
        console.say("")?;

        match MenuOption::from_token(&choice) {
            Ok(MenuOption::Exit) => break,
            Ok(option) => match dispatch(option, db, console).await {
                Ok(()) => {}
                Err(ConsoleError::InputClosed) => break,
                Err(err) => return Err(err),
            },
            Err(InvalidSelection(token)) => {
                debug!(%token, "invalid menu selection");
                console.say("Invalid option. Try again.")?;
            }
        }
    }

    console.say("Exiting...")
}
