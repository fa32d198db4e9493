//! `pharmastock-console` — operator console over the medication supply store.
//!
//! A numbered menu loop: read a selection token, route it to a handler, let the
//! handler prompt for its fields and call the repositories, print the outcome.

pub mod console;
pub mod handlers;
pub mod menu;
pub mod render;

pub use console::{Console, ConsoleError};
pub use menu::{InvalidSelection, MenuOption, run};
