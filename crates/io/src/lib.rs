// File I/O operations

pub mod roster;
pub mod sheet;

pub use roster::{FileRoster, RosterError, RosterProvider};
pub use sheet::{CheckinSheet, SheetError};
