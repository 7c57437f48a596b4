//! Core contracts for sheetjitter.
//!
//! This crate defines the cell and table types shared by the randomizer and
//! the CLI, plus the shape checks every run performs before touching data.

pub mod cell;
pub mod error;
pub mod table;
pub mod validation;

pub use cell::Cell;
pub use error::{Error, Result};
pub use table::Table;
pub use validation::validate_table;
