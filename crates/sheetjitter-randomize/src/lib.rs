//! Heuristic randomization of campaign statistics sheets.
//!
//! This crate reads a header + data table from a [`store::TableStore`],
//! rewrites the numeric cells of a column range with per-header rules and
//! writes the whole table back in one call.

pub mod engine;
pub mod errors;
pub mod model;
pub mod rules;
pub mod store;

pub use engine::{Randomized, TableRandomizer};
pub use errors::{RandomizeError, StoreError};
pub use model::{ColumnBound, ColumnRange, DeliveredCap, RandomizeOptions, RandomizeReport};
pub use rules::{RuleCategory, RuleTable};
pub use store::{CsvStore, MemoryStore, TableStore};
