//! Tabular stores the randomizer reads from and writes back to.

pub mod csv;
pub mod memory;

pub use self::csv::CsvStore;
pub use self::memory::MemoryStore;

use sheetjitter_core::Table;

use crate::errors::StoreError;

/// Whole-grid access to an external table, row 0 being the header.
pub trait TableStore {
    /// Short human-readable location, used in logs.
    fn describe(&self) -> String;

    fn read_all(&mut self) -> Result<Table, StoreError>;

    /// Replace the stored table with `table` in a single write.
    fn write_all(&mut self, table: &Table) -> Result<(), StoreError>;
}
