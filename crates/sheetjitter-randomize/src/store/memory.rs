use sheetjitter_core::Table;

use crate::errors::StoreError;
use crate::store::TableStore;

/// In-memory grid, mostly useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    table: Table,
    writes: usize,
}

impl MemoryStore {
    pub fn new(table: Table) -> Self {
        Self { table, writes: 0 }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    /// Number of completed `write_all` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl TableStore for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn read_all(&mut self) -> Result<Table, StoreError> {
        Ok(self.table.clone())
    }

    fn write_all(&mut self, table: &Table) -> Result<(), StoreError> {
        self.table = table.clone();
        self.writes += 1;
        Ok(())
    }
}
