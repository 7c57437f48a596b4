use serde::{Deserialize, Serialize};

use crate::cell::Cell;

/// Rectangular grid of cells where row 0 is the header row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a table from a header row and data rows.
    pub fn with_header(header: Vec<Cell>, data: Vec<Vec<Cell>>) -> Self {
        let mut rows = Vec::with_capacity(data.len() + 1);
        rows.push(header);
        rows.extend(data);
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }

    pub fn header(&self) -> Option<&[Cell]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Header cells rendered as column names.
    pub fn column_names(&self) -> Vec<String> {
        self.header()
            .map(|header| header.iter().map(Cell::to_field).collect())
            .unwrap_or_default()
    }

    /// Index of the first column whose header matches `name` exactly.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header()?
            .iter()
            .position(|cell| cell.to_field() == name)
    }

    pub fn data_rows(&self) -> &[Vec<Cell>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Number of columns, taken from the header row.
    pub fn width(&self) -> usize {
        self.header().map(<[Cell]>::len).unwrap_or(0)
    }

    /// Row count (header included) and column count.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.width())
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::with_header(
            vec!["ID".into(), "Sent".into(), "Delivered".into()],
            vec![vec![1_i64.into(), 1000_i64.into(), 950_i64.into()]],
        )
    }

    #[test]
    fn reports_dimensions_from_header() {
        let table = sample();
        assert_eq!(table.dimensions(), (2, 3));
        assert_eq!(table.data_rows().len(), 1);
    }

    #[test]
    fn looks_up_columns_by_exact_name() {
        let table = sample();
        assert_eq!(table.column_index("Delivered"), Some(2));
        assert_eq!(table.column_index("delivered"), None);
    }

    #[test]
    fn empty_table_has_no_header() {
        let table = Table::default();
        assert!(table.header().is_none());
        assert!(table.data_rows().is_empty());
        assert_eq!(table.dimensions(), (0, 0));
    }
}
