use crate::error::{Error, Result};
use crate::table::Table;

/// Validate that a table is rectangular and has a header row.
///
/// Row indexes in error messages are 0-based with the header at row 0.
pub fn validate_table(table: &Table) -> Result<()> {
    let Some(header) = table.header() else {
        return Err(Error::MalformedTable("missing header row".to_string()));
    };
    if header.is_empty() {
        return Err(Error::MalformedTable("header row has no columns".to_string()));
    }

    let width = header.len();
    for (offset, row) in table.data_rows().iter().enumerate() {
        if row.len() != width {
            return Err(Error::MalformedTable(format!(
                "row {} has {} columns, header has {}",
                offset + 1,
                row.len(),
                width
            )));
        }
    }

    Ok(())
}
