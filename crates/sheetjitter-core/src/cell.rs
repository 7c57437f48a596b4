use serde::{Deserialize, Serialize};

/// A single value in a table.
///
/// Only [`Cell::Number`] holding a finite value is considered numeric; the
/// randomizer copies every other cell through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Parse a raw text field as read from a delimited file.
    ///
    /// Non-finite spellings such as `NaN` or `inf` stay text.
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            return Cell::Empty;
        }
        match field.parse::<f64>() {
            Ok(value) if value.is_finite() => Cell::Number(value),
            _ => Cell::Text(field.to_string()),
        }
    }

    /// Render the cell as a text field.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(value) => value.to_string(),
            Cell::Text(value) => value.clone(),
        }
    }

    /// Finite numeric value of the cell, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}
