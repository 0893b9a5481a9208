//! Worksheet summary data.
//!
//! Mirrors the shape the dashboard host returns for a worksheet: column
//! metadata (field name and position) plus rows of cells addressed by that
//! position.

use serde::{Deserialize, Serialize};

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub field_name: String,
    /// Position of this column's cell within each row.
    pub index: usize,
}

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_value: Option<String>,
}

impl Cell {
    /// Cell holding a string value.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: serde_json::Value::String(value.into()),
            formatted_value: None,
        }
    }

    /// The cell rendered as text. Strings are used verbatim, null is empty,
    /// other scalars use their JSON text.
    #[must_use]
    pub fn as_text(&self) -> String {
        match &self.value {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Summary data of one worksheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataTable {
    /// Worksheet name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub data: Vec<Vec<Cell>>,
}

impl DataTable {
    /// Position of the column with exactly this field name (case-sensitive).
    #[must_use]
    pub fn column_index(&self, field_name: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|column| column.field_name == field_name)
            .map(|column| column.index)
    }

    /// Text of a cell, or empty when the row is too short.
    #[must_use]
    pub fn cell_text(row: &[Cell], index: usize) -> String {
        row.get(index).map(Cell::as_text).unwrap_or_default()
    }

    /// Build a table from field names and string rows, assigning column
    /// positions in order.
    #[must_use]
    pub fn from_rows(name: &str, fields: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            name: name.to_string(),
            columns: fields
                .iter()
                .enumerate()
                .map(|(index, field)| Column {
                    field_name: (*field).to_string(),
                    index,
                })
                .collect(),
            data: rows
                .iter()
                .map(|row| row.iter().map(|cell| Cell::text(*cell)).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_column_index_is_exact_match() {
        let table = DataTable::from_rows("Users", &["name", "fullName"], &[]);
        assert_eq!(table.column_index("fullName"), Some(1));
        assert_eq!(table.column_index("fullname"), None);
        assert_eq!(table.column_index("Name"), None);
    }

    #[test]
    fn test_cell_text_renders_scalars() {
        let row = vec![
            Cell::text("a"),
            Cell {
                value: json!(42),
                formatted_value: Some("42".to_string()),
            },
            Cell {
                value: json!(null),
                formatted_value: None,
            },
            Cell {
                value: json!(true),
                formatted_value: None,
            },
        ];
        assert_eq!(DataTable::cell_text(&row, 0), "a");
        assert_eq!(DataTable::cell_text(&row, 1), "42");
        assert_eq!(DataTable::cell_text(&row, 2), "");
        assert_eq!(DataTable::cell_text(&row, 3), "true");
        assert_eq!(DataTable::cell_text(&row, 9), "");
    }

    #[test]
    fn test_deserializes_host_shape() {
        let table: DataTable = serde_json::from_value(json!({
            "name": "New Hires",
            "columns": [
                {"fieldName": "siteRole", "index": 1},
                {"fieldName": "name", "index": 0}
            ],
            "data": [[{"value": "a@example.com", "formattedValue": "a@example.com"}, {"value": "Viewer"}]]
        }))
        .unwrap();
        assert_eq!(table.column_index("siteRole"), Some(1));
        assert_eq!(DataTable::cell_text(&table.data[0], 1), "Viewer");
    }
}
