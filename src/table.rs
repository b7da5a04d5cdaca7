use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::value::Value;

/// Column definition in the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    /// Maximum length, only meaningful for [DataType::Varchar] columns.
    /// `None` means unbounded text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

/// The ordered column definitions of a table, fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<ColumnDef>,
}

/// A single row, mapping column names to their values.
///
/// A row may omit declared columns (INSERT with a column subset), but never
/// carries a column the schema does not declare.
pub type Row = HashMap<String, Value>;

/// A named, schema-validated row container.
///
/// The serialized form is the on-disk persistence record:
/// `{ name, columns: [{ name, data_type, size? }], rows: [{ col: value }] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(flatten)]
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: String, schema: Schema) -> Self {
        Self {
            name,
            schema,
            rows: vec![],
        }
    }

    /// The declared column names, in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.columns.iter().map(|col| col.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.columns.iter().any(|col| col.name == name)
    }

    /// Validates that a row conforms to the table schema.
    ///
    /// Checks, stopping at the first violation:
    /// - every key in the row names a declared column,
    /// - for each declared column present in the row, the value's kind
    ///   matches the declared type,
    /// - VARCHAR values respect the declared maximum length.
    pub fn validate_row(&self, row: &Row) -> Result<()> {
        for key in row.keys() {
            if !self.has_column(key) {
                return Err(Error::ColumnNotFound {
                    column: key.clone(),
                    table: self.name.clone(),
                });
            }
        }

        for col in &self.schema.columns {
            let Some(value) = row.get(&col.name) else {
                continue;
            };

            if value.data_type() != Some(col.data_type) {
                return Err(Error::TypeMismatch {
                    column: col.name.clone(),
                    expected: col.data_type,
                    found: value.kind_name(),
                });
            }

            if let (Some(size), Some(text)) = (col.size, value.as_str()) {
                if text.chars().count() > size {
                    return Err(Error::LengthExceeded {
                        column: col.name.clone(),
                        size,
                    });
                }
            }
        }

        Ok(())
    }

    /// Validates a row, then appends it.
    ///
    /// A row failing validation is never appended: the row sequence is
    /// untouched on error.
    pub fn insert(&mut self, row: Row) -> Result<()> {
        self.validate_row(&row)?;
        self.rows.push(row);
        Ok(())
    }
}
