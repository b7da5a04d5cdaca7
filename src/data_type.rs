use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents the supported data types in the database schema.
/// These types define the structure of columns and the expected format of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// A 64-bit signed integer.
    #[serde(rename = "INT")]
    Int,
    /// A variable-length UTF-8 character string, optionally bounded in length.
    #[serde(rename = "VARCHAR")]
    Varchar,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "INT"),
            Self::Varchar => write!(f, "VARCHAR"),
        }
    }
}
