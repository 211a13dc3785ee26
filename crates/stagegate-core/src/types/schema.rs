//! Parameter data types
//!
//! Every parameter declares the type of its default value and of every rule's
//! `value_when_matched` payload.

use crate::error::{CoreError, Result};
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared data type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Boolean on/off gate
    #[serde(alias = "boolean")]
    Bool,

    /// String payload
    String,

    /// Number payload (int or float)
    Number,
}

impl DataType {
    /// Returns true if the value is a well-formed payload for this type
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (DataType::Bool, Value::Bool(_))
                | (DataType::String, Value::String(_))
                | (DataType::Number, Value::Number(_))
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::String => "string",
            DataType::Number => "number",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(DataType::Bool),
            "string" => Ok(DataType::String),
            "number" => Ok(DataType::Number),
            _ => Err(CoreError::UnknownDataType(s.to_string())),
        }
    }
}
