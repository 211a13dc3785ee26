//! Runtime value types for stagegate
//!
//! The `Value` enum represents parameter defaults, rule payloads, condition
//! operands and context attributes. It mirrors JSON values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Runtime value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (f64 for simplicity, handles both int and float)
    Number(f64),
    /// String value
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Object (key-value map)
    Object(HashMap<String, Value>),
}

impl Value {
    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(map) => write!(f, "{{object with {} keys}}", map.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_bool() {
        let val_true = Value::Bool(true);
        let val_false = Value::Bool(false);

        assert_eq!(val_true, Value::Bool(true));
        assert_ne!(val_true, val_false);
        assert_eq!(val_true.as_bool(), Some(true));
        assert_eq!(Value::from("x").as_bool(), None);
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(true).type_name(), "bool");
        assert_eq!(Value::from(1.5).type_name(), "number");
        assert_eq!(Value::from("a").type_name(), "string");
        assert_eq!(Value::Array(vec![]).type_name(), "array");
    }

    #[test]
    fn test_value_from_json() {
        let json = serde_json::json!({"enabled": true, "count": 3, "tags": ["a", null]});
        let value = Value::from(json);

        match value {
            Value::Object(map) => {
                assert_eq!(map.get("enabled"), Some(&Value::Bool(true)));
                assert_eq!(map.get("count"), Some(&Value::Number(3.0)));
                assert_eq!(
                    map.get("tags"),
                    Some(&Value::Array(vec![Value::from("a"), Value::Null]))
                );
            }
            _ => panic!("Expected Object"),
        }
    }

    #[test]
    fn test_value_serde_json() {
        let val = Value::Array(vec![Value::from("dev"), Value::from(2.0), Value::Bool(false)]);

        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, r#"["dev",2.0,false]"#);

        let deserialized: Value = serde_json::from_str(r#"["dev",2,false]"#).unwrap();
        assert_eq!(val, deserialized);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("on").to_string(), "\"on\"");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(
            Value::Array(vec![Value::from(1.0), Value::Null]).to_string(),
            "[1, null]"
        );
    }
}
