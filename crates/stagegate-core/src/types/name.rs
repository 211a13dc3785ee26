//! Parameter names
//!
//! A `ParamName` is an opaque, validated identifier. Names start with an ASCII
//! letter and may contain ASCII letters, digits, `_`, `-` and `.`.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Globally unique, immutable parameter identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParamName(String);

impl ParamName {
    /// Maximum accepted name length
    pub const MAX_LEN: usize = 128;

    /// Validate and wrap a name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn check(name: &str) -> Result<()> {
        let invalid = |reason: &str| CoreError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let mut chars = name.chars();
        match chars.next() {
            None => return Err(invalid("name is empty")),
            Some(c) if !c.is_ascii_alphabetic() => {
                return Err(invalid("name must start with an ASCII letter"))
            }
            Some(_) => {}
        }

        if name.len() > Self::MAX_LEN {
            return Err(invalid("name is longer than 128 characters"));
        }

        if let Some(c) = chars.find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))) {
            return Err(invalid(&format!("character '{}' is not allowed", c)));
        }

        Ok(())
    }
}

impl TryFrom<String> for ParamName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ParamName> for String {
    fn from(name: ParamName) -> Self {
        name.0
    }
}

impl FromStr for ParamName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParamName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ParamName {
    fn borrow(&self) -> &str {
        &self.0
    }
}
