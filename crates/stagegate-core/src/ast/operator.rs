//! Condition operators

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    // Equality operators
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Ne,

    // Ordering operators (versions and numbers)
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,

    // Membership operators
    /// In (attribute is one of the operands)
    In,
    /// Not in
    NotIn,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Ge,
        Operator::Lt,
        Operator::Le,
        Operator::In,
        Operator::NotIn,
    ];

    /// Returns true if this is an equality operator
    pub fn is_equality(&self) -> bool {
        matches!(self, Operator::Eq | Operator::Ne)
    }

    /// Returns true if this operator needs an ordered attribute type
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le
        )
    }

    /// Returns true if this is a set-membership operator
    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    /// Returns true if the operator takes `count` operands
    ///
    /// Membership operators take one or more operands, all others exactly one.
    pub fn accepts_operand_count(&self, count: usize) -> bool {
        if self.is_membership() {
            count >= 1
        } else {
            count == 1
        }
    }

    /// Canonical name used in stored documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::In => "in",
            Operator::NotIn => "not_in",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let op = match s.trim().to_ascii_lowercase().as_str() {
            "eq" | "=" | "==" => Operator::Eq,
            "ne" | "!=" | "<>" => Operator::Ne,
            "gt" | ">" => Operator::Gt,
            "ge" | "gte" | ">=" => Operator::Ge,
            "lt" | "<" => Operator::Lt,
            "le" | "lte" | "<=" => Operator::Le,
            "in" => Operator::In,
            "not_in" | "not in" | "nin" => Operator::NotIn,
            _ => return Err(CoreError::UnknownOperator(s.to_string())),
        };
        Ok(op)
    }
}
