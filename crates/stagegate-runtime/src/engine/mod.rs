//! Evaluation engine
//!
//! Leaf-first: the condition matcher compares one attribute against one
//! condition, the filter evaluator ORs conditions, and the resolver ANDs filters
//! per rule and picks the first matching rule.

pub mod filter;
pub mod matcher;
pub mod resolver;

pub use filter::filter_matches;
pub use resolver::{evaluate, matching_rule, resolve, Evaluation};
