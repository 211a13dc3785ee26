//! stagegate Parser - YAML documents to stagegate model types
//!
//! This crate parses the two document kinds administrators author by hand:
//! - parameter definitions (one or more per file), including the `when:`
//!   shorthand for rules
//! - stage lists, the per-stage declaration of every parameter name

pub mod error;
pub mod parameter_parser;
pub mod stage_list_parser;
pub mod yaml_parser;

// Re-export main parser types
pub use error::{ParseError, Result};
pub use parameter_parser::ParameterParser;
pub use stage_list_parser::StageListParser;
pub use yaml_parser::YamlParser;
