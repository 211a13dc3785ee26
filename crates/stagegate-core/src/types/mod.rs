//! Type system for stagegate
//!
//! This module contains:
//! - Value types
//! - Parameter data types
//! - Parameter names
//! - Semantic versions used by version-aware conditions

pub mod name;
pub mod schema;
pub mod value;
pub mod version;

pub use name::ParamName;
pub use schema::DataType;
pub use value::Value;
pub use version::SemanticVersion;
