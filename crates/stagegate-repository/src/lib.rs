//! Persistence layer for stagegate
//!
//! This crate provides the [`ParameterStore`] contract the engine persists
//! through, and its backends:
//!
//! - **File system**: YAML definitions and JSON-lines audit logs on disk
//! - **Memory**: in-process store with failure injection for tests
//! - **PostgreSQL** (feature `postgres`): one row per parameter plus an audit table
//!
//! # Quick Start
//!
//! ```no_run
//! use stagegate_repository::{FileSystemStore, ParameterStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileSystemStore::create("data").await?;
//!     for definition in store.load_all_parameters().await? {
//!         println!("{} ({})", definition.name, definition.stage);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod file_system;
pub mod memory;
pub mod traits;

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-exports - Configuration
pub use config::{ConfigError, RepositoryConfig, RepositorySource};

// Re-exports - Error
pub use error::{RepositoryError, RepositoryResult};

// Re-exports - Stores
pub use file_system::FileSystemStore;
pub use memory::MemoryStore;
pub use traits::ParameterStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
