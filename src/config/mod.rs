//! Field-cleaner descriptors and their TOML loader.

mod cleaner;
pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{FieldCleaner, ValidationError, ValidationIssue};
