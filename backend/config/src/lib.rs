//! bibtag run configuration.
//!
//! Built once at process start (defaults, then an optional YAML file, then
//! environment variables) and passed down read-only.

pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use env::{resolve_env_vars, resolve_env_vars_with};
pub use io::{default_config_path, load_config};
pub use schema::{Config, DestinationDirs, OcrSettings, OllamaSettings, OpenAiSettings};
pub use validation::{validate, ConfigValidationError, ValidationReport};
