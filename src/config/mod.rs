//! Configuration
//!
//! A `.env` file backed by a fixed registry of keys:
//!
//! - Missing keys are appended as commented templates
//! - Process environment values override the file
//! - Token updates are written back without disturbing unrelated lines

mod env_file;
mod errors;
mod loader;
mod registry;

pub use env_file::{bootstrap_env_file, parse_env, read_env_file, upsert_env_values};
pub use errors::{ConfigError, ConfigResult};
pub use loader::{Config, ConfigLoader};
pub use registry::{
    lookup, required_names, ConfigVar, CONFIG_REGISTRY, DA_ACCESS_TOKEN, DA_CACHE_DIR,
    DA_CLIENT_ID, DA_CLIENT_SECRET, DA_OAUTH_SCOPE, DA_REDIRECT_URI, DA_REFRESH_TOKEN,
};
