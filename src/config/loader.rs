//! Resolved configuration
//!
//! Values come from the `.env` file, overridden by the process environment.
//! Only the CLI layer builds a `Config`; everything below it receives the
//! value explicitly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::env_file::{bootstrap_env_file, read_env_file, upsert_env_values};
use super::errors::{ConfigError, ConfigResult};
use super::registry::{
    required_names, CONFIG_REGISTRY, DA_ACCESS_TOKEN, DA_CACHE_DIR, DA_CLIENT_ID,
    DA_CLIENT_SECRET, DA_OAUTH_SCOPE, DA_REDIRECT_URI, DA_REFRESH_TOKEN,
};
use crate::observability::{log_event_with_fields, Event};

/// Builds a `Config` from a `.env` path plus overrides
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_path: PathBuf,
    overrides: BTreeMap<String, String>,
}

impl ConfigLoader {
    pub fn new(env_path: impl Into<PathBuf>) -> Self {
        Self {
            env_path: env_path.into(),
            overrides: BTreeMap::new(),
        }
    }

    /// Take registry keys set in the process environment
    pub fn with_process_env(mut self) -> Self {
        for var in CONFIG_REGISTRY {
            if let Ok(value) = std::env::var(var.name) {
                self.overrides.insert(var.name.to_string(), value);
            }
        }
        self
    }

    /// Override a single key
    pub fn with_override(mut self, name: &str, value: impl Into<String>) -> Self {
        self.overrides.insert(name.to_string(), value.into());
        self
    }

    pub fn env_path(&self) -> &Path {
        &self.env_path
    }

    fn resolve(&self) -> ConfigResult<(Vec<String>, Config)> {
        let added = bootstrap_env_file(&self.env_path)?;
        let file = read_env_file(&self.env_path)?;

        let mut values = BTreeMap::new();
        for var in CONFIG_REGISTRY {
            let from_env = self
                .overrides
                .get(var.name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty());
            let value = from_env
                .or_else(|| file.get(var.name).map(|v| v.trim()))
                .unwrap_or("");
            values.insert(var.name, value.to_string());
        }

        let path = self.env_path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", &path)]);

        Ok((
            added,
            Config {
                env_path: self.env_path.clone(),
                values,
            },
        ))
    }

    /// Load without checking required keys
    pub fn load(&self) -> ConfigResult<Config> {
        self.resolve().map(|(_, config)| config)
    }

    /// Load and fail with every missing name in `names`
    pub fn require(&self, names: &[&str]) -> ConfigResult<Config> {
        let (added, config) = self.resolve()?;
        let missing: Vec<String> = names
            .iter()
            .filter(|name| config.get(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Incomplete {
                path: self.env_path.clone(),
                missing,
                added,
            });
        }
        Ok(config)
    }

    /// Load and require every required registry key
    pub fn load_validated(&self) -> ConfigResult<Config> {
        self.require(&required_names())
    }
}

/// Resolved configuration values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    env_path: PathBuf,
    values: BTreeMap<&'static str, String>,
}

impl Config {
    /// Non-empty value of a registry key
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn env_path(&self) -> &Path {
        &self.env_path
    }

    pub fn client_id(&self) -> Option<&str> {
        self.get(DA_CLIENT_ID)
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.get(DA_CLIENT_SECRET)
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.get(DA_REDIRECT_URI)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.get(DA_ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.get(DA_REFRESH_TOKEN)
    }

    pub fn oauth_scope(&self) -> Option<&str> {
        self.get(DA_OAUTH_SCOPE)
    }

    /// Whether a rejected access token can be refreshed
    pub fn can_refresh(&self) -> bool {
        self.client_id().is_some() && self.client_secret().is_some() && self.refresh_token().is_some()
    }

    /// `DA_CACHE_DIR`, else the platform cache dir, else `.cache/da-story-edit`
    pub fn cache_dir(&self) -> PathBuf {
        match self.get(DA_CACHE_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::cache_dir()
                .map(|dir| dir.join("da-story-edit"))
                .unwrap_or_else(|| PathBuf::from(".cache").join("da-story-edit")),
        }
    }

    /// Write tokens back to the `.env` file and into this value
    pub fn persist(&mut self, updates: &[(&'static str, &str)]) -> ConfigResult<()> {
        upsert_env_values(&self.env_path, updates)?;
        for (name, value) in updates {
            self.values.insert(*name, value.to_string());
        }
        Ok(())
    }
}
