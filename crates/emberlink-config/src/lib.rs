//! Configuration for Emberlink hosts.
//!
//! TOML file + `EMBERLINK_*` environment layering, credential resolution,
//! and translation to `emberlink_core::CoordinatorConfig`. The host owns
//! credential *persistence*; this crate only reads what it wrote.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use emberlink_core::{AccountCredentials, CoordinatorConfig, DEFAULT_POLL_INTERVAL_SECS};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no credentials configured (set email and password)")]
    NoCredentials,

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Host-facing configuration surface: two credential fields and one
/// polling option.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub email: Option<String>,
    pub password: Option<SecretString>,

    /// Poll interval in seconds. Clamped to the core minimum when
    /// translated via [`coordinator_config()`](Config::coordinator_config).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "emberlink", "emberlink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("emberlink");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

impl Config {
    /// Load from the default config path merged with `EMBERLINK_*` env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(config_path())
    }

    /// Load from an explicit file path merged with `EMBERLINK_*` env vars.
    /// Env vars win over the file; a missing file is not an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("EMBERLINK_"));
        Self::from_figment(&figment)
    }

    /// Extract from a prepared figment (tests layer providers directly).
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// Resolve the account credentials, requiring both fields.
    pub fn credentials(&self) -> Result<AccountCredentials, ConfigError> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Ok(AccountCredentials {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => Err(ConfigError::NoCredentials),
        }
    }

    /// Translate to the core coordinator config.
    ///
    /// The interval clamp happens here, at configuration time, so the
    /// coordinator never sees a value below the minimum.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig::new(Duration::from_secs(self.poll_interval_secs))
    }
}
