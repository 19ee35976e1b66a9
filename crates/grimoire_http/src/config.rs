//! Environment-driven server configuration.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults and log the value used.
//! - Set but unparsable variables are errors, never silently defaulted.

use grimoire_core::default_log_level;
use log::info;
use std::env;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const PORT_VAR: &str = "GRIMOIRE_PORT";
pub const BIND_VAR: &str = "GRIMOIRE_BIND";
pub const DB_PATH_VAR: &str = "GRIMOIRE_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "GRIMOIRE_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "GRIMOIRE_LOG_DIR";

const DEFAULT_PORT: &str = "3000";
const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_DB_PATH: &str = "grimoire.sqlite3";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: IpAddr,
    pub port: u16,
    pub db_path: PathBuf,
    pub log_level: String,
    /// Rolling log directory; stderr logging when absent.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            bind: try_load(&lookup, BIND_VAR, DEFAULT_BIND)?,
            port: try_load(&lookup, PORT_VAR, DEFAULT_PORT)?,
            db_path: PathBuf::from(var(&lookup, DB_PATH_VAR).unwrap_or_else(|| {
                info!("event=config_default module=config key={DB_PATH_VAR} value={DEFAULT_DB_PATH}");
                DEFAULT_DB_PATH.to_string()
            })),
            log_level: var(&lookup, LOG_LEVEL_VAR)
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: var(&lookup, LOG_DIR_VAR).map(PathBuf::from),
        })
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

fn var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = var(lookup, key).unwrap_or_else(|| {
        info!("event=config_default module=config key={key} value={default}");
        default.to_string()
    });
    raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        reason: err.to_string(),
        value: raw.clone(),
    })
}
