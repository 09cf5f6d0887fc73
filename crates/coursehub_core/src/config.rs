//! Data-layer configuration.
//!
//! # Responsibility
//! - Hold storage, seeding, logging and hashing settings with safe defaults.
//! - Read overrides from `COURSEHUB_*` environment variables.
//!
//! # Invariants
//! - `Default` values are production values.
//! - Invalid environment values are reported, never silently ignored.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "COURSEHUB_DB_PATH";
pub const ENV_NAMESPACE: &str = "COURSEHUB_NAMESPACE";
pub const ENV_SEED: &str = "COURSEHUB_SEED";
pub const ENV_LOG_LEVEL: &str = "COURSEHUB_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "COURSEHUB_LOG_DIR";

const DEFAULT_NAMESPACE: &str = "coursehub";

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordHashingConfig {
    /// Minimal cost for tests and throwaway fixtures; not for real accounts.
    pub fn low_cost() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayerConfig {
    /// Scopes every store key; two namespaces never share data.
    pub namespace: String,
    /// SQLite file; `None` keeps data in memory.
    pub database_path: Option<PathBuf>,
    /// Write the bootstrap dataset into collections that were never written.
    pub seed_on_first_open: bool,
    pub log_level: String,
    /// Rolling log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub password_hashing: PasswordHashingConfig,
}

impl Default for DataLayerConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            database_path: None,
            seed_on_first_open: true,
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            password_hashing: PasswordHashingConfig::default(),
        }
    }
}

impl DataLayerConfig {
    /// Defaults overridden by `COURSEHUB_*` variables from the process env.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = non_blank(lookup(ENV_DB_PATH)) {
            config.database_path = Some(PathBuf::from(path));
        }
        if let Some(namespace) = non_blank(lookup(ENV_NAMESPACE)) {
            config.namespace = namespace;
        }
        if let Some(seed) = non_blank(lookup(ENV_SEED)) {
            config.seed_on_first_open = parse_flag(ENV_SEED, &seed)?;
        }
        if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
            config.log_level = level;
        }
        if let Some(dir) = non_blank(lookup(ENV_LOG_DIR)) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { variable: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { variable, value } => {
                write!(f, "invalid value `{value}` for {variable}")
            }
        }
    }
}

impl Error for ConfigError {}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn parse_flag(variable: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            variable,
            value: value.to_string(),
        }),
    }
}
