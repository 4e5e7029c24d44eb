//! Connection configuration resolution.
//!
//! # Responsibility
//! - Resolve connection string, database name and collection name from
//!   layered sources (explicit settings, environment, defaults).
//! - Select the database provider and its provisioning strategy.
//! - Keep credential-bearing connection strings out of logs.
//!
//! # Invariants
//! - A `ConnectionConfig` is only produced when all three fields resolved.
//! - An explicit non-empty setting always wins over the environment.
//! - Connection strings are logged masked, never raw.

mod mask;
mod provider;
mod resolver;
mod source;

pub use mask::mask_connection_string;
pub use provider::{DatabaseProvider, DATABASE_PROVIDER_ENV};
pub use resolver::{
    ConnectionConfig, ConnectionResolver, MissingConnectionPolicy, ResolverDefaults,
    DEFAULT_DATABASE_NAME,
};
pub use source::{JsonSettings, ProcessEnv, SettingsSource};

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration error raised at startup or while interpreting caller input.
#[derive(Debug)]
pub enum ConfigError {
    /// Required setting has no value after all precedence levels.
    MissingSetting { key: String, env_var: String },
    UnknownProvider(String),
    /// Connection string the store cannot open. Holds the masked form.
    UnsupportedConnectionString(String),
    UnknownSortField { entity: &'static str, field: String },
    InvalidSettings(String),
    Io { path: PathBuf, source: std::io::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSetting { key, env_var } => write!(
                f,
                "missing required setting `{key}` (environment variable `{env_var}`)"
            ),
            Self::UnknownProvider(value) => write!(
                f,
                "unknown database provider `{value}`; expected SqlServer|postgresql|postgres"
            ),
            Self::UnsupportedConnectionString(masked) => {
                write!(f, "unsupported connection string `{masked}`")
            }
            Self::UnknownSortField { entity, field } => {
                write!(f, "unknown sort field `{field}` for {entity}")
            }
            Self::InvalidSettings(message) => write!(f, "invalid settings: {message}"),
            Self::Io { path, source } => {
                write!(f, "failed to read settings `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
