use crate::config::{ConfigError, ConfigResult, SettingsSource};
use crate::db::ProvisioningStrategy;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Environment variable naming the database provider.
pub const DATABASE_PROVIDER_ENV: &str = "DATABASE_PROVIDER";

/// Database provider selected at startup.
///
/// The store engine is SQLite either way; the provider decides how the
/// collection schema is provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatabaseProvider {
    #[default]
    SqlServer,
    Postgres,
}

impl DatabaseProvider {
    /// Reads `DATABASE_PROVIDER`; unset or blank selects `SqlServer`.
    pub fn from_env(env: &dyn SettingsSource) -> ConfigResult<Self> {
        match env.get(DATABASE_PROVIDER_ENV) {
            Some(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(Self::default()),
        }
    }

    pub fn provisioning_strategy(self) -> ProvisioningStrategy {
        match self {
            Self::SqlServer => ProvisioningStrategy::Migrate,
            Self::Postgres => ProvisioningStrategy::EnsureCreated,
        }
    }
}

impl FromStr for DatabaseProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlserver" => Ok(Self::SqlServer),
            "postgresql" | "postgres" => Ok(Self::Postgres),
            _ => Err(ConfigError::UnknownProvider(value.trim().to_string())),
        }
    }
}

impl Display for DatabaseProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SqlServer => f.write_str("SqlServer"),
            Self::Postgres => f.write_str("postgresql"),
        }
    }
}
