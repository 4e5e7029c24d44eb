use crate::config::mask::mask_connection_string;
use crate::config::{ConfigError, ConfigResult, SettingsSource};
use crate::model::Entity;
use log::info;
use std::fmt::{Debug, Formatter};

/// Database name used when neither settings nor environment name one.
pub const DEFAULT_DATABASE_NAME: &str = "storekeep";

const CONNECTION_STRING_KEY: &str = "ConnectionString";
const DATABASE_NAME_KEY: &str = "DatabaseName";
const DEFAULT_COLLECTION_KEY: &str = "CollectionName";

/// What to do when no connection string is configured anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingConnectionPolicy {
    /// Fail with `ConfigError::MissingSetting`.
    #[default]
    Fail,
    /// Use `ResolverDefaults::connection_string`; fails when that is `None`.
    UseDefault,
}

/// Compiled-in fallbacks, the last precedence level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverDefaults {
    pub connection_string: Option<String>,
    pub database_name: String,
    pub collection_name: String,
}

impl ResolverDefaults {
    /// Defaults for entity `T`: its default collection, no connection string.
    pub fn for_entity<T: Entity>() -> Self {
        Self {
            connection_string: None,
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            collection_name: T::DEFAULT_COLLECTION.to_string(),
        }
    }

    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = Some(connection_string.into());
        self
    }

    pub fn with_database_name(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = database_name.into();
        self
    }
}

/// Fully resolved connection settings for one collection.
///
/// Immutable once built. `Debug` prints the masked connection string.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    connection_string: String,
    database_name: String,
    collection_name: String,
}

impl ConnectionConfig {
    pub fn new(
        connection_string: impl Into<String>,
        database_name: impl Into<String>,
        collection_name: impl Into<String>,
    ) -> Self {
        Self {
            connection_string: connection_string.into(),
            database_name: database_name.into(),
            collection_name: collection_name.into(),
        }
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub fn masked_connection_string(&self) -> String {
        mask_connection_string(&self.connection_string)
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }
}

impl Debug for ConnectionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("connection_string", &self.masked_connection_string())
            .field("database_name", &self.database_name)
            .field("collection_name", &self.collection_name)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Settings,
    Env,
    Default,
}

impl Origin {
    fn as_str(self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Env => "env",
            Self::Default => "default",
        }
    }
}

/// Resolves a `ConnectionConfig` for one provider prefix.
///
/// For provider `MongoDB` the keys are `MongoDB:ConnectionString`,
/// `MongoDB:DatabaseName` and `MongoDB:CollectionName`, overridden by
/// `MONGODB_CONNECTION_STRING`, `MONGODB_DATABASE_NAME` and
/// `MONGODB_COLLECTION_NAME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionResolver {
    provider: String,
    collection_key: String,
    policy: MissingConnectionPolicy,
}

impl ConnectionResolver {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            collection_key: DEFAULT_COLLECTION_KEY.to_string(),
            policy: MissingConnectionPolicy::default(),
        }
    }

    /// Replaces the `CollectionName` key segment, e.g. `AuthorsCollection`.
    pub fn with_collection_key(mut self, key: impl Into<String>) -> Self {
        self.collection_key = key.into();
        self
    }

    pub fn with_policy(mut self, policy: MissingConnectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MissingConnectionPolicy {
        self.policy
    }

    /// Settings key for one field, e.g. `MongoDB:DatabaseName`.
    pub fn settings_key(&self, field: &str) -> String {
        format!("{}:{field}", self.provider)
    }

    /// Environment variable for one field, e.g. `MONGODB_DATABASE_NAME`.
    pub fn env_var(&self, field: &str) -> String {
        format!(
            "{}_{}",
            self.provider.to_ascii_uppercase(),
            screaming_snake(field)
        )
    }

    /// Resolves all three fields: settings, then environment, then defaults.
    ///
    /// # Errors
    /// - `ConfigError::MissingSetting` when no connection string resolves and
    ///   the policy is `Fail`, or the policy is `UseDefault` without a default.
    pub fn resolve(
        &self,
        settings: &dyn SettingsSource,
        env: &dyn SettingsSource,
        defaults: &ResolverDefaults,
    ) -> ConfigResult<ConnectionConfig> {
        let (connection_string, connection_origin) =
            match self.lookup(CONNECTION_STRING_KEY, settings, env) {
                Some(found) => found,
                None => match (self.policy, defaults.connection_string.as_deref()) {
                    (MissingConnectionPolicy::UseDefault, Some(fallback))
                        if !fallback.trim().is_empty() =>
                    {
                        (fallback.to_string(), Origin::Default)
                    }
                    _ => {
                        return Err(ConfigError::MissingSetting {
                            key: self.settings_key(CONNECTION_STRING_KEY),
                            env_var: self.env_var(CONNECTION_STRING_KEY),
                        });
                    }
                },
            };

        let (database_name, database_origin) = self
            .lookup(DATABASE_NAME_KEY, settings, env)
            .unwrap_or_else(|| (defaults.database_name.clone(), Origin::Default));
        let (collection_name, collection_origin) = self
            .lookup(&self.collection_key, settings, env)
            .unwrap_or_else(|| (defaults.collection_name.clone(), Origin::Default));

        let config = ConnectionConfig {
            connection_string,
            database_name,
            collection_name,
        };

        info!(
            "event=config_resolved module=config status=ok provider={} connection={} connection_source={} database={} database_source={} collection={} collection_source={}",
            self.provider,
            config.masked_connection_string(),
            connection_origin.as_str(),
            config.database_name,
            database_origin.as_str(),
            config.collection_name,
            collection_origin.as_str()
        );

        Ok(config)
    }

    fn lookup(
        &self,
        field: &str,
        settings: &dyn SettingsSource,
        env: &dyn SettingsSource,
    ) -> Option<(String, Origin)> {
        if let Some(value) = non_blank(settings.get(&self.settings_key(field))) {
            return Some((value, Origin::Settings));
        }
        non_blank(env.get(&self.env_var(field))).map(|value| (value, Origin::Env))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// `ConnectionString` -> `CONNECTION_STRING`.
fn screaming_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() && previous_lower {
            out.push('_');
        }
        previous_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        out.push(ch.to_ascii_uppercase());
    }
    out
}
