use crate::config::{ConfigError, ConfigResult};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Key/value lookup used by the connection resolver.
///
/// Both the explicit settings layer and the environment layer implement this,
/// so tests can substitute either with an in-memory map.
pub trait SettingsSource {
    fn get(&self, key: &str) -> Option<String>;
}

impl SettingsSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl SettingsSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

/// Process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl SettingsSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Settings loaded from an appsettings-style JSON document.
///
/// Nested objects flatten into `Section:Key` paths and array items into
/// `Section:0`. Lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonSettings {
    values: BTreeMap<String, String>,
}

impl JsonSettings {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let root: Value = serde_json::from_str(json)
            .map_err(|err| ConfigError::InvalidSettings(format!("malformed JSON: {err}")))?;
        let Value::Object(entries) = root else {
            return Err(ConfigError::InvalidSettings(
                "settings root must be a JSON object".to_string(),
            ));
        };

        let mut values = BTreeMap::new();
        for (key, value) in entries {
            flatten_into(&mut values, key, value);
        }
        Ok(Self { values })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsSource for JsonSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(&key.to_ascii_lowercase()).cloned()
    }
}

fn flatten_into(values: &mut BTreeMap<String, String>, path: String, value: Value) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => {
            values.insert(path.to_ascii_lowercase(), flag.to_string());
        }
        Value::Number(number) => {
            values.insert(path.to_ascii_lowercase(), number.to_string());
        }
        Value::String(text) => {
            values.insert(path.to_ascii_lowercase(), text);
        }
        Value::Array(items) => {
            for (index, item) in items.into_iter().enumerate() {
                flatten_into(values, format!("{path}:{index}"), item);
            }
        }
        Value::Object(entries) => {
            for (key, item) in entries {
                flatten_into(values, format!("{path}:{key}"), item);
            }
        }
    }
}
