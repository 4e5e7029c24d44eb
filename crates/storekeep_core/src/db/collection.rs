use crate::db::{DbError, DbResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

static COLLECTION_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid collection name regex"));

/// Validated collection (table) name, safe to splice into SQL as an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionName(String);

impl CollectionName {
    pub fn parse(name: &str) -> DbResult<Self> {
        if !COLLECTION_NAME_RE.is_match(name) || name.starts_with("__") {
            return Err(DbError::InvalidCollectionName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted identifier form.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl Display for CollectionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
