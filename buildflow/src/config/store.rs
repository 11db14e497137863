//! Key-value store backed by a properties file.

use crate::errors::ConfigError;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// A flat, read-only key-value store.
///
/// Supports the common subset of the Java properties format: one
/// `key=value` or `key: value` pair per line, `#` and `!` comment lines,
/// surrounding whitespace trimmed. A line holding only a key maps to an
/// empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    values: HashMap<String, String>,
}

impl ConfigStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses properties text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] when a line has a separator but no key.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let (key, value) = match line.find(['=', ':']) {
                Some(pos) => (line[..pos].trim(), line[pos + 1..].trim()),
                None => (line, ""),
            };

            if key.is_empty() {
                return Err(ConfigError::Malformed {
                    line: index + 1,
                    content: raw.to_string(),
                });
            }

            values.insert(key.to_string(), value.to_string());
        }

        Ok(Self { values })
    }

    /// Loads a properties file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file exists but cannot be read,
    /// or a parse error from [`ConfigStore::parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let store = Self::parse(&text)?;
        debug!(path = %path.display(), keys = store.len(), "Loaded configuration");
        Ok(store)
    }

    /// Loads a properties file, falling back to an empty store if it is absent.
    ///
    /// A missing file is not fatal: stages whose preconditions depend on the
    /// absent keys fail on their own.
    ///
    /// # Errors
    ///
    /// Returns an error for unreadable or malformed files that do exist.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Unable to find configuration file, continuing with empty configuration");
            return Ok(Self::new());
        }
        Self::load(path)
    }

    /// Returns the value for a key, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the value for a key or a missing-key error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] when the key is absent.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::missing(key))
    }

    /// Iterates `(suffix, value)` for every key starting with `prefix`.
    pub fn entries_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.values.iter().filter_map(move |(key, value)| {
            key.strip_prefix(prefix)
                .filter(|suffix| !suffix.is_empty())
                .map(|suffix| (suffix, value.as_str()))
        })
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the store has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sets a value, returning the updated store.
    ///
    /// Intended for assembling configuration in code before it is frozen
    /// into a [`super::PipelineConfig`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_basic_pairs() {
        let store = ConfigStore::parse("app.version=1.0\nscripts = A.java, B.py\n").unwrap();

        assert_eq!(store.get("app.version"), Some("1.0"));
        assert_eq!(store.get("scripts"), Some("A.java, B.py"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_parse_comments_and_blank_lines() {
        let text = "# build settings\n\n! legacy comment\napp.name=demo\n";
        let store = ConfigStore::parse(text).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("app.name"), Some("demo"));
    }

    #[test]
    fn test_parse_colon_separator_and_url_values() {
        let store =
            ConfigStore::parse("github.repo_url: https://github.com/acme/app.git\n").unwrap();

        assert_eq!(
            store.get("github.repo_url"),
            Some("https://github.com/acme/app.git")
        );
    }

    #[test]
    fn test_parse_bare_key() {
        let store = ConfigStore::parse("tests\n").unwrap();
        assert_eq!(store.get("tests"), Some(""));
    }

    #[test]
    fn test_parse_missing_key_is_malformed() {
        let err = ConfigStore::parse("app.name=x\n=orphan\n").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_get_absent_key() {
        let store = ConfigStore::new();
        assert_eq!(store.get("app.version"), None);
        assert!(store.require("app.version").is_err());
    }

    #[test]
    fn test_entries_with_prefix() {
        let store = ConfigStore::new()
            .with("handler.py", "python3")
            .with("handler.", "ignored")
            .with("app.name", "demo");

        let entries: Vec<_> = store.entries_with_prefix("handler.").collect();
        assert_eq!(entries, vec![("py", "python3")]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "app.version=2.3").unwrap();

        let store = ConfigStore::load(file.path()).unwrap();
        assert_eq!(store.require("app.version").unwrap(), "2.3");
    }

    #[test]
    fn test_load_or_empty_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load_or_empty(dir.path().join("config.properties")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigStore::load(dir.path().join("absent.properties")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
