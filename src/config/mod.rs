//! Layered configuration: built-in defaults, the user's properties file, and
//! anything pulled in through `config.include`, flattened into one [`Config`].

mod endpoint;
mod loader;
mod properties;

use std::collections::BTreeMap;

pub use endpoint::{Endpoint, resolve};
pub use loader::{ConfigLoader, DEFAULT_CONFIG_RESOURCE, USER_CONFIG_FILE};

/// Reserved key naming another source to merge in.
pub const INCLUDE_KEY: &str = "config.include";
/// `true` selects the https base URL.
pub const SECURE_KEY: &str = "api.secure";
pub const SECURE_URI_KEY: &str = "uri.secure";
pub const BASIC_URI_KEY: &str = "uri.basic";
pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";

#[derive(Debug, thiserror::Error)]
/// Errors raised by [`ConfigLoader`] and [`Config`] mutators.
pub enum ConfigError {
    /// A source was named twice during one resolution pass.
    #[error("config include cycle: {}", .chain.join(" -> "))]
    IncludeCycle { chain: Vec<String> },

    /// A key passed to a mutator was empty.
    #[error("config key must not be empty")]
    InvalidKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A source that was skipped while loading because it was missing or unreadable.
pub struct SkippedSource {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
/// Flattened key/value configuration.
///
/// Later writes win, whether they come from a later source or from [`Config::set`].
/// Lookups of missing keys return `None`; they never render as text.
pub struct Config {
    values: BTreeMap<String, String>,
    skipped: Vec<SkippedSource>,
}

impl Config {
    /// Empty configuration with no defaults loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the built-in defaults overlaid with `bbn.properties`, if one can be found.
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// `true` only for a case-insensitive `"true"`; anything else, including a missing
    /// key or a value with surrounding whitespace, is `false`.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    /// Insert or overwrite `key`.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::InvalidKey);
        }
        self.values.insert(key, value.into());
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_secure(&self) -> bool {
        self.get_bool(SECURE_KEY)
    }

    pub fn set_secure(&mut self, secure: bool) {
        let value = if secure { "true" } else { "false" };
        self.values.insert(SECURE_KEY.to_owned(), value.to_owned());
    }

    pub fn username(&self) -> Option<&str> {
        self.get(USERNAME_KEY)
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.values.insert(USERNAME_KEY.to_owned(), username.into());
    }

    pub fn password(&self) -> Option<&str> {
        self.get(PASSWORD_KEY)
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.values.insert(PASSWORD_KEY.to_owned(), password.into());
    }

    /// Resolve `endpoint` against the current secure flag.
    pub fn endpoint(&self, endpoint: Endpoint) -> Option<String> {
        resolve(self, endpoint, self.is_secure())
    }

    /// Sources that were missing or unreadable during the last load.
    pub fn skipped_sources(&self) -> &[SkippedSource] {
        &self.skipped
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn record_skipped(&mut self, id: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedSource {
            id: id.into(),
            reason: reason.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_absent_not_text() {
        let config = Config::new();
        assert_eq!(config.get("username"), None);
        assert!(!config.get_bool("api.secure"));
    }

    #[test]
    fn get_bool_accepts_only_true() {
        let mut config = Config::new();
        for (value, expected) in [
            ("true", true),
            ("TRUE", true),
            ("True", true),
            (" True ", false),
            ("yes", false),
            ("1", false),
            ("", false),
        ] {
            config.set("flag", value).unwrap();
            assert_eq!(config.get_bool("flag"), expected, "value {value:?}");
        }
    }

    #[test]
    fn set_overwrites_and_rejects_empty_key() {
        let mut config = Config::new();
        config.set("username", "first").unwrap();
        config.set("username", "bbnapi_user").unwrap();
        assert_eq!(config.username(), Some("bbnapi_user"));

        assert!(matches!(config.set("", "x"), Err(ConfigError::InvalidKey)));
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn secure_flag_round_trips() {
        let mut config = Config::new();
        assert!(!config.is_secure());
        config.set_secure(true);
        assert!(config.is_secure());
        assert_eq!(config.get(SECURE_KEY), Some("true"));
        config.set_secure(false);
        assert!(!config.is_secure());
    }

    #[test]
    fn cycle_error_lists_chain() {
        let err = ConfigError::IncludeCycle {
            chain: vec![
                "a.properties".to_owned(),
                "b.properties".to_owned(),
                "a.properties".to_owned(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "config include cycle: a.properties -> b.properties -> a.properties"
        );
    }
}
