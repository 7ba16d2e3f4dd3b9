use std::fs;
use std::path::{Path, PathBuf};

use super::{Config, ConfigError, INCLUDE_KEY, properties};

/// Name of the built-in resource carrying the gateway defaults.
pub const DEFAULT_CONFIG_RESOURCE: &str = "bbn-default.properties";
/// Source loaded on top of the defaults unless overridden.
pub const USER_CONFIG_FILE: &str = "bbn.properties";

const DEFAULT_CONFIG: &str = include_str!("default.properties");

#[derive(Debug, Clone)]
/// Resolves configuration sources into a [`Config`].
///
/// A pass loads the default source, then the user source, following every
/// `config.include` directive recursively. Regular keys of a file are applied
/// before its includes, so an included file overrides the file that names it.
///
/// Source identifiers are resolved in this order:
/// 1. a built-in resource registered under that exact name,
/// 2. an absolute file path,
/// 3. a relative path, tried against the including file's directory, then each
///    search directory, then the current directory.
///
/// Missing or unreadable sources are logged and skipped. A source may be loaded
/// more than once in a pass (diamond includes, a user file including the defaults);
/// each load applies its keys again. A source that includes itself, directly or
/// through other sources, fails the whole load with [`ConfigError::IncludeCycle`].
pub struct ConfigLoader {
    default_source: Option<String>,
    user_source: Option<String>,
    search_dirs: Vec<PathBuf>,
    resources: Vec<(String, String)>,
}

enum Source<'a> {
    Resource { name: &'a str, text: &'a str },
    File(PathBuf),
    Missing,
}

impl Source<'_> {
    fn identity(&self, id: &str) -> String {
        match self {
            Self::Resource { name, .. } => format!("resource:{name}"),
            Self::File(path) => fs::canonicalize(path)
                .unwrap_or_else(|_| path.clone())
                .display()
                .to_string(),
            Self::Missing => id.to_owned(),
        }
    }
}

/// Sources currently being loaded, outermost first, as `(identity, id)`.
#[derive(Default)]
struct Pass {
    chain: Vec<(String, String)>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader for the built-in defaults plus `bbn.properties`.
    pub fn new() -> Self {
        Self {
            default_source: Some(DEFAULT_CONFIG_RESOURCE.to_owned()),
            user_source: Some(USER_CONFIG_FILE.to_owned()),
            search_dirs: Vec::new(),
            resources: vec![(
                DEFAULT_CONFIG_RESOURCE.to_owned(),
                DEFAULT_CONFIG.to_owned(),
            )],
        }
    }

    /// Replace the source loaded first.
    pub fn default_source(mut self, id: impl Into<String>) -> Self {
        self.default_source = Some(id.into());
        self
    }

    pub fn no_default_source(mut self) -> Self {
        self.default_source = None;
        self
    }

    /// Replace the source loaded on top of the defaults.
    pub fn user_source(mut self, id: impl Into<String>) -> Self {
        self.user_source = Some(id.into());
        self
    }

    pub fn no_user_source(mut self) -> Self {
        self.user_source = None;
        self
    }

    /// Add a directory searched for relative source identifiers.
    pub fn search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    /// Register an in-memory source under `name`. A later registration shadows an earlier one.
    pub fn resource(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.resources.insert(0, (name.into(), contents.into()));
        self
    }

    /// Run a resolution pass into a fresh [`Config`].
    pub fn load(&self) -> Result<Config, ConfigError> {
        let mut config = Config::new();
        self.load_into(&mut config)?;
        Ok(config)
    }

    /// Run a resolution pass on top of an existing [`Config`]; loaded keys overwrite.
    pub fn load_into(&self, config: &mut Config) -> Result<(), ConfigError> {
        let mut pass = Pass::default();
        let roots = [self.default_source.as_deref(), self.user_source.as_deref()];
        for id in roots.into_iter().flatten() {
            self.load_source(id, None, &mut pass, config)?;
        }
        Ok(())
    }

    fn load_source(
        &self,
        id: &str,
        parent_dir: Option<&Path>,
        pass: &mut Pass,
        config: &mut Config,
    ) -> Result<(), ConfigError> {
        let source = self.locate(id, parent_dir);
        let identity = source.identity(id);
        if pass.chain.iter().any(|(open, _)| *open == identity) {
            let mut chain: Vec<String> =
                pass.chain.iter().map(|(_, open_id)| open_id.clone()).collect();
            chain.push(id.to_owned());
            return Err(ConfigError::IncludeCycle { chain });
        }

        let (text, dir) = match source {
            Source::Resource { text, .. } => (text.to_owned(), None),
            Source::File(path) => match fs::read_to_string(&path) {
                Ok(text) => (text, path.parent().map(Path::to_path_buf)),
                Err(err) => {
                    tracing::warn!(source = id, error = %err, "skipping unreadable config source");
                    config.record_skipped(id, err.to_string());
                    return Ok(());
                }
            },
            Source::Missing => {
                tracing::warn!(source = id, "config source not found, skipping");
                config.record_skipped(id, "not found");
                return Ok(());
            }
        };

        tracing::debug!(source = id, "loading config source");
        let mut includes = Vec::new();
        for (key, value) in properties::parse(&text) {
            if key == INCLUDE_KEY {
                if !value.is_empty() {
                    includes.push(value);
                }
            } else {
                config.values.insert(key, value);
            }
        }

        pass.chain.push((identity, id.to_owned()));
        for include in &includes {
            self.load_source(include, dir.as_deref(), pass, config)?;
        }
        pass.chain.pop();
        Ok(())
    }

    fn locate(&self, id: &str, parent_dir: Option<&Path>) -> Source<'_> {
        if let Some((name, text)) = self.resources.iter().find(|(name, _)| name == id) {
            return Source::Resource { name, text };
        }

        let path = Path::new(id);
        if path.is_absolute() {
            return Source::File(path.to_path_buf());
        }

        parent_dir
            .into_iter()
            .chain(self.search_dirs.iter().map(PathBuf::as_path))
            .chain(std::iter::once(Path::new(".")))
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.is_file())
            .map_or(Source::Missing, Source::File)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::config::SkippedSource;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn path_str(path: &Path) -> String {
        path.to_str().unwrap().to_owned()
    }

    #[test]
    fn user_source_overrides_defaults() {
        let dir = tempdir().unwrap();
        let user = write(dir.path(), "user.properties", "a=2\nb=3\n");

        let config = ConfigLoader::new()
            .resource("defaults", "a=1\n")
            .default_source("defaults")
            .user_source(path_str(&user))
            .load()
            .unwrap();

        assert_eq!(config.get("a"), Some("2"));
        assert_eq!(config.get("b"), Some("3"));
        assert!(config.skipped_sources().is_empty());
    }

    #[test]
    fn include_is_resolved_next_to_including_file() {
        let dir = tempdir().unwrap();
        write(dir.path(), "other.cfg", "c=4\n");
        let main = write(dir.path(), "main.cfg", "config.include=other.cfg\n");

        let config = ConfigLoader::new()
            .no_default_source()
            .user_source(path_str(&main))
            .load()
            .unwrap();

        assert_eq!(config.get("c"), Some("4"));
        assert_eq!(config.get(INCLUDE_KEY), None);
    }

    #[test]
    fn include_overrides_including_file_regardless_of_position() {
        let dir = tempdir().unwrap();
        write(dir.path(), "first.cfg", "x=first\ny=first\n");
        write(dir.path(), "second.cfg", "y=second\n");
        let main = write(
            dir.path(),
            "main.cfg",
            "config.include=first.cfg\nx=main\nz=main\nconfig.include=second.cfg\n",
        );

        let config = ConfigLoader::new()
            .no_default_source()
            .user_source(path_str(&main))
            .load()
            .unwrap();

        assert_eq!(config.get("x"), Some("first"));
        assert_eq!(config.get("y"), Some("second"));
        assert_eq!(config.get("z"), Some("main"));
    }

    #[test]
    fn nested_includes_are_followed() {
        let dir = tempdir().unwrap();
        write(dir.path(), "c.cfg", "depth=3\n");
        write(dir.path(), "b.cfg", "depth=2\nconfig.include=c.cfg\n");
        let a = write(dir.path(), "a.cfg", "depth=1\nconfig.include=b.cfg\n");

        let config = ConfigLoader::new()
            .no_default_source()
            .user_source(path_str(&a))
            .load()
            .unwrap();
        assert_eq!(config.get("depth"), Some("3"));
    }

    #[test]
    fn missing_user_source_keeps_defaults() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.properties");

        let config = ConfigLoader::new()
            .user_source(path_str(&missing))
            .load()
            .unwrap();

        assert_eq!(
            config.get("uri.secure"),
            Some("https://www.bbnplace.com/sms/bulksms/")
        );
        assert_eq!(config.skipped_sources().len(), 1);
        assert_eq!(config.skipped_sources()[0].id, path_str(&missing));
    }

    #[test]
    fn missing_relative_include_is_skipped() {
        let dir = tempdir().unwrap();
        let main = write(
            dir.path(),
            "main.cfg",
            "k=v\nconfig.include=nowhere-to-be-found.cfg\n",
        );

        let config = ConfigLoader::new()
            .no_default_source()
            .user_source(path_str(&main))
            .load()
            .unwrap();

        assert_eq!(config.get("k"), Some("v"));
        assert_eq!(
            config.skipped_sources(),
            &[SkippedSource {
                id: "nowhere-to-be-found.cfg".to_owned(),
                reason: "not found".to_owned(),
            }]
        );
    }

    #[test]
    fn unreadable_source_is_skipped() {
        let dir = tempdir().unwrap();

        let config = ConfigLoader::new()
            .user_source(path_str(dir.path()))
            .load()
            .unwrap();

        assert!(config.contains("resource.uri.send"));
        assert_eq!(config.skipped_sources().len(), 1);
    }

    #[test]
    fn include_cycle_is_fatal() {
        let dir = tempdir().unwrap();
        write(dir.path(), "b.cfg", "config.include=a.cfg\n");
        let a = write(dir.path(), "a.cfg", "config.include=b.cfg\n");

        let err = ConfigLoader::new()
            .no_default_source()
            .user_source(path_str(&a))
            .load()
            .unwrap_err();

        match err {
            ConfigError::IncludeCycle { chain } => {
                assert_eq!(
                    chain,
                    vec![path_str(&a), "b.cfg".to_owned(), "a.cfg".to_owned()]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn self_include_is_fatal() {
        let err = ConfigLoader::new()
            .resource("loop", "config.include=loop\n")
            .default_source("loop")
            .no_user_source()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::IncludeCycle { .. }));
    }

    #[test]
    fn relative_source_is_found_in_search_dir() {
        let dir = tempdir().unwrap();
        write(dir.path(), USER_CONFIG_FILE, "username=bbnapi_user\n");

        let config = ConfigLoader::new().search_dir(dir.path()).load().unwrap();

        assert_eq!(config.username(), Some("bbnapi_user"));
        assert!(!config.is_secure());
    }

    #[test]
    fn file_can_include_builtin_resource() {
        let dir = tempdir().unwrap();
        let main = write(
            dir.path(),
            "main.cfg",
            "config.include=bbn-default.properties\n",
        );

        let config = ConfigLoader::new()
            .no_default_source()
            .user_source(path_str(&main))
            .load()
            .unwrap();
        assert_eq!(config.get("resource.uri.balance"), Some("acctbals.php"));
    }

    #[test]
    fn diamond_include_is_not_a_cycle() {
        let config = ConfigLoader::new()
            .no_default_source()
            .resource("a", "config.include=b\nconfig.include=c\n")
            .resource("b", "from=b\nconfig.include=d\n")
            .resource("c", "from=c\nconfig.include=d\n")
            .resource("d", "shared=d\n")
            .user_source("a")
            .load()
            .unwrap();

        assert_eq!(config.get("from"), Some("c"));
        assert_eq!(config.get("shared"), Some("d"));
    }

    #[test]
    fn shared_include_is_reapplied_last_write_wins() {
        let config = ConfigLoader::new()
            .no_default_source()
            .resource("a", "config.include=b\nconfig.include=c\n")
            .resource("b", "config.include=d\n")
            .resource("c", "k=c\nconfig.include=d\n")
            .resource("d", "k=d\n")
            .user_source("a")
            .load()
            .unwrap();

        assert_eq!(config.get("k"), Some("d"));
    }

    #[test]
    fn user_file_may_include_defaults_again() {
        let dir = tempdir().unwrap();
        let user = write(
            dir.path(),
            "bbn.properties",
            "api.secure=true\nconfig.include=bbn-default.properties\nusername=me\n",
        );

        let config = ConfigLoader::new()
            .user_source(path_str(&user))
            .load()
            .unwrap();

        assert_eq!(config.username(), Some("me"));
        // Included after the file's own keys, so the default wins.
        assert!(!config.is_secure());
        assert!(config.skipped_sources().is_empty());
    }

    #[test]
    fn missing_include_named_twice_is_skipped_twice() {
        let config = ConfigLoader::new()
            .no_default_source()
            .resource("a", "config.include=gone.cfg\nconfig.include=gone.cfg\nk=v\n")
            .user_source("a")
            .load()
            .unwrap();

        assert_eq!(config.get("k"), Some("v"));
        assert_eq!(config.skipped_sources().len(), 2);
    }

    #[test]
    fn cycle_through_shared_include_is_still_fatal() {
        let err = ConfigLoader::new()
            .no_default_source()
            .resource("a", "config.include=b\nconfig.include=c\n")
            .resource("b", "config.include=d\n")
            .resource("c", "config.include=d\n")
            .resource("d", "config.include=c\n")
            .user_source("a")
            .load()
            .unwrap_err();

        match err {
            ConfigError::IncludeCycle { chain } => {
                assert_eq!(chain, vec!["a", "b", "d", "c", "d"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_into_overlays_existing_values() {
        let mut config = Config::new();
        config.set("username", "kept").unwrap();
        config.set("uri.basic", "http://replaced/").unwrap();

        ConfigLoader::new()
            .no_user_source()
            .load_into(&mut config)
            .unwrap();

        assert_eq!(config.username(), Some("kept"));
        assert_eq!(
            config.get("uri.basic"),
            Some("http://sms.bbnplace.com/bulksms/")
        );
    }
}
