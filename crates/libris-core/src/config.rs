//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/libris/config.toml)
//! 3. Environment variables (LIBRIS_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "LIBRIS";

/// Default name of the book record file
pub const DEFAULT_BOOKS_FILE: &str = "book.dat";

/// Default name of the reader record file
pub const DEFAULT_READERS_FILE: &str = "reader.dat";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory holding the record files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Book record file, relative to `data_dir` unless absolute
    #[serde(default = "default_books_file")]
    pub books_file: PathBuf,

    /// Reader record file, relative to `data_dir` unless absolute
    #[serde(default = "default_readers_file")]
    pub readers_file: PathBuf,

    /// Write logs here instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            books_file: default_books_file(),
            readers_file: default_readers_file(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (LIBRIS_DATA_DIR, LIBRIS_BOOKS_FILE, ...)
    /// 2. Config file (~/.config/libris/config.toml or LIBRIS_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_BOOKS_FILE", ENV_PREFIX)) {
            if !val.is_empty() {
                self.books_file = PathBuf::from(val);
            }
        }

        if let Ok(val) = std::env::var(format!("{}_READERS_FILE", ENV_PREFIX)) {
            if !val.is_empty() {
                self.readers_file = PathBuf::from(val);
            }
        }

        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with LIBRIS_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("libris")
            .join("config.toml")
    }

    /// Get the path to the book record file
    pub fn books_path(&self) -> PathBuf {
        self.data_dir.join(&self.books_file)
    }

    /// Get the path to the reader record file
    pub fn readers_path(&self) -> PathBuf {
        self.data_dir.join(&self.readers_file)
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("libris")
}

fn default_books_file() -> PathBuf {
    PathBuf::from(DEFAULT_BOOKS_FILE)
}

fn default_readers_file() -> PathBuf {
    PathBuf::from(DEFAULT_READERS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "LIBRIS_DATA_DIR",
        "LIBRIS_BOOKS_FILE",
        "LIBRIS_READERS_FILE",
        "LIBRIS_LOG_FILE",
        "LIBRIS_CONFIG",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.data_dir.ends_with("libris"));
        assert_eq!(config.books_file, PathBuf::from("book.dat"));
        assert_eq!(config.readers_file, PathBuf::from("reader.dat"));
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_record_paths() {
        let config = Config {
            data_dir: PathBuf::from("/srv/library"),
            ..Config::default()
        };

        assert_eq!(config.books_path(), PathBuf::from("/srv/library/book.dat"));
        assert_eq!(
            config.readers_path(),
            PathBuf::from("/srv/library/reader.dat")
        );
    }

    #[test]
    fn test_absolute_file_ignores_data_dir() {
        let config = Config {
            data_dir: PathBuf::from("/srv/library"),
            books_file: PathBuf::from("/backup/books.txt"),
            ..Config::default()
        };

        assert_eq!(config.books_path(), PathBuf::from("/backup/books.txt"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("LIBRIS_DATA_DIR", "/tmp/libris-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/libris-test"));
    }

    #[test]
    fn test_env_override_files() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("LIBRIS_BOOKS_FILE", "books.txt");
        env::set_var("LIBRIS_READERS_FILE", "");
        config.apply_env_overrides();

        assert_eq!(config.books_file, PathBuf::from("books.txt"));
        // Empty value keeps the current file name
        assert_eq!(config.readers_file, PathBuf::from("reader.dat"));
    }

    #[test]
    fn test_env_override_log_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("LIBRIS_LOG_FILE", "/tmp/libris.log");
        config.apply_env_overrides();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/libris.log")));

        // Empty string clears it
        env::set_var("LIBRIS_LOG_FILE", "");
        config.apply_env_overrides();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            books_file = "catalog.dat"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.books_file, PathBuf::from("catalog.dat"));
        assert_eq!(config.readers_file, PathBuf::from("reader.dat"));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: PathBuf::from("/data/libris"),
            books_file: PathBuf::from("books.txt"),
            readers_file: PathBuf::from("members.txt"),
            log_file: Some(PathBuf::from("/var/log/libris.log")),
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_with_cli_override(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let _guard = EnvGuard::new(ENV_VARS);

        assert!(Config::load_from_str("data_dir = [").is_err());
    }
}
