//! Runtime configuration: built-in defaults under the user's home directory,
//! an optional `config.toml` next to the data, then `LIBRARY_TRACKER_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File};
use directories::BaseDirs;
use serde::Deserialize;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-tracker";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
const LOG_DIR_NAME: &str = "logs";
const CONFIG_FILE_NAME: &str = "config.toml";
const ENV_PREFIX: &str = "LIBRARY_TRACKER";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub log_directory: PathBuf,
    /// Default `tracing` filter directive; `RUST_LOG` still wins.
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration rooted at `~/.library-tracker`.
    pub fn load() -> Result<Self> {
        let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Self::load_from(&base_dirs.home_dir().join(DATA_DIR_NAME))
    }

    /// Load configuration with defaults and the optional config file taken
    /// from `data_dir`.
    pub fn load_from(data_dir: &Path) -> Result<Self> {
        let database_path = data_dir.join(DB_FILE_NAME);
        let log_directory = data_dir.join(LOG_DIR_NAME);
        let config_file = data_dir.join(CONFIG_FILE_NAME);

        let config = Config::builder()
            .set_default("database_path", database_path.to_string_lossy().into_owned())?
            .set_default("log_directory", log_directory.to_string_lossy().into_owned())?
            .set_default("log_level", "info")?
            .add_source(File::from(config_file).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).prefix_separator("_"))
            .build()
            .context("failed to read configuration")?;

        config
            .try_deserialize()
            .context("invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "library-tracker-config-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults_live_under_the_data_dir() {
        let dir = scratch_dir("defaults");
        let config = AppConfig::load_from(&dir).unwrap();

        assert_eq!(config.database_path, dir.join(DB_FILE_NAME));
        assert_eq!(config.log_directory, dir.join(LOG_DIR_NAME));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = scratch_dir("file");
        fs::write(
            dir.join(CONFIG_FILE_NAME),
            "database_path = \"/tmp/shelf.sqlite\"\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&dir).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/shelf.sqlite"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_directory, dir.join(LOG_DIR_NAME));
    }
}
