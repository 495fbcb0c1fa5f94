//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use storedesk_builder::Node;
use storedesk_store::{DocumentStore, Store};

use crate::config::{CliConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Collection the page trees are stored under.
pub const PAGE_COLLECTION: &str = "page";

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = load_config(config_path, &cwd)?;

        Ok(Self { config, output, cwd })
    }

    /// Open the page store in the configured data directory.
    pub fn pages(&self) -> Result<DocumentStore<Node>> {
        let dir = self.resolve_path(&self.config.store.data_dir);
        let store = Store::open_dir(&dir)
            .with_context(|| format!("Failed to open page store: {}", dir.display()))?;
        Ok(DocumentStore::new(store, PAGE_COLLECTION))
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

/// Load the explicit config file, else the nearest discovered one.
///
/// Only a missing file falls back to defaults; a file that fails to parse
/// is an error.
pub fn load_config(config_path: Option<&str>, cwd: &Path) -> Result<CliConfig> {
    if let Some(path) = config_path {
        return CliConfig::load(path);
    }
    match find_config_file(cwd) {
        Some(path) => CliConfig::load(&path.to_string_lossy()),
        None => Ok(CliConfig::default()),
    }
}

/// Find the nearest config file walking up from `start`.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_FILE_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".storedesk.toml"), "").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            find_config_file(&nested),
            Some(dir.path().join(".storedesk.toml"))
        );
    }

    #[test]
    fn test_toml_preferred_over_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("storedesk.json"), "{}").unwrap();
        std::fs::write(dir.path().join("storedesk.toml"), "").unwrap();

        assert_eq!(
            find_config_file(dir.path()),
            Some(dir.path().join("storedesk.toml"))
        );
    }

    #[test]
    fn test_discovered_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("storedesk.toml"), "[pos]\nregister = \"back\"\n").unwrap();

        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.pos.register, "back");
    }

    #[test]
    fn test_broken_discovered_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("storedesk.toml"), "[pos\ncurrency = \"EUR\"\n").unwrap();

        let err = load_config(None, dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse TOML config"));
    }

    #[test]
    fn test_resolve_path() {
        let ctx = Context {
            config: CliConfig::default(),
            output: Output::new(false, true),
            cwd: PathBuf::from("/work"),
        };
        assert_eq!(ctx.resolve_path("pages"), PathBuf::from("/work/pages"));
        assert_eq!(ctx.resolve_path("/abs"), PathBuf::from("/abs"));
    }
}
