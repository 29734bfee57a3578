//! Config file loading and resolution against command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;
use tasklist_core::config::DEFAULT_TABLE;
use tasklist_core::StoreConfig;

use crate::cli::Cli;

/// Contents of `config.toml`. Every field is optional; flags win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
}

/// Everything the binary needs after flags, env and file are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store: StoreConfig,
    pub log_file: PathBuf,
    pub timeout_secs: Option<u64>,
}

pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasklist")
}

pub fn default_config_path() -> PathBuf {
    app_dir().join("config.toml")
}

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("tasklist")
        .join("tasklist.log")
}

/// Read a config file. A missing file is an empty config; a file that
/// exists but does not parse is an error.
pub fn load_file(path: &Path) -> anyhow::Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
}

pub fn resolve(cli: &Cli, file: FileConfig) -> anyhow::Result<Settings> {
    let Some(url) = cli.url.clone().or(file.store.url) else {
        bail!(
            "no store URL: pass --url, set TASKLIST_URL, or add `url` under [store] in {}",
            default_config_path().display()
        );
    };
    let store = StoreConfig {
        url,
        api_key: cli.key.clone().or(file.store.api_key),
        table: cli
            .table
            .clone()
            .or(file.store.table)
            .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
    };
    Ok(Settings {
        store,
        log_file: cli
            .log_file
            .clone()
            .or(file.log_file)
            .unwrap_or_else(default_log_path),
        timeout_secs: cli.timeout_secs.or(file.timeout_secs),
    })
}

pub fn load(cli: &Cli) -> anyhow::Result<Settings> {
    let path = cli.config.clone().unwrap_or_else(default_config_path);
    let file = load_file(&path)?;
    resolve(cli, file)
}
