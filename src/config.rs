use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

/// Root configuration structure, deserialized from `.license-fixr/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Remote lookup settings.
    #[serde(default)]
    pub github: GithubConfig,
    /// License template settings.
    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Settings for the repository license lookup stage.
#[derive(Debug, Deserialize)]
pub struct GithubConfig {
    /// Contents-API root. Overridable for GitHub Enterprise hosts.
    #[serde(default = "default_api_root")]
    pub api_root: String,
    /// Fallback access token when `--auth` is not passed.
    #[serde(default)]
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How many packages are looked up concurrently.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// License template settings.
#[derive(Debug, Default, Deserialize)]
pub struct TemplatesConfig {
    /// Directory of `<identifier>.txt` template files replacing the bundled set.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_api_root() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_batch_size() -> usize {
    75
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            api_root: default_api_root(),
            token: None,
            timeout_secs: default_timeout_secs(),
            batch_size: default_batch_size(),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `./.license-fixr/config.toml`
/// 3. `~/.config/license-fixr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)?;
        return Ok(toml::from_str(&content)?);
    }

    let project_config = Path::new(".license-fixr").join("config.toml");
    if project_config.exists() {
        let content = std::fs::read_to_string(&project_config)?;
        return Ok(toml::from_str(&content)?);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-fixr")
            .join("config.toml");
        if home_config.exists() {
            let content = std::fs::read_to_string(&home_config)?;
            return Ok(toml::from_str(&content)?);
        }
    }

    Ok(Config::default())
}
