use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for the HTTP existence probe (`[http]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Seconds allowed to establish the connection.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for the whole probe, including redirects.
    pub timeout_secs: u64,
    /// Follow `3xx` redirects before judging the status.
    pub follow_redirects: bool,
    /// Optional `User-Agent` header; libcurl sends none by default.
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 30,
            follow_redirects: true,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for the S3 client (`[s3]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    /// Signing region; S3-compatible servers usually accept any.
    pub region: String,
    pub connect_timeout_secs: u64,
    /// Seconds allowed per operation, retries included.
    pub timeout_secs: u64,
    /// Page size requested from ListObjectsV2.
    pub max_keys: u32,
    /// Attempts per request, counting the first (1 disables retries).
    pub max_attempts: u32,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            connect_timeout_secs: 15,
            timeout_secs: 60,
            max_keys: 1000,
            max_attempts: 3,
        }
    }
}

impl S3Config {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/locus/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocusConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub s3: S3Config,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("locus")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<LocusConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = LocusConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<LocusConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: LocusConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
