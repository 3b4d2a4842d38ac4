use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Transfer settings, loaded from `~/.config/mfetch/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum time to establish a connection, in seconds.
    pub connect_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes per second...
    pub low_speed_limit_bytes: u32,
    /// ...for this many seconds.
    pub low_speed_time_secs: u64,
    /// `User-Agent` sent with HTTP requests.
    pub user_agent: String,
    /// When true, a transport failure while fetching an entry aborts the whole
    /// run. When false it is recorded as a per-entry fetch error and the batch
    /// continues.
    pub abort_on_fetch_error: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            user_agent: format!("mfetch/{}", env!("CARGO_PKG_VERSION")),
            abort_on_fetch_error: true,
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn low_speed_time(&self) -> Duration {
        Duration::from_secs(self.low_speed_time_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: FetchConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = FetchConfig::default();
        assert_eq!(cfg.connect_timeout_secs, 30);
        assert_eq!(cfg.low_speed_limit_bytes, 1024);
        assert_eq!(cfg.low_speed_time(), Duration::from_secs(60));
        assert!(cfg.user_agent.starts_with("mfetch/"));
        assert!(cfg.abort_on_fetch_error);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: FetchConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let toml = r#"
            connect_timeout_secs = 5
            abort_on_fetch_error = false
        "#;
        let cfg: FetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(5));
        assert!(!cfg.abort_on_fetch_error);
        assert_eq!(cfg.low_speed_limit_bytes, 1024);
        assert_eq!(cfg.low_speed_time_secs, 60);
    }

    #[test]
    fn config_toml_empty_is_default() {
        let cfg: FetchConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, FetchConfig::default());
    }
}
