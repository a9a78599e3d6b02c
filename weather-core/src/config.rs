use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_API_HOST: &str = "https://devapi.qweather.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LANG: &str = "zh";
pub const DEFAULT_HISTORY_DAYS: u32 = 4;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// api_host = "https://devapi.qweather.com"
/// timeout_secs = 10
/// ```
///
/// Every field is optional on disk; accessors fall back to the defaults above.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Language passed to the upstream for condition text, e.g. "zh" or "en".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// How many past days `/api/weather/history` covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_days: Option<u32>,
}

/// Values supplied on the command line or through the environment.
/// `Some` wins over whatever the config file holds.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    pub timeout_secs: Option<u64>,
    pub history_days: Option<u32>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-proxy", "weather-proxy")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(key) = overrides.api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(host) = overrides.api_host.filter(|h| !h.trim().is_empty()) {
            self.api_host = Some(host);
        }
        if overrides.timeout_secs.is_some() {
            self.timeout_secs = overrides.timeout_secs;
        }
        if overrides.history_days.is_some() {
            self.history_days = overrides.history_days;
        }
    }

    /// The API credential. Its absence is fatal for anything that talks to the upstream.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: set QWEATHER_API_KEY or run `weather-proxy configure`."
                )
            })
    }

    /// Upstream base URL without a trailing slash.
    pub fn api_host(&self) -> &str {
        self.api_host
            .as_deref()
            .map(|h| h.trim().trim_end_matches('/'))
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_API_HOST)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or(DEFAULT_LANG)
    }

    pub fn history_days(&self) -> u32 {
        self.history_days.unwrap_or(DEFAULT_HISTORY_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = Config { api_key: Some("   ".into()), ..Config::default() };
        assert!(cfg.api_key().is_err());
    }

    #[test]
    fn defaults_apply_when_fields_absent() {
        let cfg = Config::default();

        assert_eq!(cfg.api_host(), DEFAULT_API_HOST);
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.lang(), "zh");
        assert_eq!(cfg.history_days(), 4);
    }

    #[test]
    fn api_host_drops_trailing_slash() {
        let cfg = Config { api_host: Some("http://localhost:9000/".into()), ..Config::default() };
        assert_eq!(cfg.api_host(), "http://localhost:9000");
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut cfg = Config {
            api_key: Some("FILE_KEY".into()),
            api_host: Some("https://file.example".into()),
            history_days: Some(7),
            ..Config::default()
        };

        cfg.apply(Overrides {
            api_key: Some("ENV_KEY".into()),
            api_host: None,
            timeout_secs: Some(3),
            history_days: None,
        });

        assert_eq!(cfg.api_key().unwrap(), "ENV_KEY");
        assert_eq!(cfg.api_host(), "https://file.example");
        assert_eq!(cfg.timeout(), Duration::from_secs(3));
        assert_eq!(cfg.history_days(), 7);
    }

    #[test]
    fn empty_override_does_not_clear_file_key() {
        let mut cfg = Config { api_key: Some("FILE_KEY".into()), ..Config::default() };
        cfg.apply(Overrides { api_key: Some(String::new()), ..Overrides::default() });

        assert_eq!(cfg.api_key().unwrap(), "FILE_KEY");
    }

    #[test]
    fn save_then_load_preserves_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            api_host: Some("https://example.test".into()),
            timeout_secs: Some(5),
            lang: Some("en".into()),
            history_days: None,
        };
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_loads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(loaded, Config::default());
    }
}
