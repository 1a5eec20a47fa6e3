use anyhow::Context;
use courtside_api::client::DEFAULT_BASE_URL;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_POLL_SECS: u64 = 5;

/// On-disk shape of `config.json`. Every field is optional.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_screen: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_url: String,
    pub poll_interval: Duration,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Where exported scoresheets are written.
    pub export_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: Some(LevelFilter::Info),
            api_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            username: None,
            password: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl AppSettings {
    /// Config file first, then `COURTSIDE_*` environment overrides.
    pub fn load() -> Self {
        let file = match read_config_file(&config_path()) {
            Ok(file) => file,
            Err(e) => {
                // The logger is not up yet; keep going with defaults.
                eprintln!("courtside: ignoring config file: {e:#}");
                None
            }
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    pub fn from_sources(file: Option<ConfigFile>, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        let file = file.unwrap_or_default();
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = env("COURTSIDE_API_URL").or(file.api_url) {
            settings.api_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = env("COURTSIDE_POLL_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .or(file.poll_secs)
            .filter(|s| *s > 0)
        {
            settings.poll_interval = Duration::from_secs(secs);
        }
        if let Some(level) = env("COURTSIDE_LOG").or(file.log_level) {
            settings.log_level = LevelFilter::from_str(level.trim()).ok().or(settings.log_level);
        }
        settings.full_screen = file.full_screen.unwrap_or(false);
        settings.username = env("COURTSIDE_USER").or(file.username);
        settings.password = env("COURTSIDE_PASSWORD").or(file.password);
        if let Some(dir) = env("COURTSIDE_EXPORT_DIR").or(file.export_dir) {
            settings.export_dir = PathBuf::from(dir.trim());
        }
        settings
    }

    pub fn credentials(&self) -> Option<(String, String)> {
        Some((self.username.clone()?, self.password.clone()?))
    }

    /// Persist the UI preferences. Credentials and env overrides stay where they came from.
    pub fn save_preferences(&self) -> anyhow::Result<()> {
        self.save_preferences_to(&config_path())
    }

    fn save_preferences_to(&self, path: &Path) -> anyhow::Result<()> {
        let mut file = read_config_file(path)?.unwrap_or_default();
        file.full_screen = Some(self.full_screen);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let payload = serde_json::to_string_pretty(&file).context("serializing config")?;
        std::fs::write(path, payload).with_context(|| format!("writing {}", path.display()))
    }
}

fn read_config_file(path: &Path) -> anyhow::Result<Option<ConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let file = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid config json", path.display()))?;
    Ok(Some(file))
}

pub fn config_path() -> PathBuf {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join("courtside").join("config.json");
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home)
            .join(".config")
            .join("courtside")
            .join("config.json");
    }
    PathBuf::from("courtside.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_any_source() {
        let settings = AppSettings::from_sources(None, env_of(&[]));
        assert_eq!(settings.api_url, DEFAULT_BASE_URL);
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.log_level, Some(LevelFilter::Info));
        assert!(settings.credentials().is_none());
        assert_eq!(settings.export_dir, PathBuf::from("."));
    }

    #[test]
    fn env_overrides_file() {
        let file: ConfigFile = serde_json::from_str(
            r#"{"api_url": "http://scores.local/api/", "poll_secs": 10, "log_level": "warn",
                "full_screen": true, "username": "umpire"}"#,
        )
        .unwrap();
        let settings = AppSettings::from_sources(
            Some(file),
            env_of(&[
                ("COURTSIDE_POLL_SECS", "2"),
                ("COURTSIDE_LOG", "debug"),
                ("COURTSIDE_PASSWORD", "secret"),
                ("COURTSIDE_EXPORT_DIR", "/tmp/sheets"),
            ]),
        );
        assert_eq!(settings.api_url, "http://scores.local/api");
        assert_eq!(settings.poll_interval, Duration::from_secs(2));
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
        assert!(settings.full_screen);
        assert_eq!(
            settings.credentials(),
            Some(("umpire".to_string(), "secret".to_string()))
        );
        assert_eq!(settings.export_dir, PathBuf::from("/tmp/sheets"));
    }

    #[test]
    fn bad_values_keep_defaults() {
        let settings = AppSettings::from_sources(
            None,
            env_of(&[("COURTSIDE_POLL_SECS", "0"), ("COURTSIDE_LOG", "loud"), ("COURTSIDE_USER", " ")]),
        );
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.log_level, Some(LevelFilter::Info));
        assert_eq!(settings.username, None);
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("courtside-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn save_preferences_keeps_other_fields() {
        let dir = scratch_dir("prefs");
        let path = dir.join("config.json");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, r#"{"api_url": "http://scores.local/api", "username": "umpire"}"#)
            .unwrap();

        let settings = AppSettings { full_screen: true, ..AppSettings::default() };
        settings.save_preferences_to(&path).unwrap();

        let file = read_config_file(&path).unwrap().unwrap();
        assert_eq!(file.full_screen, Some(true));
        assert_eq!(file.username.as_deref(), Some("umpire"));
        assert_eq!(file.api_url.as_deref(), Some("http://scores.local/api"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn broken_config_names_the_file() {
        let dir = scratch_dir("broken");
        let path = dir.join("config.json");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_config_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.json is not valid config json"));
        assert!(read_config_file(&dir.join("missing.json")).unwrap().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
