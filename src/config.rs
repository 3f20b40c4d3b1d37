use crate::db::Database;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CHAT_BASE_URL: &str = "http://192.168.0.119:5000";
pub const DEFAULT_IMAGE_BASE_URL: &str = "http://192.168.0.119:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const CHAT_URL_ENV: &str = "PHRASEBOX_CHAT_URL";
pub const IMAGE_URL_ENV: &str = "PHRASEBOX_IMAGE_URL";
pub const TIMEOUT_ENV: &str = "PHRASEBOX_TIMEOUT_SECS";
pub const DATA_DIR_ENV: &str = "PHRASEBOX_DATA_DIR";

/// Where the backend lives. Chat endpoints and the image endpoint are served
/// from different hosts, so each has its own base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub chat_base_url: String,
    pub image_base_url: String,
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            chat_base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl BackendConfig {
    /// Same host for every endpoint. Handy for local servers and tests.
    pub fn single_host(base_url: &str) -> Self {
        let base = trim_base(base_url);
        Self {
            chat_base_url: base.clone(),
            image_base_url: base,
            ..Self::default()
        }
    }

    pub fn resolve(db: &Database) -> Self {
        Self::resolve_with(db, |key| std::env::var(key).ok())
    }

    /// Environment first, then stored settings, then defaults.
    pub fn resolve_with(db: &Database, env: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |env_key: &str, setting_key: &str| -> Option<String> {
            env(env_key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| db.get_setting(setting_key).ok().flatten())
                .filter(|v| !v.trim().is_empty())
        };

        let chat_base_url = lookup(CHAT_URL_ENV, "chat_base_url")
            .map(|v| trim_base(&v))
            .unwrap_or_else(|| DEFAULT_CHAT_BASE_URL.to_string());
        let image_base_url = lookup(IMAGE_URL_ENV, "image_base_url")
            .map(|v| trim_base(&v))
            .unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string());
        let timeout_secs = match lookup(TIMEOUT_ENV, "request_timeout_secs") {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                tracing::warn!("ignoring invalid request timeout {:?}", raw);
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            chat_base_url,
            image_base_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Directory holding the local database.
pub fn data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .or_else(|| dirs::data_dir().map(|d| d.join("phrasebox")))
        .unwrap_or_else(|| PathBuf::from(".phrasebox"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_set() {
        let db = Database::in_memory().unwrap();
        let config = BackendConfig::resolve_with(&db, |_| None);
        assert_eq!(config, BackendConfig::default());
    }

    #[test]
    fn test_env_beats_settings_beats_default() {
        let db = Database::in_memory().unwrap();
        db.set_setting("chat_base_url", "http://settings:5000/").unwrap();
        db.set_setting("image_base_url", "http://settings:3000").unwrap();
        db.set_setting("request_timeout_secs", "5").unwrap();

        let config = BackendConfig::resolve_with(&db, |key| match key {
            CHAT_URL_ENV => Some("http://env:5000".to_string()),
            _ => None,
        });
        assert_eq!(config.chat_base_url, "http://env:5000");
        assert_eq!(config.image_base_url, "http://settings:3000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        let db = Database::in_memory().unwrap();
        db.set_setting("request_timeout_secs", "soon").unwrap();
        let config = BackendConfig::resolve_with(&db, |_| None);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_single_host_trims_slash() {
        let config = BackendConfig::single_host("http://127.0.0.1:8080/");
        assert_eq!(config.chat_base_url, "http://127.0.0.1:8080");
        assert_eq!(config.image_base_url, "http://127.0.0.1:8080");
    }
}
