use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "findref";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "findref.log";

/// Environment variable that overrides the app data directory
pub const HOME_ENV: &str = "FINDREF_HOME";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Maximum number of items returned by an in-dataset search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Timeout for a single documentation page request
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// How long a downloaded page stays valid in the page cache
    #[serde(default = "default_http_cache_ttl_secs")]
    pub http_cache_ttl_secs: u64,

    /// Worker threads used while scraping pages.
    /// If 0, uses the number of CPU cores
    #[serde(default = "default_fetch_threads")]
    pub fetch_threads: usize,
}

fn default_search_limit() -> usize {
    50
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_http_cache_ttl_secs() -> u64 {
    7 * 24 * 3600
}

fn default_fetch_threads() -> usize {
    0 // 0 means use CPU count
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            http_timeout_secs: default_http_timeout_secs(),
            http_cache_ttl_secs: default_http_cache_ttl_secs(),
            fetch_threads: default_fetch_threads(),
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            let config: AppConfig = serde_json::from_str(&content)
                .context("Failed to parse config file")?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .context("Failed to write config file")?;
        Ok(())
    }

    /// Get the effective fetch thread count (resolves 0 to CPU count)
    pub fn effective_fetch_threads(&self) -> usize {
        if self.fetch_threads == 0 {
            num_cpus()
        } else {
            self.fetch_threads
        }
    }
}

/// Get the number of CPUs available
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the path to the log file
pub fn get_log_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(LOG_FILE))
}

/// Get the application data directory for storing indexes and caches
pub fn get_app_data_dir() -> Result<PathBuf> {
    let app_dir = match std::env::var_os(HOME_ENV) {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base = if cfg!(target_os = "macos") {
                dirs::home_dir()
                    .map(|h| h.join("Library").join("Application Support"))
            } else if cfg!(target_os = "windows") {
                dirs::data_local_dir()
            } else {
                // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
                dirs::data_dir()
            };

            let base = base.context("Could not determine app data directory")?;
            base.join(APP_NAME)
        }
    };

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Directory holding every dataset's index generations
pub fn get_indexes_dir() -> Result<PathBuf> {
    let dir = get_app_data_dir()?.join("indexes");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Working directory of one dataset (page cache, git checkouts)
pub fn get_dataset_dir(dataset: &str) -> Result<PathBuf> {
    let dir = get_app_data_dir()?.join("datasets").join(sanitize(dataset));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Keep a name usable as a single path component
pub fn sanitize(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(64)
        .collect();

    if sanitized.is_empty() {
        "unnamed".to_string()
    } else {
        sanitized
    }
}

/// Build a stable file name for a key that may contain any characters.
/// Format: sanitized prefix + hash of the full key
pub fn hashed_name(prefix: &str, key: &str) -> String {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();

    let prefix: String = sanitize(prefix).chars().take(24).collect();
    format!("{}-{:016x}", prefix, hash)
}

/// Size of a directory tree in bytes
pub fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut size = 0;
    if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                size += entry.metadata()?.len();
            } else if path.is_dir() {
                size += dir_size(&path)?;
            }
        }
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashed_name() {
        let a = hashed_name("boto3.amazonaws.com", "https://boto3.amazonaws.com/a.html");
        let b = hashed_name("boto3.amazonaws.com", "https://boto3.amazonaws.com/a.html");
        let c = hashed_name("boto3.amazonaws.com", "https://boto3.amazonaws.com/b.html");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("boto3_amazonaws_com-"));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("findref-boto3"), "findref-boto3");
        assert_eq!(sanitize("a/b c"), "a_b_c");
        assert_eq!(sanitize(""), "unnamed");
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.search_limit, 50);
        assert_eq!(config.fetch_threads, 0);
    }

    #[test]
    fn test_app_config_effective_fetch_threads() {
        let mut config = AppConfig::default();

        // 0 should resolve to CPU count
        assert!(config.effective_fetch_threads() >= 1);

        // Explicit value should be used as-is
        config.fetch_threads = 4;
        assert_eq!(config.effective_fetch_threads(), 4);
    }

    #[test]
    fn test_app_config_partial_json() {
        // Should use defaults for missing fields
        let json = r#"{"search_limit": 10}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.search_limit, 10);
        assert_eq!(config.http_timeout_secs, 30);
    }

    #[test]
    fn test_app_config_empty_json() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.search_limit, 50);
        assert_eq!(config.http_cache_ttl_secs, 7 * 24 * 3600);
    }
}
