//! Page fetching with an on-disk cache, and shallow git checkouts.

use crate::utils::{AppConfig, hashed_name};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

const USER_AGENT: &str = concat!("findref/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client that keeps page bodies on disk for `ttl`
pub struct HttpCache {
    client: Client,
    dir: PathBuf,
    ttl: Duration,
}

impl HttpCache {
    pub fn new(dir: PathBuf, config: &AppConfig) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create page cache {}", dir.display()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            dir,
            ttl: Duration::from_secs(config.http_cache_ttl_secs),
        })
    }

    /// GET `url`, served from the cache unless `refresh` is set or the entry expired
    pub fn get(&self, url: &str, refresh: bool) -> Result<String> {
        let path = self.entry_path(url);

        if !refresh && let Some(body) = self.read_fresh(&path) {
            debug!(url, "page cache hit");
            return Ok(body);
        }

        debug!(url, "fetching page");
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .with_context(|| format!("Failed to fetch {url}"))?;

        fs::write(&path, &body)
            .with_context(|| format!("Failed to cache {url} at {}", path.display()))?;
        Ok(body)
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        let host = url
            .split("://")
            .nth(1)
            .and_then(|rest| rest.split('/').next())
            .unwrap_or("page");
        self.dir.join(format!("{}.html", hashed_name(host, url)))
    }

    fn read_fresh(&self, path: &Path) -> Option<String> {
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
        let age = SystemTime::now().duration_since(modified).unwrap_or_default();
        if age >= self.ttl {
            return None;
        }
        fs::read_to_string(path).ok()
    }
}

/// Shallow-clone `url` into `dest`. With `refresh`, an existing checkout is replaced;
/// otherwise it is reused as-is.
pub fn git_clone_shallow(url: &str, dest: &Path, refresh: bool) -> Result<()> {
    if dest.exists() {
        if !refresh {
            debug!(url, dest = %dest.display(), "reusing checkout");
            return Ok(());
        }
        fs::remove_dir_all(dest)
            .with_context(|| format!("Failed to remove old checkout {}", dest.display()))?;
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    info!(url, "cloning documentation repository");
    let output = Command::new("git")
        .args(["clone", "--depth", "1", "--quiet", url])
        .arg(dest)
        .output()
        .context("Failed to run git (is it installed?)")?;

    if !output.status.success() {
        // Don't leave a partial checkout that would be reused next time
        let _ = fs::remove_dir_all(dest);
        anyhow::bail!(
            "git clone {} failed: {}",
            url,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(())
}
