//! Unknown-hash candidate list: download and local cache
//!
//! The list is re-downloaded when the cache is missing or older than the
//! configured max age. A failed download is not fatal; whatever is cached
//! (possibly nothing) is used instead.

use reqwest::Client;

use crate::config::ListfileConfig;
use crate::error::{Result, SearchError};

pub struct ListfileCache {
    config: ListfileConfig,
    http: Client,
}

impl ListfileCache {
    pub fn new(config: ListfileConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Missing, unreadable, or older than the max age
    pub fn is_stale(&self) -> bool {
        if self.config.max_age.is_zero() {
            return true;
        }
        let modified = match std::fs::metadata(&self.config.cache_path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => return true,
        };
        // A timestamp in the future counts as fresh
        modified
            .elapsed()
            .map(|age| age >= self.config.max_age)
            .unwrap_or(false)
    }

    /// Download the list and overwrite the cache
    pub async fn refresh(&self) -> Result<()> {
        let unavailable = |reason: String| SearchError::SourceUnavailable {
            url: self.config.url.clone(),
            reason,
        };

        let resp = self
            .http
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(unavailable(format!("HTTP {}", resp.status().as_u16())));
        }

        let body = resp.bytes().await.map_err(|e| unavailable(e.to_string()))?;
        tokio::fs::write(&self.config.cache_path, &body).await?;

        tracing::info!(
            path = %self.config.cache_path.display(),
            bytes = body.len(),
            "Downloaded unknown listfile"
        );
        Ok(())
    }

    /// Lines of the cached list, or nothing if there is no cache
    pub fn load_lines(&self) -> Result<Vec<String>> {
        if !self.config.cache_path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read(&self.config.cache_path)?;
        Ok(String::from_utf8_lossy(&data)
            .lines()
            .map(str::to_string)
            .collect())
    }

    /// Refresh if stale (tolerating failure), then read the cache
    pub async fn fetch(&self) -> Result<Vec<String>> {
        if self.is_stale() {
            if let Err(e) = self.refresh().await {
                tracing::warn!(error = %e, "Continuing with cached listfile");
            }
        }

        let lines = self.load_lines()?;
        tracing::info!(
            path = %self.config.cache_path.display(),
            lines = lines.len(),
            "Loaded unknown listfile"
        );
        Ok(lines)
    }
}
