use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings read from the JSON config file. Secrets stay in the environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listing pages to scan, in order.
    pub web_addresses: Vec<String>,
    pub keywords: Vec<String>,
    /// One keyword per line; merged after `keywords`.
    pub keywords_file: Option<PathBuf>,
    pub max_links: usize,
    pub window_radius: usize,
    pub browser_user_agent: Option<String>,
    pub subject_prefix: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web_addresses: Vec::new(),
            keywords: Vec::new(),
            keywords_file: None,
            max_links: 2,
            window_radius: 1000,
            browser_user_agent: None,
            subject_prefix: "[Hibrain] ".to_string(),
            max_retries: 3,
            retry_delay_ms: 1500,
            request_timeout_secs: 15,
        }
    }
}

impl AppConfig {
    /// Config file location: `NOTIFIER_CONFIG`, else `config.json`.
    pub fn path_from_env() -> PathBuf {
        dotenv::var("NOTIFIER_CONFIG")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_json(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        // Keyword files are relative to the config file.
        if let (Some(file), Some(dir)) = (&config.keywords_file, path.parent()) {
            if file.is_relative() {
                config.keywords_file = Some(dir.join(file));
            }
        }
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.web_addresses.iter().all(|u| u.trim().is_empty()) {
            bail!("web_addresses must list at least one page");
        }
        if self.max_links == 0 {
            bail!("max_links must be at least 1");
        }
        if self.max_retries == 0 {
            bail!("max_retries must be at least 1");
        }
        Ok(())
    }

    pub fn user_agent(&self) -> &str {
        self.browser_user_agent
            .as_deref()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Truthy environment flag (`1`, `true`, `yes`, `on`).
pub fn env_flag(name: &str) -> bool {
    dotenv::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
