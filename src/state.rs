use crate::config::AppConfig;
use crate::fetch::PageFetcher;
use crate::notify::Notifier;

/// Proximity matching parameters, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Chars kept on each side of a keyword occurrence.
    pub window_radius: usize,
    pub max_links: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window_radius: 1000,
            max_links: 2,
        }
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub keywords: Vec<String>,
    pub fetcher: PageFetcher,
    pub notifier: Notifier,
}

impl AppState {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            window_radius: self.config.window_radius,
            max_links: self.config.max_links,
        }
    }
}
