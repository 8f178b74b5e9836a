mod config;
mod fetch;
mod keywords;
mod notify;
mod pipeline;
mod scan;
mod state;

use anyhow::Context;
use tracing::{info, Level};

use config::{env_flag, AppConfig};
use fetch::PageFetcher;
use notify::Notifier;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load env
    let _ = dotenv::dotenv();

    let level = if env_flag("NOTIFIER_DEBUG") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    // Everything that can be misconfigured is checked before the first request.
    let config_path = AppConfig::path_from_env();
    let config = AppConfig::load(&config_path)?;
    info!(
        path = %config_path.display(),
        pages = config.web_addresses.len(),
        max_links = config.max_links,
        window_radius = config.window_radius,
        "Config loaded"
    );

    let keywords = keywords::load(&config)?;

    let dry_run = env_flag("NOTIFIER_DRY_RUN");
    let notifier = Notifier::from_env(&config.subject_prefix, dry_run)
        .context("Notification settings are incomplete")?;
    if dry_run {
        info!("Dry run: notices will be logged, not mailed");
    }

    let fetcher = PageFetcher::new(&config)?;

    let state = AppState {
        config,
        keywords,
        fetcher,
        notifier,
    };

    let summary = pipeline::run(&state).await;
    info!(?summary, "Run finished");

    Ok(())
}
