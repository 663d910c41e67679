//! Tab discovery: attach a page runner to every matching tab.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use autoquality_cdp::{CdpClient, PageInfo};
use autoquality_config::{BrowserConfig, Config};
use autoquality_core::CancellationToken;
use parking_lot::Mutex;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::page_runner::PageRunner;

/// Pages that should get a runner: matching tabs not already watched.
pub(crate) fn select_new_pages(
    pages: Vec<PageInfo>,
    browser: &BrowserConfig,
    watched: &HashSet<String>,
) -> Vec<PageInfo> {
    pages
        .into_iter()
        .filter(|p| p.is_page() && browser.matches_url(&p.url) && !watched.contains(&p.id))
        .collect()
}

/// Connect to the browser and watch matching tabs until `shutdown` fires.
pub(crate) async fn run(config: Arc<Config>, shutdown: CancellationToken) -> Result<()> {
    let endpoint = config.browser.endpoint.clone();
    let client = Arc::new(
        CdpClient::connect(&endpoint)
            .await
            .with_context(|| format!("Failed to connect to {}", endpoint))?,
    );
    info!("Connected to {}", client.browser_ws_url());

    let runner = Arc::new(PageRunner::new(client.clone(), config.clone(), shutdown.clone()));
    let watched: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
    let mut tasks = JoinSet::new();

    let mut ticker = tokio::time::interval(config.browser.discovery_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let result = loop {
        tokio::select! {
            _ = shutdown.cancelled() => break Ok(()),
            _ = ticker.tick() => {
                if !client.is_connected() {
                    break Err(anyhow::anyhow!("Browser connection lost"));
                }
                let pages = match client.list_pages().await {
                    Ok(pages) => pages,
                    Err(e) => {
                        warn!("Failed to list pages: {}", e);
                        continue;
                    }
                };
                let fresh = select_new_pages(pages, &config.browser, &watched.lock());
                for page in fresh {
                    watched.lock().insert(page.id.clone());
                    let runner = runner.clone();
                    let watched = watched.clone();
                    tasks.spawn(async move {
                        if let Err(e) = runner.run(&page).await {
                            warn!(target_id = %page.id, "Page runner failed: {}", e);
                        }
                        watched.lock().remove(&page.id);
                    });
                }
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = joined {
                    warn!("Page runner task failed: {}", e);
                }
            }
        }
    };

    shutdown.cancel();
    while tasks.join_next().await.is_some() {}
    debug!("All page runners stopped");
    result
}

/// Reject configurations the run loop cannot work with.
pub(crate) fn ensure_runnable(config: &Config) -> Result<()> {
    if config.browser.match_urls.is_empty() {
        bail!("No page URL prefixes configured; nothing to watch");
    }
    Ok(())
}
