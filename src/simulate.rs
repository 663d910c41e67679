//! In-memory rehearsal of a full watcher run.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use autoquality_config::Config;
use autoquality_core::memory::{MemoryPage, MockPlayer};
use autoquality_core::{
    ActivationWatcher, LabelMatcher, MenuAccessor, RetrySchedule, SelectionOrchestrator,
    SelectionSession, WatchReport,
};
use tracing::{info, warn};

pub(crate) const DEFAULT_LABELS: &[&str] = &["1080p60", "720p60", "480p", "360p", "160p", "Auto"];

/// Time after which the simulated menu mounts, so that it is first seen at
/// retry step `step` (1-based). Step 0 mounts immediately; a step past the
/// end of the schedule mounts after the retry budget, leaving it to the
/// mutation signal.
pub(crate) fn mount_delay(schedule: &RetrySchedule, step: usize) -> Duration {
    if step == 0 {
        return Duration::ZERO;
    }
    let delays: Vec<Duration> = schedule.iter().collect();
    if step > delays.len() {
        return schedule.budget() + Duration::from_millis(200);
    }
    let reached: Duration = delays[..step].iter().sum();
    reached.saturating_sub(delays[step - 1] / 2)
}

pub(crate) async fn run(config: &Config, delay_step: usize, labels: &[String]) -> Result<WatchReport> {
    let schedule = config.selection.retry_schedule();
    let delay = mount_delay(&schedule, delay_step);
    info!(?delay, labels = ?labels, "Simulating player");

    let page = MemoryPage::new();
    let player = MockPlayer::new(page.clone(), labels).with_mount_delay(delay);
    player.install();

    let dom = Arc::new(page.clone());
    let locator = Arc::new(config.locator.to_locator());
    let orchestrator = SelectionOrchestrator::new(
        MenuAccessor::new(dom.clone(), locator),
        LabelMatcher::new(config.selection.preference_list()),
        schedule.clone(),
        Arc::new(SelectionSession::new()),
    );
    let watcher = ActivationWatcher::new(Arc::new(orchestrator), dom);

    let limit = delay.max(schedule.budget()) + Duration::from_secs(1);
    let report = match tokio::time::timeout(limit, watcher.run()).await {
        Ok(report) => report?,
        Err(_) => {
            warn!("Nothing selected within {:?}", limit);
            watcher.cleanup().await;
            let session = watcher.orchestrator().session();
            WatchReport {
                selected: session.selected(),
                attempts: session.attempts(),
                ..WatchReport::default()
            }
        }
    };

    if let Some(clicked) = player.selected() {
        info!(clicked = %clicked, "Player switched quality");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_delay_lands_inside_requested_step() {
        let schedule = RetrySchedule::default();
        assert_eq!(mount_delay(&schedule, 0), Duration::ZERO);
        // 0 + 30 + 80 reached at step 3, mounted halfway through its wait.
        assert_eq!(mount_delay(&schedule, 3), Duration::from_millis(70));
        assert_eq!(mount_delay(&schedule, 6), Duration::from_millis(860));
        assert_eq!(mount_delay(&schedule, 7), Duration::from_millis(1360));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulation_selects_within_retries() {
        let labels: Vec<String> = DEFAULT_LABELS.iter().map(|l| l.to_string()).collect();
        let report = run(&Config::default(), 3, &labels).await.unwrap();
        assert_eq!(report.selected, Some("1080p60".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulation_late_menu_selected_on_mutation() {
        let labels = vec!["720p".to_string(), "Auto".to_string()];
        let report = run(&Config::default(), 9, &labels).await.unwrap();
        assert_eq!(report.selected, Some("720p".into()));
        assert!(report.mutations > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulation_without_match_reports_nothing() {
        let labels = vec!["4K Ultra".to_string()];
        let report = run(&Config::default(), 1, &labels).await.unwrap();
        assert_eq!(report.selected, None);
    }
}
