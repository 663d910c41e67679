//! End-to-end watcher scenarios against the in-memory player.

use std::sync::Arc;
use std::time::Duration;

use autoquality_core::memory::{ElementSpec, MemoryPage, MockPlayer};
use autoquality_core::{
    ActivationWatcher, CssLocator, LabelMatcher, MenuAccessor, RetrySchedule, SelectionOrchestrator,
    SelectionSession, WatchReport,
};

type Watcher = ActivationWatcher<MemoryPage, MemoryPage>;

fn build_watcher(page: &MemoryPage) -> Arc<Watcher> {
    let dom = Arc::new(page.clone());
    let accessor = MenuAccessor::new(dom.clone(), Arc::new(CssLocator::default()));
    let orchestrator = SelectionOrchestrator::new(
        accessor,
        LabelMatcher::default(),
        RetrySchedule::default(),
        Arc::new(SelectionSession::new()),
    );
    Arc::new(ActivationWatcher::new(Arc::new(orchestrator), dom))
}

fn spawn_watcher(watcher: &Arc<Watcher>) -> tokio::task::JoinHandle<WatchReport> {
    let watcher = watcher.clone();
    tokio::spawn(async move { watcher.run().await.unwrap() })
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

#[tokio::test(start_paused = true)]
async fn test_initial_attempt_selects_open_menu() {
    let page = MemoryPage::new();
    let player = MockPlayer::new(page.clone(), &["1080p60", "720p", "Auto"]);
    player.install();
    player.open_now();

    let watcher = build_watcher(&page);
    let report = spawn_watcher(&watcher).await.unwrap();

    assert_eq!(report.selected, Some("1080p60".into()));
    assert_eq!(report.attempts, 1);
    assert_eq!(player.selections(), vec!["1080p60"]);
    assert!(!watcher.is_active());
    assert_eq!(page.observer_count(), 0);
    assert_eq!(page.play_listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_menu_mounting_triggers_selection() {
    let page = MemoryPage::new();
    let player = MockPlayer::new(page.clone(), &["720p", "480p", "Auto"]);

    let watcher = build_watcher(&page);
    let task = spawn_watcher(&watcher);
    settle().await;
    assert!(watcher.is_active());

    // Controls appearing is not enough on its own: no menu container yet.
    player.install();
    settle().await;
    assert!(player.selections().is_empty());
    assert_eq!(page.click_count(), 0);

    player.open_now();
    let report = task.await.unwrap();
    assert_eq!(report.selected, Some("720p".into()));
    assert!(report.mutations >= 2);
    assert_eq!(player.selections(), vec!["720p"]);
}

#[tokio::test(start_paused = true)]
async fn test_playback_start_opens_menu() {
    let page = MemoryPage::new();
    let player = MockPlayer::new(page.clone(), &["480p", "360p"]);

    let watcher = build_watcher(&page);
    let task = spawn_watcher(&watcher);
    settle().await;

    player.install();
    settle().await;
    page.fire_play();

    let report = task.await.unwrap();
    assert_eq!(report.selected, Some("480p".into()));
    assert_eq!(report.plays, 1);
    assert_eq!(report.attempts, 2);
}

#[tokio::test(start_paused = true)]
async fn test_plays_during_attempt_fold_into_one_followup() {
    let page = MemoryPage::new();
    let player = MockPlayer::new(page.clone(), &["720p", "Auto"])
        .with_mount_delay(Duration::from_secs(60));
    player.install();

    let watcher = build_watcher(&page);
    let task = spawn_watcher(&watcher);

    // The initial pass has opened the trigger and is still retrying.
    tokio::time::sleep(Duration::from_millis(10)).await;
    page.fire_play();
    page.fire_play();
    page.fire_play();

    tokio::time::sleep(Duration::from_secs(5)).await;
    let session = watcher.orchestrator().session().clone();
    assert_eq!(session.attempts(), 2);
    // Opened once; the follow-up saw the trigger already expanded.
    assert_eq!(page.click_count(), 1);
    assert!(player.is_expanded());

    watcher.cleanup().await;
    let report = task.await.unwrap();
    assert_eq!(report.plays, 3);
    assert_eq!(report.attempts, 2);
    assert_eq!(report.selected, None);
}

#[tokio::test(start_paused = true)]
async fn test_mutation_lookups_release_handles() {
    let page = MemoryPage::new();

    let watcher = build_watcher(&page);
    let task = spawn_watcher(&watcher);
    settle().await;
    // Initial pass found no trigger.
    let after_initial = page.release_count();
    assert_eq!(after_initial, 1);

    // No menu is mounted, so the mutation only costs a container lookup.
    page.append(page.body(), ElementSpec::new("div").class("ad"));
    settle().await;
    assert_eq!(page.release_count(), after_initial + 1);
    assert_eq!(watcher.orchestrator().session().attempts(), 1);

    watcher.cleanup().await;
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_delayed_menu_within_retry_budget() {
    let page = MemoryPage::new();
    let player = MockPlayer::new(page.clone(), &["1080p60", "720p", "Auto"])
        .with_mount_delay(Duration::from_millis(100));
    player.install();

    let watcher = build_watcher(&page);
    let report = spawn_watcher(&watcher).await.unwrap();

    assert_eq!(report.selected, Some("1080p60".into()));
    assert_eq!(report.attempts, 1);
    assert_eq!(player.selections(), vec!["1080p60"]);
    assert_eq!(watcher.orchestrator().session().attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_activity_after_done() {
    let page = MemoryPage::new();
    let player = MockPlayer::new(page.clone(), &["720p", "Auto"]);
    player.install();
    player.open_now();

    let watcher = build_watcher(&page);
    spawn_watcher(&watcher).await.unwrap();
    let clicks = page.click_count();
    let attempts = watcher.orchestrator().session().attempts();

    page.fire_play();
    player.unmount_menu();
    player.mount_menu();
    page.append(page.body(), ElementSpec::new("video"));
    page.fire_play();
    settle().await;

    assert_eq!(page.click_count(), clicks);
    assert_eq!(watcher.orchestrator().session().attempts(), attempts);
    assert_eq!(player.selections(), vec!["720p"]);
    assert_eq!(page.observer_count(), 0);
    assert_eq!(page.play_listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_external_cleanup_stops_watcher() {
    let page = MemoryPage::new();
    let watcher = build_watcher(&page);
    let task = spawn_watcher(&watcher);
    settle().await;
    assert_eq!(page.observer_count(), 1);

    watcher.cleanup().await;
    watcher.cleanup().await;
    let report = task.await.unwrap();

    assert_eq!(report.selected, None);
    assert!(!watcher.is_active());
    assert_eq!(page.observer_count(), 0);
    assert_eq!(page.play_listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_auto_only_menu() {
    let page = MemoryPage::new();
    let player = MockPlayer::new(page.clone(), &["Auto"]);
    player.install();
    player.open_now();

    let report = spawn_watcher(&build_watcher(&page)).await.unwrap();
    assert_eq!(report.selected, Some("Auto".into()));
}
