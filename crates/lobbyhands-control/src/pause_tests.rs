use super::*;
use std::sync::Arc;

use serde_json::json;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[test]
fn test_new_controller() {
    let control = PauseController::new();
    assert!(!control.is_paused());
    assert!(!control.is_shutdown_requested());
    assert!(!control.is_restart_requested());
    assert_eq!(control.total_paused(), Duration::ZERO);
    assert!(control.current_operation().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_active_time_excludes_closed_pause() {
    let control = PauseController::new();
    let t0 = Instant::now();

    tokio::time::advance(secs(5)).await;
    assert!(control.toggle_pause());
    tokio::time::advance(secs(15)).await;
    assert!(!control.toggle_pause());
    tokio::time::advance(secs(5)).await;

    assert_eq!(control.elapsed_active_time(t0), secs(10));
    assert_eq!(control.total_paused(), secs(15));
}

#[tokio::test(start_paused = true)]
async fn test_active_time_excludes_open_pause() {
    let control = PauseController::new();
    let t0 = Instant::now();

    tokio::time::advance(secs(4)).await;
    control.toggle_pause();
    tokio::time::advance(secs(30)).await;

    assert_eq!(control.elapsed_active_time(t0), secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_active_time_never_negative() {
    let control = PauseController::new();
    control.toggle_pause();
    tokio::time::advance(secs(60)).await;
    control.toggle_pause();

    // Start captured after the pause already closed.
    let t0 = Instant::now();
    tokio::time::advance(secs(10)).await;
    assert_eq!(control.elapsed_active_time(t0), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_active_time_monotonic_while_running() {
    let control = PauseController::new();
    let t0 = Instant::now();
    let mut last = Duration::ZERO;
    for step in 0..10 {
        tokio::time::advance(secs(1)).await;
        if step % 3 == 0 {
            control.toggle_pause();
        }
        let now = control.elapsed_active_time(t0);
        assert!(now >= last);
        last = now;
    }
}

#[test]
fn test_force_pause_and_resume_idempotent() {
    let control = PauseController::new();
    assert!(control.force_pause());
    assert!(!control.force_pause());
    assert!(control.is_paused());
    assert!(control.force_resume());
    assert!(!control.force_resume());
    assert!(!control.is_paused());
}

#[test]
fn test_restart_keeps_first_reason() {
    let control = PauseController::new();
    control.request_restart("x");
    control.request_restart("y");
    assert_eq!(control.restart_reason().as_deref(), Some("x"));

    control.clear_restart();
    assert!(!control.is_restart_requested());
    control.request_restart("y");
    assert_eq!(control.restart_reason().as_deref(), Some("y"));
}

#[tokio::test]
async fn test_checkpoint_passes_when_idle() {
    let control = PauseController::new();
    assert!(control.check_checkpoint("idle").await);
}

#[tokio::test]
async fn test_checkpoint_sticky_after_shutdown() {
    let control = PauseController::new();
    control.request_shutdown();
    for _ in 0..3 {
        assert!(!control.check_checkpoint("op").await);
    }
    control.toggle_pause();
    assert!(!control.check_checkpoint("op").await);
    control.toggle_pause();
    assert!(!control.check_checkpoint("op").await);
}

#[tokio::test]
async fn test_checkpoint_refused_until_restart_cleared() {
    let control = PauseController::new();
    control.request_restart("lobby timeout");
    assert!(!control.check_checkpoint("op").await);
    assert!(!control.check_checkpoint("op").await);
    control.clear_restart();
    assert!(control.check_checkpoint("op").await);
}

#[tokio::test(start_paused = true)]
async fn test_checkpoint_blocks_until_resume() {
    let control = Arc::new(PauseController::new());
    control.toggle_pause();

    let waiter = {
        let control = control.clone();
        tokio::spawn(async move { control.check_checkpoint("blocked").await })
    };

    tokio::time::advance(secs(3)).await;
    assert!(!waiter.is_finished());
    control.toggle_pause();

    assert!(waiter.await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_checkpoint_paused_then_shutdown() {
    let control = Arc::new(PauseController::new());
    control.toggle_pause();

    let waiter = {
        let control = control.clone();
        tokio::spawn(async move { control.check_checkpoint("blocked").await })
    };

    tokio::task::yield_now().await;
    control.request_shutdown();

    assert!(!waiter.await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_checkpoint_paused_then_restart() {
    let control = Arc::new(PauseController::new());
    control.toggle_pause();

    let waiter = {
        let control = control.clone();
        tokio::spawn(async move { control.check_checkpoint("blocked").await })
    };

    tokio::time::advance(secs(1)).await;
    control.request_restart("operator");
    control.toggle_pause();

    assert!(!waiter.await.unwrap());
}

#[tokio::test]
async fn test_events_published() {
    let control = PauseController::new();
    let mut rx = control.subscribe();

    control.toggle_pause();
    control.toggle_pause();
    control.request_restart("r");
    control.request_restart("ignored");
    control.request_shutdown();
    control.request_shutdown();

    assert_eq!(rx.recv().await.unwrap(), ControlEvent::Paused);
    assert!(matches!(rx.recv().await.unwrap(), ControlEvent::Resumed { .. }));
    assert_eq!(
        rx.recv().await.unwrap(),
        ControlEvent::RestartRequested {
            reason: "r".to_string()
        }
    );
    assert_eq!(rx.recv().await.unwrap(), ControlEvent::ShutdownRequested);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_operations_and_history() {
    let control = PauseController::new();
    let mut detail = OperationDetail::new();
    detail.insert("session".to_string(), json!(1));

    control.set_current_operation("startup", OperationDetail::new());
    control.set_current_operation("afk_lobby_monitor", detail);

    let mut update = OperationDetail::new();
    update.insert("cycles".to_string(), json!(7));
    control.update_operation_details(update);

    let current = control.current_operation().unwrap();
    assert_eq!(current.name, "afk_lobby_monitor");
    assert_eq!(current.detail["session"], json!(1));
    assert_eq!(current.detail["cycles"], json!(7));

    let history = control.history(10);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].name, "startup");
}

#[test]
fn test_history_capacity() {
    let control = PauseController::new();
    for i in 0..(HISTORY_CAPACITY + 10) {
        control.set_current_operation(format!("op{}", i), OperationDetail::new());
    }
    let history = control.history(usize::MAX);
    assert_eq!(history.len(), HISTORY_CAPACITY);
    assert_eq!(history[0].name, "op9");
}

#[test]
fn test_status_snapshot() {
    let control = PauseController::new();
    control.set_current_operation("afk_lobby_monitor", OperationDetail::new());
    control.toggle_pause();
    control.request_restart("gold text in chat");

    let status = control.status();
    assert!(status.paused);
    assert!(!status.shutdown_requested);
    assert!(status.restart_requested);
    assert_eq!(status.restart_reason.as_deref(), Some("gold text in chat"));
    assert_eq!(status.operation.as_deref(), Some("afk_lobby_monitor"));
}

#[test]
fn test_event_display() {
    assert_eq!(ControlEvent::Paused.to_string(), "PAUSED");
    assert_eq!(ControlEvent::ShutdownRequested.to_string(), "SHUTDOWN");
    assert_eq!(
        ControlEvent::Resumed {
            paused_for: Duration::from_millis(1500)
        }
        .to_string(),
        "RESUMED after 1.5s"
    );
}
