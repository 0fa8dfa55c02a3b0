use super::*;
use crate::testing::{Button, RecordingActuator, ScriptedVision};

use lobbyhands_config::InfiniteConfig;
use lobbyhands_store::{ClickStep, CounterStore, TriggerBookStore};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    dir_path: std::path::PathBuf,
    control: Arc<PauseController>,
    vision: Arc<ScriptedVision>,
    actuator: Arc<RecordingActuator>,
    stats: Arc<StatsJournal>,
}

async fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let stats = Arc::new(
        StatsJournal::open(dir.path().join("statistics.json"))
            .await
            .unwrap(),
    );
    Fixture {
        dir_path: dir.path().to_path_buf(),
        _dir: dir,
        control: Arc::new(PauseController::new()),
        vision: Arc::new(ScriptedVision::new()),
        actuator: Arc::new(RecordingActuator::new()),
        stats,
    }
}

fn quiet_settings(timeout_secs: u64) -> LobbyConfig {
    LobbyConfig {
        timeout_secs,
        gold_check_every_ticks: 0,
        wait_for_accept: false,
        ..LobbyConfig::default()
    }
}

fn lobby(f: &Fixture, settings: LobbyConfig) -> LobbyMonitorLoop {
    LobbyMonitorLoop::new(
        settings,
        f.control.clone(),
        f.vision.clone(),
        f.actuator.clone(),
        f.stats.clone(),
        NotifyHandle::disconnected(),
    )
}

#[test]
fn test_every_schedule() {
    let mut every = Every::starting_at(Duration::ZERO, Duration::from_secs(10));
    assert!(every.due(Duration::ZERO));
    assert!(!every.due(Duration::from_secs(9)));
    assert!(every.due(Duration::from_secs(11)));
    assert!(!every.due(Duration::from_secs(20)));
    assert!(every.due(Duration::from_secs(21)));
}

#[tokio::test(start_paused = true)]
async fn test_session_times_out() {
    let f = fixture().await;
    let lobby = lobby(&f, quiet_settings(5));

    let outcome = lobby.run_session().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Restart("lobby timeout".to_string()));
    let op = f.control.current_operation().unwrap();
    assert_eq!(op.name, LOBBY_OPERATION);
    assert_eq!(op.detail["timeout_secs"], 5);
}

#[tokio::test(start_paused = true)]
async fn test_pause_extends_session() {
    let f = fixture().await;
    let lobby = lobby(&f, quiet_settings(5));
    let control = f.control.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        control.toggle_pause();
        tokio::time::sleep(Duration::from_secs(100)).await;
        control.toggle_pause();
    });

    let start = Instant::now();
    let outcome = lobby.run_session().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Restart("lobby timeout".to_string()));
    assert!(start.elapsed() >= Duration::from_secs(105));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_ends_session() {
    let f = fixture().await;
    f.control.request_shutdown();

    let outcome = lobby(&f, quiet_settings(60)).run_session().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Shutdown);
}

#[tokio::test(start_paused = true)]
async fn test_restart_request_carries_reason() {
    let f = fixture().await;
    let control = f.control.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        control.request_restart("operator");
    });

    let outcome = lobby(&f, quiet_settings(60)).run_session().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Restart("operator".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_death_frame_restarts() {
    let f = fixture().await;
    f.vision.set_death_frame(true);

    let outcome = lobby(&f, quiet_settings(60)).run_session().await.unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Restart("host death frame".to_string())
    );
    assert_eq!(f.stats.snapshot().total("host_deaths"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_gold_text_restarts() {
    let f = fixture().await;
    f.vision.show_text("9999999");
    let settings = LobbyConfig {
        gold_check_every_ticks: 3,
        wait_for_accept: false,
        ..LobbyConfig::default()
    };
    let chat = settings.chat_region.resolve(1920, 1080);

    let outcome = lobby(&f, settings).run_session().await.unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Restart("gold text in chat".to_string())
    );
    assert_eq!(f.actuator.keys(), vec!["enter".to_string(), "esc".to_string()]);
    let queries = f.vision.text_queries.lock().clone();
    assert_eq!(queries, vec![("9999999".to_string(), chat)]);
    assert_eq!(f.stats.snapshot().total("host_deaths"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_gold_check_closes_chat_when_absent() {
    let f = fixture().await;
    let settings = LobbyConfig {
        timeout_secs: 4,
        gold_check_every_ticks: 2,
        wait_for_accept: false,
        ..LobbyConfig::default()
    };

    lobby(&f, settings).run_session().await.unwrap();

    assert_eq!(
        f.actuator.keys(),
        vec!["enter", "esc", "enter", "esc"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
}

fn accept_settings(accept_timeout_secs: u64) -> LobbyConfig {
    LobbyConfig {
        timeout_secs: 5,
        gold_check_every_ticks: 0,
        wait_for_accept: true,
        accept_timeout_secs,
        ..LobbyConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_accept_clicked_before_monitoring() {
    let f = fixture().await;
    f.vision.show_text("ACCEPT");

    let outcome = lobby(&f, accept_settings(30)).run_session().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Restart("lobby timeout".to_string()));
    assert_eq!(f.actuator.clicks(), vec![(10, 10)]);
    let names: Vec<String> = f.control.history(10).into_iter().map(|r| r.name).collect();
    assert!(names.contains(&ACCEPT_OPERATION.to_string()));
    assert_eq!(f.control.current_operation().unwrap().name, LOBBY_OPERATION);
}

#[tokio::test(start_paused = true)]
async fn test_accept_timeout_restarts() {
    let f = fixture().await;

    let outcome = lobby(&f, accept_settings(3)).run_session().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Restart("accept timeout".to_string()));
    assert!(f.actuator.clicks().is_empty());
    let op = f.control.current_operation().unwrap();
    assert_eq!(op.name, ACCEPT_OPERATION);
    assert_eq!(op.detail["timeout_secs"], 3);
    let queries = f.vision.text_queries.lock().clone();
    assert!(!queries.is_empty());
    assert!(queries
        .iter()
        .all(|q| *q == ("ACCEPT".to_string(), Region::new(0, 0, 1920, 1080))));
}

#[tokio::test(start_paused = true)]
async fn test_pause_extends_accept_wait() {
    let f = fixture().await;
    let control = f.control.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        control.toggle_pause();
        tokio::time::sleep(Duration::from_secs(100)).await;
        control.toggle_pause();
    });

    let start = Instant::now();
    let outcome = lobby(&f, accept_settings(10)).run_session().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Restart("accept timeout".to_string()));
    assert!(start.elapsed() >= Duration::from_secs(110));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_accept_wait() {
    let f = fixture().await;
    let control = f.control.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        control.request_shutdown();
    });

    let outcome = lobby(&f, accept_settings(60)).run_session().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Shutdown);
    assert!(f.actuator.clicks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_infinite_cycle_fires_trigger() {
    let f = fixture().await;
    let counters = Arc::new(
        CounterStore::open(f.dir_path.join("counters.json"))
            .await
            .unwrap(),
    );
    let automaton = Arc::new(CycleAutomaton::new(
        InfiniteConfig::default(),
        f.vision.clone(),
        f.actuator.clone(),
        counters.clone(),
    ));
    let engine = Arc::new(
        TriggerEngine::open(
            TriggerBookStore::new(f.dir_path.join("triggers.json")),
            f.actuator.clone(),
        )
        .await
        .unwrap(),
    );
    engine.add_entity("pet", "Pet").await.unwrap();
    engine
        .set_clicks(
            "pet",
            vec![ClickStep {
                x: 5,
                y: 5,
                description: "feed".to_string(),
            }],
        )
        .await
        .unwrap();
    engine.add_trigger("pet", 1).await.unwrap();
    f.vision.push_buttons([Button::At(960, 540), Button::At(960, 540)]);

    let lobby = lobby(&f, quiet_settings(15)).with_infinite(automaton, engine.clone());
    let outcome = lobby.run_session().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Restart("lobby timeout".to_string()));
    assert_eq!(counters.total_cycles(), 1);
    assert!(f.actuator.clicks().contains(&(5, 5)));
    assert!(engine.evaluate(1).is_empty());
    assert_eq!(f.stats.snapshot().total("triggers_fired"), 1);
    let op = f.control.current_operation().unwrap();
    assert_eq!(op.detail["infinite_cycles"], 1);
    assert_eq!(op.detail["infinite_enabled"], true);
}
