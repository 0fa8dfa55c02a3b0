//! The `run` command: wire everything together and supervise sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use lobbyhands_config::Config;
use lobbyhands_control::{install_os_signals, ControlEvent, PauseController};
use lobbyhands_desktop::{ButtonSearch, DeathFrameSearch, DesktopActuator, DesktopVision, TesseractOcr};
use lobbyhands_notify::{Notification, Notifier, NotifyHandle, NotifyLevel};
use lobbyhands_protocols::{Actuator, Vision};
use lobbyhands_runloop::{CycleAutomaton, LobbyMonitorLoop, Supervisor, TriggerEngine};
use lobbyhands_store::{CounterStore, StatsJournal, TriggerBookStore};

use crate::console::{stdin_lines, Console};

/// How long to wait for queued notifications on exit.
const NOTIFY_FLUSH: Duration = Duration::from_secs(5);

fn desktop_vision(config: &Config) -> DesktopVision {
    DesktopVision::new(
        ButtonSearch {
            color: config.infinite.button_color,
            tolerance: config.infinite.color_tolerance,
            insets: config.infinite.search_region,
        },
        DeathFrameSearch {
            region: config.death_frame.region,
            color: config.death_frame.color,
            tolerance: config.death_frame.tolerance,
            min_pixels: config.death_frame.min_pixels,
        },
        TesseractOcr::new(config.ocr.tesseract_cmd.clone(), config.ocr.min_confidence),
    )
}

/// Notification for a control event, if it deserves one.
pub(crate) fn event_notification(event: &ControlEvent) -> Option<Notification> {
    match event {
        ControlEvent::Paused => Some(Notification::new(
            "Control",
            "Paused by operator",
            NotifyLevel::Info,
        )),
        ControlEvent::Resumed { paused_for } => Some(Notification::new(
            "Control",
            format!("Resumed after {:.0}s", paused_for.as_secs_f64()),
            NotifyLevel::Info,
        )),
        ControlEvent::RestartRequested { reason } => Some(Notification::new(
            "Control",
            format!("Restart requested: {}", reason),
            NotifyLevel::Warning,
        )),
        ControlEvent::ShutdownRequested => Some(Notification::new(
            "Control",
            "Shutting down",
            NotifyLevel::Critical,
        )),
        ControlEvent::OperationStarted { name, detail } => {
            Some(Notification::operation_started(name, detail))
        }
    }
}

/// Forward control events to the notifier until the channel closes.
fn spawn_event_bridge(
    mut events: broadcast::Receiver<ControlEvent>,
    notify: NotifyHandle,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(notification) = event_notification(&event) {
                        notify.post(notification);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Control event bridge lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

pub(crate) async fn run(config: Config, with_console: bool) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting LobbyHands v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {}", config.storage.data_dir().display());

    let control = Arc::new(PauseController::new());
    install_os_signals(control.clone())?;

    let notifier = Notifier::with_telegram(config.notify.telegram());
    info!("Notification channels: {:?}", notifier.channel_names());
    let (notify, notify_task) = notifier.spawn();
    let bridge = spawn_event_bridge(control.subscribe(), notify.clone());

    let stats = Arc::new(StatsJournal::open(config.storage.stats_path()).await?);
    let counters = Arc::new(CounterStore::open(config.storage.counters_path()).await?);
    info!(
        cycles = counters.total_cycles(),
        "Loaded counters from {}",
        counters.path().display()
    );

    let vision: Arc<dyn Vision> = Arc::new(desktop_vision(&config));
    let actuator: Arc<dyn Actuator> = Arc::new(DesktopActuator::new());

    let engine = Arc::new(
        TriggerEngine::open(
            TriggerBookStore::new(config.storage.triggers_path()),
            actuator.clone(),
        )
        .await?,
    );
    let automaton = Arc::new(
        CycleAutomaton::new(
            config.infinite.clone(),
            vision.clone(),
            actuator.clone(),
            counters.clone(),
        )
        .with_stats(stats.clone()),
    );

    let mut lobby = LobbyMonitorLoop::new(
        config.lobby.clone(),
        control.clone(),
        vision,
        actuator,
        stats.clone(),
        notify.clone(),
    );
    if config.infinite.enabled {
        lobby = lobby.with_infinite(automaton.clone(), engine.clone());
    } else {
        info!("Infinite mode disabled");
    }

    let console = with_console.then(|| {
        let console = Console::new(control.clone(), automaton, engine, stats.clone());
        tokio::spawn(console.run(stdin_lines()))
    });

    let supervisor = Supervisor::new(
        lobby,
        config.supervisor.clone(),
        control.clone(),
        stats,
        notify.clone(),
    );
    let report = supervisor.run().await;
    info!(
        exit = ?report.exit,
        sessions = report.sessions,
        restarts = report.restarts,
        "LobbyHands stopped"
    );

    if let Some(console) = console {
        console.abort();
    }
    bridge.abort();
    drop(supervisor);
    drop(notify);
    if tokio::time::timeout(NOTIFY_FLUSH, notify_task).await.is_err() {
        warn!("Pending notifications dropped on exit");
    }
    Ok(())
}
