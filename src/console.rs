//! Operator console on stdin.
//!
//! Each line is one command. Commands only touch the thread-safe mutation
//! points: the pause controller, trigger flags and the automaton's session
//! state.
//!
//! Stdin is read on a dedicated OS thread and forwarded line by line over a
//! channel. The blocking read never holds a runtime worker, so the console
//! task stops as soon as shutdown is requested.

use std::io::BufRead;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use lobbyhands_control::{ControlEvent, PauseController};
use lobbyhands_runloop::{CycleAutomaton, TriggerEngine};
use lobbyhands_store::StatsJournal;

use crate::cmd_admin::format_stats;

const HELP: &str = "\
commands:
  pause | resume | toggle
  restart [reason]
  clear-restart
  quit
  status
  stats
  enable <entity> <threshold>
  disable <entity> <threshold>
  triggers
  reload
  reset-session";

/// Finished operations shown by `status`.
const STATUS_HISTORY: usize = 5;

/// Forward lines of `reader` from a dedicated thread.
///
/// The channel closes when the reader hits end of input or fails.
pub(crate) fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    let spawned = std::thread::Builder::new()
        .name("console-stdin".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Console read failed: {}", e);
                        break;
                    }
                };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
            debug!("Console reader finished");
        });
    if let Err(e) = spawned {
        warn!("Could not start console reader: {}", e);
    }
    rx
}

/// Lines typed on stdin.
pub(crate) fn stdin_lines() -> mpsc::Receiver<String> {
    spawn_line_reader(std::io::BufReader::new(std::io::stdin()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Pause,
    Resume,
    Toggle,
    Restart(String),
    ClearRestart,
    Quit,
    Status,
    Stats,
    SetTrigger {
        entity: String,
        threshold: u64,
        enabled: bool,
    },
    Triggers,
    Reload,
    ResetSession,
    Help,
}

/// Parse one console line. Blank lines are `Ok(None)`.
pub(crate) fn parse(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match head.to_lowercase().as_str() {
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "toggle" => Command::Toggle,
        "restart" => {
            let reason = rest.join(" ");
            Command::Restart(if reason.is_empty() {
                "operator request".to_string()
            } else {
                reason
            })
        }
        "clear-restart" => Command::ClearRestart,
        "quit" | "exit" | "stop" => Command::Quit,
        "status" => Command::Status,
        "stats" => Command::Stats,
        "enable" | "disable" => {
            let [entity, threshold] = rest.as_slice() else {
                return Err(format!("usage: {} <entity> <threshold>", head));
            };
            let threshold = threshold
                .parse()
                .map_err(|_| format!("not a cycle count: {}", threshold))?;
            Command::SetTrigger {
                entity: entity.to_string(),
                threshold,
                enabled: head.eq_ignore_ascii_case("enable"),
            }
        }
        "triggers" => Command::Triggers,
        "reload" => Command::Reload,
        "reset-session" => Command::ResetSession,
        "help" | "?" => Command::Help,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(Some(command))
}

pub(crate) struct Console {
    control: Arc<PauseController>,
    automaton: Arc<CycleAutomaton>,
    engine: Arc<TriggerEngine>,
    stats: Arc<StatsJournal>,
}

impl Console {
    pub(crate) fn new(
        control: Arc<PauseController>,
        automaton: Arc<CycleAutomaton>,
        engine: Arc<TriggerEngine>,
        stats: Arc<StatsJournal>,
    ) -> Self {
        Self {
            control,
            automaton,
            engine,
            stats,
        }
    }

    /// Run commands from `lines` until input ends, `quit` or shutdown.
    pub(crate) async fn run(self, mut lines: mpsc::Receiver<String>) {
        let mut events = self.control.subscribe();
        if self.control.is_shutdown_requested() {
            return;
        }
        info!("Operator console ready, type 'help'");
        loop {
            let line = tokio::select! {
                line = lines.recv() => match line {
                    Some(line) => line,
                    None => break,
                },
                event = events.recv() => match event {
                    Ok(ControlEvent::ShutdownRequested) | Err(broadcast::error::RecvError::Closed) => break,
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        if self.control.is_shutdown_requested() {
                            break;
                        }
                        continue;
                    }
                },
            };
            match parse(&line) {
                Ok(Some(command)) => {
                    let quit = command == Command::Quit;
                    println!("{}", self.execute(command).await);
                    if quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(message) => println!("{}", message),
            }
        }
    }

    pub(crate) async fn execute(&self, command: Command) -> String {
        match command {
            Command::Pause => {
                if self.control.force_pause() {
                    "paused".to_string()
                } else {
                    "already paused".to_string()
                }
            }
            Command::Resume => {
                if self.control.force_resume() {
                    "resumed".to_string()
                } else {
                    "not paused".to_string()
                }
            }
            Command::Toggle => {
                if self.control.toggle_pause() {
                    "paused".to_string()
                } else {
                    "resumed".to_string()
                }
            }
            Command::Restart(reason) => {
                self.control.request_restart(reason.clone());
                format!("restart requested: {}", reason)
            }
            Command::ClearRestart => {
                if self.control.is_restart_requested() {
                    self.control.clear_restart();
                    "restart request cleared".to_string()
                } else {
                    "no restart pending".to_string()
                }
            }
            Command::Quit => {
                self.control.request_shutdown();
                "shutting down".to_string()
            }
            Command::Status => {
                let status = self.control.status();
                let automaton = self.automaton.snapshot();
                let history = self.control.history(STATUS_HISTORY);
                let doc = serde_json::json!({
                    "control": status,
                    "history": history,
                    "infinite": automaton,
                });
                serde_json::to_string_pretty(&doc).unwrap_or_else(|e| e.to_string())
            }
            Command::Stats => format_stats(&self.automaton.counters().snapshot(), &self.stats.snapshot()),
            Command::SetTrigger {
                entity,
                threshold,
                enabled,
            } => match self
                .engine
                .set_trigger_enabled(&entity, threshold, enabled)
                .await
            {
                Ok(()) => format!(
                    "{} {}@{}",
                    if enabled { "enabled" } else { "disabled" },
                    entity,
                    threshold
                ),
                Err(e) => format!("error: {}", e),
            },
            Command::Triggers => {
                let lines = self.engine.list();
                if lines.is_empty() {
                    "no entities".to_string()
                } else {
                    lines.join("\n")
                }
            }
            Command::Reload => match self.engine.reload().await {
                Ok(()) => format!("reloaded {} entities", self.engine.book().len()),
                Err(e) => format!("error: {}", e),
            },
            Command::ResetSession => {
                self.automaton.reset_session();
                "infinite session reset (durable counters kept)".to_string()
            }
            Command::Help => HELP.to_string(),
        }
    }
}
