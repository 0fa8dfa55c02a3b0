//! OS signal wiring.

use std::sync::Arc;

use tracing::info;

use crate::error::ControlError;
use crate::pause::PauseController;

/// What an OS signal does to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// SIGTERM, SIGINT, Ctrl+C.
    Shutdown,
    /// SIGHUP.
    TogglePause,
}

impl SignalAction {
    pub fn apply(self, control: &PauseController) {
        match self {
            SignalAction::Shutdown => control.request_shutdown(),
            SignalAction::TogglePause => {
                control.toggle_pause();
            }
        }
    }
}

/// Install OS signal handlers (Unix).
#[cfg(unix)]
pub fn install_os_signals(control: Arc<PauseController>) -> Result<(), ControlError> {
    use tokio::signal::unix::{signal, SignalKind};

    let kinds = [
        (SignalKind::terminate(), "SIGTERM", SignalAction::Shutdown),
        (SignalKind::interrupt(), "SIGINT", SignalAction::Shutdown),
        (SignalKind::hangup(), "SIGHUP", SignalAction::TogglePause),
    ];

    for (kind, name, action) in kinds {
        let mut stream = signal(kind).map_err(|e| ControlError::SignalSetup(e.to_string()))?;
        let control = control.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                info!("Received {}", name);
                action.apply(&control);
            }
        });
    }

    info!("OS signal handlers installed (SIGTERM, SIGINT, SIGHUP)");
    Ok(())
}

/// Install OS signal handlers (non-Unix fallback).
#[cfg(not(unix))]
pub fn install_os_signals(control: Arc<PauseController>) -> Result<(), ControlError> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C");
            SignalAction::Shutdown.apply(&control);
        }
    });

    info!("OS signal handlers installed (Ctrl+C only)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_action() {
        let control = PauseController::new();
        SignalAction::Shutdown.apply(&control);
        assert!(control.is_shutdown_requested());
    }

    #[test]
    fn test_toggle_action() {
        let control = PauseController::new();
        SignalAction::TogglePause.apply(&control);
        assert!(control.is_paused());
        SignalAction::TogglePause.apply(&control);
        assert!(!control.is_paused());
    }

    #[tokio::test]
    async fn test_install_inside_runtime() {
        let control = Arc::new(PauseController::new());
        assert!(install_os_signals(control).is_ok());
    }
}
