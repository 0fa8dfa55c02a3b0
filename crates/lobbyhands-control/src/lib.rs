//! # LobbyHands Control
//!
//! Process-wide control state shared by every long-running operation.
//!
//! ## Features
//!
//! - Pause/resume with active-time accounting (paused intervals excluded)
//! - Sticky restart and shutdown requests observed at checkpoints
//! - Current operation record with a bounded history
//! - Timeout checks that distinguish expiry from cancellation
//! - OS signal wiring (SIGTERM/SIGINT shut down, SIGHUP toggles pause)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lobbyhands_control::{timer, PauseController, TimerVerdict};
//!
//! let control = Arc::new(PauseController::new());
//! let start = tokio::time::Instant::now();
//! loop {
//!     match timer::check_with_timeout(&control, "search", timeout, start).await {
//!         TimerVerdict::Continue { .. } => { /* one unit of work */ }
//!         TimerVerdict::TimedOut { elapsed } => break,
//!         TimerVerdict::Cancelled => return,
//!     }
//! }
//! ```

pub mod error;
pub mod operation;
pub mod pause;
pub mod signal;
pub mod timer;

pub use error::ControlError;
pub use operation::{OperationDetail, OperationRecord};
pub use pause::{ControlEvent, ControlStatus, PauseController, HISTORY_CAPACITY};
pub use signal::install_os_signals;
pub use timer::TimerVerdict;
