//! # LobbyHands Protocols
//!
//! Interface definitions for the external collaborators the lobby keeper
//! talks to. Contains only traits and plain data - no implementations.
//!
//! ## Core Traits
//!
//! - [`Vision`] - Black-box screen oracles (button, death frame, text)
//! - [`Actuator`] - Keyboard and mouse input

pub mod actuator;
pub mod error;
pub mod types;
pub mod vision;

pub use actuator::Actuator;
pub use error::CollaboratorError;
pub use types::*;
pub use vision::{DeathFrameReading, Vision};
