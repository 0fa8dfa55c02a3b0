//! Error types for the collaborator layer.

mod collaborator;

pub use collaborator::*;
