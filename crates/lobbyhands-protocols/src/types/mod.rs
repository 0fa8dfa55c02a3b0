//! Common types shared by collaborators and the core.

mod geometry;

pub use geometry::*;
