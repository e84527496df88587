//! Quarry Services Layer
//!
//! Platform-facing concerns around the core: settings and save snapshots.

pub mod save;
pub mod settings;
