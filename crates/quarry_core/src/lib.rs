//! Quarry Engine Core
//!
//! Contains the simulation foundation for the sandbox:
//! - Entity Component System (sparse-set storage and snapshot views)
//! - Deterministic fixed-step clock

pub mod ecs;
pub mod time;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
