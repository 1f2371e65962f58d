//! Facade over the solar n-body propagator workspace.
//!
//! Re-exports the member crates as modules so front-ends (CLI, experiments,
//! notebooks) and the integration tests share one import surface.

pub use nbody_core::{constants, time, units, vector};

pub use nbody_config as config;
pub use nbody_dynamics as dynamics;
pub use nbody_export as export;
