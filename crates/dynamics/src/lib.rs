//! Gravitational particle/integrator core.
//!
//! [`ParticleSystem`] owns the bodies of a simulation and drives them forward
//! in time with one of three fixed-step schemes: symplectic leapfrog,
//! classical 4th-order Runge-Kutta, or a 4-step Adams-Bashforth-Moulton
//! predictor-corrector bootstrapped by Runge-Kutta. The force model sums
//! Newtonian point-mass attraction over the perturber set and can add the
//! isotropic PPN relativistic correction on top.
//!
//! Every `advance_*` call performs one or more whole-system force evaluations
//! before any particle's state is advanced, so each evaluation sees a single
//! consistent snapshot of all positions and velocities.

pub mod forces;
pub mod particle;
pub mod step;
pub mod system;

pub use particle::{Particle, ParticleState};
pub use system::ParticleSystem;
