//! Per-particle stepping kernels and the scheme-transient scratch records.
//!
//! The system drives these in lockstep across all particles: a whole-system
//! force evaluation always precedes each kernel call, and no kernel here ever
//! triggers one itself. The Runge-Kutta scheme in particular is split into
//! four stage kernels because each stage needs forces evaluated at the
//! temporarily committed position left behind by the previous stage.

use nbody_core::vector::Vector3;

use crate::particle::Particle;

/// Runge-Kutta stage vectors plus the pre-step state snapshot.
///
/// The `former_*` snapshot doubles as the predictor base for the ABM4
/// corrector, which refines from the pre-predictor state.
#[derive(Debug, Clone, Default)]
pub struct RungeKuttaScratch {
    former_position: Vector3,
    former_velocity: Vector3,
    k: [Vector3; 4],
    l: [Vector3; 4],
}

/// One `(velocity, acceleration)` sample of a completed step.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistorySample {
    pub velocity: Vector3,
    pub acceleration: Vector3,
}

/// Fixed 4-slot cyclic history of step samples for the ABM4 scheme.
///
/// Slots are overwritten in rotation; the system tracks the shared write
/// cursor and valid count, since every particle records on the same schedule.
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    slots: [HistorySample; 4],
}

impl HistoryBuffer {
    /// Overwrite the slot at `cursor`.
    pub fn record(&mut self, cursor: usize, sample: HistorySample) {
        self.slots[cursor] = sample;
    }

    /// The four samples ordered oldest to newest, given the cursor where the
    /// next sample will be written. Only meaningful once all four slots hold
    /// valid samples.
    pub fn ordered(&self, cursor: usize) -> [HistorySample; 4] {
        [
            self.slots[cursor],
            self.slots[(cursor + 1) % 4],
            self.slots[(cursor + 2) % 4],
            self.slots[(cursor + 3) % 4],
        ]
    }
}

/// Backward half-kick that offsets the velocity to `v(-½)` so the first
/// leapfrog step lands on the staggered grid.
pub(crate) fn leapfrog_init(particle: &mut Particle, dt: f64) {
    let half_kick = particle.acceleration * (0.5 * dt);
    particle.velocity = particle.velocity - half_kick;
}

/// Kick-drift update: `v(n+½) = v(n−½) + Δt·a(n)`, `p(n+1) = p(n) + Δt·v(n+½)`.
pub(crate) fn leapfrog_advance(particle: &mut Particle, dt: f64) {
    particle.velocity.accumulate(particle.acceleration * dt);
    particle.position.accumulate(particle.velocity * dt);
}

/// Stage A: snapshot the pre-step state, form `k1`/`l1`, and commit the
/// half-step-advanced state for the stage-B force evaluation.
pub(crate) fn runge_kutta_stage_a(particle: &mut Particle, scratch: &mut RungeKuttaScratch, dt: f64) {
    scratch.former_position = particle.position;
    scratch.former_velocity = particle.velocity;
    scratch.k[0] = particle.acceleration * dt;
    scratch.l[0] = scratch.former_velocity * dt;
    particle.velocity = scratch.former_velocity + scratch.k[0] * 0.5;
    particle.position = scratch.former_position + scratch.l[0] * 0.5;
}

/// Stage B: form `k2`/`l2` from the stage-A state and commit the second
/// half-step position for the stage-C force evaluation.
pub(crate) fn runge_kutta_stage_b(particle: &mut Particle, scratch: &mut RungeKuttaScratch, dt: f64) {
    scratch.k[1] = particle.acceleration * dt;
    scratch.l[1] = (scratch.former_velocity + scratch.k[0] * 0.5) * dt;
    particle.velocity = scratch.former_velocity + scratch.k[1] * 0.5;
    particle.position = scratch.former_position + scratch.l[1] * 0.5;
}

/// Stage C: form `k3`/`l3` and commit the full-step position for the stage-D
/// force evaluation.
pub(crate) fn runge_kutta_stage_c(particle: &mut Particle, scratch: &mut RungeKuttaScratch, dt: f64) {
    scratch.k[2] = particle.acceleration * dt;
    scratch.l[2] = (scratch.former_velocity + scratch.k[1] * 0.5) * dt;
    particle.velocity = scratch.former_velocity + scratch.k[2];
    particle.position = scratch.former_position + scratch.l[2];
}

/// Stage D: form `k4`/`l4` and combine all four stages into the final state.
pub(crate) fn runge_kutta_stage_d(particle: &mut Particle, scratch: &mut RungeKuttaScratch, dt: f64) {
    scratch.k[3] = particle.acceleration * dt;
    scratch.l[3] = (scratch.former_velocity + scratch.k[2]) * dt;
    let velocity_increment =
        (scratch.k[0] + scratch.k[1] * 2.0 + scratch.k[2] * 2.0 + scratch.k[3]) * (1.0 / 6.0);
    let position_increment =
        (scratch.l[0] + scratch.l[1] * 2.0 + scratch.l[2] * 2.0 + scratch.l[3]) * (1.0 / 6.0);
    particle.velocity = scratch.former_velocity + velocity_increment;
    particle.position = scratch.former_position + position_increment;
}

/// 4-step Adams-Bashforth predictor over the history samples ordered oldest
/// to newest, with `history[3]` belonging to the current step.
///
/// Snapshots the pre-predictor state into the scratch record so the corrector
/// can refine from it.
pub(crate) fn abm4_predict(
    particle: &mut Particle,
    scratch: &mut RungeKuttaScratch,
    history: &[HistorySample; 4],
    dt: f64,
) {
    scratch.former_position = particle.position;
    scratch.former_velocity = particle.velocity;
    let weight = dt / 24.0;
    let position_increment = (history[3].velocity * 55.0 - history[2].velocity * 59.0
        + history[1].velocity * 37.0
        - history[0].velocity * 9.0)
        * weight;
    let velocity_increment = (history[3].acceleration * 55.0 - history[2].acceleration * 59.0
        + history[1].acceleration * 37.0
        - history[0].acceleration * 9.0)
        * weight;
    particle.position = scratch.former_position + position_increment;
    particle.velocity = scratch.former_velocity + velocity_increment;
}

/// Adams-Moulton corrector over the history samples ordered oldest to newest,
/// with `history[3]` holding the force evaluation at the predicted state.
///
/// Refines from the pre-predictor snapshot taken by [`abm4_predict`].
pub(crate) fn abm4_correct(
    particle: &mut Particle,
    scratch: &RungeKuttaScratch,
    history: &[HistorySample; 4],
    dt: f64,
) {
    let weight = dt / 24.0;
    let position_increment = (history[3].velocity * 9.0 + history[2].velocity * 19.0
        - history[1].velocity * 5.0
        + history[0].velocity)
        * weight;
    let velocity_increment = (history[3].acceleration * 9.0 + history[2].acceleration * 19.0
        - history[1].acceleration * 5.0
        + history[0].acceleration)
        * weight;
    particle.position = scratch.former_position + position_increment;
    particle.velocity = scratch.former_velocity + velocity_increment;
}
