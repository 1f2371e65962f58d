//! System-level orchestration: particle arena, force-evaluation phases,
//! time-stepping protocols, drift correction, and energy accounting.

use std::collections::HashMap;

use nbody_core::constants::SPEED_OF_LIGHT_M_S;
use nbody_core::vector::Vector3;

use crate::forces::{self, PerturberState};
use crate::particle::{Particle, ParticleState};
use crate::step::{self, HistoryBuffer, HistorySample, RungeKuttaScratch};

/// One arena slot: the particle, whether it acts as a perturber, and the
/// scheme-transient scratch kept alongside (not inside) the physical state.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    particle: Particle,
    exerts_force: bool,
    scratch: RungeKuttaScratch,
    history: HistoryBuffer,
}

/// Session bookkeeping for the ABM4 scheme, shared by all particles since
/// they record on the same schedule. Discarded whenever the requested step
/// size changes or another scheme runs in between.
#[derive(Debug, Clone, Copy, Default)]
struct Abm4Session {
    valid: bool,
    step_seconds: f64,
    filled: usize,
    cursor: usize,
}

/// The named collection of all simulated bodies and the driver of force
/// evaluation and time stepping.
///
/// Bodies registered with [`ParticleSystem::add_particle`] both feel and exert
/// gravity; bodies registered with
/// [`ParticleSystem::add_particle_without_mass`] only feel it. Each
/// `advance_*` call runs one or more whole-system force evaluations before
/// mutating any particle, so every evaluation sees a consistent snapshot of
/// all positions and velocities.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    general_relativity: bool,
    speed_of_light: f64,
    abm: Abm4Session,
    force_evaluations: u64,
}

impl ParticleSystem {
    /// Empty system with the relativistic correction disabled.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            general_relativity: false,
            speed_of_light: SPEED_OF_LIGHT_M_S,
            abm: Abm4Session::default(),
            force_evaluations: 0,
        }
    }

    /// Register a body that both feels and exerts gravity.
    ///
    /// Panics if the name is already registered or the particle has no
    /// positive gravitational parameter.
    pub fn add_particle(&mut self, name: &str, particle: Particle) {
        assert!(
            particle.mu() > 0.0,
            "perturber '{name}' must have a positive gravitational parameter; use add_particle_without_mass for test particles"
        );
        self.insert(name, particle, true);
    }

    /// Register a massless test particle: acted upon by gravity, exerting
    /// none. Panics if the name is already registered.
    pub fn add_particle_without_mass(&mut self, name: &str, particle: Particle) {
        self.insert(name, particle, false);
    }

    fn insert(&mut self, name: &str, particle: Particle, exerts_force: bool) {
        assert!(
            !self.index.contains_key(name),
            "particle '{name}' is already registered"
        );
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(Entry {
            name: name.to_string(),
            particle,
            exerts_force,
            scratch: RungeKuttaScratch::default(),
            history: HistoryBuffer::default(),
        });
        // Membership changed; any cached multistep history is for a different system.
        self.abm.valid = false;
    }

    /// Look up a body by name.
    pub fn particle(&self, name: &str) -> Option<&Particle> {
        self.index.get(name).map(|&slot| &self.entries[slot].particle)
    }

    /// Externally visible state snapshot of a body.
    pub fn state(&self, name: &str) -> Option<ParticleState> {
        self.particle(name).map(Particle::state)
    }

    /// Iterate over `(name, particle)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Particle)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.particle))
    }

    /// Number of registered bodies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the system has no bodies.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enable or disable the relativistic correction pass.
    pub fn set_general_relativity(&mut self, enabled: bool) {
        self.general_relativity = enabled;
    }

    /// Whether the relativistic correction pass runs.
    pub fn general_relativity(&self) -> bool {
        self.general_relativity
    }

    /// Override the speed of light used by the relativistic correction.
    ///
    /// Intended for accuracy experiments that scale c to verify convergence
    /// toward Newtonian behavior. Panics on a non-positive value.
    pub fn set_speed_of_light(&mut self, speed_of_light_m_s: f64) {
        assert!(
            speed_of_light_m_s.is_finite() && speed_of_light_m_s > 0.0,
            "speed of light must be positive and finite"
        );
        self.speed_of_light = speed_of_light_m_s;
    }

    /// The speed of light used by the relativistic correction, in m/s.
    pub fn speed_of_light(&self) -> f64 {
        self.speed_of_light
    }

    /// Total number of whole-system force evaluations performed so far.
    ///
    /// Each `advance_*` call performs a fixed number of evaluations for its
    /// scheme, which makes the ABM4 bootstrap observable from the outside.
    pub fn force_evaluations(&self) -> u64 {
        self.force_evaluations
    }

    /// Evaluate forces for every particle at the current state.
    ///
    /// Two strict phases. Phase 1 computes the Newtonian acceleration and
    /// potential energy of every particle and snapshots the Newtonian
    /// acceleration. Phase 2, run only when the relativity flag is set and
    /// only after phase 1 has finished for all particles, adds the PPN
    /// correction computed against the phase-1 snapshots.
    pub fn compute_acceleration(&mut self) {
        self.force_evaluations += 1;
        let slots = self.perturber_slots();

        let snapshot = self.perturber_snapshot(&slots);
        for (i, entry) in self.entries.iter_mut().enumerate() {
            let (acceleration, potential) = forces::newtonian(
                entry.particle.position,
                entry.particle.mass_kg(),
                slots[i],
                &snapshot,
            );
            entry.particle.acceleration = acceleration;
            entry.particle.newtonian_acceleration = acceleration;
            entry.particle.potential_energy = potential;
        }

        if !self.general_relativity {
            return;
        }

        // Rebuild the snapshot so it carries the fresh Newtonian accelerations.
        let snapshot = self.perturber_snapshot(&slots);
        let mu_over_r = forces::mu_over_r_at_perturbers(&snapshot);
        for (i, entry) in self.entries.iter_mut().enumerate() {
            let correction = forces::relativistic_correction(
                entry.particle.position,
                entry.particle.velocity,
                slots[i],
                &snapshot,
                &mu_over_r,
                self.speed_of_light,
            );
            entry.particle.acceleration = entry.particle.newtonian_acceleration + correction;
        }
    }

    /// For each entry, its slot in the perturber snapshot, or `None` for
    /// massless bodies.
    fn perturber_slots(&self) -> Vec<Option<usize>> {
        let mut next = 0;
        self.entries
            .iter()
            .map(|entry| {
                if entry.exerts_force {
                    let slot = next;
                    next += 1;
                    Some(slot)
                } else {
                    None
                }
            })
            .collect()
    }

    fn perturber_snapshot(&self, slots: &[Option<usize>]) -> Vec<PerturberState> {
        let mut snapshot = Vec::with_capacity(slots.iter().flatten().count());
        for entry in self.entries.iter().filter(|e| e.exerts_force) {
            snapshot.push(PerturberState {
                position: entry.particle.position,
                velocity: entry.particle.velocity,
                mu: entry.particle.mu(),
                newtonian_acceleration: entry.particle.newtonian_acceleration,
            });
        }
        snapshot
    }

    /// Offset every velocity half a step backward so leapfrog starts on its
    /// staggered grid. Call once before the first [`Self::advance_leapfrog`].
    pub fn init_leapfrog(&mut self, dt_seconds: f64) {
        check_step(dt_seconds);
        self.abm.valid = false;
        self.compute_acceleration();
        for entry in &mut self.entries {
            step::leapfrog_init(&mut entry.particle, dt_seconds);
        }
    }

    /// Advance all particles one step with the leapfrog scheme.
    pub fn advance_leapfrog(&mut self, dt_seconds: f64) {
        check_step(dt_seconds);
        self.abm.valid = false;
        self.compute_acceleration();
        for entry in &mut self.entries {
            step::leapfrog_advance(&mut entry.particle, dt_seconds);
        }
    }

    /// Advance all particles one step with classical 4th-order Runge-Kutta.
    ///
    /// Four force-evaluation/update round-trips: every stage's forces are
    /// evaluated for the whole system before any particle moves to the next
    /// stage.
    pub fn advance_runge_kutta(&mut self, dt_seconds: f64) {
        check_step(dt_seconds);
        self.abm.valid = false;
        self.runge_kutta_step(dt_seconds);
    }

    fn runge_kutta_step(&mut self, dt_seconds: f64) {
        self.compute_acceleration();
        for entry in &mut self.entries {
            step::runge_kutta_stage_a(&mut entry.particle, &mut entry.scratch, dt_seconds);
        }
        self.compute_acceleration();
        for entry in &mut self.entries {
            step::runge_kutta_stage_b(&mut entry.particle, &mut entry.scratch, dt_seconds);
        }
        self.compute_acceleration();
        for entry in &mut self.entries {
            step::runge_kutta_stage_c(&mut entry.particle, &mut entry.scratch, dt_seconds);
        }
        self.compute_acceleration();
        for entry in &mut self.entries {
            step::runge_kutta_stage_d(&mut entry.particle, &mut entry.scratch, dt_seconds);
        }
    }

    /// Advance all particles one step with the 4-step Adams-Bashforth-Moulton
    /// predictor-corrector.
    ///
    /// While fewer than four history samples exist (first use, step-size
    /// change, or another scheme ran in between), each call performs one full
    /// Runge-Kutta step followed by a force evaluation recorded into the
    /// history ring. Once warm, each call predicts, evaluates forces at the
    /// predicted state (recorded into the ring), and corrects.
    pub fn advance_abm4(&mut self, dt_seconds: f64) {
        check_step(dt_seconds);
        if !self.abm.valid || self.abm.step_seconds != dt_seconds {
            self.abm = Abm4Session {
                valid: true,
                step_seconds: dt_seconds,
                filled: 0,
                cursor: 0,
            };
        }

        if self.abm.filled < 4 {
            self.runge_kutta_step(dt_seconds);
            self.compute_acceleration();
            self.record_history();
            self.abm.filled += 1;
            return;
        }

        let cursor = self.abm.cursor;
        for entry in &mut self.entries {
            let ordered = entry.history.ordered(cursor);
            step::abm4_predict(&mut entry.particle, &mut entry.scratch, &ordered, dt_seconds);
        }
        self.compute_acceleration();
        self.record_history();
        let cursor = self.abm.cursor;
        for entry in &mut self.entries {
            let ordered = entry.history.ordered(cursor);
            step::abm4_correct(&mut entry.particle, &entry.scratch, &ordered, dt_seconds);
        }
    }

    fn record_history(&mut self) {
        let cursor = self.abm.cursor;
        for entry in &mut self.entries {
            entry.history.record(
                cursor,
                HistorySample {
                    velocity: entry.particle.velocity,
                    acceleration: entry.particle.acceleration,
                },
            );
        }
        self.abm.cursor = (cursor + 1) % 4;
    }

    /// Recenter the system on its μ-weighted barycenter.
    ///
    /// μ weighting, not mass weighting: μ is known to tighter relative
    /// precision than mass for solar-system bodies. Massless particles carry
    /// zero weight but are recentered like everything else. Panics if no body
    /// has positive μ.
    pub fn correct_drift(&mut self) {
        let mut mu_sum = 0.0;
        let mut weighted_position = Vector3::zero();
        let mut weighted_velocity = Vector3::zero();
        for entry in &self.entries {
            let mu = entry.particle.mu();
            mu_sum += mu;
            weighted_position.accumulate(entry.particle.position * mu);
            weighted_velocity.accumulate(entry.particle.velocity * mu);
        }
        assert!(
            mu_sum > 0.0,
            "drift correction needs at least one body with positive mu"
        );
        self.correct_drift_to(
            weighted_position * (1.0 / mu_sum),
            weighted_velocity * (1.0 / mu_sum),
        );
    }

    /// Subtract an externally supplied drift from every particle's position
    /// and velocity.
    pub fn correct_drift_to(&mut self, drift_position: Vector3, drift_velocity: Vector3) {
        for entry in &mut self.entries {
            entry.particle.position = entry.particle.position - drift_position;
            entry.particle.velocity = entry.particle.velocity - drift_velocity;
        }
    }

    /// Total kinetic energy `Σ ½ m |v|²` in joules.
    pub fn kinetic_energy(&self) -> f64 {
        self.entries.iter().map(|e| e.particle.kinetic_energy()).sum()
    }

    /// Total potential energy in joules, valid immediately after a force
    /// evaluation. Per-particle values are stored pre-halved, so this is a
    /// plain sum.
    pub fn potential_energy(&self) -> f64 {
        self.entries.iter().map(|e| e.particle.potential_energy()).sum()
    }

    /// Total mechanical energy in joules.
    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy() + self.potential_energy()
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn check_step(dt_seconds: f64) {
    assert!(
        dt_seconds.is_finite() && dt_seconds > 0.0,
        "step size must be positive and finite, got {dt_seconds}"
    );
}
