//! Per-body physical state and force-model outputs.

use nbody_core::constants::GRAVITATIONAL_CONSTANT;
use nbody_core::vector::Vector3;
use serde::Serialize;

/// Physical state of one simulated body plus the outputs of the latest
/// force evaluation.
///
/// Scheme-transient scratch (Runge-Kutta stage vectors, ABM4 history) lives in
/// [`crate::step`] records held by the system alongside each particle, not
/// here, so this type carries only the authoritative dynamical state.
#[derive(Debug, Clone)]
pub struct Particle {
    mass_kg: f64,
    mu: f64,
    pub(crate) position: Vector3,
    pub(crate) velocity: Vector3,
    pub(crate) acceleration: Vector3,
    pub(crate) newtonian_acceleration: Vector3,
    pub(crate) potential_energy: f64,
}

impl Particle {
    /// Create a body whose gravitational parameter is derived as `G · mass`.
    pub fn with_mass(mass_kg: f64, position: Vector3, velocity: Vector3) -> Self {
        Self::with_mu(mass_kg, GRAVITATIONAL_CONSTANT * mass_kg, position, velocity)
    }

    /// Create a body with an explicitly supplied gravitational parameter.
    ///
    /// Preferred for solar-system bodies, where μ is known to tighter relative
    /// precision than the mass itself.
    pub fn with_mu(mass_kg: f64, mu_m3_s2: f64, position: Vector3, velocity: Vector3) -> Self {
        Self {
            mass_kg,
            mu: mu_m3_s2,
            position,
            velocity,
            acceleration: Vector3::zero(),
            newtonian_acceleration: Vector3::zero(),
            potential_energy: 0.0,
        }
    }

    /// Create a massless test particle (probe, spacecraft, small asteroid).
    ///
    /// It is acted upon by gravity but exerts none.
    pub fn massless(position: Vector3, velocity: Vector3) -> Self {
        Self::with_mu(0.0, 0.0, position, velocity)
    }

    /// Body mass in kg.
    #[inline]
    pub fn mass_kg(&self) -> f64 {
        self.mass_kg
    }

    /// Standard gravitational parameter μ in m³/s².
    #[inline]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Current position in metres.
    #[inline]
    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Current velocity in m/s.
    #[inline]
    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    /// Total acceleration from the latest force evaluation (Newtonian, plus
    /// the relativistic correction when enabled).
    #[inline]
    pub fn acceleration(&self) -> Vector3 {
        self.acceleration
    }

    /// Newtonian-only acceleration snapshot from the latest force evaluation.
    #[inline]
    pub fn newtonian_acceleration(&self) -> Vector3 {
        self.newtonian_acceleration
    }

    /// Potential energy from the latest Newtonian pass, in joules.
    ///
    /// Stored pre-halved: the pair double-count inherent in summing from both
    /// ends is resolved here, so the system-level total is a plain sum.
    #[inline]
    pub fn potential_energy(&self) -> f64 {
        self.potential_energy
    }

    /// Kinetic energy `½ m |v|²` in joules.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass_kg * self.velocity.norm_squared()
    }

    /// Snapshot of the externally visible state.
    pub fn state(&self) -> ParticleState {
        ParticleState {
            position_m: self.position,
            velocity_m_s: self.velocity,
            mu_m3_s2: self.mu,
            kinetic_energy_joules: self.kinetic_energy(),
            potential_energy_joules: self.potential_energy,
        }
    }
}

/// Serializable snapshot of one body's externally visible state.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParticleState {
    pub position_m: Vector3,
    pub velocity_m_s: Vector3,
    pub mu_m3_s2: f64,
    pub kinetic_energy_joules: f64,
    pub potential_energy_joules: f64,
}
