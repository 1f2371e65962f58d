//! Force model: Newtonian point-mass attraction and the isotropic PPN
//! relativistic correction.
//!
//! Both passes work from frozen [`PerturberState`] snapshots gathered by the
//! orchestrator, never from live particle state, so a pass always sees one
//! consistent view of the system. The relativistic pass additionally reads the
//! Newtonian acceleration snapshot of every perturber taken by the Newtonian
//! pass of the same step; see Folkner et al., "The Planetary and Lunar
//! Ephemerides DE430 and DE431", eq. (27), with β = γ = 1.

use nbody_core::vector::Vector3;

/// PPN parameter β; 1 for general relativity.
pub const PPN_BETA: f64 = 1.0;
/// PPN parameter γ; 1 for general relativity.
pub const PPN_GAMMA: f64 = 1.0;

/// Frozen view of one perturber, valid for the duration of a force pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PerturberState {
    pub position: Vector3,
    pub velocity: Vector3,
    pub mu: f64,
    pub newtonian_acceleration: Vector3,
}

/// Newtonian acceleration and potential energy of a body at `position` with
/// mass `mass_kg`, summed over every perturber except the body itself.
///
/// Returns the acceleration and the potential energy already halved: each
/// unordered pair is counted from both ends across the whole system, and the
/// double-count is resolved here so the system total is a plain sum.
pub(crate) fn newtonian(
    position: Vector3,
    mass_kg: f64,
    self_slot: Option<usize>,
    perturbers: &[PerturberState],
) -> (Vector3, f64) {
    let mut acceleration = Vector3::zero();
    let mut potential = 0.0;
    for (slot, perturber) in perturbers.iter().enumerate() {
        if Some(slot) == self_slot {
            continue;
        }
        let offset = perturber.position - position;
        let distance_squared = offset.norm_squared();
        let distance = distance_squared.sqrt();
        acceleration.accumulate(position.direction_to(perturber.position) * (perturber.mu / distance_squared));
        potential -= perturber.mu * mass_kg / distance;
    }
    (acceleration, 0.5 * potential)
}

/// For every perturber B, the sum `Σ_{C≠B} μ_C / r_BC` over the other
/// perturbers. Computed once per relativistic pass; it feeds the second inner
/// sum of the curly-brace term for every target particle.
pub(crate) fn mu_over_r_at_perturbers(perturbers: &[PerturberState]) -> Vec<f64> {
    let mut sums = vec![0.0; perturbers.len()];
    for (slot, perturber) in perturbers.iter().enumerate() {
        let mut sum = 0.0;
        for (other_slot, other) in perturbers.iter().enumerate() {
            if other_slot == slot {
                continue;
            }
            sum += other.mu / perturber.position.distance(other.position);
        }
        sums[slot] = sum;
    }
    sums
}

/// Relativistic correction to the acceleration of a body at `position` with
/// velocity `velocity`, to be added on top of its Newtonian acceleration.
///
/// Implements the isotropic parameterized post-Newtonian n-body acceleration
/// with β = γ = 1. The two inner sums of the curly-brace term are asymmetric
/// by construction: one runs over all perturbers other than the target A, the
/// other over all perturbers other than the current perturber B. Every
/// perturber contribution reads that perturber's Newtonian acceleration
/// snapshot, never a recomputed or corrected value.
pub(crate) fn relativistic_correction(
    position: Vector3,
    velocity: Vector3,
    self_slot: Option<usize>,
    perturbers: &[PerturberState],
    mu_over_r_at_perturber: &[f64],
    speed_of_light: f64,
) -> Vector3 {
    let c2 = speed_of_light * speed_of_light;
    let velocity_squared = velocity.norm_squared();

    // Σ_{C≠A} μ_C / r_AC, the potential-like sum at the target body.
    let mut mu_over_r_at_target = 0.0;
    for (slot, perturber) in perturbers.iter().enumerate() {
        if Some(slot) == self_slot {
            continue;
        }
        mu_over_r_at_target += perturber.mu / position.distance(perturber.position);
    }

    let mut curly_term = Vector3::zero();
    let mut velocity_cross_term = Vector3::zero();
    let mut perturber_acceleration_term = Vector3::zero();

    for (slot, perturber) in perturbers.iter().enumerate() {
        if Some(slot) == self_slot {
            continue;
        }
        let offset = perturber.position - position; // r_B − r_A
        let distance = offset.norm();
        let factor = perturber.mu / (distance * distance * distance);

        // (r_A − r_B)·v_B / r_AB
        let radial_speed = (-offset).dot(perturber.velocity) / distance;

        let mut bracket = 0.0;
        bracket -= 2.0 * (PPN_BETA + PPN_GAMMA) / c2 * mu_over_r_at_target;
        bracket -= (2.0 * PPN_BETA - 1.0) / c2 * mu_over_r_at_perturber[slot];
        bracket += PPN_GAMMA * velocity_squared / c2;
        bracket += (1.0 + PPN_GAMMA) * perturber.velocity.norm_squared() / c2;
        bracket -= 2.0 * (1.0 + PPN_GAMMA) / c2 * velocity.dot(perturber.velocity);
        bracket -= 1.5 / c2 * radial_speed * radial_speed;
        bracket += 0.5 / c2 * offset.dot(perturber.newtonian_acceleration);
        curly_term.accumulate(offset * (factor * bracket));

        let velocity_weight =
            velocity * (2.0 + 2.0 * PPN_GAMMA) - perturber.velocity * (1.0 + 2.0 * PPN_GAMMA);
        velocity_cross_term.accumulate(
            (velocity - perturber.velocity) * (factor * (-offset).dot(velocity_weight)),
        );

        perturber_acceleration_term
            .accumulate(perturber.newtonian_acceleration * (perturber.mu / distance));
    }

    curly_term
        + velocity_cross_term * (1.0 / c2)
        + perturber_acceleration_term * ((3.0 + 4.0 * PPN_GAMMA) / (2.0 * c2))
}
