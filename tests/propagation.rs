use solar_nbody::constants::{AU_M, GRAVITATIONAL_CONSTANT, MU_EARTH_M3_S2, MU_SUN_M3_S2};
use solar_nbody::dynamics::{Particle, ParticleSystem};
use solar_nbody::vector::Vector3;

const SUN_MASS_KG: f64 = 1.9885e30;
const EARTH_MASS_KG: f64 = 5.9722e24;

fn circular_speed(mu: f64, radius: f64) -> f64 {
    (mu / radius).sqrt()
}

/// Sun at rest at the origin, Earth at 1 AU with circular orbital velocity
/// perpendicular to the radius vector.
fn sun_earth_system() -> ParticleSystem {
    let mut system = ParticleSystem::new();
    system.add_particle(
        "Sun",
        Particle::with_mu(SUN_MASS_KG, MU_SUN_M3_S2, Vector3::zero(), Vector3::zero()),
    );
    system.add_particle(
        "Earth",
        Particle::with_mu(
            EARTH_MASS_KG,
            MU_EARTH_M3_S2,
            Vector3::new(AU_M, 0.0, 0.0),
            Vector3::new(0.0, circular_speed(MU_SUN_M3_S2, AU_M), 0.0),
        ),
    );
    system
}

/// Period of the Sun-Earth relative orbit implied by the seed state, from
/// vis-viva with the combined gravitational parameter.
fn relative_orbit_period() -> f64 {
    let mu = MU_SUN_M3_S2 + MU_EARTH_M3_S2;
    let v = circular_speed(MU_SUN_M3_S2, AU_M);
    let semi_major = 1.0 / (2.0 / AU_M - v * v / mu);
    std::f64::consts::TAU * (semi_major.powi(3) / mu).sqrt()
}

fn earth_relative_to_sun(system: &ParticleSystem) -> Vector3 {
    let sun = system.particle("Sun").expect("sun registered");
    let earth = system.particle("Earth").expect("earth registered");
    earth.position() - sun.position()
}

#[test]
fn two_body_acceleration_matches_closed_form() {
    let sun_position = Vector3::new(1.0e11, -2.0e10, 5.0e9);
    let earth_position = Vector3::new(-0.4e11, 1.1e11, -3.0e10);
    let mut system = ParticleSystem::new();
    system.add_particle(
        "Sun",
        Particle::with_mass(SUN_MASS_KG, sun_position, Vector3::zero()),
    );
    system.add_particle(
        "Earth",
        Particle::with_mass(EARTH_MASS_KG, earth_position, Vector3::zero()),
    );
    system.compute_acceleration();

    let distance = sun_position.distance(earth_position);
    let mu_sun = GRAVITATIONAL_CONSTANT * SUN_MASS_KG;
    let mu_earth = GRAVITATIONAL_CONSTANT * EARTH_MASS_KG;

    let earth_accel = system.particle("Earth").unwrap().acceleration();
    let expected_earth =
        earth_position.direction_to(sun_position) * (mu_sun / (distance * distance));
    assert!(
        (earth_accel - expected_earth).norm() <= 1e-12 * expected_earth.norm(),
        "Earth acceleration {:?} should equal mu_sun/r^2 toward the Sun {:?}",
        earth_accel,
        expected_earth
    );

    let sun_accel = system.particle("Sun").unwrap().acceleration();
    let expected_sun = sun_position.direction_to(earth_position) * (mu_earth / (distance * distance));
    assert!(
        (sun_accel - expected_sun).norm() <= 1e-12 * expected_sun.norm(),
        "Sun acceleration should equal mu_earth/r^2 toward Earth"
    );

    // Both particles carry half the pair potential, so the total is -G m1 m2 / r.
    let expected_potential = -GRAVITATIONAL_CONSTANT * SUN_MASS_KG * EARTH_MASS_KG / distance;
    let total_potential = system.potential_energy();
    assert!(
        (total_potential - expected_potential).abs() <= 1e-10 * expected_potential.abs(),
        "total potential {} should be -G m1 m2 / r = {}",
        total_potential,
        expected_potential
    );
}

#[test]
fn massless_body_does_not_perturb_massive_bodies() {
    let dt = 3_600.0;
    let steps = 100;

    let mut reference = sun_earth_system();
    for _ in 0..steps {
        reference.advance_runge_kutta(dt);
    }

    let mut with_probe = sun_earth_system();
    with_probe.add_particle_without_mass(
        "Probe",
        Particle::massless(
            Vector3::new(AU_M, -1.0e9, 0.0),
            Vector3::new(100.0, circular_speed(MU_SUN_M3_S2, AU_M), 0.0),
        ),
    );
    for _ in 0..steps {
        with_probe.advance_runge_kutta(dt);
    }

    for name in ["Sun", "Earth"] {
        let expected = reference.particle(name).unwrap().position();
        let actual = with_probe.particle(name).unwrap().position();
        assert!(
            (actual - expected).norm() <= 1e-3,
            "{name} trajectory moved by {} m after adding a massless probe",
            (actual - expected).norm()
        );
    }
    // The probe itself must still be pulled along a sensible orbit.
    let probe = with_probe.particle("Probe").unwrap();
    assert!(probe.position().distance(Vector3::zero()) > 0.9 * AU_M);
}

#[test]
fn runge_kutta_position_error_shrinks_as_dt_fourth_power() {
    let period = relative_orbit_period();

    let error_for = |steps: u64| {
        let mut system = sun_earth_system();
        let start = earth_relative_to_sun(&system);
        let dt = period / steps as f64;
        for _ in 0..steps {
            system.advance_runge_kutta(dt);
        }
        (earth_relative_to_sun(&system) - start).norm()
    };

    let coarse = error_for(300);
    let fine = error_for(600);
    let ratio = coarse / fine;
    // Fourth-order convergence: halving dt should shrink the error by ~16x.
    assert!(
        (5.0..50.0).contains(&ratio),
        "expected ~16x error reduction when halving dt, got {ratio:.2}x (coarse {coarse:.3e} m, fine {fine:.3e} m)"
    );
}

#[test]
fn drift_correction_zeroes_mu_weighted_means() {
    let mut system = ParticleSystem::new();
    system.add_particle(
        "Sun",
        Particle::with_mu(
            SUN_MASS_KG,
            MU_SUN_M3_S2,
            Vector3::new(3.0e8, -2.0e8, 1.0e8),
            Vector3::new(2.0, -1.0, 0.5),
        ),
    );
    system.add_particle(
        "Jupiter",
        Particle::with_mu(
            1.8982e27,
            1.26686534e17,
            Vector3::new(7.78e11, 1.0e11, -2.0e10),
            Vector3::new(-1300.0, 12000.0, 300.0),
        ),
    );
    system.add_particle(
        "Saturn",
        Particle::with_mu(
            5.6834e26,
            3.7931187e16,
            Vector3::new(-1.43e12, 3.0e11, 5.0e10),
            Vector3::new(2500.0, -9000.0, -200.0),
        ),
    );
    system.add_particle_without_mass(
        "Probe",
        Particle::massless(Vector3::new(2.0e11, 2.0e11, 0.0), Vector3::new(0.0, 15_000.0, 0.0)),
    );

    system.correct_drift();

    let mut mu_sum = 0.0;
    let mut weighted_position = Vector3::zero();
    let mut weighted_velocity = Vector3::zero();
    let mut position_scale = 0.0;
    let mut velocity_scale = 0.0;
    for (_, particle) in system.iter() {
        mu_sum += particle.mu();
        weighted_position.accumulate(particle.position() * particle.mu());
        weighted_velocity.accumulate(particle.velocity() * particle.mu());
        position_scale += particle.mu() * particle.position().norm();
        velocity_scale += particle.mu() * particle.velocity().norm();
    }
    assert!(mu_sum > 0.0);
    assert!(
        weighted_position.norm() <= 1e-12 * position_scale,
        "mu-weighted position sum should vanish, got {:?}",
        weighted_position
    );
    assert!(
        weighted_velocity.norm() <= 1e-12 * velocity_scale,
        "mu-weighted velocity sum should vanish, got {:?}",
        weighted_velocity
    );
}

#[test]
fn abm4_bootstraps_with_four_runge_kutta_steps() {
    let dt = 3_600.0;
    let mut system = sun_earth_system();

    // Bootstrap: 4 RK stage evaluations plus the history evaluation per call.
    for call in 0..4 {
        let before = system.force_evaluations();
        system.advance_abm4(dt);
        assert_eq!(
            system.force_evaluations() - before,
            5,
            "bootstrap call {call} should cost one RK step plus one history evaluation"
        );
    }
    // Warm path: predictor, one evaluation at the predicted state, corrector.
    for call in 0..4 {
        let before = system.force_evaluations();
        system.advance_abm4(dt);
        assert_eq!(
            system.force_evaluations() - before,
            1,
            "warm call {call} should cost exactly one force evaluation"
        );
    }
    // A step-size change discards the history and forces a full re-bootstrap.
    for call in 0..4 {
        let before = system.force_evaluations();
        system.advance_abm4(dt / 2.0);
        assert_eq!(
            system.force_evaluations() - before,
            5,
            "re-bootstrap call {call} after dt change should cost five evaluations"
        );
    }
    let before = system.force_evaluations();
    system.advance_abm4(dt / 2.0);
    assert_eq!(system.force_evaluations() - before, 1);
}

#[test]
fn abm4_follows_the_orbit_once_warm() {
    let period = relative_orbit_period();
    let steps: u64 = 400;
    let dt = period / steps as f64;

    let mut system = sun_earth_system();
    let start = earth_relative_to_sun(&system);
    for _ in 0..steps {
        system.advance_abm4(dt);
    }
    let relative = earth_relative_to_sun(&system);
    assert!(
        (relative.norm() - AU_M).abs() <= 0.01 * AU_M,
        "ABM4 orbit radius should stay near 1 AU, got {} m",
        relative.norm()
    );
    assert!(
        (relative - start).norm() <= 0.01 * AU_M,
        "ABM4 should return near the starting point after one period, missed by {} m",
        (relative - start).norm()
    );
}

/// Leapfrog velocities live on the staggered half-step grid; resynchronize
/// them before forming energies so the diagnostic reflects the scheme's true
/// bounded oscillation.
fn leapfrog_energy(system: &mut ParticleSystem, dt: f64) -> f64 {
    system.compute_acceleration();
    let mut kinetic = 0.0;
    for (_, particle) in system.iter() {
        let synchronized = particle.velocity() + particle.acceleration() * (0.5 * dt);
        kinetic += 0.5 * particle.mass_kg() * synchronized.norm_squared();
    }
    kinetic + system.potential_energy()
}

#[test]
fn leapfrog_energy_oscillates_without_secular_drift() {
    let dt = 86_400.0;
    let steps_per_orbit = 365;
    let orbits = 5;

    let mut system = sun_earth_system();
    system.init_leapfrog(dt);
    let initial = leapfrog_energy(&mut system, dt);

    let mut samples = Vec::new();
    for _ in 0..(steps_per_orbit * orbits) {
        system.advance_leapfrog(dt);
        let energy = leapfrog_energy(&mut system, dt);
        let deviation = (energy - initial) / initial.abs();
        assert!(
            deviation.abs() < 2e-3,
            "leapfrog energy deviation {deviation:.3e} exceeds the oscillation bound"
        );
        samples.push(energy);
    }

    // Compare one full orbital cycle at each end: the oscillation averages
    // out, leaving any secular drift.
    let first_cycle: f64 =
        samples[..steps_per_orbit].iter().sum::<f64>() / steps_per_orbit as f64;
    let last_cycle: f64 = samples[samples.len() - steps_per_orbit..].iter().sum::<f64>()
        / steps_per_orbit as f64;
    let secular = (last_cycle - first_cycle) / initial.abs();
    assert!(
        secular.abs() < 1e-4,
        "leapfrog energy shows secular drift of {secular:.3e} over {orbits} orbits"
    );
}

#[test]
fn runge_kutta_energy_drift_shrinks_as_dt_fourth_power() {
    let drift_for = |dt: f64, steps: u64| {
        let mut system = sun_earth_system();
        system.compute_acceleration();
        let initial = system.total_energy();
        for _ in 0..steps {
            system.advance_runge_kutta(dt);
        }
        system.compute_acceleration();
        ((system.total_energy() - initial) / initial.abs()).abs()
    };

    let coarse = drift_for(86_400.0, 800);
    let fine = drift_for(43_200.0, 1_600);
    assert!(coarse < 1e-4, "RK4 energy drift unexpectedly large: {coarse:.3e}");
    assert!(
        fine < coarse / 6.0,
        "halving dt should shrink RK4 energy drift ~16x over the same span, got {coarse:.3e} -> {fine:.3e}"
    );
}

#[test]
fn relativistic_correction_vanishes_as_c_grows() {
    let perihelion = 4.6e10;
    let speed = 58_980.0;
    let mut system = ParticleSystem::new();
    system.add_particle(
        "Sun",
        Particle::with_mu(SUN_MASS_KG, MU_SUN_M3_S2, Vector3::zero(), Vector3::zero()),
    );
    system.add_particle(
        "Mercury",
        Particle::with_mu(
            3.3011e23,
            2.2032e13,
            Vector3::new(perihelion, 0.0, 0.0),
            Vector3::new(0.0, speed, 0.0),
        ),
    );
    system.set_general_relativity(true);

    system.compute_acceleration();
    let mercury = system.particle("Mercury").unwrap();
    let newtonian = mercury.newtonian_acceleration();
    let correction = (mercury.acceleration() - newtonian).norm();
    assert!(
        correction > 1e-9 * newtonian.norm(),
        "relativistic correction should be nonzero at Mercury's perihelion"
    );
    assert!(
        correction < 1e-6 * newtonian.norm(),
        "relativistic correction should be a small perturbation, got {:.3e} of Newtonian",
        correction / newtonian.norm()
    );

    let speed_of_light = system.speed_of_light();
    system.set_speed_of_light(speed_of_light * 1.0e3);
    system.compute_acceleration();
    let mercury = system.particle("Mercury").unwrap();
    let scaled_correction = (mercury.acceleration() - mercury.newtonian_acceleration()).norm();
    // The correction scales as 1/c^2: three orders of magnitude in c buys six
    // in the correction.
    assert!(
        scaled_correction < correction * 1e-4,
        "correction did not converge toward Newtonian as c grew: {correction:.3e} -> {scaled_correction:.3e}"
    );
}

#[test]
fn earth_returns_after_one_orbital_period() {
    let dt = 3_600.0;
    let period = relative_orbit_period();
    let full_steps = (period / dt).floor() as u64;
    let remainder = period - full_steps as f64 * dt;

    let mut system = sun_earth_system();
    let start = earth_relative_to_sun(&system);
    for _ in 0..full_steps {
        system.advance_runge_kutta(dt);
        let radius = earth_relative_to_sun(&system).norm();
        assert!(
            (radius - AU_M).abs() <= 1e-3 * AU_M,
            "orbit radius strayed to {radius} m"
        );
    }
    if remainder > 0.0 {
        system.advance_runge_kutta(remainder);
    }

    let miss = (earth_relative_to_sun(&system) - start).norm();
    assert!(
        miss <= 5.0e5,
        "Earth should return to within a few hundred km after one period, missed by {:.1} km",
        miss / 1_000.0
    );
}

#[test]
fn default_system_matches_new() {
    let system = ParticleSystem::default();
    assert!(system.is_empty());
    assert!(!system.general_relativity());
    assert_eq!(system.speed_of_light(), 299_792_458.0);
    assert_eq!(system.force_evaluations(), 0);
}

#[test]
fn state_snapshot_exposes_energies_and_mu() {
    let mut system = sun_earth_system();
    system.compute_acceleration();
    let state = system.state("Earth").expect("earth registered");
    assert_eq!(state.mu_m3_s2, MU_EARTH_M3_S2);
    assert!(state.kinetic_energy_joules > 0.0);
    assert!(state.potential_energy_joules < 0.0);
    assert!(system.state("Pluto").is_none());
}
