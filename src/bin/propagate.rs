use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use solar_nbody::config::{build_system, load_bodies, load_scenario};
use solar_nbody::dynamics::ParticleSystem;
use solar_nbody::export::{energy, summary, trajectory, writer_for_path};
use solar_nbody::time::days_to_seconds;

/// Propagate a scenario forward in time with a fixed-step integrator and
/// export trajectory and energy diagnostics.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fixed-step gravitational n-body propagator (Newtonian + PPN)"
)]
struct Cli {
    /// Scenario YAML with seed state vectors
    #[arg(long)]
    scenario: PathBuf,

    /// Body catalog: a TOML file or a directory of TOML files
    #[arg(long, default_value = "configs/bodies")]
    bodies: PathBuf,

    /// Integration scheme
    #[arg(long, value_enum, default_value_t = Integrator::Rk4)]
    integrator: Integrator,

    /// Step size in seconds
    #[arg(long, default_value_t = 3_600.0)]
    dt_seconds: f64,

    /// Simulated duration in days
    #[arg(long)]
    duration_days: f64,

    /// Sample the trajectory every N steps (0 disables sampling)
    #[arg(long, default_value_t = 24)]
    sample_every: u64,

    /// Recenter the system on its barycenter every N steps (0 disables)
    #[arg(long, default_value_t = 0)]
    drift_correct_every: u64,

    /// Force the relativistic correction on, overriding the scenario flag
    #[arg(long, default_value_t = false)]
    relativity: bool,

    /// Trajectory CSV output path (`-` for stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Energy diagnostics CSV output path
    #[arg(long)]
    energy_output: Option<PathBuf>,

    /// Run summary JSON path
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum Integrator {
    Leapfrog,
    Rk4,
    Abm4,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let catalog = load_bodies(&cli.bodies)
        .with_context(|| format!("loading body catalog from {}", cli.bodies.display()))?;
    let scenario = load_scenario(&cli.scenario)
        .with_context(|| format!("loading scenario from {}", cli.scenario.display()))?;
    let mut system = build_system(&scenario, &catalog)?;
    if cli.relativity {
        system.set_general_relativity(true);
    }

    if !(cli.dt_seconds.is_finite() && cli.dt_seconds > 0.0) {
        bail!("--dt-seconds must be positive");
    }
    let steps = (days_to_seconds(cli.duration_days) / cli.dt_seconds).round() as u64;
    if steps == 0 {
        bail!("duration of {} days yields no steps at dt = {} s", cli.duration_days, cli.dt_seconds);
    }

    let started_utc = summary::timestamp_utc();
    system.compute_acceleration();
    let initial_energy = system.total_energy();

    let mut trajectory_writer = match &cli.output {
        Some(path) => {
            let mut writer = writer_for_path(path)?;
            trajectory::write_header(&mut writer)?;
            Some(writer)
        }
        None => None,
    };
    let mut energy_writer = match &cli.energy_output {
        Some(path) => {
            let mut writer = writer_for_path(path)?;
            energy::write_header(&mut writer)?;
            Some(writer)
        }
        None => None,
    };

    if matches!(cli.integrator, Integrator::Leapfrog) {
        system.init_leapfrog(cli.dt_seconds);
    }

    for step in 1..=steps {
        match cli.integrator {
            Integrator::Leapfrog => system.advance_leapfrog(cli.dt_seconds),
            Integrator::Rk4 => system.advance_runge_kutta(cli.dt_seconds),
            Integrator::Abm4 => system.advance_abm4(cli.dt_seconds),
        }
        if cli.drift_correct_every > 0 && step % cli.drift_correct_every == 0 {
            system.correct_drift();
        }
        if cli.sample_every > 0 && step % cli.sample_every == 0 {
            let t_seconds = step as f64 * cli.dt_seconds;
            sample(&mut system, t_seconds, &mut trajectory_writer, &mut energy_writer)?;
        }
    }

    system.compute_acceleration();
    let final_energy = system.total_energy();
    let relative_drift = if initial_energy != 0.0 {
        (final_energy - initial_energy) / initial_energy.abs()
    } else {
        0.0
    };

    if let Some(writer) = trajectory_writer.as_mut() {
        writer.flush()?;
    }
    if let Some(writer) = energy_writer.as_mut() {
        writer.flush()?;
    }

    println!(
        "Scenario       : {} ({} bodies, epoch {})",
        scenario.name,
        system.len(),
        scenario.epoch
    );
    println!(
        "Integrator     : {:?}, dt = {} s, {} steps ({} days)",
        cli.integrator, cli.dt_seconds, steps, cli.duration_days
    );
    println!(
        "Relativity     : {}",
        if system.general_relativity() { "on" } else { "off" }
    );
    println!("Energy drift   : {:.3e} (relative)", relative_drift);

    if let Some(path) = &cli.summary {
        summary::write(
            path,
            &summary::RunSummary {
                scenario: scenario.name.clone(),
                integrator: format!("{:?}", cli.integrator).to_lowercase(),
                dt_seconds: cli.dt_seconds,
                steps,
                bodies: system.len(),
                general_relativity: system.general_relativity(),
                started_utc,
                initial_total_energy_joules: initial_energy,
                final_total_energy_joules: final_energy,
                relative_energy_drift: relative_drift,
            },
        )?;
    }

    Ok(())
}

fn sample(
    system: &mut ParticleSystem,
    t_seconds: f64,
    trajectory_writer: &mut Option<Box<dyn std::io::Write>>,
    energy_writer: &mut Option<Box<dyn std::io::Write>>,
) -> anyhow::Result<()> {
    if trajectory_writer.is_none() && energy_writer.is_none() {
        return Ok(());
    }
    // Refresh diagnostics so potential energy matches the sampled state.
    system.compute_acceleration();
    if let Some(writer) = trajectory_writer.as_mut() {
        for (name, particle) in system.iter() {
            let position = particle.position();
            let velocity = particle.velocity();
            trajectory::Record {
                t_seconds,
                body: name,
                position_m: [position.x, position.y, position.z],
                velocity_m_s: [velocity.x, velocity.y, velocity.z],
            }
            .write_to(writer)?;
        }
    }
    if let Some(writer) = energy_writer.as_mut() {
        energy::Record {
            t_seconds,
            kinetic_joules: system.kinetic_energy(),
            potential_joules: system.potential_energy(),
            total_joules: system.total_energy(),
        }
        .write_to(writer)?;
    }
    Ok(())
}
