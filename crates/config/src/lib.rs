//! Body-constant catalogs and simulation scenarios.
//!
//! The catalog is a directory of TOML files, one per body, carrying the
//! physical constants the propagator needs (mass, μ, radius, rotation data).
//! A scenario is a YAML file naming catalog bodies and their seed state
//! vectors; the ephemeris layer that produces those vectors is an external
//! collaborator, so scenarios simply carry its output.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use nbody_core::constants::GRAVITATIONAL_CONSTANT;
use nbody_core::vector::Vector3;
use nbody_dynamics::{Particle, ParticleSystem};

/// Physical constants for one body, parsed from a catalog TOML file.
#[derive(Debug, Deserialize, Clone)]
pub struct BodyConfig {
    pub name: String,
    pub mass_kg: f64,
    /// Standard gravitational parameter; preferred over `G · mass` when
    /// present, since μ is known to tighter relative precision.
    #[serde(default)]
    pub mu_m3_s2: Option<f64>,
    pub radius_km: f64,
    #[serde(default)]
    pub ellipticity: Option<f64>,
    #[serde(default)]
    pub sidereal_rotation_period_hours: Option<f64>,
}

impl BodyConfig {
    /// Gravitational parameter in m³/s²: the cataloged μ when present,
    /// `G · mass` otherwise.
    pub fn mu(&self) -> f64 {
        self.mu_m3_s2
            .unwrap_or(GRAVITATIONAL_CONSTANT * self.mass_kg)
    }
}

/// One body entry of a scenario: a catalog reference (or a massless probe)
/// plus its seed state vector.
#[derive(Debug, Deserialize, Clone)]
pub struct ScenarioBody {
    pub body: String,
    #[serde(default)]
    pub massless: bool,
    pub position_m: Vector3,
    pub velocity_m_s: Vector3,
}

/// A simulation scenario parsed from YAML.
#[derive(Debug, Deserialize, Clone)]
pub struct ScenarioConfig {
    pub name: String,
    /// Label of the epoch the seed state vectors were sampled at.
    pub epoch: String,
    #[serde(default)]
    pub general_relativity: bool,
    pub bodies: Vec<ScenarioBody>,
}

/// Errors that can occur while loading catalogs and scenarios.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("scenario references body '{0}' missing from the catalog")]
    UnknownBody(String),
}

/// Load body configurations from a TOML file or a directory of TOML files.
pub fn load_bodies<P: AsRef<Path>>(path: P) -> Result<Vec<BodyConfig>, ConfigError> {
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else {
        let contents = std::fs::read_to_string(path)?;
        Ok(vec![toml::from_str(&contents)?])
    }
}

/// Load a scenario from a YAML file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let reader = std::fs::File::open(path)?;
    Ok(serde_yaml::from_reader(reader)?)
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        records.push(toml::from_str(&contents)?);
    }
    Ok(records)
}

/// Build a [`ParticleSystem`] from a scenario and the body catalog.
///
/// Massive bodies are seeded with their cataloged μ; entries flagged
/// `massless` become test particles and need no catalog record.
pub fn build_system(
    scenario: &ScenarioConfig,
    catalog: &[BodyConfig],
) -> Result<ParticleSystem, ConfigError> {
    let mut system = ParticleSystem::new();
    system.set_general_relativity(scenario.general_relativity);
    for entry in &scenario.bodies {
        if entry.massless {
            system.add_particle_without_mass(
                &entry.body,
                Particle::massless(entry.position_m, entry.velocity_m_s),
            );
            continue;
        }
        let body = catalog
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(&entry.body))
            .ok_or_else(|| ConfigError::UnknownBody(entry.body.clone()))?;
        system.add_particle(
            &entry.body,
            Particle::with_mu(body.mass_kg, body.mu(), entry.position_m, entry.velocity_m_s),
        );
    }
    Ok(system)
}
