//! Core constants, units, and shared primitives for the solar n-body propagator workspace.

pub mod vector;

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Newtonian gravitational constant (m³ kg⁻¹ s⁻²), CODATA 2018.
    pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;
    /// Speed of light in vacuum (m/s).
    pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;
    /// Metres per astronomical unit.
    pub const AU_M: f64 = 1.495_978_707e11;
    /// Kilometres per astronomical unit.
    pub const AU_KM: f64 = 149_597_870.7;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Days per sidereal year.
    pub const SIDEREAL_YEAR_DAYS: f64 = 365.256_363;
    /// Standard gravitational parameter of the Sun (m³/s²), DE430.
    pub const MU_SUN_M3_S2: f64 = 1.327_124_400_18e20;
    /// Standard gravitational parameter of the Earth (m³/s²).
    pub const MU_EARTH_M3_S2: f64 = 3.986_004_418e14;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::AU_M;

    /// Convert kilometres to metres.
    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert astronomical units to metres.
    #[inline]
    pub fn au_to_m(v: f64) -> f64 {
        v * AU_M
    }

    /// Convert metres to astronomical units.
    #[inline]
    pub fn m_to_au(v: f64) -> f64 {
        v / AU_M
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    use super::constants::SECONDS_PER_DAY;

    /// Convert days to seconds.
    #[inline]
    pub fn days_to_seconds(days: f64) -> f64 {
        days * SECONDS_PER_DAY
    }

    /// Convert seconds to days.
    #[inline]
    pub fn seconds_to_days(seconds: f64) -> f64 {
        seconds / SECONDS_PER_DAY
    }
}
