//! Export helpers for CSV and JSON artifacts of propagation runs.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod trajectory {
    use std::io::{self, Write};

    const HEADER: &str = "t_seconds,body,x_m,y_m,z_m,vx_m_s,vy_m_s,vz_m_s";

    /// Write the standard trajectory CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// CSV row emitted by the trajectory exporter: one body at one sample time.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub t_seconds: f64,
        pub body: &'a str,
        pub position_m: [f64; 3],
        pub velocity_m_s: [f64; 3],
    }

    impl<'a> Record<'a> {
        /// Serialize the record to CSV, matching the standard header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(
                writer,
                "{:.3},{},{:.6e},{:.6e},{:.6e},{:.6e},{:.6e},{:.6e}",
                self.t_seconds,
                self.body,
                self.position_m[0],
                self.position_m[1],
                self.position_m[2],
                self.velocity_m_s[0],
                self.velocity_m_s[1],
                self.velocity_m_s[2],
            )
        }
    }
}

pub mod energy {
    use std::io::{self, Write};

    const HEADER: &str = "t_seconds,kinetic_joules,potential_joules,total_joules";

    /// Write the standard energy-diagnostic CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// CSV row of system energy diagnostics at one sample time.
    #[derive(Debug, Clone, Copy)]
    pub struct Record {
        pub t_seconds: f64,
        pub kinetic_joules: f64,
        pub potential_joules: f64,
        pub total_joules: f64,
    }

    impl Record {
        /// Serialize the record to CSV, matching the standard header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(
                writer,
                "{:.3},{:.9e},{:.9e},{:.9e}",
                self.t_seconds, self.kinetic_joules, self.potential_joules, self.total_joules,
            )
        }
    }
}

pub mod summary {
    use std::fs::File;
    use std::io;
    use std::path::Path;

    use chrono::{SecondsFormat, Utc};
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    /// JSON sidecar describing a completed propagation run.
    #[derive(Debug, Clone, Serialize)]
    pub struct RunSummary {
        pub scenario: String,
        pub integrator: String,
        pub dt_seconds: f64,
        pub steps: u64,
        pub bodies: usize,
        pub general_relativity: bool,
        pub started_utc: String,
        pub initial_total_energy_joules: f64,
        pub final_total_energy_joules: f64,
        pub relative_energy_drift: f64,
    }

    /// Current UTC timestamp in the format used by [`RunSummary::started_utc`].
    pub fn timestamp_utc() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Write the run summary as pretty-printed JSON.
    pub fn write(path: &Path, summary: &RunSummary) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        to_writer_pretty(File::create(path)?, summary)?;
        Ok(())
    }
}
