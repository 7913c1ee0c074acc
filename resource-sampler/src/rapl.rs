//! Package energy from the Linux powercap RAPL interface

use crate::error::{Error, Result};
use crate::handle::Sampler;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Package 0 zone on Intel machines
pub const DEFAULT_ZONE: &str = "/sys/devices/virtual/powercap/intel-rapl/intel-rapl:0";

/// Energy consumed over a sampling window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaplReading {
    pub energy_uj: u64,
    pub elapsed: Duration,
}

impl RaplReading {
    /// Energy in millijoules
    pub fn cpu_mj(&self) -> f64 {
        self.energy_uj as f64 / 1e3
    }

    /// Average power in milliwatts
    pub fn power_mw(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.energy_uj as f64 / secs / 1e3
    }
}

/// Samples a RAPL zone's `energy_uj` counter
#[derive(Debug)]
pub struct RaplSampler {
    zone: PathBuf,
    max_range_uj: Option<u64>,
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
    last_uj: u64,
    total_uj: u64,
}

impl RaplSampler {
    pub fn new() -> Self {
        Self::with_zone(DEFAULT_ZONE)
    }

    /// Sample a specific zone directory (containing `energy_uj`)
    pub fn with_zone<P: AsRef<Path>>(zone: P) -> Self {
        Self {
            zone: zone.as_ref().to_path_buf(),
            max_range_uj: None,
            started_at: None,
            stopped_at: None,
            last_uj: 0,
            total_uj: 0,
        }
    }

    fn read_counter(&self, file: &str) -> Result<u64> {
        let path = self.zone.join(file);
        let raw = fs::read_to_string(&path)?;
        raw.trim().parse::<u64>().map_err(|e| {
            Error::Parse(format!("{}: {:?}: {}", path.display(), raw.trim(), e))
        })
    }
}

impl Default for RaplSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RaplSampler {
    type Output = RaplReading;

    fn name(&self) -> &'static str {
        "rapl"
    }

    fn start(&mut self) -> Result<()> {
        if !self.zone.join("energy_uj").exists() {
            return Err(Error::Unavailable(format!(
                "no energy counter in {}",
                self.zone.display()
            )));
        }
        self.max_range_uj = self.read_counter("max_energy_range_uj").ok();
        self.last_uj = self.read_counter("energy_uj")?;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn sample(&mut self) -> Result<()> {
        let current = self.read_counter("energy_uj")?;
        let delta = if current >= self.last_uj {
            current - self.last_uj
        } else {
            // Counter wrapped
            match self.max_range_uj {
                Some(range) => range.saturating_sub(self.last_uj) + current,
                None => {
                    log::warn!(
                        "RAPL counter went backwards ({} -> {}) without a known range",
                        self.last_uj,
                        current
                    );
                    0
                }
            }
        };
        self.total_uj += delta;
        self.last_uj = current;
        self.stopped_at = Some(Instant::now());
        Ok(())
    }

    fn finish(self) -> Result<RaplReading> {
        let elapsed = match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => stop.duration_since(start),
            _ => Duration::ZERO,
        };
        Ok(RaplReading {
            energy_uj: self.total_uj,
            elapsed,
        })
    }
}

/// True when package energy can be read on this machine
pub fn is_available() -> bool {
    cfg!(target_os = "linux")
        && cfg!(target_arch = "x86_64")
        && crate::cpu::is_root()
        && Path::new(DEFAULT_ZONE).exists()
}
