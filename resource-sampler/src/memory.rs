//! Resident memory of the current process

use crate::error::{Error, Result};
use crate::handle::Sampler;
use sysinfo::{Pid, System};

const MIB: f64 = 1024.0 * 1024.0;

/// Resident set size samples in MiB
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryUsage {
    pub samples: Vec<f64>,
}

impl MemoryUsage {
    pub fn max_mib(&self) -> f64 {
        self.samples.iter().copied().fold(0.0, f64::max)
    }
}

pub struct MemorySampler {
    system: System,
    pid: Option<Pid>,
    samples: Vec<f64>,
}

impl MemorySampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: None,
            samples: Vec::new(),
        }
    }

    fn resident_mib(&mut self, pid: Pid) -> Result<f64> {
        if !self.system.refresh_process(pid) {
            return Err(Error::Unavailable(format!("process {} not visible", pid)));
        }
        self.system
            .process(pid)
            .map(|process| process.memory() as f64 / MIB)
            .ok_or_else(|| Error::Unavailable(format!("process {} not visible", pid)))
    }
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for MemorySampler {
    type Output = MemoryUsage;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn start(&mut self) -> Result<()> {
        let pid = sysinfo::get_current_pid().map_err(|e| Error::Unavailable(e.to_string()))?;
        let baseline = self.resident_mib(pid)?;
        self.samples.push(baseline);
        self.pid = Some(pid);
        Ok(())
    }

    fn sample(&mut self) -> Result<()> {
        if let Some(pid) = self.pid {
            let mib = self.resident_mib(pid)?;
            self.samples.push(mib);
        }
        Ok(())
    }

    fn finish(self) -> Result<MemoryUsage> {
        Ok(MemoryUsage {
            samples: self.samples,
        })
    }
}
