//! CPU power from macOS `powermetrics`
//!
//! Two samplers are provided:
//! - [`PowerMetricsSummary`]: one long-running `powermetrics` process that is
//!   interrupted on stop and reports its usage summary
//! - [`PowerMetricsDetail`]: one short `powermetrics` invocation per tick

mod aggregate;
mod sample;

pub use aggregate::{aggregate, PowerStats};
pub use sample::{parse_samples, Cluster, Cpu, PowerSample, Processor};

use crate::error::{Error, Result};
use crate::handle::Sampler;
use std::env;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

pub const POWERMETRICS: &str = "powermetrics";

/// Long-running `powermetrics` process interrupted with SIGINT on stop
pub struct PowerMetricsSummary {
    program: PathBuf,
    child: Option<Child>,
}

impl PowerMetricsSummary {
    pub fn new() -> Self {
        Self::with_program(POWERMETRICS)
    }

    pub fn with_program<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            child: None,
        }
    }
}

impl Default for PowerMetricsSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for PowerMetricsSummary {
    type Output = Vec<PowerSample>;

    fn name(&self) -> &'static str {
        "powermetrics"
    }

    fn start(&mut self) -> Result<()> {
        let child = Command::new(&self.program)
            .args(["-f", "plist", "-s", "cpu_power", "-i", "0", "--show-usage-summary"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Command(format!("{}: {}", self.program.display(), e)))?;
        log::debug!("started {} (pid {})", self.program.display(), child.id());
        self.child = Some(child);
        Ok(())
    }

    fn sample(&mut self) -> Result<()> {
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<PowerSample>> {
        let child = self
            .child
            .take()
            .ok_or_else(|| Error::Command("powermetrics was never started".to_string()))?;

        interrupt(&child)?;
        let output = child.wait_with_output()?;

        if !output.status.success() && output.status.signal() != Some(libc::SIGINT) {
            return Err(Error::Command(format!(
                "{} exited with {}",
                self.program.display(),
                output.status
            )));
        }

        let samples = parse_samples(&output.stdout)?;
        if samples.is_empty() {
            return Err(Error::Command(format!(
                "{} produced no samples",
                self.program.display()
            )));
        }
        Ok(samples)
    }
}

impl Drop for PowerMetricsSummary {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// One `powermetrics -n 1` invocation per tick
pub struct PowerMetricsDetail {
    program: PathBuf,
    samples: Vec<PowerSample>,
}

impl PowerMetricsDetail {
    pub fn new() -> Self {
        Self::with_program(POWERMETRICS)
    }

    pub fn with_program<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            samples: Vec::new(),
        }
    }
}

impl Default for PowerMetricsDetail {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for PowerMetricsDetail {
    type Output = Vec<PowerSample>;

    fn name(&self) -> &'static str {
        "powermetrics"
    }

    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn sample(&mut self) -> Result<()> {
        let output = Command::new(&self.program)
            .args(["-f", "plist", "-s", "cpu_power", "-i", "1", "-n", "1"])
            .stderr(Stdio::null())
            .output()
            .map_err(|e| Error::Command(format!("{}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            return Err(Error::Command(format!(
                "{} exited with {}",
                self.program.display(),
                output.status
            )));
        }

        self.samples.extend(parse_samples(&output.stdout)?);
        Ok(())
    }

    fn finish(self) -> Result<Vec<PowerSample>> {
        Ok(self.samples)
    }
}

fn interrupt(child: &Child) -> Result<()> {
    // SAFETY: the pid belongs to a child we have not yet reaped
    let rc = unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGINT) };
    if rc != 0 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }
    Ok(())
}

/// Locate an executable on `PATH`
pub fn which(binary: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// True on Apple silicon when running as root with `powermetrics` installed
pub fn is_available() -> bool {
    cfg!(target_os = "macos")
        && cfg!(target_arch = "aarch64")
        && crate::cpu::is_root()
        && which(POWERMETRICS).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_which_finds_shell() {
        assert!(which("sh").is_some());
        assert!(which("definitely-not-a-real-binary-name").is_none());
    }

    #[test]
    fn test_missing_program_fails_start() {
        let mut sampler = PowerMetricsSummary::with_program("/nonexistent/powermetrics");
        assert!(matches!(sampler.start(), Err(Error::Command(_))));
    }

    #[test]
    fn test_finish_without_start() {
        let sampler = PowerMetricsSummary::with_program("/nonexistent/powermetrics");
        assert!(sampler.finish().is_err());
    }
}
