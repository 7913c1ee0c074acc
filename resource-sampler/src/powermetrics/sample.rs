//! Plist sample model for `powermetrics -s cpu_power`

use crate::error::Result;
use serde::Deserialize;

/// One powermetrics sample (or the usage summary in summary mode)
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PowerSample {
    #[serde(default)]
    pub elapsed_ns: u64,
    #[serde(default)]
    pub processor: Processor,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Processor {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    /// Millijoules over the sample window
    #[serde(default)]
    pub package_energy: f64,
    #[serde(default)]
    pub cpu_energy: f64,
    #[serde(default)]
    pub dram_energy: f64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Cluster {
    pub name: String,
    /// Milliwatts
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub cpus: Vec<Cpu>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Cpu {
    pub cpu: u64,
    #[serde(default)]
    pub freq_hz: f64,
    #[serde(default)]
    pub idle_ratio: f64,
}

/// Parse powermetrics output; consecutive samples are separated by NUL bytes
pub fn parse_samples(output: &[u8]) -> Result<Vec<PowerSample>> {
    output
        .split(|&b| b == 0)
        .filter(|doc| doc.iter().any(|b| !b.is_ascii_whitespace()))
        .map(|doc| plist::from_bytes::<PowerSample>(doc).map_err(Into::into))
        .collect()
}
