use super::sample::PowerSample;
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary statistics over a set of powermetrics samples
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PowerStats {
    /// Mean idle ratio per cpu, ordered by cpu id
    pub idle_ratio_cpus: Vec<f64>,
    /// Mean frequency per cpu, ordered by cpu id
    pub freq_hz: Vec<f64>,
    /// Sum over clusters of each cluster's mean power
    #[serde(rename = "power_mW")]
    pub power_mw: f64,
    pub package_energy_sum: i64,
    #[serde(rename = "cpu_mJ")]
    pub cpu_mj: i64,
    pub dram_energy_sum: i64,
    pub elapsed_ns: i64,
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

pub fn aggregate(samples: &[PowerSample]) -> PowerStats {
    let mut idle: BTreeMap<u64, Mean> = BTreeMap::new();
    let mut freq: BTreeMap<u64, Mean> = BTreeMap::new();
    let mut cluster_power: BTreeMap<&str, Mean> = BTreeMap::new();

    let mut package = 0.0;
    let mut cpu_energy = 0.0;
    let mut dram = 0.0;
    let mut elapsed_ns = 0u64;

    for sample in samples {
        for cluster in &sample.processor.clusters {
            cluster_power
                .entry(cluster.name.as_str())
                .or_default()
                .push(cluster.power);
            for cpu in &cluster.cpus {
                idle.entry(cpu.cpu).or_default().push(cpu.idle_ratio);
                freq.entry(cpu.cpu).or_default().push(cpu.freq_hz);
            }
        }
        package += sample.processor.package_energy;
        cpu_energy += sample.processor.cpu_energy;
        dram += sample.processor.dram_energy;
        elapsed_ns += sample.elapsed_ns;
    }

    PowerStats {
        idle_ratio_cpus: idle.values().map(Mean::value).collect(),
        freq_hz: freq.values().map(Mean::value).collect(),
        power_mw: cluster_power
            .values()
            .fold(0.0, |acc, mean| acc + mean.value()),
        package_energy_sum: package as i64,
        cpu_mj: cpu_energy as i64,
        dram_energy_sum: dram as i64,
        elapsed_ns: elapsed_ns as i64,
    }
}
