use serde::Serialize;
use std::env;
use sysinfo::System;

pub use resource_sampler::cpu::is_root;
pub use resource_sampler::powermetrics::which;

/// Description of the machine a benchmark ran on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformInfo {
    pub machine: String,
    pub version: String,
    pub platform: String,
    pub system: String,
    pub cpu_count: usize,
    /// Total physical memory in bytes
    pub memory: u64,
    pub processor: String,
}

impl PlatformInfo {
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu();

        Self {
            machine: env::consts::ARCH.to_string(),
            version: System::kernel_version().unwrap_or_default(),
            platform: System::long_os_version().unwrap_or_default(),
            system: System::name().unwrap_or_else(|| env::consts::OS.to_string()),
            cpu_count: sys.cpus().len(),
            memory: sys.total_memory(),
            processor: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect() {
        let info = PlatformInfo::collect();
        assert_eq!(info.machine, env::consts::ARCH);
        assert!(info.cpu_count > 0);
        assert!(info.memory > 0);
        assert!(!info.system.is_empty());
    }
}
