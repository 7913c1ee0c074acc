//! Background samplers for benchmark runs: energy, power and process usage

pub mod cpu;
pub mod error;
pub mod handle;
pub mod memory;
pub mod powermetrics;
pub mod rapl;

pub use error::{Error, Result};
pub use handle::{profile, Sampler, SamplerHandle};
pub use memory::{MemorySampler, MemoryUsage};
pub use powermetrics::{PowerMetricsDetail, PowerMetricsSummary, PowerSample, PowerStats};
pub use rapl::{RaplReading, RaplSampler};
