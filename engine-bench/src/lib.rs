//! Engine benchmarks
//!
//! Runs TPC-H and the Fannie Mae mortgage summary against several SQL
//! engines over the same Parquet files, recording wall time, CPU time, peak
//! memory and, where the platform exposes it, power draw.

pub mod backend;
pub mod error;
pub mod platform;
pub mod prepare;
pub mod queries;
pub mod report;
pub mod runner;

pub use backend::{Backend, EngineKind};
pub use error::{Error, Result};
pub use queries::Workload;
pub use runner::{run_matrix, RunConfig, RunGroup, RunRecord};
