//! Measured execution of benchmark queries
//!
//! Every query is timed on the wall clock and the process CPU clock while a
//! memory sampler tracks resident size. When power measurement is requested
//! and the machine supports it, a power sampler wraps the whole measurement.

use chrono::Local;
use resource_sampler::cpu::process_time;
use resource_sampler::powermetrics::{self, PowerSample};
use resource_sampler::{
    profile, rapl, MemorySampler, PowerMetricsDetail, PowerMetricsSummary, RaplReading,
    RaplSampler, SamplerHandle,
};
use serde::Serialize;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crate::backend::{Backend, EngineKind, QueryOutput};
use crate::error::{Error, Result};
use crate::platform::PlatformInfo;
use crate::queries::{Query, Workload};

pub const RUN_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Power measurement facility chosen for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSource {
    PowerMetrics,
    Rapl,
    None,
}

impl PowerSource {
    /// Prefer powermetrics, then RAPL; nothing unless `requested`
    pub fn detect(requested: bool) -> Self {
        if !requested {
            PowerSource::None
        } else if powermetrics::is_available() {
            PowerSource::PowerMetrics
        } else if rapl::is_available() {
            PowerSource::Rapl
        } else {
            PowerSource::None
        }
    }
}

/// Power columns of a run record; all empty when power was not measured
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PowerFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_ratio_cpus: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq_hz: Option<Vec<f64>>,
    #[serde(rename = "power_mW", skip_serializing_if = "Option::is_none")]
    pub power_mw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_energy_sum: Option<i64>,
    #[serde(rename = "cpu_mJ", skip_serializing_if = "Option::is_none")]
    pub cpu_mj: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dram_energy_sum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ns: Option<i64>,
}

impl PowerFields {
    pub fn from_powermetrics(samples: &[PowerSample]) -> Self {
        let stats = powermetrics::aggregate(samples);
        Self {
            idle_ratio_cpus: Some(stats.idle_ratio_cpus),
            freq_hz: Some(stats.freq_hz),
            power_mw: Some(stats.power_mw),
            package_energy_sum: Some(stats.package_energy_sum),
            cpu_mj: Some(stats.cpu_mj as f64),
            dram_energy_sum: Some(stats.dram_energy_sum),
            elapsed_ns: Some(stats.elapsed_ns),
        }
    }

    pub fn from_rapl(reading: &RaplReading) -> Self {
        Self {
            cpu_mj: Some(reading.cpu_mj()),
            power_mw: Some(reading.power_mw()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == PowerFields::default()
    }
}

enum PowerSession {
    PowerMetrics(SamplerHandle<Vec<PowerSample>>),
    Rapl(SamplerHandle<RaplReading>),
}

impl PowerSession {
    fn start(source: PowerSource) -> Result<Option<Self>> {
        let session = match source {
            PowerSource::PowerMetrics => Some(PowerSession::PowerMetrics(SamplerHandle::spawn(
                PowerMetricsSummary::new(),
            )?)),
            PowerSource::Rapl => Some(PowerSession::Rapl(SamplerHandle::spawn(RaplSampler::new())?)),
            PowerSource::None => None,
        };
        Ok(session)
    }

    fn finish(self) -> Result<PowerFields> {
        match self {
            PowerSession::PowerMetrics(handle) => Ok(PowerFields::from_powermetrics(&handle.stop()?)),
            PowerSession::Rapl(handle) => Ok(PowerFields::from_rapl(&handle.stop()?)),
        }
    }
}

/// Measure power while the process sleeps for `duration`
///
/// `detail` runs one powermetrics invocation per tick instead of a single
/// summary process; RAPL ignores it.
pub fn measure_idle(source: PowerSource, duration: Duration, detail: bool) -> Result<PowerFields> {
    let idle = || thread::sleep(duration);
    match source {
        PowerSource::PowerMetrics if detail => {
            let (_, samples) = profile(PowerMetricsDetail::new(), idle)?;
            Ok(PowerFields::from_powermetrics(&samples))
        }
        PowerSource::PowerMetrics => {
            let (_, samples) = profile(PowerMetricsSummary::new(), idle)?;
            Ok(PowerFields::from_powermetrics(&samples))
        }
        PowerSource::Rapl => {
            let (_, reading) = profile(RaplSampler::new(), idle)?;
            Ok(PowerFields::from_rapl(&reading))
        }
        PowerSource::None => Err(Error::Sampler(resource_sampler::Error::Unavailable(
            "neither powermetrics nor RAPL is usable; both need root".to_string(),
        ))),
    }
}

/// Timings and memory for one execution
#[derive(Debug)]
pub struct Measurement {
    /// Wall-clock seconds
    pub total_time_process: f64,
    /// Process CPU seconds
    pub total_time_cpu: f64,
    /// Peak resident memory in MiB
    pub max_memory_usage: f64,
    pub outcome: Result<QueryOutput>,
}

/// Execute `sql` while measuring wall time, CPU time and peak memory
pub async fn profile_run(backend: &dyn Backend, sql: &str) -> Result<Measurement> {
    let start_wall = Instant::now();
    let start_cpu = process_time()?;
    let memory = SamplerHandle::spawn(MemorySampler::new())?;

    let outcome = backend.execute(sql).await;

    let usage = memory.stop()?;
    let total_time_cpu = (process_time()? - start_cpu).as_secs_f64();
    let total_time_process = start_wall.elapsed().as_secs_f64();

    Ok(Measurement {
        total_time_process,
        total_time_cpu,
        max_memory_usage: usage.max_mib(),
        outcome,
    })
}

/// One measured query execution
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub name: String,
    pub threads: usize,
    pub run_date: String,
    pub total_time_process: f64,
    pub total_time_cpu: f64,
    pub max_memory_usage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(flatten)]
    pub power: PowerFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run one query under the selected power source
pub async fn run_query(
    backend: &dyn Backend,
    query: &Query,
    power: PowerSource,
    threads: usize,
) -> Result<RunRecord> {
    log::info!("{} {} ({} threads)", backend.name(), query.name, threads);

    let session = PowerSession::start(power)?;
    let measurement = profile_run(backend, query.sql).await;
    let power = match session {
        Some(session) => session.finish()?,
        None => PowerFields::default(),
    };
    let measurement = measurement?;

    let (rows, error) = match measurement.outcome {
        Ok(output) => {
            log::info!(
                "{} {}: {} rows in {:.3}s (cpu {:.3}s, peak {:.1} MiB)",
                backend.name(),
                query.name,
                output.rows,
                measurement.total_time_process,
                measurement.total_time_cpu,
                measurement.max_memory_usage
            );
            (Some(output.rows), None)
        }
        Err(e) => {
            log::warn!("{} {} failed: {}", backend.name(), query.name, e);
            (None, Some(e.to_string()))
        }
    };

    Ok(RunRecord {
        name: query.name.to_string(),
        threads,
        run_date: Local::now().format(RUN_DATE_FORMAT).to_string(),
        total_time_process: measurement.total_time_process,
        total_time_cpu: measurement.total_time_cpu,
        max_memory_usage: measurement.max_memory_usage,
        rows,
        power,
        error,
    })
}

/// Runs for one (datadir, engine, threads) combination
#[derive(Debug, Clone, Serialize)]
pub struct RunGroup {
    #[serde(flatten)]
    pub platform: PlatformInfo,
    pub runs: Vec<RunRecord>,
    pub datadir: String,
    pub db: String,
}

/// What to run: every combination of data directory, engine and thread count
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub workload: Workload,
    pub datadirs: Vec<PathBuf>,
    pub engines: Vec<EngineKind>,
    pub queries: Vec<String>,
    pub threads: Vec<usize>,
    pub powermetrics: bool,
}

impl RunConfig {
    /// Defaults for `workload`: `data`, duckdb, 8 threads, every query
    pub fn new(workload: Workload) -> Self {
        Self {
            workload,
            datadirs: vec![PathBuf::from("data")],
            engines: vec![EngineKind::DuckDb],
            queries: workload.queries().iter().map(|q| q.name.to_string()).collect(),
            threads: vec![8],
            powermetrics: false,
        }
    }
}

pub async fn run_matrix(config: &RunConfig) -> Result<Vec<RunGroup>> {
    let queries = config.workload.select(&config.queries)?;

    let power = PowerSource::detect(config.powermetrics);
    if config.powermetrics && power == PowerSource::None {
        log::warn!("power measurement requested but neither powermetrics nor RAPL is usable");
    }

    let platform = PlatformInfo::collect();
    let mut groups = Vec::new();

    for datadir in &config.datadirs {
        for engine in &config.engines {
            for &threads in &config.threads {
                let backend = engine.connect(threads)?;
                for source in config.workload.sources(datadir) {
                    backend.register_parquet(&source).await?;
                }

                let mut runs = Vec::with_capacity(queries.len());
                for query in &queries {
                    runs.push(run_query(backend.as_ref(), query, power, threads).await?);
                }

                groups.push(RunGroup {
                    platform: platform.clone(),
                    runs,
                    datadir: datadir.display().to_string(),
                    db: engine.to_string(),
                });
            }
        }
    }

    Ok(groups)
}
