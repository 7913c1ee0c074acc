use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use engine_bench::backend::{EngineKind, PolarsBackend};
use engine_bench::platform::is_root;
use engine_bench::prepare::download::ARCHIVES;
use engine_bench::prepare::{self, FannieMaeOptions, MortgageDownloader};
use engine_bench::queries::Workload;
use engine_bench::report::{self, OutputFormat};
use engine_bench::runner::{self, PowerSource, RunConfig};
use std::env;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "engine-bench")]
#[command(version)]
#[command(about = "Compare SQL engines on TPC-H and the Fannie Mae mortgage summary")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run TPC-H queries
    Tpch {
        #[command(flatten)]
        run: RunArgs,

        /// Comma separated list of queries, e.g. h01,h06 [default: h01 to h22]
        #[arg(long, env = "ENGINE_BENCH_QUERIES", value_delimiter = ',')]
        queries: Vec<String>,
    },
    /// Run the Fannie Mae mortgage summary
    Fanniemae {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Download or generate benchmark data
    Prepare {
        #[command(subcommand)]
        target: PrepareCommand,
    },
    /// Measure idle power for a number of seconds
    Power {
        #[arg(long, default_value_t = 5)]
        seconds: u64,

        /// One powermetrics invocation per sample instead of a summary process
        #[arg(long)]
        detail: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Comma separated list of data directories, e.g. sf1,sf10
    #[arg(long, env = "ENGINE_BENCH_DATADIR", value_delimiter = ',', default_value = "data")]
    datadir: Vec<PathBuf>,

    /// Comma separated list of engines, e.g. duckdb,polars
    #[arg(long, env = "ENGINE_BENCH_ENGINES", value_delimiter = ',', default_value = "duckdb")]
    engines: Vec<EngineKind>,

    /// Comma separated list of thread counts, e.g. 2,4,8
    #[arg(long, env = "ENGINE_BENCH_THREADS", value_delimiter = ',', default_value = "8")]
    threads: Vec<usize>,

    /// Measure power with powermetrics or RAPL (requires root)
    #[arg(long, env = "ENGINE_BENCH_POWERMETRICS")]
    powermetrics: bool,

    #[arg(long, value_enum, env = "ENGINE_BENCH_FORMAT", default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
}

impl RunArgs {
    fn into_config(self, workload: Workload, queries: Vec<String>) -> (RunConfig, OutputFormat) {
        let mut config = RunConfig::new(workload);
        config.datadirs = self.datadir;
        config.engines = self.engines;
        config.threads = self.threads;
        config.powermetrics = self.powermetrics;
        if !queries.is_empty() {
            config.queries = queries;
        }
        (config, self.format)
    }
}

#[derive(Subcommand, Debug)]
enum PrepareCommand {
    /// Download, extract and convert the Fannie Mae mortgage data
    Fanniemae {
        /// Number of years of data
        #[arg(
            long,
            default_value = "1",
            value_parser = PossibleValuesParser::new(ARCHIVES.map(|(years, _)| years))
        )]
        years: String,

        #[arg(long, default_value = "data")]
        datadir: PathBuf,

        /// Store loan_id as Float64 instead of Int64
        #[arg(long)]
        with_id_as_float64: bool,
    },
    /// Merge the Fannie Mae parquet parts into <datadir>/concat
    Concat {
        #[arg(long, default_value = "data")]
        datadir: PathBuf,
    },
    /// Generate TPC-H tables with DuckDB
    Tpch {
        #[arg(long, default_value_t = 1.0)]
        scale_factor: f64,

        #[arg(long, default_value = "data")]
        datadir: PathBuf,
    },
}

async fn run(config: RunConfig, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    if config.powermetrics && !is_root() {
        log::warn!("power measurement needs root; expect no power columns");
    }
    let groups = runner::run_matrix(&config).await?;
    report::write(&groups, format, io::stdout().lock())?;
    Ok(())
}

/// Polars pool size for a run command that includes polars
///
/// The first requested thread count wins, as that is the count the first
/// polars connection asks for.
fn polars_threads(command: &Command) -> Option<usize> {
    let args = match command {
        Command::Tpch { run, .. } | Command::Fanniemae { run } => run,
        _ => return None,
    };
    if !args.engines.contains(&EngineKind::Polars) {
        return None;
    }
    args.threads.first().copied()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // No other thread exists yet, so the environment can be written safely
    if let Some(threads) = polars_threads(&cli.command) {
        if env::var_os(PolarsBackend::MAX_THREADS_VAR).is_none() {
            env::set_var(PolarsBackend::MAX_THREADS_VAR, threads.to_string());
        }
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(execute(cli.command))
}

async fn execute(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Tpch { run: args, queries } => {
            let (config, format) = args.into_config(Workload::Tpch, queries);
            run(config, format).await?;
        }
        Command::Fanniemae { run: args } => {
            let (config, format) = args.into_config(Workload::FannieMae, Vec::new());
            run(config, format).await?;
        }
        Command::Prepare { target } => match target {
            PrepareCommand::Fanniemae {
                years,
                datadir,
                with_id_as_float64,
            } => {
                let options = FannieMaeOptions {
                    years,
                    datadir,
                    id_as_float64: with_id_as_float64,
                };
                let summary = prepare::fanniemae(&MortgageDownloader::new(), &options).await?;
                println!(
                    "Wrote {} performance and {} acquisition parquet files",
                    summary.performance, summary.acquisition
                );
            }
            PrepareCommand::Concat { datadir } => {
                let written = tokio::task::spawn_blocking(move || prepare::concat(&datadir)).await??;
                for path in written {
                    println!("{}", path.display());
                }
            }
            PrepareCommand::Tpch {
                scale_factor,
                datadir,
            } => {
                let written = tokio::task::spawn_blocking(move || {
                    prepare::tpch::generate(scale_factor, &datadir)
                })
                .await??;
                for path in written {
                    println!("{}", path.display());
                }
            }
        },
        Command::Power { seconds, detail } => {
            let source = PowerSource::detect(true);
            let fields = runner::measure_idle(source, Duration::from_secs(seconds), detail)?;
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["engine-bench", "tpch"]).unwrap();
        let Command::Tpch { run, queries } = cli.command else {
            panic!("expected tpch");
        };
        let (config, format) = run.into_config(Workload::Tpch, queries);
        assert_eq!(config.datadirs, vec![PathBuf::from("data")]);
        assert_eq!(config.engines, vec![EngineKind::DuckDb]);
        assert_eq!(config.threads, vec![8]);
        assert_eq!(config.queries.len(), 22);
        assert!(!config.powermetrics);
        assert_eq!(format, OutputFormat::Csv);
    }

    #[test]
    fn test_comma_lists() {
        let cli = Cli::try_parse_from([
            "engine-bench",
            "tpch",
            "--datadir",
            "sf1,sf10",
            "--engines",
            "duckdb,Polars",
            "--threads",
            "2,4",
            "--queries",
            "h06,h01",
            "--format",
            "json",
        ])
        .unwrap();
        let Command::Tpch { run, queries } = cli.command else {
            panic!("expected tpch");
        };
        let (config, format) = run.into_config(Workload::Tpch, queries);
        assert_eq!(config.datadirs, vec![PathBuf::from("sf1"), PathBuf::from("sf10")]);
        assert_eq!(config.engines, vec![EngineKind::DuckDb, EngineKind::Polars]);
        assert_eq!(config.threads, vec![2, 4]);
        assert_eq!(config.queries, vec!["h06", "h01"]);
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_engine_rejected() {
        assert!(Cli::try_parse_from(["engine-bench", "fanniemae", "--engines", "sqlite"]).is_err());
    }

    #[test]
    fn test_prepare_fanniemae() {
        let cli = Cli::try_parse_from([
            "engine-bench",
            "prepare",
            "fanniemae",
            "--years",
            "4",
            "--with-id-as-float64",
        ])
        .unwrap();
        let Command::Prepare {
            target:
                PrepareCommand::Fanniemae {
                    years,
                    datadir,
                    with_id_as_float64,
                },
        } = cli.command
        else {
            panic!("expected prepare fanniemae");
        };
        assert_eq!(years, "4");
        assert_eq!(datadir, PathBuf::from("data"));
        assert!(with_id_as_float64);
    }

    #[test]
    fn test_prepare_fanniemae_rejects_unknown_years() {
        let result = Cli::try_parse_from(["engine-bench", "prepare", "fanniemae", "--years", "3"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_polars_threads() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).unwrap().command;

        let command = parse(&["engine-bench", "tpch", "--engines", "duckdb,polars", "--threads", "4,8"]);
        assert_eq!(polars_threads(&command), Some(4));

        let command = parse(&["engine-bench", "fanniemae", "--engines", "datafusion"]);
        assert_eq!(polars_threads(&command), None);

        let command = parse(&["engine-bench", "prepare", "tpch"]);
        assert_eq!(polars_threads(&command), None);
    }
}
