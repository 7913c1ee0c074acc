//! Benchmark data preparation
//!
//! - Fannie Mae: download the mortgage archive, extract it and convert the
//!   pipe-delimited text files into Parquet
//! - concat: merge the Fannie Mae Parquet parts into one file per table
//! - TPC-H: generate the tables with DuckDB and write them as Parquet

pub mod concat;
pub mod convert;
pub mod download;
pub mod extract;
pub mod tpch;

pub use self::concat::concat;
pub use self::convert::Dataset;
pub use self::download::MortgageDownloader;

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Options for `prepare fanniemae`
#[derive(Debug, Clone)]
pub struct FannieMaeOptions {
    pub years: String,
    pub datadir: PathBuf,
    pub id_as_float64: bool,
}

/// Parquet files written per dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub performance: usize,
    pub acquisition: usize,
}

/// Download, extract and convert the mortgage data
pub async fn fanniemae(
    downloader: &MortgageDownloader,
    options: &FannieMaeOptions,
) -> Result<ConvertSummary> {
    let archive = downloader
        .download(&options.years, &options.datadir)
        .await?;

    let datadir = options.datadir.clone();
    tokio::task::spawn_blocking(move || extract::extract(&archive, &datadir)).await??;

    convert_all(&options.datadir, options.id_as_float64).await
}

/// Convert both datasets of an already extracted archive
pub async fn convert_all(datadir: &Path, id_as_float64: bool) -> Result<ConvertSummary> {
    let performance = convert::convert_dataset(datadir, Dataset::Performance, id_as_float64)
        .await?
        .len();
    log::info!("Wrote {} performance parquet files", performance);

    let acquisition = convert::convert_dataset(datadir, Dataset::Acquisition, id_as_float64)
        .await?
        .len();
    log::info!("Wrote {} acquisition parquet files", acquisition);

    Ok(ConvertSummary {
        performance,
        acquisition,
    })
}
