//! Query engines under test
//!
//! Every engine implements [`Backend`]: tables are registered as Parquet
//! sources and queries are submitted as SQL text. Three engines are wired in:
//! - `duckdb`: embedded DuckDB over `read_parquet` views
//! - `polars`: a Polars `SQLContext` over lazily scanned frames
//! - `datafusion`: a DataFusion `SessionContext` with listing tables

mod datafusion;
mod duckdb;
mod polars;

pub use self::datafusion::DataFusionBackend;
pub use self::duckdb::DuckDbBackend;
pub(crate) use self::duckdb::{quote_ident, quote_literal};
pub use self::polars::PolarsBackend;

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Where a table's Parquet data lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A single Parquet file
    File(PathBuf),
    /// Every `*.parquet` file directly inside a directory
    Directory(PathBuf),
}

impl Location {
    pub fn path(&self) -> &Path {
        match self {
            Location::File(path) | Location::Directory(path) => path,
        }
    }

    /// Glob pattern understood by DuckDB and Polars
    pub fn glob(&self) -> String {
        match self {
            Location::File(path) => path.display().to_string(),
            Location::Directory(path) => path.join("*.parquet").display().to_string(),
        }
    }
}

/// A named table backed by Parquet data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    pub name: String,
    pub location: Location,
}

impl TableSource {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            location: Location::File(path.into()),
        }
    }

    pub fn directory(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            location: Location::Directory(path.into()),
        }
    }
}

/// Shape of a fully materialized query result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOutput {
    pub rows: usize,
    pub columns: usize,
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Engine name as used on the command line
    fn name(&self) -> &'static str;

    /// Make `table` queryable under its name
    async fn register_parquet(&self, table: &TableSource) -> Result<()>;

    /// Run `sql` to completion, materializing every result row
    async fn execute(&self, sql: &str) -> Result<QueryOutput>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    DuckDb,
    Polars,
    DataFusion,
}

impl EngineKind {
    pub const ALL: [EngineKind; 3] = [EngineKind::DuckDb, EngineKind::Polars, EngineKind::DataFusion];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::DuckDb => "duckdb",
            EngineKind::Polars => "polars",
            EngineKind::DataFusion => "datafusion",
        }
    }

    /// Open a fresh engine instance limited to `threads` workers
    pub fn connect(&self, threads: usize) -> Result<Arc<dyn Backend>> {
        let backend: Arc<dyn Backend> = match self {
            EngineKind::DuckDb => Arc::new(DuckDbBackend::connect(threads)?),
            EngineKind::Polars => Arc::new(PolarsBackend::connect(threads)),
            EngineKind::DataFusion => Arc::new(DataFusionBackend::connect(threads)),
        };
        Ok(backend)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        EngineKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let supported: Vec<&str> = EngineKind::ALL.iter().map(|k| k.as_str()).collect();
                Error::InvalidArgument(format!(
                    "unknown engine '{}' (supported: {})",
                    s,
                    supported.join(", ")
                ))
            })
    }
}
