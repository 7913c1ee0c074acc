use duckdb::Connection;
use std::fs;
use std::path::{Path, PathBuf};

use super::convert::Dataset;
use crate::backend::quote_literal;
use crate::error::Result;

/// Directory under the data directory that receives the merged files
pub const CONCAT_DIR: &str = "concat";

/// Merge each dataset's Parquet parts into a single file per table
///
/// The result is written to `<datadir>/concat/{perf,acq}` so that it can be
/// benchmarked as its own data directory.
pub fn concat(datadir: &Path) -> Result<Vec<PathBuf>> {
    let conn = Connection::open_in_memory()?;
    let out_root = datadir.join(CONCAT_DIR);

    let mut written = Vec::new();
    for dataset in [Dataset::Performance, Dataset::Acquisition] {
        let name = dataset.dir_name();
        let out_dir = out_root.join(name);
        fs::create_dir_all(&out_dir)?;

        let source = datadir.join(name).join("*.parquet");
        let target = out_dir.join(format!("{}.parquet", name));
        log::info!("Concatenating {} into {}", source.display(), target.display());

        conn.execute_batch(&format!(
            "COPY (SELECT * FROM read_parquet({})) TO {} (FORMAT 'parquet')",
            quote_literal(&source.display().to_string()),
            quote_literal(&target.display().to_string())
        ))?;
        written.push(target);
    }

    Ok(written)
}
