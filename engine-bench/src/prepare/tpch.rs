//! TPC-H tables generated by DuckDB's `tpch` extension

use duckdb::Connection;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::{quote_ident, quote_literal};
use crate::error::{Error, Result};
use crate::queries::tpch::TABLES;

/// Generate every TPC-H table at `scale_factor` as `<datadir>/<table>.parquet`
///
/// Decimal columns are written as DOUBLE so that every engine reads the same
/// physical type.
pub fn generate(scale_factor: f64, datadir: &Path) -> Result<Vec<PathBuf>> {
    if scale_factor.is_nan() || scale_factor <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "scale factor must be positive, got {}",
            scale_factor
        )));
    }
    fs::create_dir_all(datadir)?;

    let conn = Connection::open_in_memory()?;
    conn.execute_batch("INSTALL tpch; LOAD tpch;")?;
    log::info!("Generating TPC-H data at scale factor {}", scale_factor);
    conn.execute_batch(&format!("CALL dbgen(sf={})", scale_factor))?;

    let mut written = Vec::with_capacity(TABLES.len());
    for table in TABLES {
        let columns = table_columns(&conn, table)?;
        let target = datadir.join(format!("{}.parquet", table));
        conn.execute_batch(&format!(
            "COPY (SELECT {} FROM {}) TO {} (FORMAT 'parquet')",
            projection(&columns),
            quote_ident(table),
            quote_literal(&target.display().to_string())
        ))?;
        log::info!("Wrote {}", target.display());
        written.push(target);
    }

    Ok(written)
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT column_name, data_type FROM information_schema.columns \
         WHERE table_name = ? ORDER BY ordinal_position",
    )?;
    let columns = stmt
        .query_map([table], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<(String, String)>, _>>()?;
    Ok(columns)
}

/// Select list that casts DECIMAL columns to DOUBLE
fn projection(columns: &[(String, String)]) -> String {
    columns
        .iter()
        .map(|(name, data_type)| {
            let ident = quote_ident(name);
            if data_type.to_ascii_uppercase().starts_with("DECIMAL") {
                format!("CAST({} AS DOUBLE) AS {}", ident, ident)
            } else {
                ident
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_casts_decimals() {
        let columns = vec![
            ("l_orderkey".to_string(), "BIGINT".to_string()),
            ("l_quantity".to_string(), "DECIMAL(15,2)".to_string()),
            ("l_shipdate".to_string(), "DATE".to_string()),
        ];
        assert_eq!(
            projection(&columns),
            "\"l_orderkey\", CAST(\"l_quantity\" AS DOUBLE) AS \"l_quantity\", \"l_shipdate\""
        );
    }

    #[test]
    fn test_table_columns() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE region (r_regionkey INTEGER, r_name VARCHAR, r_x DECIMAL(15,2))")
            .unwrap();
        let columns = table_columns(&conn, "region").unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0], ("r_regionkey".to_string(), "INTEGER".to_string()));
        assert!(columns[2].1.starts_with("DECIMAL"));
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            generate(0.0, dir.path()),
            Err(Error::InvalidArgument(_))
        ));
    }
}
