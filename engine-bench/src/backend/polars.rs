use async_trait::async_trait;
use polars::prelude::{LazyFrame, ScanArgsParquet};
use polars::sql::SQLContext;
use std::env;
use std::sync::{Arc, Mutex};

use super::{Backend, QueryOutput, TableSource};
use crate::error::{Error, Result};

/// Polars SQL over lazily scanned Parquet frames
pub struct PolarsBackend {
    ctx: Arc<Mutex<SQLContext>>,
}

impl PolarsBackend {
    /// Read once, when the Polars global pool first starts
    pub const MAX_THREADS_VAR: &'static str = "POLARS_MAX_THREADS";

    /// The pool size is fixed per process. The binary sets
    /// `POLARS_MAX_THREADS` before starting its runtime; a connection asking
    /// for a different count only logs a warning.
    pub fn connect(threads: usize) -> Self {
        match env::var(Self::MAX_THREADS_VAR) {
            Ok(current) if current != threads.to_string() => log::warn!(
                "{} is {}; polars will not use {} threads",
                Self::MAX_THREADS_VAR,
                current,
                threads
            ),
            Ok(_) => {}
            Err(_) => log::warn!(
                "{} is unset; polars sizes its pool from the CPU count, not {} threads",
                Self::MAX_THREADS_VAR,
                threads
            ),
        }

        Self {
            ctx: Arc::new(Mutex::new(SQLContext::new())),
        }
    }

    fn lock(ctx: &Mutex<SQLContext>) -> Result<std::sync::MutexGuard<'_, SQLContext>> {
        ctx.lock()
            .map_err(|_| Error::Internal("Polars SQL context poisoned".to_string()))
    }
}

#[async_trait]
impl Backend for PolarsBackend {
    fn name(&self) -> &'static str {
        "polars"
    }

    async fn register_parquet(&self, table: &TableSource) -> Result<()> {
        let frame = LazyFrame::scan_parquet(table.location.glob(), ScanArgsParquet::default())?;
        Self::lock(&self.ctx)?.register(&table.name, frame);
        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<QueryOutput> {
        let ctx = self.ctx.clone();
        let sql = sql.to_string();
        tokio::task::spawn_blocking(move || {
            let frame = Self::lock(&ctx)?.execute(&sql)?;
            let df = frame.collect()?;
            Ok(QueryOutput {
                rows: df.height(),
                columns: df.width(),
            })
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_without_tables() {
        let backend = PolarsBackend::connect(2);
        let output = backend.execute("SELECT 1 AS one, 2 AS two").await.unwrap();
        assert_eq!(output.rows, 1);
        assert_eq!(output.columns, 2);
    }

    #[tokio::test]
    async fn test_unknown_table_is_error() {
        let backend = PolarsBackend::connect(2);
        let result = backend.execute("SELECT * FROM nowhere").await;
        assert!(matches!(result, Err(Error::Polars(_))));
    }
}
