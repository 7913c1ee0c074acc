use async_trait::async_trait;
use datafusion::prelude::{ParquetReadOptions, SessionConfig, SessionContext};

use super::{Backend, Location, QueryOutput, TableSource};
use crate::error::Result;

/// DataFusion session with Parquet listing tables
pub struct DataFusionBackend {
    ctx: SessionContext,
}

impl DataFusionBackend {
    pub fn connect(threads: usize) -> Self {
        let config = SessionConfig::new().with_target_partitions(threads.max(1));
        Self {
            ctx: SessionContext::new_with_config(config),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }
}

#[async_trait]
impl Backend for DataFusionBackend {
    fn name(&self) -> &'static str {
        "datafusion"
    }

    async fn register_parquet(&self, table: &TableSource) -> Result<()> {
        let path = match &table.location {
            Location::File(path) => path.display().to_string(),
            // Trailing separator marks the URL as a directory listing
            Location::Directory(path) => format!("{}/", path.display()),
        };
        self.ctx
            .register_parquet(
                &table.name,
                &path,
                ParquetReadOptions::default().file_extension(".parquet"),
            )
            .await?;
        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<QueryOutput> {
        let df = self.ctx.sql(sql).await?;
        let columns = df.schema().fields().len();
        let batches = df.collect().await?;
        let rows = batches.iter().map(|b| b.num_rows()).sum();
        Ok(QueryOutput { rows, columns })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_execute_values() {
        let backend = DataFusionBackend::connect(4);
        let output = backend
            .execute("SELECT column1, column2 FROM (VALUES (1, 'a'), (2, 'b'), (3, 'c'))")
            .await
            .unwrap();
        assert_eq!(output, QueryOutput { rows: 3, columns: 2 });
    }

    #[tokio::test]
    async fn test_target_partitions_follow_threads() {
        let backend = DataFusionBackend::connect(3);
        assert_eq!(backend.context().state().config().target_partitions(), 3);
    }

    #[tokio::test]
    async fn test_missing_table() {
        let backend = DataFusionBackend::connect(1);
        let result = backend.execute("SELECT * FROM nowhere").await;
        assert!(matches!(result, Err(Error::DataFusion(_))));
    }
}
