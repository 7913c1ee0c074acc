use async_trait::async_trait;
use duckdb::Connection;
use std::sync::{Arc, Mutex};

use super::{Backend, QueryOutput, TableSource};
use crate::error::{Error, Result};

/// In-memory DuckDB connection; tables are views over `read_parquet`
pub struct DuckDbBackend {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    pub fn connect(threads: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&format!("PRAGMA threads={};", threads))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| Error::Internal("DuckDB connection poisoned".to_string()))?;
            f(&conn)
        })
        .await?
    }
}

/// Quote an identifier for DuckDB
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal for DuckDB
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[async_trait]
impl Backend for DuckDbBackend {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    async fn register_parquet(&self, table: &TableSource) -> Result<()> {
        let sql = format!(
            "CREATE OR REPLACE VIEW {} AS SELECT * FROM read_parquet({})",
            quote_ident(&table.name),
            quote_literal(&table.location.glob())
        );
        log::debug!("duckdb: {}", sql);
        self.with_connection(move |conn| {
            conn.execute_batch(&sql)?;
            Ok(())
        })
        .await
    }

    async fn execute(&self, sql: &str) -> Result<QueryOutput> {
        let sql = sql.to_string();
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_arrow([])?.map(|batch| batch.num_rows()).sum();
            let columns = stmt.column_count();
            Ok(QueryOutput { rows, columns })
        })
        .await
    }
}
