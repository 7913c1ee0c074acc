//! The 22 TPC-H queries
//!
//! Queries are written so that DuckDB, Polars and DataFusion all accept them:
//! explicit joins, interval arithmetic folded into date literals, and
//! correlated subqueries rewritten as CTEs.

use super::Query;
use crate::backend::TableSource;
use std::path::Path;

pub const TABLES: [&str; 8] = [
    "customer", "lineitem", "nation", "orders", "part", "partsupp", "region", "supplier",
];

pub const QUERIES: &[Query] = &[
    Query { name: "h01", description: "Pricing summary report", sql: include_str!("tpch/q01.sql") },
    Query { name: "h02", description: "Minimum cost supplier", sql: include_str!("tpch/q02.sql") },
    Query { name: "h03", description: "Shipping priority", sql: include_str!("tpch/q03.sql") },
    Query { name: "h04", description: "Order priority checking", sql: include_str!("tpch/q04.sql") },
    Query { name: "h05", description: "Local supplier volume", sql: include_str!("tpch/q05.sql") },
    Query { name: "h06", description: "Forecasting revenue change", sql: include_str!("tpch/q06.sql") },
    Query { name: "h07", description: "Volume shipping", sql: include_str!("tpch/q07.sql") },
    Query { name: "h08", description: "National market share", sql: include_str!("tpch/q08.sql") },
    Query { name: "h09", description: "Product type profit measure", sql: include_str!("tpch/q09.sql") },
    Query { name: "h10", description: "Returned item reporting", sql: include_str!("tpch/q10.sql") },
    Query { name: "h11", description: "Important stock identification", sql: include_str!("tpch/q11.sql") },
    Query { name: "h12", description: "Shipping modes and order priority", sql: include_str!("tpch/q12.sql") },
    Query { name: "h13", description: "Customer distribution", sql: include_str!("tpch/q13.sql") },
    Query { name: "h14", description: "Promotion effect", sql: include_str!("tpch/q14.sql") },
    Query { name: "h15", description: "Top supplier", sql: include_str!("tpch/q15.sql") },
    Query { name: "h16", description: "Parts/supplier relationship", sql: include_str!("tpch/q16.sql") },
    Query { name: "h17", description: "Small-quantity-order revenue", sql: include_str!("tpch/q17.sql") },
    Query { name: "h18", description: "Large volume customer", sql: include_str!("tpch/q18.sql") },
    Query { name: "h19", description: "Discounted revenue", sql: include_str!("tpch/q19.sql") },
    Query { name: "h20", description: "Potential part promotion", sql: include_str!("tpch/q20.sql") },
    Query { name: "h21", description: "Suppliers who kept orders waiting", sql: include_str!("tpch/q21.sql") },
    Query { name: "h22", description: "Global sales opportunity", sql: include_str!("tpch/q22.sql") },
];

pub fn all() -> &'static [Query] {
    QUERIES
}

/// Query names in run order, as accepted by `--queries`
pub fn names() -> Vec<&'static str> {
    QUERIES.iter().map(|q| q.name).collect()
}

pub fn query(name: &str) -> Option<&'static Query> {
    QUERIES.iter().find(|q| q.name == name)
}

/// One `<table>.parquet` file per table
pub fn sources(datadir: &Path) -> Vec<TableSource> {
    TABLES
        .iter()
        .map(|table| TableSource::file(*table, datadir.join(format!("{}.parquet", table))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_queries_present_in_order() {
        assert_eq!(QUERIES.len(), 22);
        for (i, q) in QUERIES.iter().enumerate() {
            assert_eq!(q.name, format!("h{:02}", i + 1));
            assert!(!q.sql.trim().is_empty());
            assert!(!q.sql.contains(';'), "{} should be a single statement", q.name);
        }
    }

    #[test]
    fn test_queries_only_reference_tpch_tables() {
        for q in QUERIES {
            let sql = q.sql.to_lowercase();
            assert!(
                TABLES.iter().any(|t| sql.contains(t)),
                "{} references no TPC-H table",
                q.name
            );
            assert!(!sql.contains("interval"), "{} uses interval arithmetic", q.name);
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(query("h15").unwrap().description, "Top supplier");
        assert!(query("q15").is_none());
    }

    #[test]
    fn test_sources() {
        let sources = sources(Path::new("sf1"));
        assert_eq!(sources.len(), 8);
        assert_eq!(sources[1], TableSource::file("lineitem", "sf1/lineitem.parquet"));
    }
}
