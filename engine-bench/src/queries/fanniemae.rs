//! Mortgage performance summary over the Fannie Mae loan dataset
//!
//! Charge-offs and unpaid balances are aggregated per origination year and
//! loan age, then joined with the number of loans originated in that year.

use super::Query;
use crate::backend::TableSource;
use std::path::Path;

pub const QUERIES: &[Query] = &[Query {
    name: "Summary",
    description: "Charge-offs and balances by origination year and loan age",
    sql: include_str!("fanniemae_summary.sql"),
}];

/// Zero-balance codes that mark a loan as charged off
pub const CHARGEOFF_CODES: [&str; 4] = ["02", "03", "09", "15"];

/// `perf` and `acq` are directories of Parquet files produced by `prepare`
pub fn sources(datadir: &Path) -> Vec<TableSource> {
    vec![
        TableSource::directory("perf", datadir.join("perf")),
        TableSource::directory("acq", datadir.join("acq")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_uses_chargeoff_codes() {
        for code in CHARGEOFF_CODES {
            assert!(QUERIES[0].sql.contains(&format!("'{}'", code)));
        }
    }

    #[test]
    fn test_sources() {
        let sources = sources(Path::new("data"));
        assert_eq!(sources[0], TableSource::directory("perf", "data/perf"));
        assert_eq!(sources[1], TableSource::directory("acq", "data/acq"));
    }
}
