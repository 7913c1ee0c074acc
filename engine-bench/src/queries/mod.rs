//! Benchmark workloads and their queries

pub mod fanniemae;
pub mod tpch;

use crate::backend::TableSource;
use crate::error::{Error, Result};
use std::fmt;
use std::path::Path;

/// A named benchmark query
#[derive(Debug)]
pub struct Query {
    pub name: &'static str,
    pub description: &'static str,
    pub sql: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    Tpch,
    FannieMae,
}

impl Workload {
    pub fn as_str(&self) -> &'static str {
        match self {
            Workload::Tpch => "tpch",
            Workload::FannieMae => "fanniemae",
        }
    }

    /// Tables this workload reads from `datadir`
    pub fn sources(&self, datadir: &Path) -> Vec<TableSource> {
        match self {
            Workload::Tpch => tpch::sources(datadir),
            Workload::FannieMae => fanniemae::sources(datadir),
        }
    }

    pub fn queries(&self) -> &'static [Query] {
        match self {
            Workload::Tpch => tpch::QUERIES,
            Workload::FannieMae => fanniemae::QUERIES,
        }
    }

    /// Resolve query names, keeping the caller's order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&'static Query>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref().trim();
                self.queries()
                    .iter()
                    .find(|q| q.name.eq_ignore_ascii_case(name))
                    .ok_or_else(|| {
                        Error::InvalidArgument(format!(
                            "unknown {} query '{}'",
                            self.as_str(),
                            name
                        ))
                    })
            })
            .collect()
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_keeps_order() {
        let selected = Workload::Tpch.select(&["h06", "H01", " h22"]).unwrap();
        let names: Vec<&str> = selected.iter().map(|q| q.name).collect();
        assert_eq!(names, vec!["h06", "h01", "h22"]);
    }

    #[test]
    fn test_select_unknown_query() {
        let err = Workload::Tpch.select(&["h23"]).unwrap_err().to_string();
        assert!(err.contains("unknown tpch query 'h23'"));
    }

    #[test]
    fn test_fanniemae_summary() {
        let selected = Workload::FannieMae.select(&["Summary"]).unwrap();
        assert_eq!(selected.len(), 1);
        assert!(selected[0].sql.contains("split_part"));
    }
}
