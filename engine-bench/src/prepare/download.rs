//! Mortgage archive download
//!
//! The RAPIDS mirror publishes the Fannie Mae loan data as one gzip tarball
//! per range of years, starting in 2000.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

pub const MORTGAGE_BASE_URL: &str =
    "http://rapidsai-data.s3-website.us-east-2.amazonaws.com/notebook-mortgage-data";

/// Accepted `--years` values and the archive each one selects
pub const ARCHIVES: [(&str, &str); 6] = [
    ("1", "mortgage_2000.tgz"),
    ("2", "mortgage_2000-2001.tgz"),
    ("4", "mortgage_2000-2003.tgz"),
    ("8", "mortgage_2000-2007.tgz"),
    ("16", "mortgage_2000-2015.tgz"),
    ("17", "mortgage_2000-2016.tgz"),
];

pub fn archive_name(years: &str) -> Result<&'static str> {
    ARCHIVES
        .iter()
        .find(|(key, _)| *key == years)
        .map(|(_, name)| *name)
        .ok_or_else(|| {
            let choices: Vec<&str> = ARCHIVES.iter().map(|(key, _)| *key).collect();
            Error::InvalidArgument(format!(
                "unsupported years '{}', expected one of {}",
                years,
                choices.join(", ")
            ))
        })
}

/// HTTP client for the mortgage archive mirror
#[derive(Debug, Clone)]
pub struct MortgageDownloader {
    base_url: String,
    client: reqwest::Client,
}

impl MortgageDownloader {
    pub fn new() -> Self {
        Self::with_base_url(MORTGAGE_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url_for(&self, years: &str) -> Result<String> {
        Ok(format!("{}/{}", self.base_url, archive_name(years)?))
    }

    /// Stream the archive for `years` into `datadir`, returning its path
    pub async fn download(&self, years: &str, datadir: &Path) -> Result<PathBuf> {
        let url = self.url_for(years)?;
        let target = datadir.join(archive_name(years)?);
        tokio::fs::create_dir_all(datadir).await?;

        log::info!("Downloading {} to {}", url, target.display());
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Http(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        let total = response.content_length();
        let mut progress = Progress::new(total);
        let mut file = tokio::fs::File::create(&target).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            progress.advance(chunk.len() as u64);
        }
        file.flush().await?;

        log::info!("Downloaded {} bytes", progress.current);
        Ok(target)
    }
}

impl Default for MortgageDownloader {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs each whole-percent step of a download of known size
struct Progress {
    current: u64,
    total: Option<u64>,
    last_percent: u64,
}

impl Progress {
    fn new(total: Option<u64>) -> Self {
        Self {
            current: 0,
            total,
            last_percent: 0,
        }
    }

    fn advance(&mut self, bytes: u64) {
        self.current += bytes;
        let Some(total) = self.total.filter(|t| *t > 0) else {
            return;
        };
        let percent = self.current * 100 / total;
        if percent >= self.last_percent + 5 {
            self.last_percent = percent;
            log::info!("{}% [{} / {}] bytes", percent, self.current, total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_names() {
        assert_eq!(archive_name("1").unwrap(), "mortgage_2000.tgz");
        assert_eq!(archive_name("17").unwrap(), "mortgage_2000-2016.tgz");

        let err = archive_name("3").unwrap_err().to_string();
        assert!(err.contains("1, 2, 4, 8, 16, 17"));
    }

    #[test]
    fn test_url_for() {
        let downloader = MortgageDownloader::with_base_url("http://localhost:1234/");
        assert_eq!(
            downloader.url_for("4").unwrap(),
            "http://localhost:1234/mortgage_2000-2003.tgz"
        );
    }

    #[test]
    fn test_progress_steps() {
        let mut progress = Progress::new(Some(200));
        progress.advance(5);
        assert_eq!(progress.last_percent, 0);
        progress.advance(15);
        assert_eq!(progress.last_percent, 10);
        progress.advance(180);
        assert_eq!(progress.last_percent, 100);

        let mut unknown = Progress::new(None);
        unknown.advance(10);
        assert_eq!(unknown.current, 10);
    }
}
