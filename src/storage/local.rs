//! Local filesystem report storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::CrawlReport;
use crate::storage::{Listing, Report, ReportStorage};

/// Reports as pretty-printed JSON files under a root directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    fn report_key(date: NaiveDate) -> String {
        format!("reports/{}.json", date.format("%Y-%m-%d"))
    }

    fn listing_key(listing: Listing, source: &str, date: NaiveDate) -> String {
        let name: String = source
            .chars()
            .map(|c| if c == '/' || c == '\\' || c.is_whitespace() { '_' } else { c })
            .collect();
        format!("{}/{}_{}.json", listing.dir(), name, date.format("%Y-%m-%d"))
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ReportStorage for LocalStorage {
    async fn write_report(&self, report: &Report) -> Result<String> {
        let key = Self::report_key(report.run_date());
        let path = self.write_json(&key, report).await?;
        log::info!(
            "Report with {} article(s) written to {}",
            report.articles.len(),
            path.display()
        );
        Ok(path.display().to_string())
    }

    async fn write_listing(
        &self,
        listing: Listing,
        date: NaiveDate,
        report: &CrawlReport,
    ) -> Result<String> {
        let key = Self::listing_key(listing, &report.source, date);
        let path = self.write_json(&key, report).await?;
        log::info!(
            "{} article(s) of '{}' written to {}",
            report.articles.len(),
            report.source,
            path.display()
        );
        Ok(path.display().to_string())
    }

    async fn load_report(&self, date: NaiveDate) -> Result<Option<Report>> {
        let key = Self::report_key(date);
        let report = self.read_json(&key).await?;
        if report.is_none() {
            log::debug!("No report at {}", key);
        }
        Ok(report)
    }
}
