//! サンプル台帳（正式レコードの参照先）
//!
//! 取込セッションからは読み取り専用。デザイン番号で照会し、
//! 0件以上の正式レコードを台帳の並び順で返す。

use crate::error::{Result, ScanError};
use async_trait::async_trait;
use sample_scan_common::DirectoryRecord;
use std::path::PathBuf;
use std::time::Duration;

#[async_trait]
pub trait SampleDirectory: Send + Sync {
    /// デザイン番号（大文字小文字を無視）で照会
    async fn find_by_design(&self, design_number: &str) -> Result<Vec<DirectoryRecord>>;
}

fn design_matches(record: &DirectoryRecord, design_number: &str) -> bool {
    record.design_number.to_lowercase() == design_number.to_lowercase()
}

/// JSONファイルのサンプル台帳
///
/// 照会のたびにファイル全体を読み直す（スナップショット照会）。
#[derive(Debug, Clone)]
pub struct JsonDirectory {
    path: PathBuf,
}

impl JsonDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn snapshot(&self) -> Result<Vec<DirectoryRecord>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ScanError::Directory(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| ScanError::InvalidDirectory(format!("{}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl SampleDirectory for JsonDirectory {
    async fn find_by_design(&self, design_number: &str) -> Result<Vec<DirectoryRecord>> {
        let records = self.snapshot().await?;
        Ok(records
            .into_iter()
            .filter(|r| design_matches(r, design_number))
            .collect())
    }
}

/// メモリ上のサンプル台帳
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    records: Vec<DirectoryRecord>,
    latency: Option<Duration>,
}

impl MemoryDirectory {
    pub fn new(records: Vec<DirectoryRecord>) -> Self {
        Self {
            records,
            latency: None,
        }
    }

    /// 照会ごとに待ち時間を入れる
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

#[async_trait]
impl SampleDirectory for MemoryDirectory {
    async fn find_by_design(&self, design_number: &str) -> Result<Vec<DirectoryRecord>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(self
            .records
            .iter()
            .filter(|r| design_matches(r, design_number))
            .cloned()
            .collect())
    }
}
