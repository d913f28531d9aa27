//! 账户拉取层配置

use super::error::{ReverserError, Result};
use serde::{Deserialize, Serialize};
use solana_commitment_config::CommitmentConfig;
use std::path::Path;
use std::time::Duration;

/// 单次 getMultipleAccounts 的上限
pub const MAX_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl From<Commitment> for CommitmentConfig {
    fn from(c: Commitment) -> Self {
        match c {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverserConfig {
    pub rpc_url: String,
    pub commitment: Commitment,
    /// 批量拉取时每批的账户数，限制在 1..=100
    pub batch_size: usize,
    /// 并行单账户拉取的最大并发数
    pub max_concurrency: usize,
    /// 请求超时时间（毫秒）
    pub request_timeout_ms: u64,
}

impl Default for ReverserConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: Commitment::Confirmed,
            batch_size: MAX_BATCH_SIZE,
            max_concurrency: 8,
            request_timeout_ms: 15000,
        }
    }
}

impl ReverserConfig {
    pub fn local() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8899".to_string(),
            commitment: Commitment::Processed,
            batch_size: MAX_BATCH_SIZE,
            max_concurrency: 32,
            request_timeout_ms: 5000,
        }
    }

    pub fn mainnet() -> Self {
        Self::default()
    }

    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = url.into();
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ReverserError::Config(format!("read {}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    /// 把越界的数值拉回合法范围
    pub fn normalized(mut self) -> Self {
        self.batch_size = self.batch_size.clamp(1, MAX_BATCH_SIZE);
        self.max_concurrency = self.max_concurrency.max(1);
        self
    }

    pub fn commitment_config(&self) -> CommitmentConfig {
        self.commitment.into()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
