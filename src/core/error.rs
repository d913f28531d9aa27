//! 统一错误类型
//!
//! 解码、推导、校验与组装过程中的所有失败都在检测点立即返回，
//! 引擎内部不做重试、不吞错误。重试只属于外部的账户拉取层。

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReverserError>;

#[derive(Debug, Error)]
pub enum ReverserError {
    /// Base58 输入含非法字符，或解码后的长度不是一个公钥
    #[error("invalid base58 input {input:?}: {reason}")]
    InvalidEncoding { input: String, reason: String },

    #[error("seed #{index} is {len} bytes, max is 32")]
    SeedTooLong { index: usize, len: usize },

    #[error("{count} seeds given, max is 16")]
    TooManySeeds { count: usize },

    /// 256 个 bump 全部落在曲线上
    #[error("no off-curve program address found for program {program_id}")]
    PdaNotFound { program_id: Pubkey },

    #[error(
        "account too short for field `{field}`: needs {required} bytes at offset {offset:#x}, buffer has {actual}"
    )]
    TruncatedAccount {
        field: String,
        offset: usize,
        required: usize,
        actual: usize,
    },

    #[error("integrity mismatch ({context}): account claims {claim}, recomputed {recomputed}")]
    IntegrityMismatch {
        context: String,
        claim: String,
        recomputed: String,
    },

    #[error("swap account role `{role}` could not be resolved")]
    UnresolvedRole { role: String },

    #[error("layout `{layout}` has no field `{field}`")]
    UnknownField { layout: String, field: String },

    #[error("field `{field}` is not a {expected}")]
    FieldKindMismatch { field: String, expected: &'static str },

    #[error("invalid layout `{layout}`: {reason}")]
    InvalidLayout { layout: String, reason: String },

    #[error("unexpected account {address}: {reason}")]
    UnexpectedAccount { address: Pubkey, reason: String },

    #[error("account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("config error: {0}")]
    Config(String),
}

impl ReverserError {
    pub fn unresolved(role: impl Into<String>) -> Self {
        ReverserError::UnresolvedRole { role: role.into() }
    }

    pub fn mismatch(
        context: impl Into<String>,
        claim: impl std::fmt::Display,
        recomputed: impl std::fmt::Display,
    ) -> Self {
        ReverserError::IntegrityMismatch {
            context: context.into(),
            claim: claim.to_string(),
            recomputed: recomputed.to_string(),
        }
    }

    pub fn unexpected(address: Pubkey, reason: impl Into<String>) -> Self {
        ReverserError::UnexpectedAccount { address, reason: reason.into() }
    }

    /// 是否属于拉取层的错误（其余均为确定性的解码/校验错误，重试无意义）
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, ReverserError::Rpc(_) | ReverserError::AccountNotFound(_))
    }
}

impl From<solana_client::client_error::ClientError> for ReverserError {
    fn from(e: solana_client::client_error::ClientError) -> Self {
        ReverserError::Rpc(e.to_string())
    }
}

impl From<serde_json::Error> for ReverserError {
    fn from(e: serde_json::Error) -> Self {
        ReverserError::Config(e.to_string())
    }
}
