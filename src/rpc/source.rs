//! 账户来源抽象
//!
//! 引擎只消费原始字节 + owner program；传输、鉴权、重试都属于这一层的实现。

use crate::accounts::token::{AccountData, TokenAccountInfo};
use crate::core::error::{ReverserError, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::warn;
use solana_sdk::pubkey::Pubkey;

/// getProgramAccounts 过滤条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramAccountsFilter {
    DataSize(u64),
    Memcmp { offset: usize, bytes: Vec<u8> },
}

impl ProgramAccountsFilter {
    pub fn memcmp_pubkey(offset: usize, key: &Pubkey) -> Self {
        ProgramAccountsFilter::Memcmp { offset, bytes: key.to_bytes().to_vec() }
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            ProgramAccountsFilter::DataSize(size) => data.len() as u64 == *size,
            ProgramAccountsFilter::Memcmp { offset, bytes } => offset
                .checked_add(bytes.len())
                .and_then(|end| data.get(*offset..end))
                .map_or(false, |slice| slice == bytes.as_slice()),
        }
    }
}

#[async_trait]
pub trait AccountSource: Send + Sync {
    /// 账户不存在时返回 `AccountNotFound`
    async fn get_account(&self, address: &Pubkey) -> Result<AccountData>;

    /// 批量拉取，结果与输入一一对应，不存在的账户为 `None`
    async fn get_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<AccountData>>>;

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[ProgramAccountsFilter],
    ) -> Result<Vec<AccountData>>;

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<TokenAccountInfo>>;
}

/// 批量拉取，任一账户缺失即报 `AccountNotFound`
pub async fn fetch_required<S: AccountSource + ?Sized>(
    source: &S,
    addresses: &[Pubkey],
) -> Result<Vec<AccountData>> {
    let fetched = source.get_accounts(addresses).await?;
    addresses
        .iter()
        .zip(fetched)
        .map(|(key, account)| account.ok_or(ReverserError::AccountNotFound(*key)))
        .collect()
}

/// 有界并发地逐个拉取；每个账户单独返回结果，一个失败不影响其他账户
pub async fn fetch_each<S: AccountSource + ?Sized>(
    source: &S,
    addresses: &[Pubkey],
    max_concurrency: usize,
) -> Vec<Result<AccountData>> {
    stream::iter(addresses.iter())
        .map(|key| async move {
            let result = source.get_account(key).await;
            if let Err(e) = &result {
                warn!("fetch {} failed: {}", key, e);
            }
            result
        })
        .buffered(max_concurrency.max(1))
        .collect()
        .await
}
