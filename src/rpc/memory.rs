//! 内存账户来源，用于测试和离线回放

use super::source::{AccountSource, ProgramAccountsFilter};
use crate::accounts::token::{parse_token_account, AccountData, TokenAccountInfo};
use crate::core::ata::is_token_program;
use crate::core::error::{ReverserError, Result};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountSource {
    accounts: BTreeMap<Pubkey, AccountData>,
    failing: HashSet<Pubkey>,
}

impl InMemoryAccountSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: AccountData) -> Self {
        self.insert(account);
        self
    }

    /// 读取该地址时模拟一次 RPC 失败
    pub fn with_failure(mut self, address: Pubkey) -> Self {
        self.failing.insert(address);
        self
    }

    pub fn insert(&mut self, account: AccountData) {
        self.accounts.insert(account.pubkey, account);
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn lookup(&self, address: &Pubkey) -> Result<Option<AccountData>> {
        if self.failing.contains(address) {
            return Err(ReverserError::Rpc(format!("simulated failure for {}", address)));
        }
        Ok(self.accounts.get(address).cloned())
    }
}

#[async_trait]
impl AccountSource for InMemoryAccountSource {
    async fn get_account(&self, address: &Pubkey) -> Result<AccountData> {
        self.lookup(address)?.ok_or(ReverserError::AccountNotFound(*address))
    }

    async fn get_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<AccountData>>> {
        addresses.iter().map(|a| self.lookup(a)).collect()
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[ProgramAccountsFilter],
    ) -> Result<Vec<AccountData>> {
        Ok(self
            .accounts
            .values()
            .filter(|a| a.owner == *program_id)
            .filter(|a| filters.iter().all(|f| f.matches(&a.data)))
            .cloned()
            .collect())
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<TokenAccountInfo>> {
        Ok(self
            .accounts
            .values()
            .filter(|a| is_token_program(&a.owner))
            .filter_map(|a| parse_token_account(a).ok())
            .filter(|t| t.owner == *owner && t.mint == *mint)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::token::tests::token_account_bytes;
    use crate::core::ata::TOKEN_PROGRAM_ID;

    #[tokio::test]
    async fn test_program_accounts_filtered() {
        let program = Pubkey::new_unique();
        let parent = Pubkey::new_unique();
        let mut child = vec![0u8; 128];
        child[56..88].copy_from_slice(parent.as_ref());

        let matching = AccountData::new(Pubkey::new_unique(), program, child);
        let source = InMemoryAccountSource::new()
            .with_account(matching.clone())
            .with_account(AccountData::new(Pubkey::new_unique(), program, vec![0u8; 128]))
            .with_account(AccountData::new(Pubkey::new_unique(), program, vec![0u8; 64]))
            .with_account(AccountData::new(Pubkey::new_unique(), Pubkey::new_unique(), vec![0u8; 128]));
        assert_eq!(source.len(), 4);

        let all = source
            .get_program_accounts(&program, &[ProgramAccountsFilter::DataSize(128)])
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let filtered = source
            .get_program_accounts(
                &program,
                &[
                    ProgramAccountsFilter::DataSize(128),
                    ProgramAccountsFilter::memcmp_pubkey(56, &parent),
                ],
            )
            .await
            .unwrap();
        assert_eq!(filtered, vec![matching]);
    }

    #[tokio::test]
    async fn test_token_accounts_by_owner() {
        let pool = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let vault = Pubkey::new_unique();
        let source = InMemoryAccountSource::new()
            .with_account(AccountData::new(vault, TOKEN_PROGRAM_ID, token_account_bytes(&mint, &pool, 9)))
            .with_account(AccountData::new(
                Pubkey::new_unique(),
                TOKEN_PROGRAM_ID,
                token_account_bytes(&Pubkey::new_unique(), &pool, 9),
            ))
            .with_account(AccountData::new(
                Pubkey::new_unique(),
                TOKEN_PROGRAM_ID,
                token_account_bytes(&mint, &Pubkey::new_unique(), 9),
            ));

        let found = source.get_token_accounts_by_owner(&pool, &mint).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].address, vault);
        assert_eq!(found[0].amount, 9);
    }

    #[tokio::test]
    async fn test_get_accounts_preserves_order() {
        let a = AccountData::new(Pubkey::new_unique(), Pubkey::new_unique(), vec![1]);
        let b = AccountData::new(Pubkey::new_unique(), Pubkey::new_unique(), vec![2]);
        let source = InMemoryAccountSource::new().with_account(a.clone()).with_account(b.clone());
        let missing = Pubkey::new_unique();

        let out = source.get_accounts(&[b.pubkey, missing, a.pubkey]).await.unwrap();
        assert_eq!(out, vec![Some(b), None, Some(a)]);
    }
}
