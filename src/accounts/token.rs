//! SPL Token 和 Token-2022 账户解析
//!
//! 提供 Token Account 和 Mint 账户的解析，以及金库（vault）选择

use crate::core::ata::is_token_program;
use crate::core::error::{ReverserError, Result};
use solana_sdk::pubkey::Pubkey;
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::{Account, Mint};
use spl_token_2022::{
    extension::StateWithExtensions,
    state::{Account as Account2022, Mint as Mint2022},
};
use std::cmp::Reverse;

/// 拉取到的原始账户
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountData {
    pub pubkey: Pubkey,
    pub executable: bool,
    pub lamports: u64,
    pub owner: Pubkey,
    pub rent_epoch: u64,
    pub data: Vec<u8>,
}

impl AccountData {
    pub fn new(pubkey: Pubkey, owner: Pubkey, data: Vec<u8>) -> Self {
        Self { pubkey, executable: false, lamports: 0, owner, rent_epoch: 0, data }
    }
}

/// Token Account 中与金库选择相关的字段
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenAccountInfo {
    pub address: Pubkey,
    pub mint: Pubkey,
    /// token account 的 authority（不是账户的 owner program）
    pub owner: Pubkey,
    pub amount: u64,
    pub token_program: Pubkey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintInfo {
    pub address: Pubkey,
    pub token_program: Pubkey,
    pub supply: u64,
    pub decimals: u8,
}

#[inline]
fn is_token_2022(owner: &Pubkey) -> bool {
    owner.to_bytes() == spl_token_2022::ID.to_bytes()
}

/// 解析 Token Account（SPL Token 或 Token-2022，由 owner program 决定）
pub fn parse_token_account(account: &AccountData) -> Result<TokenAccountInfo> {
    if !is_token_program(&account.owner) {
        return Err(ReverserError::unexpected(
            account.pubkey,
            format!("owner {} is not a token program", account.owner),
        ));
    }

    let (mint, owner, amount) = if is_token_2022(&account.owner) {
        let info = StateWithExtensions::<Account2022>::unpack(&account.data).map_err(|e| {
            ReverserError::unexpected(account.pubkey, format!("not a token-2022 account: {e}"))
        })?;
        (info.base.mint.to_bytes(), info.base.owner.to_bytes(), info.base.amount)
    } else {
        let info = Account::unpack(&account.data).map_err(|e| {
            ReverserError::unexpected(account.pubkey, format!("not a token account: {e}"))
        })?;
        (info.mint.to_bytes(), info.owner.to_bytes(), info.amount)
    };

    Ok(TokenAccountInfo {
        address: account.pubkey,
        mint: Pubkey::new_from_array(mint),
        owner: Pubkey::new_from_array(owner),
        amount,
        token_program: account.owner,
    })
}

/// 解析 Mint；mint 的 owner 就是其 token program
pub fn parse_mint(account: &AccountData) -> Result<MintInfo> {
    if !is_token_program(&account.owner) {
        return Err(ReverserError::unresolved("token_program"));
    }

    let (supply, decimals) = if is_token_2022(&account.owner) {
        let mint = StateWithExtensions::<Mint2022>::unpack(&account.data).map_err(|e| {
            ReverserError::unexpected(account.pubkey, format!("not a token-2022 mint: {e}"))
        })?;
        (mint.base.supply, mint.base.decimals)
    } else {
        let mint = Mint::unpack(&account.data).map_err(|e| {
            ReverserError::unexpected(account.pubkey, format!("not a mint: {e}"))
        })?;
        (mint.supply, mint.decimals)
    };

    Ok(MintInfo { address: account.pubkey, token_program: account.owner, supply, decimals })
}

/// 从候选 token account 中选出 `mint` 的金库：余额最大者，余额相同取地址最小者
pub fn select_vault(candidates: &[TokenAccountInfo], mint: &Pubkey, role: &str) -> Result<Pubkey> {
    candidates
        .iter()
        .filter(|c| c.mint == *mint)
        .max_by_key(|c| (c.amount, Reverse(c.address.to_bytes())))
        .map(|c| c.address)
        .ok_or_else(|| ReverserError::unresolved(role))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::ata::{TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};

    /// 按 SPL Token Account 布局（165 字节）手工打包
    pub(crate) fn token_account_bytes(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Vec<u8> {
        let mut data = vec![0u8; 165];
        data[0..32].copy_from_slice(mint.as_ref());
        data[32..64].copy_from_slice(owner.as_ref());
        data[64..72].copy_from_slice(&amount.to_le_bytes());
        // state = Initialized
        data[108] = 1;
        data
    }

    /// SPL Mint 布局（82 字节）
    pub(crate) fn mint_bytes(supply: u64, decimals: u8) -> Vec<u8> {
        let mut data = vec![0u8; 82];
        data[36..44].copy_from_slice(&supply.to_le_bytes());
        data[44] = decimals;
        data[45] = 1;
        data
    }

    fn info(address: Pubkey, mint: Pubkey, amount: u64) -> TokenAccountInfo {
        TokenAccountInfo { address, mint, owner: Pubkey::default(), amount, token_program: TOKEN_PROGRAM_ID }
    }

    #[test]
    fn test_parse_spl_token_account() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let address = Pubkey::new_unique();
        let account = AccountData::new(address, TOKEN_PROGRAM_ID, token_account_bytes(&mint, &owner, 500));

        let parsed = parse_token_account(&account).unwrap();
        assert_eq!(parsed.address, address);
        assert_eq!(parsed.mint, mint);
        assert_eq!(parsed.owner, owner);
        assert_eq!(parsed.amount, 500);
        assert_eq!(parsed.token_program, TOKEN_PROGRAM_ID);
    }

    #[test]
    fn test_parse_token_2022_account() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let account = AccountData::new(
            Pubkey::new_unique(),
            TOKEN_2022_PROGRAM_ID,
            token_account_bytes(&mint, &owner, 7),
        );
        let parsed = parse_token_account(&account).unwrap();
        assert_eq!(parsed.amount, 7);
        assert_eq!(parsed.token_program, TOKEN_2022_PROGRAM_ID);
    }

    #[test]
    fn test_non_token_owner_rejected() {
        let account = AccountData::new(Pubkey::new_unique(), Pubkey::new_unique(), vec![0u8; 165]);
        assert!(matches!(
            parse_token_account(&account),
            Err(ReverserError::UnexpectedAccount { .. })
        ));
        assert!(matches!(
            parse_mint(&account),
            Err(ReverserError::UnresolvedRole { role }) if role == "token_program"
        ));
    }

    #[test]
    fn test_parse_mint() {
        let account = AccountData::new(Pubkey::new_unique(), TOKEN_PROGRAM_ID, mint_bytes(1_000, 6));
        let mint = parse_mint(&account).unwrap();
        assert_eq!(mint.decimals, 6);
        assert_eq!(mint.supply, 1_000);
        assert_eq!(mint.token_program, TOKEN_PROGRAM_ID);
    }

    #[test]
    fn test_select_vault_largest_balance() {
        let mint = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let small = Pubkey::new_unique();
        let big = Pubkey::new_unique();
        let candidates = vec![
            info(small, mint, 10),
            info(big, mint, 1_000),
            info(Pubkey::new_unique(), other, 1_000_000),
        ];
        assert_eq!(select_vault(&candidates, &mint, "base_vault").unwrap(), big);
    }

    #[test]
    fn test_select_vault_tie_takes_lowest_address() {
        let mint = Pubkey::new_unique();
        let low = Pubkey::new_from_array([1u8; 32]);
        let high = Pubkey::new_from_array([2u8; 32]);
        let candidates = vec![info(high, mint, 5), info(low, mint, 5)];
        assert_eq!(select_vault(&candidates, &mint, "quote_vault").unwrap(), low);
    }

    #[test]
    fn test_select_vault_none() {
        let err = select_vault(&[], &Pubkey::new_unique(), "quote_vault").unwrap_err();
        assert!(matches!(err, ReverserError::UnresolvedRole { role } if role == "quote_vault"));
    }
}
