//! HumidiFi
//!
//! 配置账户里的 mint 与 swap_id 均做了 XOR 混淆；金库不在账户中存储，
//! 通过 `getTokenAccountsByOwner(pool, mint)` 取余额最大者。

use super::common::{
    expect_owner, largest_vault, SwapUser, SYSVAR_CLOCK_ID, SYSVAR_INSTRUCTIONS_ID,
};
use super::{Protocol, SwapAccounts};
use crate::accounts::layout::{decode_account, AccountLayout, DecodedAccount, FieldKind};
use crate::accounts::token::AccountData;
use crate::accounts::utils::u64_mask_bytes;
use crate::core::assembler::{Extras, OrderTable, ResolvedAddress};
use crate::core::error::{ReverserError, Result};
use crate::core::validator::validate_link;
use crate::rpc::AccountSource;
use once_cell::sync::Lazy;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

pub const PROGRAM_ID: Pubkey = pubkey!("9H6tua7jkLhdm3w8BvgpTn5LZNU7g4ZynDmCiNN3q6Rp");

pub const POOL: &str = "humidifi_pool";

pub const MINT_MASKS: [u64; 4] =
    [0xFB5CE87AAE443C38, 0x04A2178451BAC3C7, 0x04A1178751B9C3C6, 0x04A0178651B8C3C5];
pub const SWAP_ID_MASK: u64 = 0x6E9DE2B30B19F9EA;

pub static POOL_LAYOUT: Lazy<AccountLayout> = Lazy::new(|| {
    let mint_mask = u64_mask_bytes(&MINT_MASKS);
    AccountLayout::new(POOL)
        .masked_field("quote_mint", 0x180, FieldKind::Pubkey, mint_mask.clone())
        .masked_field("base_mint", 0x1A0, FieldKind::Pubkey, mint_mask)
        .masked_field("swap_id", 0x2B0, FieldKind::U64, SWAP_ID_MASK.to_le_bytes().to_vec())
});

/// HumidiFi swap instruction account mapping:
/// 0: user_authority (writable, signer)
/// 1: pool
/// 2: base_vault
/// 3: quote_vault
/// 4: user_base_token
/// 5: user_quote_token
/// 6: sysvar_clock
/// 7: token_program
/// 8: sysvar_instructions
pub static SWAP_TABLE: Lazy<OrderTable> = Lazy::new(|| {
    OrderTable::new("humidifi_swap")
        .signer("user_authority", true)
        .account("pool", true, POOL)
        .extra("base_vault", true)
        .extra("quote_vault", true)
        .extra("user_base_token", true)
        .extra("user_quote_token", true)
        .fixed("sysvar_clock", SYSVAR_CLOCK_ID)
        .extra("token_program", false)
        .fixed("sysvar_instructions", SYSVAR_INSTRUCTIONS_ID)
});

#[derive(Debug, Clone)]
pub struct HumidiFiPool {
    pub pool: DecodedAccount,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub last_swap_id: u64,
}

impl HumidiFiPool {
    /// 下一笔 swap 使用的 id
    pub fn next_swap_id(&self) -> Result<u64> {
        self.last_swap_id.checked_add(1).ok_or_else(|| {
            ReverserError::unexpected(self.pool.address, "swap_id counter overflow")
        })
    }
}

pub fn decode_pool(account: &AccountData) -> Result<HumidiFiPool> {
    expect_owner(account, &PROGRAM_ID)?;
    let pool = decode_account(&POOL_LAYOUT, account)?;
    Ok(HumidiFiPool {
        base_mint: pool.pubkey("base_mint")?,
        quote_mint: pool.pubkey("quote_mint")?,
        last_swap_id: pool.u64("swap_id")?,
        pool,
    })
}

pub(crate) async fn resolve_with_account<S: AccountSource + ?Sized>(
    source: &S,
    account: AccountData,
    user: &SwapUser,
) -> Result<SwapAccounts> {
    let pool = decode_pool(&account)?;
    let base_vault = largest_vault(source, &account.pubkey, &pool.base_mint, "base_vault").await?;
    let quote_vault = largest_vault(source, &account.pubkey, &pool.quote_mint, "quote_vault").await?;
    validate_link(
        &quote_vault.token_program,
        &base_vault.token_program,
        &format!("{} vault token programs", account.pubkey),
    )?;
    let token_program = base_vault.token_program;

    let mut extras = Extras::new();
    extras.insert("user_authority".to_string(), user.authority_address());
    extras.insert("base_vault".to_string(), ResolvedAddress::Key(base_vault.address));
    extras.insert("quote_vault".to_string(), ResolvedAddress::Key(quote_vault.address));
    extras.insert("user_base_token".to_string(), user.base_token_address(&pool.base_mint, &token_program)?);
    extras.insert("user_quote_token".to_string(), user.quote_token_address(&pool.quote_mint, &token_program)?);
    extras.insert("token_program".to_string(), ResolvedAddress::Key(token_program));

    SwapAccounts::assemble(Protocol::HumidiFi, account.pubkey, vec![pool.pool], &extras, &SWAP_TABLE)
}

pub async fn resolve_swap_accounts<S: AccountSource + ?Sized>(
    source: &S,
    pool: &Pubkey,
    user: &SwapUser,
) -> Result<SwapAccounts> {
    let account = source.get_account(pool).await?;
    resolve_with_account(source, account, user).await
}
