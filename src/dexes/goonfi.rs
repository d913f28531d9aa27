//! GoonFi（仅池子账户）
//!
//! 池子里能解出 mint 与金库；`pool_signer` 的种子藏在程序的压缩字面量表里，
//! 无法从账户数据推出，只能由调用方提供。

use super::common::{expect_owner, load_mint, SwapUser, SYSVAR_INSTRUCTIONS_ID};
use super::{Protocol, SwapAccounts};
use crate::accounts::layout::{decode_account, AccountLayout, DecodedAccount};
use crate::accounts::token::AccountData;
use crate::core::assembler::{Extras, OrderTable, ResolvedAddress};
use crate::core::error::{ReverserError, Result};
use crate::core::validator::validate_link;
use crate::rpc::AccountSource;
use once_cell::sync::Lazy;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

pub const PROGRAM_ID: Pubkey = pubkey!("goonERTdGsjnkZqWuVjs73BZ3Pb9qoCUdBUL17BnS5j");
pub const GLOBAL_STATE: Pubkey = pubkey!("updapqBoqhn48uaVxD7oKyFVEwEcHmqbgQa1GvHaUuX");

pub const POOL_MIN_LEN: usize = 0x1D8;
const ROUTER_FLAG_OFFSET: usize = 0x388;
const BLACKLIST_FLAG_OFFSET: usize = 0x38E;

pub const POOL_STATE: &str = "goonfi_pool";

pub static POOL_LAYOUT: Lazy<AccountLayout> = Lazy::new(|| {
    AccountLayout::new(POOL_STATE)
        .bytes("discriminator", 0, 8)
        .pubkey("global_state", 0xE0)
        .pubkey("base_mint", 0x100)
        .pubkey("quote_mint", 0x120)
        .pubkey("base_vault", 0x140)
        .pubkey("quote_vault", 0x160)
});

/// GoonFi swap instruction account mapping:
/// 0: user_authority (writable, signer)
/// 1: pool_state
/// 2: user_base_token
/// 3: user_quote_token
/// 4: base_vault
/// 5: quote_vault
/// 6: pool_signer
/// 7: sysvar_instructions
/// 8: token_program
pub static SWAP_TABLE: Lazy<OrderTable> = Lazy::new(|| {
    OrderTable::new("goonfi_swap")
        .signer("user_authority", true)
        .account("pool_state", true, POOL_STATE)
        .extra("user_base_token", true)
        .extra("user_quote_token", true)
        .field("base_vault", true, POOL_STATE, "base_vault")
        .field("quote_vault", true, POOL_STATE, "quote_vault")
        .extra("pool_signer", false)
        .fixed("sysvar_instructions", SYSVAR_INSTRUCTIONS_ID)
        .extra("token_program", false)
});

#[derive(Debug, Clone)]
pub struct GoonFiPool {
    pub pool: DecodedAccount,
    /// 账户足够长时才存在
    pub router_flag: Option<u8>,
    pub blacklist_flag: Option<u8>,
}

pub fn decode_pool(account: &AccountData) -> Result<GoonFiPool> {
    expect_owner(account, &PROGRAM_ID)?;
    if account.data.len() < POOL_MIN_LEN {
        return Err(ReverserError::unexpected(
            account.pubkey,
            format!("pool account is {} bytes, expected at least {}", account.data.len(), POOL_MIN_LEN),
        ));
    }
    let pool = decode_account(&POOL_LAYOUT, account)?;
    validate_link(
        &pool.pubkey("global_state")?,
        &GLOBAL_STATE,
        &format!("{}.global_state", account.pubkey),
    )?;
    Ok(GoonFiPool {
        router_flag: account.data.get(ROUTER_FLAG_OFFSET).copied(),
        blacklist_flag: account.data.get(BLACKLIST_FLAG_OFFSET).copied(),
        pool,
    })
}

pub(crate) async fn resolve_with_account<S: AccountSource + ?Sized>(
    source: &S,
    account: AccountData,
    user: &SwapUser,
    pool_signer: Option<Pubkey>,
) -> Result<SwapAccounts> {
    let goon = decode_pool(&account)?;
    let base_mint = goon.pool.pubkey("base_mint")?;
    let quote_mint = goon.pool.pubkey("quote_mint")?;
    let (base, quote) = futures::try_join!(load_mint(source, &base_mint), load_mint(source, &quote_mint))?;

    let mut extras = Extras::new();
    extras.insert("user_authority".to_string(), user.authority_address());
    extras.insert("user_base_token".to_string(), user.base_token_address(&base_mint, &base.token_program)?);
    extras.insert("user_quote_token".to_string(), user.quote_token_address(&quote_mint, &quote.token_program)?);
    extras.insert("token_program".to_string(), ResolvedAddress::Key(base.token_program));
    if let Some(signer) = pool_signer {
        extras.insert("pool_signer".to_string(), ResolvedAddress::Key(signer));
    }

    SwapAccounts::assemble(Protocol::GoonFi, account.pubkey, vec![goon.pool], &extras, &SWAP_TABLE)
}

/// `pool_signer` 为 `None` 时返回 `UnresolvedRole("pool_signer")`
pub async fn resolve_swap_accounts<S: AccountSource + ?Sized>(
    source: &S,
    pool: &Pubkey,
    user: &SwapUser,
    pool_signer: Option<Pubkey>,
) -> Result<SwapAccounts> {
    let account = source.get_account(pool).await?;
    resolve_with_account(source, account, user, pool_signer).await
}
