//! Tessera V
//!
//! 所有池子共用一个 global state，金库是 global state 名下对应 mint 余额最大的 token account。

use super::common::{expect_owner, largest_vault, load_mint, SwapUser, SYSVAR_INSTRUCTIONS_ID};
use super::{Protocol, SwapAccounts};
use crate::accounts::layout::{decode_account, AccountLayout, DecodedAccount};
use crate::accounts::token::{AccountData, MintInfo};
use crate::core::assembler::{Extras, OrderTable, ResolvedAddress};
use crate::core::error::Result;
use crate::rpc::AccountSource;
use once_cell::sync::Lazy;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

pub const PROGRAM_ID: Pubkey = pubkey!("TessVdML9pBGgG9yGks7o4HewRaXVAMuoVj4x83GLQH");
pub const GLOBAL_STATE: Pubkey = pubkey!("8ekCy2jHHUbW2yeNGFWYJT9Hm9FW7SvZcZK66dSZCDiF");

pub const POOL_STATE: &str = "tessera_v_pool";

pub static POOL_LAYOUT: Lazy<AccountLayout> = Lazy::new(|| {
    AccountLayout::new(POOL_STATE)
        .u32("pool_id", 0x10)
        .pubkey("base_mint", 0x18)
        .pubkey("quote_mint", 0x38)
});

/// Tessera V swap instruction account mapping:
/// 0: global_state
/// 1: pool_state
/// 2: user_authority (signer)
/// 3: base_vault
/// 4: quote_vault
/// 5: user_base_token
/// 6: user_quote_token
/// 7: base_mint
/// 8: quote_mint
/// 9: base_token_program
/// 10: quote_token_program
/// 11: sysvar_instructions
pub static SWAP_TABLE: Lazy<OrderTable> = Lazy::new(|| {
    OrderTable::new("tessera_v_swap")
        .extra("global_state", true)
        .account("pool_state", true, POOL_STATE)
        .signer("user_authority", true)
        .extra("base_vault", true)
        .extra("quote_vault", true)
        .extra("user_base_token", true)
        .extra("user_quote_token", true)
        .field("base_mint", false, POOL_STATE, "base_mint")
        .field("quote_mint", false, POOL_STATE, "quote_mint")
        .extra("base_token_program", false)
        .extra("quote_token_program", false)
        .fixed("sysvar_instructions", SYSVAR_INSTRUCTIONS_ID)
});

pub fn decode_pool(account: &AccountData) -> Result<DecodedAccount> {
    expect_owner(account, &PROGRAM_ID)?;
    decode_account(&POOL_LAYOUT, account)
}

#[derive(Debug, Clone)]
pub struct TesseraMarket {
    pub pool: DecodedAccount,
    pub base_mint: MintInfo,
    pub quote_mint: MintInfo,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
}

pub async fn load_market<S: AccountSource + ?Sized>(source: &S, account: &AccountData) -> Result<TesseraMarket> {
    let pool = decode_pool(account)?;
    let base_mint = load_mint(source, &pool.pubkey("base_mint")?).await?;
    let quote_mint = load_mint(source, &pool.pubkey("quote_mint")?).await?;
    let base_vault = largest_vault(source, &GLOBAL_STATE, &base_mint.address, "base_vault").await?;
    let quote_vault = largest_vault(source, &GLOBAL_STATE, &quote_mint.address, "quote_vault").await?;
    Ok(TesseraMarket {
        pool,
        base_mint,
        quote_mint,
        base_vault: base_vault.address,
        quote_vault: quote_vault.address,
    })
}

pub(crate) async fn resolve_with_account<S: AccountSource + ?Sized>(
    source: &S,
    account: AccountData,
    user: &SwapUser,
) -> Result<SwapAccounts> {
    let market = load_market(source, &account).await?;
    let base = &market.base_mint;
    let quote = &market.quote_mint;

    let mut extras = Extras::new();
    extras.insert("global_state".to_string(), ResolvedAddress::Key(GLOBAL_STATE));
    extras.insert("user_authority".to_string(), user.authority_address());
    extras.insert("base_vault".to_string(), ResolvedAddress::Key(market.base_vault));
    extras.insert("quote_vault".to_string(), ResolvedAddress::Key(market.quote_vault));
    extras.insert("user_base_token".to_string(), user.base_token_address(&base.address, &base.token_program)?);
    extras.insert("user_quote_token".to_string(), user.quote_token_address(&quote.address, &quote.token_program)?);
    extras.insert("base_token_program".to_string(), ResolvedAddress::Key(base.token_program));
    extras.insert("quote_token_program".to_string(), ResolvedAddress::Key(quote.token_program));

    SwapAccounts::assemble(Protocol::TesseraV, account.pubkey, vec![market.pool], &extras, &SWAP_TABLE)
}

pub async fn resolve_swap_accounts<S: AccountSource + ?Sized>(
    source: &S,
    pool: &Pubkey,
    user: &SwapUser,
) -> Result<SwapAccounts> {
    let account = source.get_account(pool).await?;
    resolve_with_account(source, account, user).await
}
