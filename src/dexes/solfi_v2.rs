//! SolFi V2
//!
//! market 账户前 704 字节是固定头部，金库、mint、token program、oracle、config 都在头部里。

use super::common::{expect_owner, require_token_program, SwapDirection, SwapUser, SYSVAR_INSTRUCTIONS_ID};
use super::{Protocol, SwapAccounts};
use crate::accounts::layout::{decode_account, AccountLayout, DecodedAccount};
use crate::accounts::token::{parse_token_account, AccountData};
use crate::core::assembler::{Extras, OrderTable};
use crate::core::error::{ReverserError, Result};
use crate::core::validator::validate_link;
use crate::rpc::AccountSource;
use once_cell::sync::Lazy;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

pub const PROGRAM_ID: Pubkey = pubkey!("SV2EYYJyRz2YhfXwXnhNAevDEui5Q6yrfyo13WtupPF");

pub const MARKET_ACCOUNT_SIZE: usize = 1728;
pub const MARKET_HEADER_SIZE: usize = 704;

pub const MARKET: &str = "solfi_v2_market";

pub static MARKET_LAYOUT: Lazy<AccountLayout> = Lazy::new(|| {
    AccountLayout::new(MARKET)
        .u8("bump", 0)
        .u8("market_num", 1)
        .u8("config_version", 2)
        .u64("sequence_number", 8)
        .u64("sequence_number_prev_slot", 16)
        .pubkey("oracle", 24)
        .pubkey("base_mint", 56)
        .pubkey("quote_mint", 88)
        .pubkey("base_vault", 120)
        .pubkey("quote_vault", 152)
        .pubkey("base_token_program", 184)
        .pubkey("quote_token_program", 216)
        .u8("base_mint_decimals", 248)
        .u8("quote_mint_decimals", 249)
        .pubkey("config", 256)
        .bytes("reserved", 288, MARKET_HEADER_SIZE - 288)
});

/// SolFi V2 swap instruction account mapping:
/// 0: user (writable, signer)
/// 1: pair
/// 2: oracle
/// 3: config
/// 4: base_vault
/// 5: quote_vault
/// 6: user_source (base 侧槽位，quote→base 时放 quote 账户)
/// 7: user_destination
/// 8: base_mint
/// 9: quote_mint
/// 10: base_token_program
/// 11: quote_token_program
/// 12: sysvar_instructions
pub static SWAP_TABLE: Lazy<OrderTable> = Lazy::new(|| {
    OrderTable::new("solfi_v2_swap")
        .signer("user", true)
        .account("pair", true, MARKET)
        .field("oracle", false, MARKET, "oracle")
        .field("config", false, MARKET, "config")
        .field("base_vault", true, MARKET, "base_vault")
        .field("quote_vault", true, MARKET, "quote_vault")
        .extra("user_source", true)
        .extra("user_destination", true)
        .field("base_mint", false, MARKET, "base_mint")
        .field("quote_mint", false, MARKET, "quote_mint")
        .field("base_token_program", false, MARKET, "base_token_program")
        .field("quote_token_program", false, MARKET, "quote_token_program")
        .fixed("sysvar_instructions", SYSVAR_INSTRUCTIONS_ID)
});

pub fn decode_market(account: &AccountData) -> Result<DecodedAccount> {
    expect_owner(account, &PROGRAM_ID)?;
    if account.data.len() < MARKET_ACCOUNT_SIZE {
        return Err(ReverserError::unexpected(
            account.pubkey,
            format!("market account is {} bytes, expected at least {}", account.data.len(), MARKET_ACCOUNT_SIZE),
        ));
    }
    let market = decode_account(&MARKET_LAYOUT, account)?;
    require_token_program(market.pubkey("base_token_program")?, "base_token_program")?;
    require_token_program(market.pubkey("quote_token_program")?, "quote_token_program")?;
    Ok(market)
}

/// 金库 token account 的 mint 与 token program 必须与头部一致
pub async fn verify_vaults<S: AccountSource + ?Sized>(source: &S, market: &DecodedAccount) -> Result<()> {
    let sides = [
        ("base_vault", "base_mint", "base_token_program"),
        ("quote_vault", "quote_mint", "quote_token_program"),
    ];
    let keys = [market.pubkey("base_vault")?, market.pubkey("quote_vault")?];
    let fetched = source.get_accounts(&keys).await?;

    for ((vault, mint, program), (key, account)) in sides.iter().zip(keys.iter().zip(fetched)) {
        let account = account.ok_or(ReverserError::AccountNotFound(*key))?;
        let info = parse_token_account(&account)?;
        let context = format!("{}.{} mint", market.address, vault);
        validate_link(&info.mint, &market.pubkey(mint)?, &context)?;
        let context = format!("{}.{} token program", market.address, vault);
        validate_link(&info.token_program, &market.pubkey(program)?, &context)?;
    }
    Ok(())
}

pub(crate) async fn resolve_with_account<S: AccountSource + ?Sized>(
    source: &S,
    account: AccountData,
    user: &SwapUser,
    direction: SwapDirection,
) -> Result<SwapAccounts> {
    let market = decode_market(&account)?;
    verify_vaults(source, &market).await?;

    let user_base = user.base_token_address(&market.pubkey("base_mint")?, &market.pubkey("base_token_program")?)?;
    let user_quote =
        user.quote_token_address(&market.pubkey("quote_mint")?, &market.pubkey("quote_token_program")?)?;
    let (user_source, user_destination) = match direction {
        SwapDirection::BaseToQuote => (user_base, user_quote),
        SwapDirection::QuoteToBase => (user_quote, user_base),
    };

    let mut extras = Extras::new();
    extras.insert("user".to_string(), user.authority_address());
    extras.insert("user_source".to_string(), user_source);
    extras.insert("user_destination".to_string(), user_destination);

    SwapAccounts::assemble(Protocol::SolFiV2, account.pubkey, vec![market], &extras, &SWAP_TABLE)
}

pub async fn resolve_swap_accounts<S: AccountSource + ?Sized>(
    source: &S,
    market: &Pubkey,
    user: &SwapUser,
    direction: SwapDirection,
) -> Result<SwapAccounts> {
    let account = source.get_account(market).await?;
    resolve_with_account(source, account, user, direction).await
}
