//! ZeroFi
//!
//! pair 账户直接存储两侧金库与 vault info；token program 由 0x791 的标志位决定，
//! 未置位时取 base mint 的 owner。
//!
//! 0x100 处曾被当作 swap authority 读取，但它与 `vault_info_quote`（0xE8..0x108）共享 8 字节；
//! `vault_info_quote` 是指令账户，以它为准，不再解码 authority。

use super::common::{expect_owner, load_mint, SwapDirection, SwapUser, SYSVAR_INSTRUCTIONS_ID};
use super::{Protocol, SwapAccounts};
use crate::accounts::layout::{decode_account, AccountLayout, DecodedAccount};
use crate::accounts::token::AccountData;
use crate::core::assembler::{Extras, OrderTable, ResolvedAddress};
use crate::core::ata::TOKEN_2022_PROGRAM_ID;
use crate::core::error::Result;
use crate::rpc::AccountSource;
use once_cell::sync::Lazy;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

pub const PROGRAM_ID: Pubkey = pubkey!("ZERor4xhbUycZ6gb9ntrhqscUcZmAbQDjEAtCf4hbZY");

pub const PAIR: &str = "zerofi_pair";

pub static PAIR_LAYOUT: Lazy<AccountLayout> = Lazy::new(|| {
    AccountLayout::new(PAIR)
        .pubkey("base_mint", 0x48)
        .pubkey("quote_mint", 0x68)
        .pubkey("vault_base", 0x88)
        .pubkey("vault_info_base", 0xA8)
        .pubkey("vault_quote", 0xC8)
        .pubkey("vault_info_quote", 0xE8)
        .u8("token_2022_flag", 0x791)
        .u8("fast_flag", 0x79C)
        .u8("base_left_flag", 0x79F)
});

/// ZeroFi swap instruction account mapping:
/// 0: pair
/// 1: vault_info_in
/// 2: vault_in
/// 3: vault_info_out
/// 4: vault_out
/// 5: user_source
/// 6: user_destination
/// 7: payer (writable, signer)
/// 8: token_program
/// 9: sysvar_instructions
fn swap_table(name: &str, side_in: &str, side_out: &str) -> OrderTable {
    OrderTable::new(name)
        .account("pair", true, PAIR)
        .field("vault_info_in", true, PAIR, &format!("vault_info_{side_in}"))
        .field("vault_in", true, PAIR, &format!("vault_{side_in}"))
        .field("vault_info_out", true, PAIR, &format!("vault_info_{side_out}"))
        .field("vault_out", true, PAIR, &format!("vault_{side_out}"))
        .extra("user_source", true)
        .extra("user_destination", true)
        .signer("payer", true)
        .extra("token_program", false)
        .fixed("sysvar_instructions", SYSVAR_INSTRUCTIONS_ID)
}

pub static SWAP_BASE_IN: Lazy<OrderTable> = Lazy::new(|| swap_table("zerofi_swap_base_in", "base", "quote"));
pub static SWAP_QUOTE_IN: Lazy<OrderTable> = Lazy::new(|| swap_table("zerofi_swap_quote_in", "quote", "base"));

pub fn order_table(direction: SwapDirection) -> &'static OrderTable {
    match direction {
        SwapDirection::BaseToQuote => &SWAP_BASE_IN,
        SwapDirection::QuoteToBase => &SWAP_QUOTE_IN,
    }
}

#[derive(Debug, Clone)]
pub struct ZeroFiPair {
    pub pair: DecodedAccount,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub uses_token_2022: bool,
    pub fast_path: bool,
    pub base_on_left: bool,
}

pub fn decode_pair(account: &AccountData) -> Result<ZeroFiPair> {
    expect_owner(account, &PROGRAM_ID)?;
    let pair = decode_account(&PAIR_LAYOUT, account)?;
    Ok(ZeroFiPair {
        base_mint: pair.pubkey("base_mint")?,
        quote_mint: pair.pubkey("quote_mint")?,
        uses_token_2022: pair.u64("token_2022_flag")? & 1 != 0,
        fast_path: pair.u64("fast_flag")? != 0,
        base_on_left: pair.u64("base_left_flag")? != 0,
        pair,
    })
}

pub(crate) async fn resolve_with_account<S: AccountSource + ?Sized>(
    source: &S,
    account: AccountData,
    user: &SwapUser,
    direction: SwapDirection,
) -> Result<SwapAccounts> {
    let pair = decode_pair(&account)?;
    let token_program = if pair.uses_token_2022 {
        TOKEN_2022_PROGRAM_ID
    } else {
        load_mint(source, &pair.base_mint).await?.token_program
    };

    let user_base = user.base_token_address(&pair.base_mint, &token_program)?;
    let user_quote = user.quote_token_address(&pair.quote_mint, &token_program)?;
    let (user_source, user_destination) = match direction {
        SwapDirection::BaseToQuote => (user_base, user_quote),
        SwapDirection::QuoteToBase => (user_quote, user_base),
    };

    let mut extras = Extras::new();
    extras.insert("user_source".to_string(), user_source);
    extras.insert("user_destination".to_string(), user_destination);
    extras.insert("payer".to_string(), user.authority_address());
    extras.insert("token_program".to_string(), ResolvedAddress::Key(token_program));

    SwapAccounts::assemble(Protocol::ZeroFi, account.pubkey, vec![pair.pair], &extras, order_table(direction))
}

pub async fn resolve_swap_accounts<S: AccountSource + ?Sized>(
    source: &S,
    pair: &Pubkey,
    user: &SwapUser,
    direction: SwapDirection,
) -> Result<SwapAccounts> {
    let account = source.get_account(pair).await?;
    resolve_with_account(source, account, user, direction).await
}
