//! Aquifer
//!
//! 账户层级：dex global → dex instance → vault info（Aquifer 程序，1056 字节）；
//! coin state 属于 fast 程序（128 字节），指回 dex global。
//! 子账户都通过 getProgramAccounts(size + memcmp) 定位，再做父指针校验。

use super::common::{expect_owner, largest_vault, load_mint, SwapUser, SYSVAR_INSTRUCTIONS_ID};
use super::{Protocol, SwapAccounts};
use crate::accounts::layout::{decode_account, AccountLayout, DecodedAccount};
use crate::accounts::token::AccountData;
use crate::core::assembler::{Extras, OrderTable, ResolvedAddress};
use crate::core::error::{ReverserError, Result};
use crate::core::validator::validate_back_pointer;
use crate::rpc::{AccountSource, ProgramAccountsFilter};
use log::debug;
use once_cell::sync::Lazy;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

pub const PROGRAM_ID: Pubkey = pubkey!("AQU1FRd7papthgdrwPTTq5JacJh8YtwEXaBfKU3bTz45");
pub const FAST_PROGRAM_ID: Pubkey = pubkey!("fastC7gqs2WUXgcyNna2BZAe9mte4zcTGprv3mv18N3");

pub const COIN_STATE_SIZE: u64 = 128;
pub const VAULT_INFO_SIZE: u64 = 1056;

pub const DEX_GLOBAL: &str = "dex_global";
pub const DEX_INSTANCE: &str = "dex_instance";

pub static DEX_GLOBAL_LAYOUT: Lazy<AccountLayout> =
    Lazy::new(|| AccountLayout::new(DEX_GLOBAL).u64("version", 0).pubkey("admin", 8));

pub static DEX_INSTANCE_LAYOUT: Lazy<AccountLayout> =
    Lazy::new(|| AccountLayout::new(DEX_INSTANCE).pubkey("parent_dex", 0));

pub static COIN_STATE_LAYOUT: Lazy<AccountLayout> = Lazy::new(|| {
    AccountLayout::new("coin_state")
        .u64("index", 0)
        .u32("bump", 8)
        .pubkey("mint", 24)
        .pubkey("dex", 56)
        .pubkey("global", 88)
});

pub static VAULT_INFO_LAYOUT: Lazy<AccountLayout> =
    Lazy::new(|| AccountLayout::new("vault_info").pubkey("mint", 952).pubkey("instance", 1016));

/// Aquifer swap instruction account mapping:
/// 0: sysvar_instructions
/// 1: payer (writable, signer)
/// 2: token_program_base
/// 3: user_base_token
/// 4: base_mint
/// 5: token_program_quote
/// 6: user_quote_token
/// 7: quote_mint
/// 8: dex_global
/// 9: dex_instance
/// 10: coin_state_base
/// 11: coin_state_quote
/// 12: base_vault_pda
/// 13: base_vault_token
/// 14: quote_vault_pda
/// 15: quote_vault_token
pub static SWAP_TABLE: Lazy<OrderTable> = Lazy::new(|| {
    OrderTable::new("aquifer_swap")
        .fixed("sysvar_instructions", SYSVAR_INSTRUCTIONS_ID)
        .signer("payer", true)
        .extra("token_program_base", false)
        .extra("user_base_token", true)
        .extra("base_mint", false)
        .extra("token_program_quote", false)
        .extra("user_quote_token", true)
        .extra("quote_mint", false)
        .account("dex_global", true, DEX_GLOBAL)
        .account("dex_instance", true, DEX_INSTANCE)
        .account("coin_state_base", true, "coin_state_base")
        .account("coin_state_quote", true, "coin_state_quote")
        .account("base_vault_pda", true, "vault_info_base")
        .extra("base_vault_token", true)
        .account("quote_vault_pda", true, "vault_info_quote")
        .extra("quote_vault_token", true)
});

/// 一次 Aquifer swap 的输入：dex 与实例地址无法从单个池子账户推出，必须由调用方给出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AquiferMarket {
    pub dex: Pubkey,
    pub instance: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
}

pub fn decode_dex(account: &AccountData) -> Result<DecodedAccount> {
    expect_owner(account, &PROGRAM_ID)?;
    decode_account(&DEX_GLOBAL_LAYOUT, account)
}

/// 解码实例并校验其父指针指向 `dex`
pub fn decode_instance(account: &AccountData, dex: &Pubkey) -> Result<DecodedAccount> {
    expect_owner(account, &PROGRAM_ID)?;
    let instance = decode_account(&DEX_INSTANCE_LAYOUT, account)?;
    validate_back_pointer(&instance, "parent_dex", dex)?;
    Ok(instance)
}

pub fn decode_coin_state(account: &AccountData, dex: &Pubkey, label: &str) -> Result<DecodedAccount> {
    expect_owner(account, &FAST_PROGRAM_ID)?;
    let coin = decode_account(&COIN_STATE_LAYOUT, account)?.labeled(label);
    validate_back_pointer(&coin, "dex", dex)?;
    Ok(coin)
}

pub fn decode_vault_info(account: &AccountData, instance: &Pubkey, label: &str) -> Result<DecodedAccount> {
    expect_owner(account, &PROGRAM_ID)?;
    let info = decode_account(&VAULT_INFO_LAYOUT, account)?.labeled(label);
    validate_back_pointer(&info, "instance", instance)?;
    Ok(info)
}

/// 在 `program` 下找第一个大小为 `size`、父字段与 mint 字段都匹配的账户
async fn find_child<S: AccountSource + ?Sized>(
    source: &S,
    program: &Pubkey,
    size: u64,
    (parent_offset, parent): (usize, &Pubkey),
    (mint_offset, mint): (usize, &Pubkey),
    role: &str,
) -> Result<AccountData> {
    let filters = [
        ProgramAccountsFilter::DataSize(size),
        ProgramAccountsFilter::memcmp_pubkey(parent_offset, parent),
        ProgramAccountsFilter::memcmp_pubkey(mint_offset, mint),
    ];
    let found = source.get_program_accounts(program, &filters).await?;
    debug!("{}: {} candidates under {}", role, found.len(), program);
    found.into_iter().next().ok_or_else(|| ReverserError::unresolved(role))
}

pub async fn resolve_swap_accounts<S: AccountSource + ?Sized>(
    source: &S,
    market: &AquiferMarket,
    user: &SwapUser,
) -> Result<SwapAccounts> {
    let AquiferMarket { dex, instance, base_mint, quote_mint } = market;

    let fetched = source.get_accounts(&[*dex, *instance]).await?;
    let mut fetched = fetched.into_iter();
    let dex_account = fetched.next().flatten().ok_or(ReverserError::AccountNotFound(*dex))?;
    let instance_account = fetched.next().flatten().ok_or(ReverserError::AccountNotFound(*instance))?;
    let dex_global = decode_dex(&dex_account)?;
    let dex_instance = decode_instance(&instance_account, dex)?;

    let (coin_base, coin_quote, info_base, info_quote) = futures::try_join!(
        find_child(source, &FAST_PROGRAM_ID, COIN_STATE_SIZE, (56, dex), (24, base_mint), "coin_state_base"),
        find_child(source, &FAST_PROGRAM_ID, COIN_STATE_SIZE, (56, dex), (24, quote_mint), "coin_state_quote"),
        find_child(source, &PROGRAM_ID, VAULT_INFO_SIZE, (1016, instance), (952, base_mint), "base_vault_pda"),
        find_child(source, &PROGRAM_ID, VAULT_INFO_SIZE, (1016, instance), (952, quote_mint), "quote_vault_pda"),
    )?;
    let coin_base = decode_coin_state(&coin_base, dex, "coin_state_base")?;
    let coin_quote = decode_coin_state(&coin_quote, dex, "coin_state_quote")?;
    let info_base = decode_vault_info(&info_base, instance, "vault_info_base")?;
    let info_quote = decode_vault_info(&info_quote, instance, "vault_info_quote")?;

    let (base, quote, base_vault, quote_vault) = futures::try_join!(
        load_mint(source, base_mint),
        load_mint(source, quote_mint),
        largest_vault(source, &info_base.address, base_mint, "base_vault_token"),
        largest_vault(source, &info_quote.address, quote_mint, "quote_vault_token"),
    )?;

    let mut extras = Extras::new();
    extras.insert("payer".to_string(), user.authority_address());
    extras.insert("token_program_base".to_string(), ResolvedAddress::Key(base.token_program));
    extras.insert("user_base_token".to_string(), user.base_token_address(base_mint, &base.token_program)?);
    extras.insert("base_mint".to_string(), ResolvedAddress::Key(*base_mint));
    extras.insert("token_program_quote".to_string(), ResolvedAddress::Key(quote.token_program));
    extras.insert("user_quote_token".to_string(), user.quote_token_address(quote_mint, &quote.token_program)?);
    extras.insert("quote_mint".to_string(), ResolvedAddress::Key(*quote_mint));
    extras.insert("base_vault_token".to_string(), ResolvedAddress::Key(base_vault.address));
    extras.insert("quote_vault_token".to_string(), ResolvedAddress::Key(quote_vault.address));

    let decoded = vec![dex_global, dex_instance, coin_base, coin_quote, info_base, info_quote];
    SwapAccounts::assemble(Protocol::Aquifer, *instance, decoded, &extras, &SWAP_TABLE)
}
