//! 交叉引用校验
//!
//! 账户里存储的身份引用（子账户指回父账户、账户自身记录的 bump）必须与独立重算的值一致。
//! 不一致是终止性错误：要么数据被篡改，要么假设的偏移是错的。

use super::error::{ReverserError, Result};
use super::pda::{derive_address, ProgramDerivedAddress};
use crate::accounts::layout::DecodedAccount;
use log::warn;
use solana_sdk::pubkey::Pubkey;

/// `claim`（账户中存储的值）必须等于 `recomputed`（独立算出的值）
pub fn validate_link(claim: &Pubkey, recomputed: &Pubkey, context: &str) -> Result<()> {
    if claim == recomputed {
        return Ok(());
    }
    warn!("integrity mismatch ({}): claim={} recomputed={}", context, claim, recomputed);
    Err(ReverserError::mismatch(context, claim, recomputed))
}

pub fn validate_bump(stored: u8, derived: u8, context: &str) -> Result<()> {
    if stored == derived {
        return Ok(());
    }
    warn!("bump mismatch ({}): stored={} derived={}", context, stored, derived);
    Err(ReverserError::mismatch(context, format!("bump {stored}"), format!("bump {derived}")))
}

/// 父指针校验：`child` 的 `field` 字段必须指向 `parent`
pub fn validate_back_pointer(child: &DecodedAccount, field: &str, parent: &Pubkey) -> Result<()> {
    let claim = child.pubkey(field)?;
    validate_link(&claim, parent, &format!("{}.{} -> {}", child.layout, field, parent))
}

/// 自洽校验：用 `seeds` 重算 PDA，地址必须等于账户自身地址；
/// 给出 `stored_bump` 时推导出的 bump 也必须相等
pub fn validate_self_pda(
    account: &DecodedAccount,
    seeds: &[&[u8]],
    program_id: &Pubkey,
    stored_bump: Option<u8>,
) -> Result<ProgramDerivedAddress> {
    let pda = ProgramDerivedAddress::find(seeds, program_id)?;
    let context = format!("{} self pda", account.layout);
    validate_link(&account.address, &pda.address, &context)?;
    if let Some(stored) = stored_bump {
        validate_bump(stored, pda.bump, &context)?;
    }
    Ok(pda)
}

/// 推导 PDA 并与某个声明值比对，返回 (地址, bump)
pub fn validate_derived(
    claim: &Pubkey,
    seeds: &[&[u8]],
    program_id: &Pubkey,
    context: &str,
) -> Result<(Pubkey, u8)> {
    let (address, bump) = derive_address(seeds, program_id)?;
    validate_link(claim, &address, context)?;
    Ok((address, bump))
}
