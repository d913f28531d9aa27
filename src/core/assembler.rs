//! Swap 账户列表组装
//!
//! 顺序表（`OrderTable`）由目标程序的指令 ABI 决定；组装器只负责逐槽位填值，
//! 不改变顺序、不省略任何角色。任何一个角色无法解析即整体失败。

use super::base58::serde_pubkey;
use super::error::{ReverserError, Result};
use crate::accounts::layout::DecodedAccount;
use serde::{Deserialize, Serialize};
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::fmt;

/// 槽位地址的来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleSource {
    /// 已解码账户自身的地址
    Account { account: String },
    /// 已解码账户中的某个 pubkey 字段
    Field { account: String, field: String },
    /// 由解析器额外提供（推导出的 PDA / ATA、调用方传入的账户、占位符），按角色名查找
    Extra,
    /// 固定地址：程序、sysvar
    Fixed {
        #[serde(with = "serde_pubkey")]
        address: Pubkey,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSlot {
    pub role: String,
    pub is_writable: bool,
    pub is_signer: bool,
    pub source: RoleSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTable {
    pub name: String,
    pub slots: Vec<AccountSlot>,
}

impl OrderTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), slots: Vec::new() }
    }

    pub fn slot(mut self, role: &str, is_writable: bool, is_signer: bool, source: RoleSource) -> Self {
        self.slots.push(AccountSlot { role: role.to_string(), is_writable, is_signer, source });
        self
    }

    pub fn account(self, role: &str, is_writable: bool, account: &str) -> Self {
        self.slot(role, is_writable, false, RoleSource::Account { account: account.to_string() })
    }

    pub fn field(self, role: &str, is_writable: bool, account: &str, field: &str) -> Self {
        self.slot(
            role,
            is_writable,
            false,
            RoleSource::Field { account: account.to_string(), field: field.to_string() },
        )
    }

    pub fn extra(self, role: &str, is_writable: bool) -> Self {
        self.slot(role, is_writable, false, RoleSource::Extra)
    }

    pub fn signer(self, role: &str, is_writable: bool) -> Self {
        self.slot(role, is_writable, true, RoleSource::Extra)
    }

    pub fn fixed(self, role: &str, address: Pubkey) -> Self {
        self.slot(role, false, false, RoleSource::Fixed { address })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.role.as_str())
    }
}

/// 槽位最终的地址：真实公钥，或在没有用户公钥时的显式占位符（如 `<user-authority>`）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedAddress {
    Key(Pubkey),
    Placeholder(String),
}

impl ResolvedAddress {
    pub fn placeholder(name: &str) -> Self {
        ResolvedAddress::Placeholder(format!("<{}>", name))
    }

    pub fn pubkey(&self) -> Option<Pubkey> {
        match self {
            ResolvedAddress::Key(k) => Some(*k),
            ResolvedAddress::Placeholder(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ResolvedAddress::Placeholder(_))
    }
}

impl From<Pubkey> for ResolvedAddress {
    fn from(key: Pubkey) -> Self {
        ResolvedAddress::Key(key)
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedAddress::Key(k) => write!(f, "{}", k),
            ResolvedAddress::Placeholder(p) => f.write_str(p),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapAccountEntry {
    pub role: String,
    pub address: ResolvedAddress,
    pub is_writable: bool,
    pub is_signer: bool,
}

impl fmt::Display for SwapAccountEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = match (self.is_writable, self.is_signer) {
            (true, true) => "ws",
            (true, false) => "w-",
            (false, true) => "-s",
            (false, false) => "--",
        };
        write!(f, "{:<28} {} {}", self.role, flags, self.address)
    }
}

/// 解析器额外提供的角色 → 地址
pub type Extras = HashMap<String, ResolvedAddress>;

fn resolve_slot(
    slot: &AccountSlot,
    decoded: &[DecodedAccount],
    extras: &Extras,
) -> Result<ResolvedAddress> {
    let find = |label: &str| decoded.iter().find(|d| d.label == label);
    let resolved = match &slot.source {
        RoleSource::Account { account } => find(account).map(|d| ResolvedAddress::Key(d.address)),
        RoleSource::Field { account, field } => find(account)
            .and_then(|d| d.pubkey(field).ok())
            .map(ResolvedAddress::Key),
        RoleSource::Extra => extras.get(&slot.role).cloned(),
        RoleSource::Fixed { address } => Some(ResolvedAddress::Key(*address)),
    };
    resolved.ok_or_else(|| ReverserError::unresolved(slot.role.as_str()))
}

/// 按顺序表逐槽位填值，保持声明顺序与可写/签名标志
pub fn assemble(
    decoded: &[DecodedAccount],
    extras: &Extras,
    table: &OrderTable,
) -> Result<Vec<SwapAccountEntry>> {
    table
        .slots
        .iter()
        .map(|slot| {
            Ok(SwapAccountEntry {
                role: slot.role.clone(),
                address: resolve_slot(slot, decoded, extras)?,
                is_writable: slot.is_writable,
                is_signer: slot.is_signer,
            })
        })
        .collect()
}

/// 转成指令可用的 `AccountMeta`；仍含占位符的列表不能用于构造交易
pub fn to_account_metas(entries: &[SwapAccountEntry]) -> Result<Vec<AccountMeta>> {
    entries
        .iter()
        .map(|e| {
            let key = e.address.pubkey().ok_or_else(|| ReverserError::unresolved(e.role.as_str()))?;
            Ok(if e.is_writable {
                AccountMeta::new(key, e.is_signer)
            } else {
                AccountMeta::new_readonly(key, e.is_signer)
            })
        })
        .collect()
}
