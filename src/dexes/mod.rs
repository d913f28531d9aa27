//! 各 DEX 的布局表、账户顺序表与解析器
//!
//! 每个协议只提供数据（偏移表、顺序表）和少量校验；解码、推导、组装都走通用引擎。

pub mod aquifer;
pub mod common;
pub mod goonfi;
pub mod humidifi;
pub mod obric_v2;
pub mod saros;
pub mod solfi_v2;
pub mod tessera_v;
pub mod zerofi;

use crate::accounts::layout::DecodedAccount;
use crate::core::assembler::{assemble, to_account_metas, Extras, OrderTable, SwapAccountEntry};
use crate::core::error::{ReverserError, Result};
use crate::rpc::AccountSource;
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;
use std::fmt;

pub use common::{SwapDirection, SwapUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Saros,
    HumidiFi,
    ZeroFi,
    SolFiV2,
    TesseraV,
    Aquifer,
    GoonFi,
    ObricV2,
}

impl Protocol {
    pub const ALL: [Protocol; 8] = [
        Protocol::Saros,
        Protocol::HumidiFi,
        Protocol::ZeroFi,
        Protocol::SolFiV2,
        Protocol::TesseraV,
        Protocol::Aquifer,
        Protocol::GoonFi,
        Protocol::ObricV2,
    ];

    pub fn program_id(&self) -> Pubkey {
        match self {
            Protocol::Saros => saros::PROGRAM_ID,
            Protocol::HumidiFi => humidifi::PROGRAM_ID,
            Protocol::ZeroFi => zerofi::PROGRAM_ID,
            Protocol::SolFiV2 => solfi_v2::PROGRAM_ID,
            Protocol::TesseraV => tessera_v::PROGRAM_ID,
            Protocol::Aquifer => aquifer::PROGRAM_ID,
            Protocol::GoonFi => goonfi::PROGRAM_ID,
            Protocol::ObricV2 => obric_v2::PROGRAM_ID,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Saros => "saros",
            Protocol::HumidiFi => "humidifi",
            Protocol::ZeroFi => "zerofi",
            Protocol::SolFiV2 => "solfi_v2",
            Protocol::TesseraV => "tessera_v",
            Protocol::Aquifer => "aquifer",
            Protocol::GoonFi => "goonfi",
            Protocol::ObricV2 => "obric_v2",
        }
    }

    pub fn from_program_id(program_id: &Pubkey) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.program_id() == *program_id)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一次解析的完整结果：有序账户列表 + 参与解析的已解码账户
#[derive(Debug, Clone)]
pub struct SwapAccounts {
    pub protocol: Protocol,
    pub pool: Pubkey,
    pub accounts: Vec<SwapAccountEntry>,
    pub decoded: Vec<DecodedAccount>,
}

impl SwapAccounts {
    pub(crate) fn assemble(
        protocol: Protocol,
        pool: Pubkey,
        decoded: Vec<DecodedAccount>,
        extras: &Extras,
        table: &OrderTable,
    ) -> Result<Self> {
        let accounts = assemble(&decoded, extras, table)?;
        Ok(Self { protocol, pool, accounts, decoded })
    }

    pub fn get(&self, role: &str) -> Option<&SwapAccountEntry> {
        self.accounts.iter().find(|e| e.role == role)
    }

    /// 按角色取真实地址（占位符返回 `None`）
    pub fn address(&self, role: &str) -> Option<Pubkey> {
        self.get(role).and_then(|e| e.address.pubkey())
    }

    pub fn has_placeholders(&self) -> bool {
        self.accounts.iter().any(|e| e.address.is_placeholder())
    }

    pub fn account_metas(&self) -> Result<Vec<AccountMeta>> {
        to_account_metas(&self.accounts)
    }
}

impl fmt::Display for SwapAccounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} swap accounts for {} ({}):", self.protocol, self.pool, self.protocol.program_id())?;
        for (index, entry) in self.accounts.iter().enumerate() {
            writeln!(f, "{:>3} {}", index, entry)?;
        }
        Ok(())
    }
}

/// 根据池子账户的 owner 识别协议并解析
///
/// Aquifer 需要额外的 mint 参数，请直接调用 `aquifer::resolve_swap_accounts`。
pub async fn resolve_swap_accounts<S: AccountSource + ?Sized>(
    source: &S,
    pool: &Pubkey,
    user: &SwapUser,
    direction: SwapDirection,
) -> Result<SwapAccounts> {
    let account = source.get_account(pool).await?;
    let protocol = Protocol::from_program_id(&account.owner).ok_or_else(|| {
        ReverserError::unexpected(*pool, format!("owner {} is not a supported dex", account.owner))
    })?;

    match protocol {
        Protocol::Saros => saros::resolve_with_account(account, user, direction),
        Protocol::HumidiFi => humidifi::resolve_with_account(source, account, user).await,
        Protocol::ZeroFi => zerofi::resolve_with_account(source, account, user, direction).await,
        Protocol::SolFiV2 => solfi_v2::resolve_with_account(source, account, user, direction).await,
        Protocol::TesseraV => tessera_v::resolve_with_account(source, account, user).await,
        Protocol::GoonFi => goonfi::resolve_with_account(source, account, user, None).await,
        Protocol::ObricV2 => {
            obric_v2::resolve_with_account(source, account, user, direction, obric_v2::ObricSwapOrder::Swap2).await
        }
        Protocol::Aquifer => Err(ReverserError::unexpected(
            *pool,
            "aquifer swaps need explicit base/quote mints",
        )),
    }
}
