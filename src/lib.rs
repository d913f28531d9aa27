// 核心模块 - 扁平化结构
pub mod accounts; // 账户布局解析
pub mod core;     // 推导 / 校验 / 组装引擎
pub mod dexes;    // 各协议的偏移表与顺序表
pub mod rpc;      // 账户拉取层

// 重新导出主要API
pub use core::{
    // 错误
    ReverserError, Result,
    // 推导
    derive_address, derive_associated_token_address, ProgramDerivedAddress,
    // 校验与组装
    validate_link, assemble, to_account_metas, OrderTable, ResolvedAddress, SwapAccountEntry,
    // 配置
    ReverserConfig,
};

pub use accounts::{decode_account, AccountData, AccountLayout, DecodedAccount};

// 导出解析入口
pub use dexes::{resolve_swap_accounts, Protocol, SwapAccounts, SwapDirection, SwapUser};

pub use rpc::{AccountSource, InMemoryAccountSource, RpcAccountSource};
