//! 逆向引擎核心模块
//!
//! 纯同步、无副作用的引擎：
//! - Base58 编解码与 Ed25519 曲线判定
//! - PDA / ATA 推导（bump 从 255 向下搜索）
//! - 交叉引用校验
//! - 按顺序表组装 swap 账户列表

pub mod assembler;
pub mod ata;
pub mod base58;
pub mod config;
pub mod curve;
pub mod error;
pub mod pda;
pub mod validator;

pub use assembler::{
    assemble, to_account_metas, AccountSlot, Extras, OrderTable, ResolvedAddress, RoleSource,
    SwapAccountEntry,
};
pub use ata::{derive_associated_token_address, is_token_program};
pub use config::{Commitment, ReverserConfig};
pub use curve::is_on_curve;
pub use error::{ReverserError, Result};
pub use pda::{create_program_address, derive_address, ProgramDerivedAddress};
pub use validator::{validate_back_pointer, validate_bump, validate_link, validate_self_pda};
