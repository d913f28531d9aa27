//! 账户数据解析：定长偏移布局、SPL Token 账户、边界检查读取

pub mod layout;
pub mod token;
pub mod utils;

pub use layout::{
    decode_account, read_field, AccountLayout, DecodedAccount, DecodedValue, FieldKind, FieldSpec,
};
pub use token::{parse_mint, parse_token_account, select_vault, AccountData, MintInfo, TokenAccountInfo};
pub use utils::*;
