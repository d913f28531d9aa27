//! 账户拉取层
//!
//! - `AccountSource`：统一的拉取接口
//! - `RpcAccountSource`：solana-client 非阻塞 RPC，批量请求按 ≤100 分块
//! - `InMemoryAccountSource`：测试与离线回放

pub mod client;
pub mod memory;
pub mod source;

pub use client::RpcAccountSource;
pub use memory::InMemoryAccountSource;
pub use source::{fetch_each, fetch_required, AccountSource, ProgramAccountsFilter};
