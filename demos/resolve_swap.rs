//! Resolve the swap account list of a DEX pool from live RPC
//!
//! The pool owner decides the protocol (Saros, HumidiFi, ZeroFi, SolFi V2, Tessera V, GoonFi, Obric V2).
//! Without a user key the user-side accounts are printed as placeholders.
//!
//! Usage:
//! ```bash
//! SOLANA_RPC_URL=https://api.mainnet-beta.solana.com \
//!     cargo run --example resolve_swap -- <POOL> [USER] [quote_to_base]
//! ```

use anyhow::{bail, Context};
use log::info;
use sol_dex_reverser::core::base58;
use sol_dex_reverser::{resolve_swap_accounts, ReverserConfig, RpcAccountSource, SwapDirection, SwapUser};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(pool) = args.next() else {
        bail!("usage: resolve_swap <POOL> [USER] [quote_to_base]");
    };
    let pool = base58::decode_pubkey(&pool).context("invalid pool address")?;
    let user = match args.next() {
        Some(user) => SwapUser::new(base58::decode_pubkey(&user).context("invalid user address")?),
        None => SwapUser::anonymous(),
    };
    let direction = match args.next().as_deref() {
        Some("quote_to_base") => SwapDirection::QuoteToBase,
        _ => SwapDirection::BaseToQuote,
    };

    // 连接到 Solana RPC
    let rpc_url = std::env::var("SOLANA_RPC_URL")
        .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_string());
    info!("Connecting to: {}", rpc_url);
    let source = RpcAccountSource::new(ReverserConfig::mainnet().with_rpc_url(rpc_url));

    let swap = resolve_swap_accounts(&source, &pool, &user, direction)
        .await
        .with_context(|| format!("failed to resolve swap accounts for {pool}"))?;

    println!("{swap}");
    if swap.has_placeholders() {
        println!("⚠ Placeholders present: pass a USER to derive the user-side token accounts.");
    } else {
        println!("✓ {} account metas ready", swap.account_metas()?.len());
    }
    Ok(())
}
