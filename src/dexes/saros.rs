//! Saros AMM（SPL token-swap 布局）
//!
//! 池子账户自带 bump，authority = PDA([swap_state])，推导出的 bump 必须与存储值一致。

use super::common::{expect_owner, require_token_program, SwapDirection, SwapUser};
use super::{Protocol, SwapAccounts};
use crate::accounts::layout::{decode_account, AccountLayout, DecodedAccount};
use crate::accounts::token::AccountData;
use crate::core::assembler::{Extras, OrderTable, ResolvedAddress};
use crate::core::error::{ReverserError, Result};
use crate::core::pda::derive_address;
use crate::core::validator::validate_bump;
use crate::rpc::AccountSource;
use once_cell::sync::Lazy;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

pub const PROGRAM_ID: Pubkey = pubkey!("SSwapUtytfBdBn1b9NUGG6foMVPtcWgpRU32HToDUZr");

pub const SWAP_STATE: &str = "swap_state";

pub static SWAP_STATE_LAYOUT: Lazy<AccountLayout> = Lazy::new(|| {
    AccountLayout::new(SWAP_STATE)
        .u8("version", 0)
        .u8("is_initialized", 1)
        .u8("bump_seed", 2)
        .pubkey("token_program", 0x03)
        .pubkey("token_a", 0x23)
        .pubkey("token_b", 0x43)
        .pubkey("pool_mint", 0x63)
        .pubkey("token_a_mint", 0x83)
        .pubkey("token_b_mint", 0xA3)
        .pubkey("fee_account", 0xC3)
        .u64("trade_fee_numerator", 0xE3)
        .u64("trade_fee_denominator", 0xEB)
        .u64("owner_trade_fee_numerator", 0xF3)
        .u64("owner_trade_fee_denominator", 0xFB)
        .u64("owner_withdraw_fee_numerator", 0x103)
        .u64("owner_withdraw_fee_denominator", 0x10B)
        .u64("host_fee_numerator", 0x113)
        .u64("host_fee_denominator", 0x11B)
        .u8("curve_type", 0x123)
        .bytes("curve_parameters", 0x124, 32)
});

/// Saros swap instruction account mapping:
/// 0: swap_state
/// 1: authority
/// 2: user_transfer_authority (signer)
/// 3: user_source
/// 4: pool_source
/// 5: pool_destination
/// 6: user_destination
/// 7: pool_mint
/// 8: fee_account
/// 9: token_program
fn swap_table(name: &str, pool_source: &str, pool_destination: &str) -> OrderTable {
    OrderTable::new(name)
        .account("swap_state", true, SWAP_STATE)
        .extra("authority", false)
        .signer("user_transfer_authority", false)
        .extra("user_source", true)
        .field("pool_source", true, SWAP_STATE, pool_source)
        .field("pool_destination", true, SWAP_STATE, pool_destination)
        .extra("user_destination", true)
        .field("pool_mint", true, SWAP_STATE, "pool_mint")
        .field("fee_account", true, SWAP_STATE, "fee_account")
        .field("token_program", false, SWAP_STATE, "token_program")
}

pub static SWAP_A_TO_B: Lazy<OrderTable> = Lazy::new(|| swap_table("saros_swap_a2b", "token_a", "token_b"));
pub static SWAP_B_TO_A: Lazy<OrderTable> = Lazy::new(|| swap_table("saros_swap_b2a", "token_b", "token_a"));

pub fn order_table(direction: SwapDirection) -> &'static OrderTable {
    match direction {
        SwapDirection::BaseToQuote => &SWAP_A_TO_B,
        SwapDirection::QuoteToBase => &SWAP_B_TO_A,
    }
}

#[derive(Debug, Clone)]
pub struct SarosPool {
    pub swap_state: DecodedAccount,
    pub authority: Pubkey,
    pub bump: u8,
}

/// 解码池子并校验：已初始化、token program 合法、authority bump 自洽
pub fn decode_pool(account: &AccountData) -> Result<SarosPool> {
    expect_owner(account, &PROGRAM_ID)?;
    let swap_state = decode_account(&SWAP_STATE_LAYOUT, account)?;

    if swap_state.u64("is_initialized")? == 0 {
        return Err(ReverserError::unexpected(account.pubkey, "swap state is not initialized"));
    }
    require_token_program(swap_state.pubkey("token_program")?, "token_program")?;

    let (authority, bump) = derive_address(&[account.pubkey.as_ref()], &PROGRAM_ID)?;
    let stored = swap_state.u64("bump_seed")? as u8;
    validate_bump(stored, bump, &format!("{} authority", account.pubkey))?;

    Ok(SarosPool { swap_state, authority, bump })
}

pub fn resolve_with_account(
    account: AccountData,
    user: &SwapUser,
    direction: SwapDirection,
) -> Result<SwapAccounts> {
    let pool = decode_pool(&account)?;
    let state = &pool.swap_state;
    let token_program = state.pubkey("token_program")?;
    let user_a = user.base_token_address(&state.pubkey("token_a_mint")?, &token_program)?;
    let user_b = user.quote_token_address(&state.pubkey("token_b_mint")?, &token_program)?;
    let (user_source, user_destination) = match direction {
        SwapDirection::BaseToQuote => (user_a, user_b),
        SwapDirection::QuoteToBase => (user_b, user_a),
    };

    let mut extras = Extras::new();
    extras.insert("authority".to_string(), ResolvedAddress::Key(pool.authority));
    extras.insert("user_transfer_authority".to_string(), user.authority_address());
    extras.insert("user_source".to_string(), user_source);
    extras.insert("user_destination".to_string(), user_destination);

    SwapAccounts::assemble(
        Protocol::Saros,
        account.pubkey,
        vec![pool.swap_state],
        &extras,
        order_table(direction),
    )
}

pub async fn resolve_swap_accounts<S: AccountSource + ?Sized>(
    source: &S,
    pool: &Pubkey,
    user: &SwapUser,
    direction: SwapDirection,
) -> Result<SwapAccounts> {
    let account = source.get_account(pool).await?;
    resolve_with_account(account, user, direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ata::{derive_associated_token_address, TOKEN_PROGRAM_ID};
    use crate::rpc::InMemoryAccountSource;

    struct Fixture {
        pool: Pubkey,
        token_a: Pubkey,
        token_b: Pubkey,
        mint_a: Pubkey,
        mint_b: Pubkey,
        data: Vec<u8>,
    }

    fn fixture() -> Fixture {
        let pool = Pubkey::new_unique();
        let (_, bump) = derive_address(&[pool.as_ref()], &PROGRAM_ID).unwrap();
        let token_a = Pubkey::new_unique();
        let token_b = Pubkey::new_unique();
        let mint_a = Pubkey::new_unique();
        let mint_b = Pubkey::new_unique();

        let mut data = vec![0u8; 0x144];
        data[0] = 1;
        data[1] = 1;
        data[2] = bump;
        data[0x03..0x23].copy_from_slice(TOKEN_PROGRAM_ID.as_ref());
        data[0x23..0x43].copy_from_slice(token_a.as_ref());
        data[0x43..0x63].copy_from_slice(token_b.as_ref());
        data[0x63..0x83].copy_from_slice(Pubkey::new_from_array([3u8; 32]).as_ref());
        data[0x83..0xA3].copy_from_slice(mint_a.as_ref());
        data[0xA3..0xC3].copy_from_slice(mint_b.as_ref());
        data[0xC3..0xE3].copy_from_slice(Pubkey::new_from_array([4u8; 32]).as_ref());
        data[0xE3..0xEB].copy_from_slice(&25u64.to_le_bytes());
        data[0xEB..0xF3].copy_from_slice(&10_000u64.to_le_bytes());

        Fixture { pool, token_a, token_b, mint_a, mint_b, data }
    }

    #[test]
    fn test_decode_pool() {
        let f = fixture();
        let pool = decode_pool(&AccountData::new(f.pool, PROGRAM_ID, f.data)).unwrap();
        assert_eq!(pool.swap_state.u64("trade_fee_numerator").unwrap(), 25);
        assert_eq!(pool.swap_state.pubkey("token_a").unwrap(), f.token_a);
        assert_eq!(pool.authority, derive_address(&[f.pool.as_ref()], &PROGRAM_ID).unwrap().0);
        assert_eq!(SWAP_STATE_LAYOUT.required_len().unwrap(), 0x144);
    }

    #[tokio::test]
    async fn test_resolve_a_to_b() {
        let f = fixture();
        let user = Pubkey::new_unique();
        let source = InMemoryAccountSource::new().with_account(AccountData::new(f.pool, PROGRAM_ID, f.data));

        let swap = resolve_swap_accounts(&source, &f.pool, &SwapUser::new(user), SwapDirection::BaseToQuote)
            .await
            .unwrap();
        assert_eq!(swap.accounts.len(), 10);
        let roles: Vec<&str> = swap.accounts.iter().map(|e| e.role.as_str()).collect();
        assert_eq!(roles, SWAP_A_TO_B.roles().collect::<Vec<_>>());

        let (user_a, _) = derive_associated_token_address(&user, &f.mint_a, &TOKEN_PROGRAM_ID).unwrap();
        let (user_b, _) = derive_associated_token_address(&user, &f.mint_b, &TOKEN_PROGRAM_ID).unwrap();
        assert_eq!(swap.address("swap_state"), Some(f.pool));
        assert_eq!(swap.address("user_source"), Some(user_a));
        assert_eq!(swap.address("user_destination"), Some(user_b));
        assert_eq!(swap.address("pool_source"), Some(f.token_a));
        assert_eq!(swap.address("pool_destination"), Some(f.token_b));
        assert_eq!(swap.address("token_program"), Some(TOKEN_PROGRAM_ID));

        let signer = swap.get("user_transfer_authority").unwrap();
        assert!(signer.is_signer && !signer.is_writable);
        assert!(!swap.get("authority").unwrap().is_writable);
        assert_eq!(swap.account_metas().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_resolve_b_to_a_anonymous() {
        let f = fixture();
        let source = InMemoryAccountSource::new().with_account(AccountData::new(f.pool, PROGRAM_ID, f.data));

        let swap = resolve_swap_accounts(&source, &f.pool, &SwapUser::anonymous(), SwapDirection::QuoteToBase)
            .await
            .unwrap();
        assert_eq!(swap.address("pool_source"), Some(f.token_b));
        assert_eq!(swap.address("pool_destination"), Some(f.token_a));
        assert_eq!(
            swap.get("user_source").unwrap().address,
            ResolvedAddress::Placeholder("<user-quote-token-account>".into())
        );
        assert!(swap.has_placeholders());
        assert!(swap.account_metas().is_err());
    }

    #[test]
    fn test_wrong_bump_rejected() {
        let mut f = fixture();
        f.data[2] = f.data[2].wrapping_sub(1);
        let err = decode_pool(&AccountData::new(f.pool, PROGRAM_ID, f.data)).unwrap_err();
        assert!(matches!(err, ReverserError::IntegrityMismatch { .. }));
    }

    #[test]
    fn test_uninitialized_and_truncated() {
        let mut f = fixture();
        f.data[1] = 0;
        assert!(matches!(
            decode_pool(&AccountData::new(f.pool, PROGRAM_ID, f.data.clone())),
            Err(ReverserError::UnexpectedAccount { .. })
        ));

        f.data.truncate(0x140);
        assert!(matches!(
            decode_pool(&AccountData::new(f.pool, PROGRAM_ID, f.data)),
            Err(ReverserError::TruncatedAccount { .. })
        ));
    }

    #[test]
    fn test_bad_token_program() {
        let mut f = fixture();
        f.data[0x03..0x23].copy_from_slice(Pubkey::new_unique().as_ref());
        let err = decode_pool(&AccountData::new(f.pool, PROGRAM_ID, f.data)).unwrap_err();
        assert!(matches!(err, ReverserError::UnresolvedRole { role } if role == "token_program"));
    }
}
