//! Obric V2
//!
//! trading pair 在 discriminator 之后内嵌一串 32 字节对齐的地址，没有固定偏移表。
//! 对齐方式由连续出现两次的 price feed 确定；之后按每个地址所属的程序分类：
//! - token account → 金库（每个 mint 取余额最大者，按出现顺序取前两个为 x / y）
//! - Pyth 程序 → price feed
//! - 其余存在的账户 → reference / second / third oracle（按出现顺序）

use super::common::{expect_owner, SwapDirection, SwapUser};
use super::{Protocol, SwapAccounts};
use crate::accounts::layout::{decode_account, AccountLayout, DecodedAccount};
use crate::accounts::token::{parse_token_account, select_vault, AccountData, TokenAccountInfo};
use crate::accounts::utils::has_discriminator;
use crate::core::assembler::{Extras, OrderTable, ResolvedAddress};
use crate::core::ata::is_token_program;
use crate::core::error::{ReverserError, Result};
use crate::core::validator::validate_link;
use crate::rpc::AccountSource;
use log::debug;
use once_cell::sync::Lazy;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, HashSet};

pub const PROGRAM_ID: Pubkey = pubkey!("obriQD1zbpyLz95G5n7nJe6a4DPjpFwa5XYPoNm113y");

/// "account:SSTradingPair"
pub const TRADING_PAIR_DISCRIMINATOR: [u8; 8] = [0x3b, 0xde, 0x0f, 0xec, 0x62, 0x66, 0x5a, 0xe0];

/// price feed 账户的 owner（Pyth v2 及 Obric 默认引用的聚合器）
pub const PRICE_FEED_PROGRAMS: [Pubkey; 3] = [
    pubkey!("Fs2X9M7wrp7YjgJvDkXsp1p8Dd1zv9VHtV6nQWmvMRdq"),
    pubkey!("FsLevCLxwJhi3F7S3w7Dnk3a1JpN96CBrum1BgqsSVqP"),
    pubkey!("Minimox7jqQmMpF6Z34DTNwE9iJyNkruzvvYQRaHpAP"),
];

const SYSVAR_INSTRUCTIONS_ID: Pubkey = pubkey!("Sysvar1nstructions1111111111111111111111111");

pub const TRADING_PAIR: &str = "obric_v2_trading_pair";

pub static TRADING_PAIR_LAYOUT: Lazy<AccountLayout> =
    Lazy::new(|| AccountLayout::new(TRADING_PAIR).bytes("discriminator", 0, 8));

/// Obric V2 swap2 instruction account mapping:
/// 0: trading_pair
/// 1: second_reference_oracle
/// 2: third_reference_oracle
/// 3: reserve_x
/// 4: reserve_y
/// 5: user_source_token
/// 6: user_destination_token
/// 7: reference_oracle
/// 8: x_price_feed
/// 9: y_price_feed
/// 10: swap_authority
/// 11: token_program
pub static SWAP2_TABLE: Lazy<OrderTable> = Lazy::new(|| {
    OrderTable::new("obric_v2_swap2")
        .account("trading_pair", true, TRADING_PAIR)
        .extra("second_reference_oracle", false)
        .extra("third_reference_oracle", false)
        .extra("reserve_x", true)
        .extra("reserve_y", true)
        .extra("user_source_token", true)
        .extra("user_destination_token", true)
        .extra("reference_oracle", true)
        .extra("x_price_feed", false)
        .extra("y_price_feed", false)
        .extra("swap_authority", false)
        .extra("token_program", false)
});

/// 旧版 swap 指令：
/// 0: trading_pair
/// 1: mint_x (pool share)
/// 2: mint_y (pool share)
/// 3: reserve_x
/// 4: reserve_y
/// 5: user_token_account_x
/// 6: user_token_account_y
/// 7: protocol_fee
/// 8: x_price_feed
/// 9: y_price_feed
/// 10: user_authority (writable, signer)
/// 11: token_program
pub static SWAP_TABLE: Lazy<OrderTable> = Lazy::new(|| {
    OrderTable::new("obric_v2_swap")
        .account("trading_pair", true, TRADING_PAIR)
        .extra("mint_x", false)
        .extra("mint_y", false)
        .extra("reserve_x", true)
        .extra("reserve_y", true)
        .extra("user_token_account_x", true)
        .extra("user_token_account_y", true)
        .extra("protocol_fee", true)
        .extra("x_price_feed", true)
        .extra("y_price_feed", true)
        .signer("user_authority", true)
        .extra("token_program", false)
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObricSwapOrder {
    Swap,
    #[default]
    Swap2,
}

impl ObricSwapOrder {
    pub fn table(&self) -> &'static OrderTable {
        match self {
            ObricSwapOrder::Swap => &SWAP_TABLE,
            ObricSwapOrder::Swap2 => &SWAP2_TABLE,
        }
    }
}

/// 从 trading pair 中解出的全部角色
#[derive(Debug, Clone)]
pub struct ObricPair {
    pub pair: DecodedAccount,
    pub mint_x: Pubkey,
    pub mint_y: Pubkey,
    pub reserve_x: Pubkey,
    pub reserve_y: Pubkey,
    /// 两侧金库共同的 authority
    pub swap_authority: Pubkey,
    pub token_program: Pubkey,
    pub x_price_feed: Pubkey,
    pub y_price_feed: Pubkey,
    pub reference_oracle: Pubkey,
    pub second_reference_oracle: Pubkey,
    pub third_reference_oracle: Pubkey,
    /// 旧版 swap 使用的 pool share mint，找不到时回落为对应的底层 mint
    pub lp_mint_x: Pubkey,
    pub lp_mint_y: Pubkey,
}

/// 找到第一段非零且紧接着重复一次的 32 字节，返回其在 body 中的对齐偏移（0..32）
pub fn find_key_alignment(body: &[u8]) -> Option<usize> {
    let last = body.len().checked_sub(64)?;
    (0..=last)
        .find(|&idx| {
            let head = &body[idx..idx + 32];
            head.iter().any(|b| *b != 0) && head == &body[idx + 32..idx + 64]
        })
        .map(|idx| idx % 32)
}

/// 校验 discriminator 并按对齐偏移切出内嵌地址（保持出现顺序，含重复）
pub fn embedded_keys(account: &AccountData) -> Result<Vec<Pubkey>> {
    if !has_discriminator(&account.data, &TRADING_PAIR_DISCRIMINATOR) {
        return Err(ReverserError::unexpected(account.pubkey, "not an SSTradingPair account"));
    }
    let body = &account.data[TRADING_PAIR_DISCRIMINATOR.len()..];
    let offset = find_key_alignment(body)
        .ok_or_else(|| ReverserError::unexpected(account.pubkey, "no repeated price feed to align embedded keys"))?;
    Ok(body[offset..]
        .chunks_exact(32)
        .filter_map(|chunk| <[u8; 32]>::try_from(chunk).ok())
        .map(Pubkey::new_from_array)
        .collect())
}

/// 去重后的候选地址（保持首次出现顺序），排除空地址与 sysvar
fn candidates(keys: &[Pubkey], pair: &Pubkey) -> Vec<Pubkey> {
    let mut seen = HashSet::new();
    keys.iter()
        .copied()
        .filter(|k| *k != Pubkey::default() && *k != SYSVAR_INSTRUCTIONS_ID && k != pair)
        .filter(|k| seen.insert(*k))
        .collect()
}

fn pick_reserves(tokens: &[TokenAccountInfo]) -> Result<(TokenAccountInfo, TokenAccountInfo)> {
    let mut mints: Vec<Pubkey> = Vec::new();
    for t in tokens {
        if !mints.contains(&t.mint) {
            mints.push(t.mint);
        }
    }
    let position = |key: &Pubkey| tokens.iter().position(|t| t.address == *key);
    let mut chosen = mints
        .iter()
        .map(|mint| select_vault(tokens, mint, "reserve"))
        .collect::<Result<Vec<_>>>()?;
    chosen.sort_by_key(position);

    let mut reserves = chosen.iter().filter_map(|key| tokens.iter().find(|t| t.address == *key));
    let x = reserves.next().cloned().ok_or_else(|| ReverserError::unresolved("reserve_x"))?;
    let y = reserves.next().cloned().ok_or_else(|| ReverserError::unresolved("reserve_y"))?;
    Ok((x, y))
}

/// 分类内嵌地址；`fetched` 是这些地址对应的链上账户（不存在的地址不在表中）
pub fn classify(
    account: &AccountData,
    keys: &[Pubkey],
    fetched: &HashMap<Pubkey, AccountData>,
) -> Result<ObricPair> {
    expect_owner(account, &PROGRAM_ID)?;
    let pair = decode_account(&TRADING_PAIR_LAYOUT, account)?;
    let ordered = candidates(keys, &account.pubkey);
    let owner_of = |key: &Pubkey| fetched.get(key).map(|a| a.owner);

    let tokens: Vec<TokenAccountInfo> = ordered
        .iter()
        .filter_map(|k| fetched.get(k))
        .filter(|a| is_token_program(&a.owner))
        .filter_map(|a| parse_token_account(a).ok())
        .collect();
    let (reserve_x, reserve_y) = pick_reserves(&tokens)?;

    let token_program = reserve_x.token_program;
    validate_link(&reserve_y.token_program, &token_program, "obric_v2 reserve_y.token_program")?;
    let swap_authority = reserve_x.owner;
    validate_link(&reserve_y.owner, &swap_authority, "obric_v2 reserve_y.owner")?;

    let mut assigned: HashSet<Pubkey> =
        [reserve_x.address, reserve_y.address, reserve_x.mint, reserve_y.mint, token_program].into();

    let feeds: Vec<Pubkey> = ordered
        .iter()
        .copied()
        .filter(|k| !assigned.contains(k))
        .filter(|k| owner_of(k).is_some_and(|o| PRICE_FEED_PROGRAMS.contains(&o)))
        .collect();
    let x_price_feed = *feeds.first().ok_or_else(|| ReverserError::unresolved("x_price_feed"))?;
    let y_price_feed = feeds.get(1).copied().unwrap_or(x_price_feed);
    assigned.extend([x_price_feed, y_price_feed]);

    let oracles: Vec<Pubkey> = ordered
        .iter()
        .copied()
        .filter(|k| !assigned.contains(k))
        .filter(|k| {
            owner_of(k).is_some_and(|o| {
                o != PROGRAM_ID && !is_token_program(&o) && !PRICE_FEED_PROGRAMS.contains(&o)
            })
        })
        .take(3)
        .collect();
    let oracle = |i: usize, role: &str| oracles.get(i).copied().ok_or_else(|| ReverserError::unresolved(role));
    let reference_oracle = oracle(0, "reference_oracle")?;
    let second_reference_oracle = oracle(1, "second_reference_oracle")?;
    let third_reference_oracle = oracle(2, "third_reference_oracle")?;
    assigned.extend(oracles.iter().copied());

    let lp_mint_x = ordered
        .iter()
        .copied()
        .find(|k| owner_of(k) == Some(PROGRAM_ID))
        .unwrap_or(reserve_x.mint);
    assigned.insert(lp_mint_x);

    // 紧挨在重复的 x price feed 之前的地址
    let lp_mint_y = keys
        .windows(3)
        .find(|w| {
            w[1] == x_price_feed
                && w[2] == x_price_feed
                && w[0] != Pubkey::default()
                && !assigned.contains(&w[0])
        })
        .map(|w| w[0])
        .unwrap_or(reserve_y.mint);

    debug!(
        "obric_v2 pair {}: reserves {}/{}, feeds {}/{}, oracle {}",
        account.pubkey, reserve_x.address, reserve_y.address, x_price_feed, y_price_feed, reference_oracle
    );

    Ok(ObricPair {
        pair,
        mint_x: reserve_x.mint,
        mint_y: reserve_y.mint,
        reserve_x: reserve_x.address,
        reserve_y: reserve_y.address,
        swap_authority,
        token_program,
        x_price_feed,
        y_price_feed,
        reference_oracle,
        second_reference_oracle,
        third_reference_oracle,
        lp_mint_x,
        lp_mint_y,
    })
}

/// 拉取内嵌地址对应的账户并分类
pub async fn load_pair<S: AccountSource + ?Sized>(source: &S, account: &AccountData) -> Result<ObricPair> {
    let keys = embedded_keys(account)?;
    let distinct = candidates(&keys, &account.pubkey);
    let fetched: HashMap<Pubkey, AccountData> = source
        .get_accounts(&distinct)
        .await?
        .into_iter()
        .flatten()
        .map(|a| (a.pubkey, a))
        .collect();
    classify(account, &keys, &fetched)
}

pub(crate) async fn resolve_with_account<S: AccountSource + ?Sized>(
    source: &S,
    account: AccountData,
    user: &SwapUser,
    direction: SwapDirection,
    order: ObricSwapOrder,
) -> Result<SwapAccounts> {
    let obric = load_pair(source, &account).await?;

    // x 视为 base，y 视为 quote
    let user_x = user.base_token_address(&obric.mint_x, &obric.token_program)?;
    let user_y = user.quote_token_address(&obric.mint_y, &obric.token_program)?;
    let (user_source, user_destination) = match direction {
        SwapDirection::BaseToQuote => (user_x.clone(), user_y.clone()),
        SwapDirection::QuoteToBase => (user_y.clone(), user_x.clone()),
    };

    let mut extras = Extras::new();
    for (role, key) in [
        ("mint_x", obric.lp_mint_x),
        ("mint_y", obric.lp_mint_y),
        ("reserve_x", obric.reserve_x),
        ("reserve_y", obric.reserve_y),
        ("protocol_fee", obric.x_price_feed),
        ("x_price_feed", obric.x_price_feed),
        ("y_price_feed", obric.y_price_feed),
        ("reference_oracle", obric.reference_oracle),
        ("second_reference_oracle", obric.second_reference_oracle),
        ("third_reference_oracle", obric.third_reference_oracle),
        ("swap_authority", obric.swap_authority),
        ("token_program", obric.token_program),
    ] {
        extras.insert(role.to_string(), ResolvedAddress::Key(key));
    }
    extras.insert("user_source_token".to_string(), user_source);
    extras.insert("user_destination_token".to_string(), user_destination);
    extras.insert("user_token_account_x".to_string(), user_x);
    extras.insert("user_token_account_y".to_string(), user_y);
    extras.insert("user_authority".to_string(), user.authority_address());

    SwapAccounts::assemble(Protocol::ObricV2, account.pubkey, vec![obric.pair], &extras, order.table())
}

pub async fn resolve_swap_accounts<S: AccountSource + ?Sized>(
    source: &S,
    pair: &Pubkey,
    user: &SwapUser,
    direction: SwapDirection,
    order: ObricSwapOrder,
) -> Result<SwapAccounts> {
    let account = source.get_account(pair).await?;
    resolve_with_account(source, account, user, direction, order).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::token::tests::{mint_bytes, token_account_bytes};
    use crate::core::ata::{derive_associated_token_address, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};
    use crate::rpc::InMemoryAccountSource;

    struct Fixture {
        pair: Pubkey,
        authority: Pubkey,
        lp_mint_x: Pubkey,
        reserve_x: Pubkey,
        reserve_y: Pubkey,
        dust_x: Pubkey,
        mint_x: Pubkey,
        mint_y: Pubkey,
        oracles: [Pubkey; 3],
        lp_mint_y: Pubkey,
        x_feed: Pubkey,
        y_feed: Pubkey,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                pair: Pubkey::new_unique(),
                authority: Pubkey::new_unique(),
                lp_mint_x: Pubkey::new_unique(),
                reserve_x: Pubkey::new_unique(),
                reserve_y: Pubkey::new_unique(),
                dust_x: Pubkey::new_unique(),
                mint_x: Pubkey::new_unique(),
                mint_y: Pubkey::new_unique(),
                oracles: [Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique()],
                lp_mint_y: Pubkey::new_unique(),
                x_feed: Pubkey::new_unique(),
                y_feed: Pubkey::new_unique(),
            }
        }

        fn keys(&self) -> Vec<Pubkey> {
            vec![
                self.lp_mint_x,
                self.reserve_x,
                self.reserve_y,
                self.mint_x,
                self.mint_y,
                self.oracles[0],
                self.oracles[1],
                self.oracles[2],
                self.lp_mint_y,
                self.x_feed,
                self.x_feed,
                self.y_feed,
                Pubkey::default(),
                self.dust_x,
            ]
        }

        /// 5 字节未对齐的前缀 + 地址序列 + 3 字节尾巴
        fn pair_bytes(&self, keys: &[Pubkey]) -> Vec<u8> {
            let mut data = TRADING_PAIR_DISCRIMINATOR.to_vec();
            data.extend_from_slice(&[0xAA; 5]);
            for key in keys {
                data.extend_from_slice(key.as_ref());
            }
            data.extend_from_slice(&[7, 7, 7]);
            data
        }

        fn source_with(&self, reserve_y_authority: Pubkey) -> InMemoryAccountSource {
            let pyth = PRICE_FEED_PROGRAMS[2];
            let oracle_program = Pubkey::new_unique();
            InMemoryAccountSource::new()
                .with_account(AccountData::new(self.pair, PROGRAM_ID, self.pair_bytes(&self.keys())))
                .with_account(AccountData::new(self.lp_mint_x, PROGRAM_ID, vec![1; 16]))
                .with_account(AccountData::new(
                    self.reserve_x,
                    TOKEN_PROGRAM_ID,
                    token_account_bytes(&self.mint_x, &self.authority, 1_000),
                ))
                .with_account(AccountData::new(
                    self.reserve_y,
                    TOKEN_PROGRAM_ID,
                    token_account_bytes(&self.mint_y, &reserve_y_authority, 2_000),
                ))
                .with_account(AccountData::new(
                    self.dust_x,
                    TOKEN_PROGRAM_ID,
                    token_account_bytes(&self.mint_x, &self.authority, 5),
                ))
                .with_account(AccountData::new(self.mint_x, TOKEN_PROGRAM_ID, mint_bytes(1, 9)))
                .with_account(AccountData::new(self.mint_y, TOKEN_PROGRAM_ID, mint_bytes(1, 6)))
                .with_account(AccountData::new(self.lp_mint_y, TOKEN_PROGRAM_ID, mint_bytes(1, 6)))
                .with_account(AccountData::new(self.oracles[0], oracle_program, vec![0; 8]))
                .with_account(AccountData::new(self.oracles[1], oracle_program, vec![0; 8]))
                .with_account(AccountData::new(self.oracles[2], oracle_program, vec![0; 8]))
                .with_account(AccountData::new(self.x_feed, pyth, vec![0; 8]))
                .with_account(AccountData::new(self.y_feed, pyth, vec![0; 8]))
        }

        fn source(&self) -> InMemoryAccountSource {
            self.source_with(self.authority)
        }
    }

    #[test]
    fn test_alignment_from_repeated_key() {
        let key = Pubkey::new_unique();
        let mut body = vec![0u8; 67];
        body.extend_from_slice(key.as_ref());
        body.extend_from_slice(key.as_ref());
        // 前面的全 0 区域不算重复
        assert_eq!(find_key_alignment(&body), Some(67 % 32));
        assert_eq!(find_key_alignment(&[0u8; 200]), None);
        assert_eq!(find_key_alignment(&[1u8; 10]), None);
    }

    #[test]
    fn test_embedded_keys() {
        let f = Fixture::new();
        let account = AccountData::new(f.pair, PROGRAM_ID, f.pair_bytes(&f.keys()));
        assert_eq!(embedded_keys(&account).unwrap(), f.keys());

        let mut bad = account.clone();
        bad.data[0] ^= 0xFF;
        assert!(matches!(embedded_keys(&bad), Err(ReverserError::UnexpectedAccount { .. })));

        let unaligned = AccountData::new(f.pair, PROGRAM_ID, f.pair_bytes(&[f.reserve_x, f.reserve_y]));
        assert!(matches!(embedded_keys(&unaligned), Err(ReverserError::UnexpectedAccount { .. })));
    }

    #[tokio::test]
    async fn test_classify_roles() {
        let f = Fixture::new();
        let source = f.source();
        let account = source.get_account(&f.pair).await.unwrap();
        let pair = load_pair(&source, &account).await.unwrap();

        assert_eq!(pair.reserve_x, f.reserve_x);
        assert_eq!(pair.reserve_y, f.reserve_y);
        assert_eq!(pair.mint_x, f.mint_x);
        assert_eq!(pair.mint_y, f.mint_y);
        assert_eq!(pair.swap_authority, f.authority);
        assert_eq!(pair.token_program, TOKEN_PROGRAM_ID);
        assert_eq!(pair.x_price_feed, f.x_feed);
        assert_eq!(pair.y_price_feed, f.y_feed);
        assert_eq!(
            [pair.reference_oracle, pair.second_reference_oracle, pair.third_reference_oracle],
            f.oracles
        );
        assert_eq!(pair.lp_mint_x, f.lp_mint_x);
        assert_eq!(pair.lp_mint_y, f.lp_mint_y);
    }

    #[tokio::test]
    async fn test_resolve_swap2_x2y() {
        let f = Fixture::new();
        let user = Pubkey::new_unique();
        let swap = resolve_swap_accounts(
            &f.source(),
            &f.pair,
            &SwapUser::new(user),
            SwapDirection::BaseToQuote,
            ObricSwapOrder::Swap2,
        )
        .await
        .unwrap();

        let roles: Vec<&str> = swap.accounts.iter().map(|e| e.role.as_str()).collect();
        assert_eq!(roles, SWAP2_TABLE.roles().collect::<Vec<_>>());
        assert_eq!(swap.protocol, Protocol::ObricV2);
        assert_eq!(swap.address("trading_pair"), Some(f.pair));
        assert_eq!(swap.address("swap_authority"), Some(f.authority));
        let (ata_x, _) = derive_associated_token_address(&user, &f.mint_x, &TOKEN_PROGRAM_ID).unwrap();
        let (ata_y, _) = derive_associated_token_address(&user, &f.mint_y, &TOKEN_PROGRAM_ID).unwrap();
        assert_eq!(swap.address("user_source_token"), Some(ata_x));
        assert_eq!(swap.address("user_destination_token"), Some(ata_y));
        assert_eq!(swap.account_metas().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_resolve_legacy_swap_y2x() {
        let f = Fixture::new();
        let swap = resolve_swap_accounts(
            &f.source(),
            &f.pair,
            &SwapUser::anonymous(),
            SwapDirection::QuoteToBase,
            ObricSwapOrder::Swap,
        )
        .await
        .unwrap();

        assert_eq!(swap.accounts.len(), SWAP_TABLE.len());
        assert_eq!(swap.address("mint_x"), Some(f.lp_mint_x));
        assert_eq!(swap.address("mint_y"), Some(f.lp_mint_y));
        assert_eq!(swap.address("protocol_fee"), Some(f.x_feed));
        assert_eq!(
            swap.get("user_token_account_x").unwrap().address,
            ResolvedAddress::Placeholder("<user-base-token-account>".into())
        );
        let authority = swap.get("user_authority").unwrap();
        assert!(authority.is_signer && authority.address.is_placeholder());
    }

    #[tokio::test]
    async fn test_reserve_authority_mismatch() {
        let f = Fixture::new();
        let source = f.source_with(Pubkey::new_unique());
        let account = source.get_account(&f.pair).await.unwrap();
        let err = load_pair(&source, &account).await.unwrap_err();
        assert!(matches!(err, ReverserError::IntegrityMismatch { context, .. } if context.contains("reserve_y.owner")));
    }

    #[tokio::test]
    async fn test_mixed_reserve_token_programs() {
        let f = Fixture::new();
        let source = f.source().with_account(AccountData::new(
            f.reserve_y,
            TOKEN_2022_PROGRAM_ID,
            token_account_bytes(&f.mint_y, &f.authority, 2_000),
        ));
        let account = source.get_account(&f.pair).await.unwrap();
        let err = load_pair(&source, &account).await.unwrap_err();
        assert!(matches!(err, ReverserError::IntegrityMismatch { .. }));
    }

    #[tokio::test]
    async fn test_missing_oracle() {
        let f = Fixture::new();
        let mut keys = f.keys();
        keys.retain(|k| *k != f.oracles[2]);
        let source = f.source().with_account(AccountData::new(f.pair, PROGRAM_ID, f.pair_bytes(&keys)));
        let err = resolve_swap_accounts(
            &source,
            &f.pair,
            &SwapUser::anonymous(),
            SwapDirection::BaseToQuote,
            ObricSwapOrder::Swap2,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ReverserError::UnresolvedRole { role } if role == "third_reference_oracle"));
    }
}
