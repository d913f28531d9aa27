//! 各协议共用的用户侧账户推导与链上辅助查询

use crate::accounts::token::{parse_mint, select_vault, AccountData, MintInfo, TokenAccountInfo};
use crate::core::assembler::ResolvedAddress;
use crate::core::ata::{derive_associated_token_address, is_token_program};
use crate::core::error::{ReverserError, Result};
use crate::rpc::AccountSource;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

pub const SYSVAR_INSTRUCTIONS_ID: Pubkey = pubkey!("Sysvar1nstructions1111111111111111111111111");
pub const SYSVAR_CLOCK_ID: Pubkey = pubkey!("SysvarC1ock11111111111111111111111111111111");

pub const USER_AUTHORITY: &str = "user-authority";
pub const USER_BASE_TOKEN: &str = "user-base-token-account";
pub const USER_QUOTE_TOKEN: &str = "user-quote-token-account";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    #[default]
    BaseToQuote,
    QuoteToBase,
}

/// 用户侧输入。没有 authority 时，用户账户以占位符输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapUser {
    pub authority: Option<Pubkey>,
    /// 显式指定的 token account，优先于 ATA 推导
    pub base_token: Option<Pubkey>,
    pub quote_token: Option<Pubkey>,
}

impl SwapUser {
    pub fn new(authority: Pubkey) -> Self {
        Self { authority: Some(authority), ..Self::default() }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token_accounts(mut self, base: Pubkey, quote: Pubkey) -> Self {
        self.base_token = Some(base);
        self.quote_token = Some(quote);
        self
    }

    pub fn authority_address(&self) -> ResolvedAddress {
        match self.authority {
            Some(key) => ResolvedAddress::Key(key),
            None => ResolvedAddress::placeholder(USER_AUTHORITY),
        }
    }

    pub fn base_token_address(&self, mint: &Pubkey, token_program: &Pubkey) -> Result<ResolvedAddress> {
        self.token_address(self.base_token, mint, token_program, USER_BASE_TOKEN)
    }

    pub fn quote_token_address(&self, mint: &Pubkey, token_program: &Pubkey) -> Result<ResolvedAddress> {
        self.token_address(self.quote_token, mint, token_program, USER_QUOTE_TOKEN)
    }

    fn token_address(
        &self,
        explicit: Option<Pubkey>,
        mint: &Pubkey,
        token_program: &Pubkey,
        placeholder: &str,
    ) -> Result<ResolvedAddress> {
        if let Some(key) = explicit {
            return Ok(ResolvedAddress::Key(key));
        }
        match &self.authority {
            Some(owner) => {
                let (ata, _) = derive_associated_token_address(owner, mint, token_program)?;
                Ok(ResolvedAddress::Key(ata))
            }
            None => Ok(ResolvedAddress::placeholder(placeholder)),
        }
    }
}

/// 账户必须属于 `program_id`
pub fn expect_owner(account: &AccountData, program_id: &Pubkey) -> Result<()> {
    if account.owner != *program_id {
        return Err(ReverserError::unexpected(
            account.pubkey,
            format!("owned by {}, expected {}", account.owner, program_id),
        ));
    }
    Ok(())
}

/// 账户里记录的 token program 必须是 SPL Token 或 Token-2022
pub fn require_token_program(program: Pubkey, role: &str) -> Result<Pubkey> {
    if is_token_program(&program) {
        Ok(program)
    } else {
        Err(ReverserError::unresolved(role))
    }
}

/// 拉取 mint，owner 即其 token program
pub async fn load_mint<S: AccountSource + ?Sized>(source: &S, mint: &Pubkey) -> Result<MintInfo> {
    let account = source.get_account(mint).await?;
    parse_mint(&account)
}

/// `owner` 名下 `mint` 余额最大的 token account（连同其 token program）
pub async fn largest_vault<S: AccountSource + ?Sized>(
    source: &S,
    owner: &Pubkey,
    mint: &Pubkey,
    role: &str,
) -> Result<TokenAccountInfo> {
    let candidates = source.get_token_accounts_by_owner(owner, mint).await?;
    let address = select_vault(&candidates, mint, role)?;
    candidates
        .into_iter()
        .find(|c| c.address == address)
        .ok_or_else(|| ReverserError::unresolved(role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ata::{TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};

    #[test]
    fn test_user_token_resolution() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        let anon = SwapUser::anonymous();
        assert_eq!(anon.authority_address(), ResolvedAddress::Placeholder("<user-authority>".into()));
        assert_eq!(
            anon.base_token_address(&mint, &TOKEN_PROGRAM_ID).unwrap(),
            ResolvedAddress::Placeholder("<user-base-token-account>".into())
        );

        let user = SwapUser::new(owner);
        let (ata, _) = derive_associated_token_address(&owner, &mint, &TOKEN_PROGRAM_ID).unwrap();
        assert_eq!(user.base_token_address(&mint, &TOKEN_PROGRAM_ID).unwrap(), ResolvedAddress::Key(ata));
        assert_ne!(
            user.quote_token_address(&mint, &TOKEN_2022_PROGRAM_ID).unwrap(),
            ResolvedAddress::Key(ata)
        );

        let explicit = Pubkey::new_unique();
        let user = SwapUser::new(owner).with_token_accounts(explicit, explicit);
        assert_eq!(user.quote_token_address(&mint, &TOKEN_PROGRAM_ID).unwrap(), ResolvedAddress::Key(explicit));
    }

    #[test]
    fn test_require_token_program() {
        assert_eq!(require_token_program(TOKEN_PROGRAM_ID, "token_program").unwrap(), TOKEN_PROGRAM_ID);
        let err = require_token_program(Pubkey::new_unique(), "token_program").unwrap_err();
        assert!(matches!(err, ReverserError::UnresolvedRole { role } if role == "token_program"));
    }

    #[test]
    fn test_expect_owner() {
        let program = Pubkey::new_unique();
        let account = AccountData::new(Pubkey::new_unique(), program, vec![]);
        assert!(expect_owner(&account, &program).is_ok());
        assert!(matches!(
            expect_owner(&account, &Pubkey::new_unique()),
            Err(ReverserError::UnexpectedAccount { .. })
        ));
    }

    #[test]
    fn test_direction_serde() {
        let d: SwapDirection = serde_json::from_str("\"quote_to_base\"").unwrap();
        assert_eq!(d, SwapDirection::QuoteToBase);
        assert_eq!(SwapDirection::default(), SwapDirection::BaseToQuote);
    }
}
