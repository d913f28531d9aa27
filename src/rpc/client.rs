//! 基于 solana-client 的 RPC 账户来源

use super::source::{fetch_each, AccountSource, ProgramAccountsFilter};
use crate::accounts::token::{parse_token_account, AccountData, TokenAccountInfo};
use crate::core::base58;
use crate::core::config::{ReverserConfig, MAX_BATCH_SIZE};
use crate::core::error::{ReverserError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use log::debug;
use solana_account_decoder::{UiAccount, UiAccountData, UiAccountEncoding};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_client::rpc_request::TokenAccountsFilter;
use solana_client::rpc_response::RpcKeyedAccount;
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;

pub struct RpcAccountSource {
    client: RpcClient,
    config: ReverserConfig,
}

impl RpcAccountSource {
    pub fn new(config: ReverserConfig) -> Self {
        let config = config.normalized();
        let client = RpcClient::new_with_timeout_and_commitment(
            config.rpc_url.clone(),
            config.request_timeout(),
            config.commitment_config(),
        );
        Self { client, config }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(ReverserConfig::default().with_rpc_url(url))
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    pub fn config(&self) -> &ReverserConfig {
        &self.config
    }

    /// 逐个并行拉取，并发数取自 `max_concurrency`；每个账户单独返回结果
    pub async fn fetch_each(&self, addresses: &[Pubkey]) -> Vec<Result<AccountData>> {
        fetch_each(self, addresses, self.config.max_concurrency).await
    }
}

/// getMultipleAccounts 的分块：每块不超过 `MAX_BATCH_SIZE` 个 key，顺序与输入一致
pub(crate) fn batches(addresses: &[Pubkey], batch_size: usize) -> std::slice::Chunks<'_, Pubkey> {
    addresses.chunks(batch_size.clamp(1, MAX_BATCH_SIZE))
}

/// 把一块响应按位置与请求的 key 对齐；条数不符说明节点响应异常
pub(crate) fn merge_batch(
    chunk: &[Pubkey],
    accounts: Vec<Option<Account>>,
) -> Result<Vec<Option<AccountData>>> {
    if accounts.len() != chunk.len() {
        return Err(ReverserError::Rpc(format!(
            "getMultipleAccounts returned {} entries for {} keys",
            accounts.len(),
            chunk.len()
        )));
    }
    Ok(chunk
        .iter()
        .zip(accounts)
        .map(|(key, account)| account.map(|a| to_account_data(*key, a)))
        .collect())
}

fn to_account_data(pubkey: Pubkey, account: Account) -> AccountData {
    AccountData {
        pubkey,
        executable: account.executable,
        lamports: account.lamports,
        owner: account.owner,
        rent_epoch: account.rent_epoch,
        data: account.data,
    }
}

fn to_rpc_filter(filter: &ProgramAccountsFilter) -> RpcFilterType {
    match filter {
        ProgramAccountsFilter::DataSize(size) => RpcFilterType::DataSize(*size),
        ProgramAccountsFilter::Memcmp { offset, bytes } => {
            RpcFilterType::Memcmp(Memcmp::new_raw_bytes(*offset, bytes.clone()))
        }
    }
}

fn decode_base64(address: &Pubkey, encoded: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| ReverserError::unexpected(*address, format!("bad base64: {e}")))
}

/// getProgramAccounts 以 base64 返回的账户还原为原始字节
pub(crate) fn ui_account_data(address: Pubkey, account: &UiAccount) -> Result<AccountData> {
    let data = match &account.data {
        UiAccountData::Binary(encoded, UiAccountEncoding::Base64) => decode_base64(&address, encoded)?,
        _ => return Err(ReverserError::unexpected(address, "expected base64 account data")),
    };
    Ok(AccountData {
        pubkey: address,
        executable: account.executable,
        lamports: account.lamports,
        owner: base58::decode_pubkey(&account.owner)?,
        rent_epoch: account.rent_epoch,
        data,
    })
}

/// getTokenAccountsByOwner 返回的条目：jsonParsed 或 base64 二进制
pub(crate) fn keyed_token_account(keyed: &RpcKeyedAccount) -> Result<TokenAccountInfo> {
    let address = base58::decode_pubkey(&keyed.pubkey)?;
    let token_program = base58::decode_pubkey(&keyed.account.owner)?;

    match &keyed.account.data {
        UiAccountData::Json(parsed) => {
            let info = parsed
                .parsed
                .get("info")
                .and_then(|v| v.as_object())
                .ok_or_else(|| ReverserError::unexpected(address, "jsonParsed token account without info"))?;
            let field = |name: &str| {
                info.get(name)
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| ReverserError::unexpected(address, format!("missing `{name}`")))
            };
            let mint = base58::decode_pubkey(field("mint")?)?;
            let owner = base58::decode_pubkey(field("owner")?)?;
            let amount = info
                .get("tokenAmount")
                .and_then(|v| v.get("amount"))
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or_else(|| ReverserError::unexpected(address, "missing tokenAmount.amount"))?;
            Ok(TokenAccountInfo { address, mint, owner, amount, token_program })
        }
        UiAccountData::Binary(encoded, UiAccountEncoding::Base64) => {
            let data = decode_base64(&address, encoded)?;
            parse_token_account(&AccountData::new(address, token_program, data))
        }
        _ => Err(ReverserError::unexpected(address, "unsupported token account encoding")),
    }
}

#[async_trait]
impl AccountSource for RpcAccountSource {
    async fn get_account(&self, address: &Pubkey) -> Result<AccountData> {
        let response = self
            .client
            .get_account_with_commitment(address, self.config.commitment_config())
            .await?;
        response
            .value
            .map(|account| to_account_data(*address, account))
            .ok_or(ReverserError::AccountNotFound(*address))
    }

    async fn get_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<AccountData>>> {
        let mut out = Vec::with_capacity(addresses.len());
        for (index, chunk) in batches(addresses, self.config.batch_size).enumerate() {
            debug!("getMultipleAccounts chunk #{} ({} keys)", index, chunk.len());
            let response = self
                .client
                .get_multiple_accounts_with_commitment(chunk, self.config.commitment_config())
                .await?;
            out.extend(merge_batch(chunk, response.value)?);
        }
        Ok(out)
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[ProgramAccountsFilter],
    ) -> Result<Vec<AccountData>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters.iter().map(to_rpc_filter).collect()),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.config.commitment_config()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self.client.get_program_ui_accounts_with_config(program_id, config).await?;
        debug!("getProgramAccounts {} -> {} accounts", program_id, accounts.len());
        accounts.iter().map(|(key, account)| ui_account_data(*key, account)).collect()
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<TokenAccountInfo>> {
        let response = self
            .client
            .get_token_accounts_by_owner_with_commitment(
                owner,
                TokenAccountsFilter::Mint(*mint),
                self.config.commitment_config(),
            )
            .await?;
        response.value.iter().map(keyed_token_account).collect()
    }
}
