//! Base58 编解码（Bitcoin 字母表，无校验和、无版本字节）

use super::error::{ReverserError, Result};
use solana_sdk::pubkey::Pubkey;

pub const PUBKEY_BYTES: usize = 32;

/// 编码任意字节；前导 0 字节保留为前导 `'1'`
#[inline]
pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// 解码任意长度的 Base58 字符串，前导 `'1'` 还原为前导 0 字节
pub fn decode(input: &str) -> Result<Vec<u8>> {
    bs58::decode(input).into_vec().map_err(|e| ReverserError::InvalidEncoding {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// 在公钥语境下解码：结果总是 32 字节，数值不足时左侧补 0
pub fn decode_32(input: &str) -> Result<[u8; PUBKEY_BYTES]> {
    let raw = decode(input)?;
    if raw.len() > PUBKEY_BYTES {
        return Err(ReverserError::InvalidEncoding {
            input: input.to_string(),
            reason: format!("decodes to {} bytes, a key has {}", raw.len(), PUBKEY_BYTES),
        });
    }
    let mut out = [0u8; PUBKEY_BYTES];
    out[PUBKEY_BYTES - raw.len()..].copy_from_slice(&raw);
    Ok(out)
}

#[inline]
pub fn decode_pubkey(input: &str) -> Result<Pubkey> {
    decode_32(input).map(Pubkey::new_from_array)
}

#[inline]
pub fn encode_pubkey(key: &Pubkey) -> String {
    encode(key.as_ref())
}

/// serde 辅助：配置文件中的公钥以 Base58 字符串表示
///
/// ```ignore
/// #[serde(with = "crate::core::base58::serde_pubkey")]
/// pub program_id: Pubkey,
/// ```
pub mod serde_pubkey {
    use serde::{Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;

    pub fn serialize<S: Serializer>(key: &Pubkey, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&super::encode_pubkey(key))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Pubkey, D::Error> {
        let text = String::deserialize(d)?;
        super::decode_pubkey(&text).map_err(serde::de::Error::custom)
    }
}
