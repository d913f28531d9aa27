//! 账户数据读取工具函数
//!
//! 所有读取都做边界检查：越界返回 `TruncatedAccount`，绝不补 0。

use crate::core::error::{ReverserError, Result};
use solana_sdk::pubkey::Pubkey;

/// 取出 `[offset, offset + len)`，越界时报告字段名、偏移与所需长度
#[inline(always)]
pub fn read_bytes<'a>(data: &'a [u8], field: &str, offset: usize, len: usize) -> Result<&'a [u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| ReverserError::TruncatedAccount {
            field: field.to_string(),
            offset,
            required: len,
            actual: data.len(),
        })
}

#[inline(always)]
fn read_array<const N: usize>(data: &[u8], field: &str, offset: usize) -> Result<[u8; N]> {
    let slice = read_bytes(data, field, offset, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

#[inline(always)]
pub fn read_u8(data: &[u8], field: &str, offset: usize) -> Result<u8> {
    read_array::<1>(data, field, offset).map(|b| b[0])
}

#[inline(always)]
pub fn read_u16_le(data: &[u8], field: &str, offset: usize) -> Result<u16> {
    read_array(data, field, offset).map(u16::from_le_bytes)
}

#[inline(always)]
pub fn read_u32_le(data: &[u8], field: &str, offset: usize) -> Result<u32> {
    read_array(data, field, offset).map(u32::from_le_bytes)
}

#[inline(always)]
pub fn read_u64_le(data: &[u8], field: &str, offset: usize) -> Result<u64> {
    read_array(data, field, offset).map(u64::from_le_bytes)
}

#[inline(always)]
pub fn read_i64_le(data: &[u8], field: &str, offset: usize) -> Result<i64> {
    read_array(data, field, offset).map(i64::from_le_bytes)
}

/// 读取公钥；全 0 即系统程序 / 空地址 `Pubkey::default()`
#[inline(always)]
pub fn read_pubkey(data: &[u8], field: &str, offset: usize) -> Result<Pubkey> {
    read_array::<32>(data, field, offset).map(Pubkey::new_from_array)
}

/// 检查 discriminator（前 8 字节）
#[inline]
pub fn has_discriminator(data: &[u8], discriminator: &[u8]) -> bool {
    data.len() >= discriminator.len() && &data[..discriminator.len()] == discriminator
}

/// 把 u64 掩码序列展开成逐字节 XOR 掩码（小端序）
pub fn u64_mask_bytes(masks: &[u64]) -> Vec<u8> {
    masks.iter().flat_map(|m| m.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_le_integers() {
        let mut data = vec![0u8; 16];
        data[0..8].copy_from_slice(&0x0102_0304_0506_0708u64.to_le_bytes());
        data[8..12].copy_from_slice(&0xdead_beefu32.to_le_bytes());
        data[12..14].copy_from_slice(&0x1234u16.to_le_bytes());
        data[14] = 9;

        assert_eq!(read_u64_le(&data, "a", 0).unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(read_u32_le(&data, "b", 8).unwrap(), 0xdead_beef);
        assert_eq!(read_u16_le(&data, "c", 12).unwrap(), 0x1234);
        assert_eq!(read_u8(&data, "d", 14).unwrap(), 9);
        assert_eq!(read_i64_le(&(-5i64).to_le_bytes(), "e", 0).unwrap(), -5);
    }

    #[test]
    fn test_out_of_bounds_reports_field() {
        let data = vec![0u8; 40];
        let err = read_pubkey(&data, "vault", 16).unwrap_err();
        match err {
            ReverserError::TruncatedAccount { field, offset, required, actual } => {
                assert_eq!(field, "vault");
                assert_eq!(offset, 16);
                assert_eq!(required, 32);
                assert_eq!(actual, 40);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_offset_overflow_is_truncation() {
        let data = vec![0u8; 8];
        assert!(read_u64_le(&data, "x", usize::MAX - 2).is_err());
    }

    #[test]
    fn test_zero_pubkey_is_default() {
        let data = vec![0u8; 32];
        assert_eq!(read_pubkey(&data, "k", 0).unwrap(), Pubkey::default());
    }

    #[test]
    fn test_mask_bytes() {
        let bytes = u64_mask_bytes(&[0x0102030405060708, 0xff]);
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], 0x08);
        assert_eq!(bytes[7], 0x01);
        assert_eq!(bytes[8], 0xff);
    }
}
