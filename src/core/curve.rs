//! Ed25519 曲线成员判定
//!
//! 仅用于 PDA 推导中的拒绝测试：合法 PDA 必须不在曲线上。

use curve25519_dalek::edwards::CompressedEdwardsY;

/// p = 2^255 - 19，小端序
const FIELD_PRIME_LE: [u8; 32] = [
    0xed, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f,
];

/// y 坐标（去掉符号位后的低 255 位）是否 < p
fn is_canonical_y(bytes: &[u8; 32]) -> bool {
    let mut y = *bytes;
    y[31] &= 0x7f;
    // 从最高字节开始比较
    for i in (0..32).rev() {
        if y[i] != FIELD_PRIME_LE[i] {
            return y[i] < FIELD_PRIME_LE[i];
        }
    }
    false
}

/// 判断 32 字节是否是 Ed25519 曲线上某点的压缩编码
///
/// 取低 255 位为 y、最高位为 x 的符号位；y >= p 时直接判为不在曲线上，
/// 否则按 x = (u/v)^((p+3)/8)（必要时乘以 sqrt(-1)）求解 x，无解即不在曲线上。
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    if !is_canonical_y(bytes) {
        return false;
    }
    CompressedEdwardsY(*bytes).decompress().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::base58;

    #[test]
    fn test_basepoint_on_curve() {
        // Ed25519 基点 B 的压缩编码 (y = 4/5)
        let mut b = [0x66u8; 32];
        b[0] = 0x58;
        assert!(is_on_curve(&b));
    }

    #[test]
    fn test_wallet_key_on_curve() {
        // 普通钱包地址是真实的 ed25519 公钥
        let key = base58::decode_32("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM").unwrap();
        assert!(is_on_curve(&key));
    }

    #[test]
    fn test_known_pda_off_curve() {
        // USDC 的 ATA，bump=254
        let key = base58::decode_32("FGETo8T8wMcN2wCjav8VK6eh3dLk63evNDPxzLSJra8B").unwrap();
        assert!(!is_on_curve(&key));
    }

    #[test]
    fn test_identity_point() {
        // y = 1, x = 0
        let mut one = [0u8; 32];
        one[0] = 1;
        assert!(is_on_curve(&one));
    }

    #[test]
    fn test_non_canonical_y_rejected() {
        // y = p + 1 会被约化为 y = 1，但这里必须判为不在曲线上
        let mut y = FIELD_PRIME_LE;
        y[0] = 0xee;
        assert!(!is_canonical_y(&y));
        assert!(!is_on_curve(&y));

        // y = p
        assert!(!is_on_curve(&FIELD_PRIME_LE));

        // y = p - 1 合法
        let mut y = FIELD_PRIME_LE;
        y[0] = 0xec;
        assert!(is_canonical_y(&y));
    }

    #[test]
    fn test_sign_bit_ignored_for_canonical_check() {
        let mut b = [0x66u8; 32];
        b[0] = 0x58;
        b[31] |= 0x80;
        assert!(is_canonical_y(&b));
        assert!(is_on_curve(&b));
    }
}
