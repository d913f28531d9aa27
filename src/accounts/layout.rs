//! 定长偏移布局解析
//!
//! 布局只是数据（字段名 → 偏移 / 类型 / 长度），解析器本身没有任何协议分支。
//! 每个协议以 `AccountLayout` 的形式提供自己的偏移表。

use super::token::AccountData;
use super::utils::read_bytes;
use crate::core::error::{ReverserError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// 字段类型；整数均为小端序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Pubkey,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    Bytes(usize),
}

impl FieldKind {
    pub fn width(&self) -> usize {
        match self {
            FieldKind::Pubkey => 32,
            FieldKind::U8 | FieldKind::I8 => 1,
            FieldKind::U16 | FieldKind::I16 => 2,
            FieldKind::U32 | FieldKind::I32 => 4,
            FieldKind::U64 | FieldKind::I64 => 8,
            FieldKind::Bytes(len) => *len,
        }
    }

    fn is_signed(&self) -> bool {
        matches!(self, FieldKind::I8 | FieldKind::I16 | FieldKind::I32 | FieldKind::I64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub offset: usize,
    pub kind: FieldKind,
    /// 逐字节 XOR 掩码，长度必须等于字段宽度（部分程序把字段混淆存储）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xor_mask: Option<Vec<u8>>,
}

impl FieldSpec {
    /// 字段结束偏移（不含）；溢出时为 `None`
    #[inline]
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.kind.width())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLayout {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl AccountLayout {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn field(mut self, name: impl Into<String>, offset: usize, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec { name: name.into(), offset, kind, xor_mask: None });
        self
    }

    pub fn masked_field(
        mut self,
        name: impl Into<String>,
        offset: usize,
        kind: FieldKind,
        mask: Vec<u8>,
    ) -> Self {
        self.fields.push(FieldSpec { name: name.into(), offset, kind, xor_mask: Some(mask) });
        self
    }

    pub fn pubkey(self, name: impl Into<String>, offset: usize) -> Self {
        self.field(name, offset, FieldKind::Pubkey)
    }

    pub fn u8(self, name: impl Into<String>, offset: usize) -> Self {
        self.field(name, offset, FieldKind::U8)
    }

    pub fn u32(self, name: impl Into<String>, offset: usize) -> Self {
        self.field(name, offset, FieldKind::U32)
    }

    pub fn u64(self, name: impl Into<String>, offset: usize) -> Self {
        self.field(name, offset, FieldKind::U64)
    }

    pub fn i64(self, name: impl Into<String>, offset: usize) -> Self {
        self.field(name, offset, FieldKind::I64)
    }

    pub fn bytes(self, name: impl Into<String>, offset: usize, len: usize) -> Self {
        self.field(name, offset, FieldKind::Bytes(len))
    }

    /// 解析该布局全部字段所需的最小长度
    pub fn required_len(&self) -> Result<usize> {
        self.fields.iter().try_fold(0usize, |len, f| Ok(len.max(self.field_end(f)?)))
    }

    fn field_end(&self, f: &FieldSpec) -> Result<usize> {
        f.end().ok_or_else(|| ReverserError::InvalidLayout {
            layout: self.name.clone(),
            reason: format!("field `{}` ends past usize::MAX", f.name),
        })
    }

    pub fn spec(&self, name: &str) -> Result<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name).ok_or_else(|| ReverserError::UnknownField {
            layout: self.name.clone(),
            field: name.to_string(),
        })
    }

    /// 校验布局本身：字段名唯一、掩码长度与字段宽度一致、字段之间不重叠
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut spans = Vec::with_capacity(self.fields.len());
        for f in &self.fields {
            spans.push((f.offset, self.field_end(f)?, f.name.as_str()));
            if !seen.insert(f.name.as_str()) {
                return Err(ReverserError::InvalidLayout {
                    layout: self.name.clone(),
                    reason: format!("duplicate field `{}`", f.name),
                });
            }
            if let Some(mask) = &f.xor_mask {
                if mask.len() != f.kind.width() {
                    return Err(ReverserError::InvalidLayout {
                        layout: self.name.clone(),
                        reason: format!(
                            "mask of `{}` is {} bytes, field is {}",
                            f.name,
                            mask.len(),
                            f.kind.width()
                        ),
                    });
                }
            }
        }

        // 两个字段共享字节时，读出的值只可能有一个是对的
        spans.sort_unstable();
        for pair in spans.windows(2) {
            let (_, prev_end, prev) = pair[0];
            let (offset, _, next) = pair[1];
            if offset < prev_end {
                return Err(ReverserError::InvalidLayout {
                    layout: self.name.clone(),
                    reason: format!("field `{next}` at {offset:#x} overlaps `{prev}` (ends at {prev_end:#x})"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Pubkey(Pubkey),
    Unsigned(u64),
    Signed(i64),
    Bytes(Vec<u8>),
}

impl DecodedValue {
    pub fn as_pubkey(&self) -> Option<Pubkey> {
        match self {
            DecodedValue::Pubkey(k) => Some(*k),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            DecodedValue::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DecodedValue::Signed(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DecodedValue::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Pubkey(k) => write!(f, "{}", k),
            DecodedValue::Unsigned(v) => write!(f, "{}", v),
            DecodedValue::Signed(v) => write!(f, "{}", v),
            DecodedValue::Bytes(b) => {
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

/// 一次解码的结果；构造后不可变，需要新数据时从新的拉取结果重新解码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAccount {
    /// 组装账户列表时引用该账户的名字，默认等于布局名
    pub label: String,
    pub address: Pubkey,
    pub owner: Pubkey,
    pub layout: String,
    pub raw: Vec<u8>,
    pub fields: BTreeMap<String, DecodedValue>,
}

impl DecodedAccount {
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn get(&self, name: &str) -> Result<&DecodedValue> {
        self.fields.get(name).ok_or_else(|| ReverserError::UnknownField {
            layout: self.layout.clone(),
            field: name.to_string(),
        })
    }

    pub fn pubkey(&self, name: &str) -> Result<Pubkey> {
        self.get(name)?.as_pubkey().ok_or_else(|| ReverserError::FieldKindMismatch {
            field: name.to_string(),
            expected: "pubkey",
        })
    }

    pub fn u64(&self, name: &str) -> Result<u64> {
        self.get(name)?.as_u64().ok_or_else(|| ReverserError::FieldKindMismatch {
            field: name.to_string(),
            expected: "unsigned integer",
        })
    }

    pub fn i64(&self, name: &str) -> Result<i64> {
        self.get(name)?.as_i64().ok_or_else(|| ReverserError::FieldKindMismatch {
            field: name.to_string(),
            expected: "signed integer",
        })
    }

    pub fn bytes(&self, name: &str) -> Result<&[u8]> {
        self.get(name)?.as_bytes().ok_or_else(|| ReverserError::FieldKindMismatch {
            field: name.to_string(),
            expected: "byte slice",
        })
    }
}

fn interpret(spec: &FieldSpec, raw: &[u8]) -> Result<DecodedValue> {
    let slice = read_bytes(raw, &spec.name, spec.offset, spec.kind.width())?;
    let mut bytes = slice.to_vec();
    if let Some(mask) = &spec.xor_mask {
        if mask.len() != bytes.len() {
            return Err(ReverserError::InvalidLayout {
                layout: spec.name.clone(),
                reason: "mask width differs from field width".to_string(),
            });
        }
        bytes.iter_mut().zip(mask).for_each(|(b, m)| *b ^= m);
    }

    let value = match spec.kind {
        FieldKind::Pubkey => {
            let mut key = [0u8; 32];
            key.copy_from_slice(&bytes);
            // 全 0 就是 Pubkey::default()（系统程序 / 空地址）
            DecodedValue::Pubkey(Pubkey::new_from_array(key))
        }
        FieldKind::Bytes(_) => DecodedValue::Bytes(bytes),
        kind => {
            let mut buf = [0u8; 8];
            buf[..bytes.len()].copy_from_slice(&bytes);
            let unsigned = u64::from_le_bytes(buf);
            if kind.is_signed() {
                let shift = 64 - 8 * bytes.len() as u32;
                DecodedValue::Signed(((unsigned << shift) as i64) >> shift)
            } else {
                DecodedValue::Unsigned(unsigned)
            }
        }
    };
    Ok(value)
}

/// 读取单个字段
pub fn read_field(layout: &AccountLayout, raw: &[u8], name: &str) -> Result<DecodedValue> {
    interpret(layout.spec(name)?, raw)
}

/// 按布局解码整个账户；任一字段越界即失败，不返回部分结果
pub fn decode_account(layout: &AccountLayout, account: &AccountData) -> Result<DecodedAccount> {
    layout.validate()?;
    let mut fields = BTreeMap::new();
    for spec in &layout.fields {
        fields.insert(spec.name.clone(), interpret(spec, &account.data)?);
    }
    debug!(
        "decoded {} as {} ({} bytes, {} fields)",
        account.pubkey,
        layout.name,
        account.data.len(),
        fields.len()
    );
    Ok(DecodedAccount {
        label: layout.name.clone(),
        address: account.pubkey,
        owner: account.owner,
        layout: layout.name.clone(),
        raw: account.data.clone(),
        fields,
    })
}
