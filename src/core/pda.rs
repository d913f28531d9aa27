//! Program Derived Address 推导
//!
//! digest = SHA-256(seeds ‖ [bump] ‖ program_id ‖ "ProgramDerivedAddress")，
//! bump 从 255 向下搜索，第一个不在曲线上的 digest 即为规范 PDA。

use super::curve::is_on_curve;
use super::error::{ReverserError, Result};
use log::debug;
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

pub const MAX_SEED_LEN: usize = 32;
pub const MAX_SEEDS: usize = 16;
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// 推导结果，保留种子（不含 bump）与所属程序，便于后续校验
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDerivedAddress {
    pub address: Pubkey,
    pub bump: u8,
    pub seeds: Vec<Vec<u8>>,
    pub program_id: Pubkey,
}

impl ProgramDerivedAddress {
    pub fn find(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Self> {
        let (address, bump) = derive_address(seeds, program_id)?;
        Ok(Self {
            address,
            bump,
            seeds: seeds.iter().map(|s| s.to_vec()).collect(),
            program_id: *program_id,
        })
    }

    /// 种子加上 bump，可直接用于签名 CPI
    pub fn signer_seeds(&self) -> Vec<Vec<u8>> {
        let mut out = self.seeds.clone();
        out.push(vec![self.bump]);
        out
    }
}

fn check_seeds(seeds: &[&[u8]]) -> Result<()> {
    if seeds.len() > MAX_SEEDS {
        return Err(ReverserError::TooManySeeds { count: seeds.len() });
    }
    if let Some((index, seed)) = seeds.iter().enumerate().find(|(_, s)| s.len() > MAX_SEED_LEN) {
        return Err(ReverserError::SeedTooLong { index, len: seed.len() });
    }
    Ok(())
}

#[inline]
fn hash_candidate(seeds: &[&[u8]], bump: Option<u8>, program_id: &Pubkey) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    if let Some(bump) = bump {
        hasher.update([bump]);
    }
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

/// 用完整种子（bump 已包含在内）计算地址；落在曲线上返回 `None`
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Option<Pubkey>> {
    check_seeds(seeds)?;
    let digest = hash_candidate(seeds, None, program_id);
    if is_on_curve(&digest) {
        return Ok(None);
    }
    Ok(Some(Pubkey::new_from_array(digest)))
}

/// 搜索规范 PDA：返回最高的、使 digest 离开曲线的 bump
pub fn derive_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    check_seeds(seeds)?;
    for bump in (0..=u8::MAX).rev() {
        let digest = hash_candidate(seeds, Some(bump), program_id);
        if !is_on_curve(&digest) {
            let address = Pubkey::new_from_array(digest);
            debug!("pda found: program={} bump={} address={}", program_id, bump, address);
            return Ok((address, bump));
        }
    }
    Err(ReverserError::PdaNotFound { program_id: *program_id })
}

/// 用给定 bump 重算地址（不搜索）。bump 对应的 digest 在曲线上时返回 `None`
pub fn address_with_bump(seeds: &[&[u8]], bump: u8, program_id: &Pubkey) -> Result<Option<Pubkey>> {
    check_seeds(seeds)?;
    let digest = hash_candidate(seeds, Some(bump), program_id);
    if is_on_curve(&digest) {
        return Ok(None);
    }
    Ok(Some(Pubkey::new_from_array(digest)))
}
