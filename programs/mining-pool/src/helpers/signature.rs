//! Delegated signer authentication.
//!
//! The pool authenticates to an external coordinator as an address-level
//! identity: the coordinator hands the pool a hash and a signature, and the
//! pool answers whether its registered operator key produced it.

use anchor_lang::solana_program::keccak;
use anchor_lang::solana_program::secp256k1_recover::secp256k1_recover;
use crate::constants::*;

/// Recovers the address that produced a signature over a 32-byte hash.
///
/// Kept separate from the ledger so the signature scheme can be replaced
/// without touching accounting code.
pub trait SignerRecovery {
    fn recover_signer(&self, hash: &[u8; 32], signature: &[u8]) -> Option<[u8; 20]>;
}

/// secp256k1 recovery over `r || s || v` signatures, yielding the
/// keccak-derived 20-byte address of the signer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Secp256k1Recovery;

impl SignerRecovery for Secp256k1Recovery {
    fn recover_signer(&self, hash: &[u8; 32], signature: &[u8]) -> Option<[u8; 20]> {
        if signature.len() != SIGNATURE_LEN {
            return None;
        }
        let (rs, v) = signature.split_at(64);
        if !is_low_s(&rs[32..64]) {
            return None;
        }
        let recovery_id = match v[0] {
            0 | 1 => v[0],
            27 | 28 => v[0] - 27,
            _ => return None,
        };

        let pubkey = secp256k1_recover(hash, recovery_id, rs).ok()?;
        Some(address_from_pubkey(&pubkey.to_bytes()))
    }
}

/// Last 20 bytes of keccak256(uncompressed public key without prefix)
pub fn address_from_pubkey(pubkey: &[u8; 64]) -> [u8; 20] {
    let digest = keccak::hash(pubkey).to_bytes();
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..32]);
    address
}

/// s must be non-zero and in the lower half of the curve order
fn is_low_s(s: &[u8]) -> bool {
    s.iter().any(|b| *b != 0) && s <= &SECP256K1_HALF_ORDER[..]
}

/// Approval code for `signature` over `hash` against the registered operator key.
///
/// An unset (all-zero) operator key rejects everything.
pub fn verify_operator_signature<R: SignerRecovery>(
    recovery: &R,
    operator_key: &[u8; 20],
    hash: &[u8; 32],
    signature: &[u8],
) -> [u8; 4] {
    if operator_key.iter().all(|b| *b == 0) {
        return SIGNATURE_REJECTED;
    }
    match recovery.recover_signer(hash, signature) {
        Some(signer) if signer == *operator_key => SIGNATURE_APPROVED,
        _ => SIGNATURE_REJECTED,
    }
}
