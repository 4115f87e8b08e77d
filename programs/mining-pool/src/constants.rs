// ══════════════════════════════════════════════════════════════════════════════
// PDA SEEDS
// ══════════════════════════════════════════════════════════════════════════════

/// Pool state PDA: ["pool", creator, staking_mint]
pub const POOL_SEED: &[u8] = b"pool";

/// Pool authority PDA: ["pool_authority", pool]
/// Signs every CPI into the Mining System and owns the vault.
pub const POOL_AUTHORITY_SEED: &[u8] = b"pool_authority";

/// Depositor position PDA: ["position", pool, depositor]
pub const POSITION_SEED: &[u8] = b"position";

// ══════════════════════════════════════════════════════════════════════════════
// FIXED-POINT MATH
// ══════════════════════════════════════════════════════════════════════════════

/// Precision of the reward-per-unit accumulator (1e18).
/// distributable (u64) * SCALE always fits in u128.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Basis points denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

// ══════════════════════════════════════════════════════════════════════════════
// FEE CEILINGS
// ══════════════════════════════════════════════════════════════════════════════

/// Operator fee ceiling: 20%
pub const MAX_OPERATOR_FEE_BPS: u16 = 2_000;

/// Protocol fee ceiling: 10%
pub const MAX_PROTOCOL_FEE_BPS: u16 = 1_000;

// ══════════════════════════════════════════════════════════════════════════════
// DELEGATED AUTHORIZATION
// ══════════════════════════════════════════════════════════════════════════════

/// Action codes are the leading bytes of a forwarded payload
/// (an Anchor instruction discriminator on the Mining System).
pub const ACTION_CODE_LEN: usize = 8;

/// Maximum number of whitelisted action codes per pool
pub const MAX_ALLOWED_ACTIONS: usize = 16;

/// Returned by verify_signature when the operator key signed the hash
pub const SIGNATURE_APPROVED: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];

/// Returned by verify_signature for any other signature
pub const SIGNATURE_REJECTED: [u8; 4] = [0xff, 0xff, 0xff, 0xff];

/// r (32) + s (32) + v (1)
pub const SIGNATURE_LEN: usize = 65;

/// secp256k1 curve order / 2, big endian. Signatures with a larger s are malleable.
pub const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

// ══════════════════════════════════════════════════════════════════════════════
// MINING SYSTEM INTERFACE
// ══════════════════════════════════════════════════════════════════════════════

/// stake(amount: u64)
pub const MINING_STAKE_DISCRIMINATOR: [u8; 8] = [206, 176, 202, 18, 200, 209, 179, 108];

/// unstake()
pub const MINING_UNSTAKE_DISCRIMINATOR: [u8; 8] = [90, 95, 107, 42, 205, 124, 50, 225];

/// cancel_unstake()
pub const MINING_CANCEL_UNSTAKE_DISCRIMINATOR: [u8; 8] = [64, 65, 53, 227, 125, 153, 3, 167];

/// withdraw()
pub const MINING_WITHDRAW_DISCRIMINATOR: [u8; 8] = [183, 18, 70, 156, 148, 109, 161, 34];

/// claim(epoch_ids: Vec<u64>)
pub const MINING_CLAIM_DISCRIMINATOR: [u8; 8] = [62, 198, 214, 193, 213, 159, 108, 210];

/// Bonus System claim_bonus(epoch_ids: Vec<u64>)
pub const BONUS_CLAIM_DISCRIMINATOR: [u8; 8] = [143, 250, 0, 123, 176, 198, 110, 71];

/// Calls the pool makes itself; never accepted on the operator whitelist
pub const RESERVED_ACTION_CODES: [[u8; 8]; 6] = [
    MINING_STAKE_DISCRIMINATOR,
    MINING_UNSTAKE_DISCRIMINATOR,
    MINING_CANCEL_UNSTAKE_DISCRIMINATOR,
    MINING_WITHDRAW_DISCRIMINATOR,
    MINING_CLAIM_DISCRIMINATOR,
    BONUS_CLAIM_DISCRIMINATOR,
];

/// Account discriminator of the Mining System `Miner` account
pub const MINER_ACCOUNT_DISCRIMINATOR: [u8; 8] = [223, 113, 15, 54, 123, 122, 140, 100];

/// Account discriminator of the Mining System `MiningConfig` account
pub const MINING_CONFIG_ACCOUNT_DISCRIMINATOR: [u8; 8] = [102, 126, 201, 253, 144, 254, 211, 53];

/// Miner layout: discriminator (8) | authority (32) | staked_amount (8)
/// | withdrawable_at (8) | eligible (1)
pub const MINER_ACCOUNT_MIN_LEN: usize = 8 + 32 + 8 + 8 + 1;

/// MiningConfig layout: discriminator (8) | current_epoch (8) | max_stake (8)
pub const MINING_CONFIG_ACCOUNT_MIN_LEN: usize = 8 + 8 + 8;

/// Upper bound on epoch ids per claim instruction
pub const MAX_CLAIM_EPOCHS: usize = 32;
