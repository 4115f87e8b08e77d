use anchor_lang::prelude::*;

use crate::state::PoolState;

// ══════════════════════════════════════════════════════════════════════════════
// POOL EVENTS
// ══════════════════════════════════════════════════════════════════════════════

/// Emitted when a pool is created
#[event]
pub struct PoolInitialized {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub staking_mint: Pubkey,
    pub operator: Pubkey,
    pub operator_fee_bps: u16,
    pub protocol_fee_bps: u16,
    pub pool_cap: u64,
    pub timestamp: i64,
}

// ══════════════════════════════════════════════════════════════════════════════
// LEDGER EVENTS
// ══════════════════════════════════════════════════════════════════════════════

#[event]
pub struct Deposited {
    pub pool: Pubkey,
    pub depositor: Pubkey,
    /// Tokens deposited
    pub amount: u64,
    /// Principal units credited
    pub units: u64,
    pub principal: u64,
    pub total_principal: u64,
    pub timestamp: i64,
}

#[event]
pub struct PrincipalWithdrawn {
    pub pool: Pubkey,
    pub depositor: Pubkey,
    /// Principal units redeemed
    pub amount: u64,
    /// Tokens paid out
    pub payout: u64,
    pub principal: u64,
    pub total_principal: u64,
    pub timestamp: i64,
}

#[event]
pub struct RewardClaimed {
    pub pool: Pubkey,
    pub depositor: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted when a reward inflow is split and folded into the accumulator
#[event]
pub struct RewardsDistributed {
    pub pool: Pubkey,
    pub gross: u64,
    pub protocol_fee: u64,
    pub operator_fee: u64,
    pub distributable: u64,
    pub reward_per_unit_stored: u128,
    pub is_bonus: bool,
    pub timestamp: i64,
}

// ══════════════════════════════════════════════════════════════════════════════
// LIFECYCLE EVENTS
// ══════════════════════════════════════════════════════════════════════════════

/// Emitted on every lifecycle transition
#[event]
pub struct StateChanged {
    pub pool: Pubkey,
    pub from: PoolState,
    pub to: PoolState,
    pub caller: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct StakedIntoMining {
    pub pool: Pubkey,
    pub amount: u64,
    pub epoch: u64,
    pub timestamp: i64,
}

#[event]
pub struct UnstakeRequested {
    pub pool: Pubkey,
    pub epoch: u64,
    pub caller: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct UnstakeExecuted {
    pub pool: Pubkey,
    pub epoch: u64,
    pub withdrawable_at: i64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawFinalized {
    pub pool: Pubkey,
    pub returned: u64,
    pub total_principal: u64,
    /// Returned above the staked principal, distributed as rewards
    pub surplus: u64,
    pub timestamp: i64,
}

/// Mining System returned less than was staked. The loss is spread pro
/// rata over every position through `principal_backing`.
#[event]
pub struct PrincipalShortfall {
    pub pool: Pubkey,
    pub staked: u64,
    pub returned: u64,
    pub shortfall: u64,
    pub principal_backing: u64,
    pub timestamp: i64,
}

// ══════════════════════════════════════════════════════════════════════════════
// ADMIN & OPERATOR EVENTS
// ══════════════════════════════════════════════════════════════════════════════

#[event]
pub struct OperatorChanged {
    pub pool: Pubkey,
    pub old_operator: Pubkey,
    pub new_operator: Pubkey,
    pub operator_key: [u8; 20],
    pub timestamp: i64,
}

#[event]
pub struct OperatorFeeRateLowered {
    pub pool: Pubkey,
    pub old_bps: u16,
    pub new_bps: u16,
    pub timestamp: i64,
}

#[event]
pub struct AllowedActionUpdated {
    pub pool: Pubkey,
    pub code: [u8; 8],
    pub allowed: bool,
    pub timestamp: i64,
}

#[event]
pub struct ForwardedSubmission {
    pub pool: Pubkey,
    pub operator: Pubkey,
    pub action_code: [u8; 8],
    pub payload_len: u32,
    pub timestamp: i64,
}

#[event]
pub struct OwnershipTransferInitiated {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub pending_owner: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct OwnershipTransferred {
    pub pool: Pubkey,
    pub old_owner: Pubkey,
    pub new_owner: Pubkey,
    pub timestamp: i64,
}
