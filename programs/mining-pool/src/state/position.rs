use anchor_lang::prelude::*;

/// A depositor's stake in one pool
///
/// Created on first deposit and never closed: a fully withdrawn position
/// stays on-chain with zero principal so its reward checkpoint survives.
///
/// PDA Seeds: ["position", pool, depositor]
#[account]
#[derive(Default, Debug)]
pub struct DepositorPosition {
    /// Pool this position belongs to
    pub pool: Pubkey,

    /// Depositor wallet
    pub owner: Pubkey,

    /// Principal units, excluding rewards. One unit per token deposited
    /// unless a Mining System shortfall impaired the pool.
    pub principal: u64,

    /// Pool accumulator value at the last settlement
    pub reward_per_unit_paid: u128,

    /// Realized, claimable reward
    pub accrued_reward: u64,

    /// Lifetime rewards claimed
    pub total_claimed: u64,

    /// PDA bump seed
    pub bump: u8,
}

/// Per-depositor snapshot returned to dashboards
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionSummary {
    pub principal: u64,
    /// Tokens `principal` would withdraw for right now
    pub redeemable: u64,
    pub pending_reward: u64,
    /// Share of total principal in basis points
    pub share_of_pool_bps: u64,
}

impl DepositorPosition {
    /// Account size: 32 + 32 + 8 + 16 + 8 + 8 + 1 = 105 bytes
    pub const LEN: usize = 32 + 32 + 8 + 16 + 8 + 8 + 1;
}
