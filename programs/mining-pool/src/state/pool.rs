use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::ErrorCode;
use crate::helpers::math::{self, FeeSplit};
use crate::helpers::mining::{MinerView, MiningConfigView};
use crate::state::{DepositorPosition, PositionSummary};

/// Lifecycle of the pooled stake.
///
/// ```text
/// Idle --stake_into_mining--> Active --execute_unstake--> Unstaking --finalize_withdraw--> Idle
///                               ^                            |
///                               +-------cancel_unstake-------+
/// ```
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PoolState {
    /// Funds held by the pool, deposits and withdrawals accepted
    #[default]
    Idle,
    /// Funds staked in the Mining System
    Active,
    /// Unstake executed, Mining System cooldown running
    Unstaking,
}

/// Pool state and configuration
///
/// One account per deployment. Holds the aggregate ledger, the reward
/// accumulator, the lifecycle state and the operator whitelist.
///
/// PDA Seeds: ["pool", creator, staking_mint]
#[account]
#[derive(Default, Debug)]
pub struct Pool {
    /// Administrative owner
    pub owner: Pubkey,

    /// Two-step ownership transfer: proposed new owner
    pub pending_owner: Option<Pubkey>,

    /// Account that created the pool (PDA seed)
    pub creator: Pubkey,

    /// Staking asset mint
    pub staking_mint: Pubkey,

    /// Pool authority token account for the staking asset
    pub vault: Pubkey,

    /// Mining System program id
    pub mining_system: Pubkey,

    /// Mining System global config account (epoch, hard cap)
    pub mining_config: Pubkey,

    /// Mining System miner account, pinned by the first verified stake
    pub miner: Pubkey,

    /// Bonus System program id
    pub bonus_system: Pubkey,

    /// Operator allowed to forward whitelisted actions
    pub operator: Pubkey,

    /// Operator's secp256k1 address for delegated signature checks
    pub operator_key: [u8; 20],

    /// Wallet receiving protocol fees
    pub protocol_fee_recipient: Pubkey,

    pub state: PoolState,

    /// Sum of all depositor principal units
    pub total_principal: u64,

    /// Accumulator denominator
    pub total_rewardable: u64,

    /// Principal units no longer backed by tokens after a Mining System
    /// shortfall. Spread pro rata: each unit redeems for
    /// `(total_principal - principal_shortfall) / total_principal` tokens.
    pub principal_shortfall: u64,

    /// Cumulative reward per unit of principal, scaled by SCALE
    pub reward_per_unit_stored: u128,

    /// Scaled division remainder carried into the next accumulator update
    pub reward_remainder: u128,

    /// Operator fee in basis points (can only decrease)
    pub operator_fee_bps: u16,

    /// Protocol fee in basis points (fixed at creation)
    pub protocol_fee_bps: u16,

    /// Maximum total principal (0 = only the Mining System cap applies)
    pub pool_cap: u64,

    /// Mining System epoch at which an unstake was requested
    pub unstake_request_epoch: Option<u64>,

    /// Action codes the operator may forward to the Mining System
    pub allowed_action_codes: Vec<[u8; ACTION_CODE_LEN]>,

    /// Reentrancy guard
    pub locked: bool,

    /// Lifetime rewards folded into the accumulator
    pub total_rewards_distributed: u64,

    /// Lifetime protocol fees paid out
    pub total_protocol_fees: u64,

    /// Lifetime operator fees paid out
    pub total_operator_fees: u64,

    /// Depositors with non-zero principal
    pub depositor_count: u64,

    /// Creation timestamp
    pub created_at: i64,

    /// PDA bump for the pool account
    pub bump: u8,

    /// PDA bump for the pool authority
    pub authority_bump: u8,

    /// Reserved for future use
    pub _reserved: [u8; 32],
}

/// Aggregate snapshot returned to dashboards
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolSummary {
    pub state: PoolState,
    pub staked_amount: u64,
    pub total_principal: u64,
    /// Tokens behind `total_principal` (lower only after a shortfall)
    pub principal_backing: u64,
    pub total_rewardable: u64,
    pub current_epoch: u64,
    pub eligible: bool,
    pub cooldown_end: i64,
}

/// Outcome of `Pool::reconcile_returned_principal`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReturnedPrincipal {
    /// Backing that was staked
    pub staked: u64,
    pub surplus: u64,
    pub shortfall: u64,
}

impl Pool {
    /// Account size calculation:
    /// - 10 Pubkeys: 32 * 10 = 320 bytes
    /// - pending_owner Option<Pubkey>: 33 bytes
    /// - operator_key: 20 bytes
    /// - state: 1 byte
    /// - total_principal, total_rewardable, principal_shortfall, pool_cap: 8 * 4 = 32 bytes
    /// - reward_per_unit_stored, reward_remainder: 16 * 2 = 32 bytes
    /// - operator_fee_bps, protocol_fee_bps: 2 * 2 = 4 bytes
    /// - unstake_request_epoch Option<u64>: 9 bytes
    /// - allowed_action_codes Vec: 4 + 8 * 16 = 132 bytes
    /// - locked: 1 byte
    /// - 4 u64 stats + created_at: 8 * 5 = 40 bytes
    /// - bump, authority_bump: 2 bytes
    /// - _reserved: 32 bytes
    /// Total: 658 bytes
    pub const LEN: usize = 32 * 10
        + 33
        + 20
        + 1
        + 8 * 4
        + 16 * 2
        + 2 * 2
        + 9
        + 4 + ACTION_CODE_LEN * MAX_ALLOWED_ACTIONS
        + 1
        + 8 * 5
        + 2
        + 32;

    // ─────────────────────────────────────────────────────────────────────
    // Access control
    // ─────────────────────────────────────────────────────────────────────

    pub fn require_owner(&self, signer: &Pubkey) -> Result<()> {
        require_keys_eq!(*signer, self.owner, ErrorCode::NotOwner);
        Ok(())
    }

    pub fn require_operator(&self, signer: &Pubkey) -> Result<()> {
        require_keys_eq!(*signer, self.operator, ErrorCode::NotOperator);
        Ok(())
    }

    pub fn require_owner_or_operator(&self, signer: &Pubkey) -> Result<()> {
        require!(
            *signer == self.owner || *signer == self.operator,
            ErrorCode::NotOperator
        );
        Ok(())
    }

    /// Accept `miner` if it is the pool's pinned miner, or if none is pinned yet.
    pub fn accepts_miner(&self, miner: &Pubkey) -> bool {
        self.miner == Pubkey::default() || self.miner == *miner
    }

    /// Record the miner after the first verified stake. Later stakes must reuse it.
    pub fn pin_miner(&mut self, miner: Pubkey) -> Result<()> {
        require!(self.accepts_miner(&miner), ErrorCode::InvalidAccount);
        self.miner = miner;
        Ok(())
    }

    /// Enter a guarded section. Fails if another call on this pool is in flight.
    pub fn acquire_lock(&mut self) -> Result<()> {
        require!(!self.locked, ErrorCode::Reentrancy);
        self.locked = true;
        Ok(())
    }

    pub fn release_lock(&mut self) {
        self.locked = false;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Configuration checks (pool creation)
    // ─────────────────────────────────────────────────────────────────────

    pub fn validate_fee_rates(operator_fee_bps: u16, protocol_fee_bps: u16) -> Result<()> {
        require!(operator_fee_bps <= MAX_OPERATOR_FEE_BPS, ErrorCode::FeeRateTooHigh);
        require!(protocol_fee_bps <= MAX_PROTOCOL_FEE_BPS, ErrorCode::FeeRateTooHigh);
        Ok(())
    }

    /// A pool cap must sit within the Mining System's own cap.
    /// A zero cap defers entirely to the Mining System cap, which deposits check separately.
    pub fn validate_pool_cap(pool_cap: u64, mining_max_stake: u64) -> Result<()> {
        if pool_cap > 0 && mining_max_stake > 0 {
            require!(pool_cap <= mining_max_stake, ErrorCode::CapExceeded);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Ledger
    // ─────────────────────────────────────────────────────────────────────

    /// Claimable reward of a position at the current accumulator value
    pub fn earned(&self, position: &DepositorPosition) -> Result<u64> {
        let pending = math::pending_reward(
            position.principal,
            self.reward_per_unit_stored,
            position.reward_per_unit_paid,
        )?;
        position
            .accrued_reward
            .checked_add(pending)
            .ok_or(ErrorCode::MathOverflow.into())
    }

    /// Realize pending reward and checkpoint the accumulator.
    /// Must run before any change to `position.principal`.
    pub fn settle(&self, position: &mut DepositorPosition) -> Result<()> {
        position.accrued_reward = self.earned(position)?;
        position.reward_per_unit_paid = self.reward_per_unit_stored;
        Ok(())
    }

    /// Tokens that back the principal ledger
    pub fn principal_backing(&self) -> u64 {
        self.total_principal.saturating_sub(self.principal_shortfall)
    }

    /// Credit `amount` tokens of principal to `position`. Returns the units credited.
    ///
    /// `mining_max_stake` is the Mining System's absolute cap (0 = uncapped).
    /// Caps apply to tokens, not units.
    pub fn deposit(
        &mut self,
        position: &mut DepositorPosition,
        amount: u64,
        mining_max_stake: u64,
    ) -> Result<u64> {
        require!(amount > 0, ErrorCode::InvalidAmount);
        require!(self.state == PoolState::Idle, ErrorCode::NotIdle);

        let backing = self.principal_backing();
        let new_backing = backing
            .checked_add(amount)
            .ok_or(ErrorCode::CapExceeded)?;
        if self.pool_cap > 0 {
            require!(new_backing <= self.pool_cap, ErrorCode::CapExceeded);
        }
        if mining_max_stake > 0 {
            require!(new_backing <= mining_max_stake, ErrorCode::CapExceeded);
        }
        let units = math::units_for_deposit(amount, self.total_principal, backing)?;

        self.settle(position)?;

        if position.principal == 0 {
            self.depositor_count = self.depositor_count.saturating_add(1);
        }
        position.principal = position
            .principal
            .checked_add(units)
            .ok_or(ErrorCode::MathOverflow)?;
        self.total_principal = self
            .total_principal
            .checked_add(units)
            .ok_or(ErrorCode::MathOverflow)?;
        self.total_rewardable = self
            .total_rewardable
            .checked_add(units)
            .ok_or(ErrorCode::MathOverflow)?;
        self.principal_shortfall = self
            .total_principal
            .checked_sub(new_backing)
            .ok_or(ErrorCode::MathOverflow)?;

        Ok(units)
    }

    /// Debit `amount` principal units from `position`. Only possible while Idle.
    /// Returns the tokens to pay out, which is `amount` unless a shortfall
    /// impaired the pool.
    pub fn withdraw_principal(&mut self, position: &mut DepositorPosition, amount: u64) -> Result<u64> {
        require!(amount > 0, ErrorCode::InvalidAmount);
        require!(self.state == PoolState::Idle, ErrorCode::FundsStaked);
        require!(amount <= position.principal, ErrorCode::InsufficientPrincipal);

        let backing = self.principal_backing();
        let payout = math::tokens_for_units(amount, self.total_principal, backing)?;

        self.settle(position)?;

        position.principal -= amount;
        if position.principal == 0 {
            self.depositor_count = self.depositor_count.saturating_sub(1);
        }
        self.total_principal = self
            .total_principal
            .checked_sub(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        self.total_rewardable = self
            .total_rewardable
            .checked_sub(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        let new_backing = backing
            .checked_sub(payout)
            .ok_or(ErrorCode::MathOverflow)?;
        self.principal_shortfall = self
            .total_principal
            .checked_sub(new_backing)
            .ok_or(ErrorCode::MathOverflow)?;

        Ok(payout)
    }

    /// Settle and zero the position's reward. Returns the amount to pay out.
    pub fn claim_reward(&self, position: &mut DepositorPosition) -> Result<u64> {
        self.settle(position)?;
        let amount = position.accrued_reward;
        position.accrued_reward = 0;
        position.total_claimed = position.total_claimed.saturating_add(amount);
        Ok(amount)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rewards
    // ─────────────────────────────────────────────────────────────────────

    /// Split a gross inflow and fold the depositor share into the accumulator.
    ///
    /// A zero inflow is a no-op. A non-zero inflow with nobody to credit
    /// fails with `NoStakers` so the caller's claim reverts and can be retried.
    pub fn distribute_rewards(&mut self, gross: u64) -> Result<FeeSplit> {
        if gross == 0 {
            return Ok(FeeSplit::default());
        }
        require!(self.total_rewardable > 0, ErrorCode::NoStakers);

        let split = math::split_reward(gross, self.protocol_fee_bps, self.operator_fee_bps)?;
        let (delta, remainder) = math::reward_per_unit_delta(
            split.distributable,
            self.reward_remainder,
            self.total_rewardable,
        )?;

        self.reward_per_unit_stored = self
            .reward_per_unit_stored
            .checked_add(delta)
            .ok_or(ErrorCode::MathOverflow)?;
        self.reward_remainder = remainder;
        self.total_rewards_distributed = self
            .total_rewards_distributed
            .saturating_add(split.distributable);
        self.total_protocol_fees = self.total_protocol_fees.saturating_add(split.protocol_fee);
        self.total_operator_fees = self.total_operator_fees.saturating_add(split.operator_fee);

        Ok(split)
    }

    /// Owner-only: lower the operator fee. Returns the previous rate.
    pub fn set_operator_fee_rate(&mut self, new_bps: u16) -> Result<u16> {
        require!(new_bps < self.operator_fee_bps, ErrorCode::FeeRateNotDecreasing);
        let old = self.operator_fee_bps;
        self.operator_fee_bps = new_bps;
        Ok(old)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Idle -> Active. Returns the amount to stake (every backing token).
    pub fn begin_stake(&mut self) -> Result<u64> {
        require!(self.state == PoolState::Idle, ErrorCode::NotIdle);
        let amount = self.principal_backing();
        require!(amount > 0, ErrorCode::InvalidAmount);
        self.state = PoolState::Active;
        Ok(amount)
    }

    /// Arm an unstake at the current Mining System epoch
    pub fn request_unstake(&mut self, current_epoch: u64) -> Result<()> {
        require!(self.state == PoolState::Active, ErrorCode::NotActive);
        require!(self.unstake_request_epoch.is_none(), ErrorCode::UnstakeAlreadyRequested);
        self.unstake_request_epoch = Some(current_epoch);
        Ok(())
    }

    /// Active -> Unstaking, only once the epoch of the request has ended.
    /// Returns the epoch the request was made in.
    pub fn execute_unstake(&mut self, current_epoch: u64) -> Result<u64> {
        require!(self.state == PoolState::Active, ErrorCode::NotActive);
        let requested = self
            .unstake_request_epoch
            .ok_or(ErrorCode::NoUnstakeRequest)?;
        require!(current_epoch > requested, ErrorCode::EpochNotElapsed);

        self.unstake_request_epoch = None;
        self.state = PoolState::Unstaking;
        Ok(requested)
    }

    /// Unstaking -> Active while the cooldown is still running
    pub fn cancel_unstake(&mut self, now: i64, withdrawable_at: i64) -> Result<()> {
        require!(self.state == PoolState::Unstaking, ErrorCode::NotUnstaking);
        require!(now < withdrawable_at, ErrorCode::CooldownExpired);
        self.state = PoolState::Active;
        Ok(())
    }

    /// Unstaking -> Idle once the cooldown has expired
    pub fn finalize_withdraw(&mut self, now: i64, withdrawable_at: i64) -> Result<()> {
        require!(self.state == PoolState::Unstaking, ErrorCode::NotUnstaking);
        require!(now >= withdrawable_at, ErrorCode::CooldownNotExpired);
        self.state = PoolState::Idle;
        Ok(())
    }

    /// Reconcile what the Mining System paid back against the staked backing.
    ///
    /// Never fails on a mismatch. Anything above the backing is returned as
    /// `surplus` for the reward path. Anything below is booked as
    /// `principal_shortfall`, which every unit shares pro rata.
    pub fn reconcile_returned_principal(&mut self, returned: u64) -> Result<ReturnedPrincipal> {
        let staked = self.principal_backing();
        if returned >= staked {
            return Ok(ReturnedPrincipal {
                staked,
                surplus: returned - staked,
                shortfall: 0,
            });
        }

        let shortfall = staked - returned;
        self.principal_shortfall = self
            .principal_shortfall
            .checked_add(shortfall)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(ReturnedPrincipal {
            staked,
            surplus: 0,
            shortfall,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Delegated authorization
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_operator(&mut self, operator: Pubkey, operator_key: [u8; 20]) -> Pubkey {
        let old = self.operator;
        self.operator = operator;
        self.operator_key = operator_key;
        old
    }

    /// First step of an ownership transfer. Overwrites any earlier proposal.
    pub fn propose_owner(&mut self, new_owner: Pubkey) {
        self.pending_owner = Some(new_owner);
    }

    /// Second step: only the proposed owner may complete. Returns the previous owner.
    pub fn accept_ownership(&mut self, signer: &Pubkey) -> Result<Pubkey> {
        let pending = self.pending_owner.ok_or(ErrorCode::NoPendingOwner)?;
        require_keys_eq!(*signer, pending, ErrorCode::NotOwner);
        let old = self.owner;
        self.owner = pending;
        self.pending_owner = None;
        Ok(old)
    }

    pub fn is_action_allowed(&self, code: &[u8; ACTION_CODE_LEN]) -> bool {
        self.allowed_action_codes.iter().any(|c| c == code)
    }

    pub fn is_reserved_action(code: &[u8; ACTION_CODE_LEN]) -> bool {
        RESERVED_ACTION_CODES.iter().any(|c| c == code)
    }

    /// Add or remove an action code. Idempotent in both directions.
    /// Codes of calls the pool makes itself cannot be added.
    pub fn set_allowed_action(&mut self, code: [u8; ACTION_CODE_LEN], allowed: bool) -> Result<()> {
        if allowed {
            require!(!Self::is_reserved_action(&code), ErrorCode::ActionReserved);
            if !self.is_action_allowed(&code) {
                require!(
                    self.allowed_action_codes.len() < MAX_ALLOWED_ACTIONS,
                    ErrorCode::WhitelistFull
                );
                self.allowed_action_codes.push(code);
            }
        } else {
            self.allowed_action_codes.retain(|c| *c != code);
        }
        Ok(())
    }

    /// Action code of a forwarded payload, if whitelisted
    pub fn check_forwarded_action(&self, payload: &[u8]) -> Result<[u8; ACTION_CODE_LEN]> {
        require!(payload.len() >= ACTION_CODE_LEN, ErrorCode::ActionNotWhitelisted);
        let mut code = [0u8; ACTION_CODE_LEN];
        code.copy_from_slice(&payload[..ACTION_CODE_LEN]);
        require!(!Self::is_reserved_action(&code), ErrorCode::ActionReserved);
        require!(self.is_action_allowed(&code), ErrorCode::ActionNotWhitelisted);
        Ok(code)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Views
    // ─────────────────────────────────────────────────────────────────────

    pub fn position_summary(&self, position: &DepositorPosition) -> Result<PositionSummary> {
        Ok(PositionSummary {
            principal: position.principal,
            redeemable: math::tokens_for_units(
                position.principal,
                self.total_principal,
                self.principal_backing(),
            )?,
            pending_reward: self.earned(position)?,
            share_of_pool_bps: math::share_of_pool_bps(position.principal, self.total_principal),
        })
    }

    pub fn summary(&self, miner: &MinerView, config: &MiningConfigView) -> PoolSummary {
        PoolSummary {
            state: self.state,
            staked_amount: miner.staked_amount,
            total_principal: self.total_principal,
            principal_backing: self.principal_backing(),
            total_rewardable: self.total_rewardable,
            current_epoch: config.current_epoch,
            eligible: miner.eligible,
            cooldown_end: if self.state == PoolState::Unstaking {
                miner.withdrawable_at
            } else {
                0
            },
        }
    }
}
