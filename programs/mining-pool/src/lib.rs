use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount};

declare_id!("5U5rKFGwWL2ghNBxhwN2CwRjLXdVkrh5tFYZNx47UVSi");

pub mod constants;
pub mod errors;
pub mod events;
pub mod state;
pub mod helpers;
pub mod contexts;

mod formal_verification;

use constants::*;
use errors::ErrorCode;
use events::*;
use state::*;
use contexts::*;
use helpers::cpi::*;
use helpers::math::FeeSplit;
use helpers::mining::{MinerView, MiningConfigView};
use helpers::signature::{verify_operator_signature, Secp256k1Recovery};

/// Pool creation parameters supplied by the registry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitializePoolArgs {
    pub operator: Pubkey,
    pub operator_key: [u8; 20],
    pub operator_fee_bps: u16,
    pub protocol_fee_recipient: Pubkey,
    pub protocol_fee_bps: u16,
    /// 0 = only the Mining System cap applies
    pub pool_cap: u64,
}

/// Pay protocol and operator cuts of a reward inflow out of the vault
#[inline(never)]
fn pay_fees<'info>(
    split: &FeeSplit,
    token_program: &AccountInfo<'info>,
    vault: &AccountInfo<'info>,
    mint: &InterfaceAccount<'info, Mint>,
    protocol_fee_account: &AccountInfo<'info>,
    operator_fee_account: &AccountInfo<'info>,
    pool_authority: &AccountInfo<'info>,
    seeds: &[&[u8]],
) -> Result<()> {
    let mint_info = mint.to_account_info();
    transfer_from_vault(
        token_program,
        vault,
        &mint_info,
        protocol_fee_account,
        pool_authority,
        split.protocol_fee,
        mint.decimals,
        seeds,
    )?;
    transfer_from_vault(
        token_program,
        vault,
        &mint_info,
        operator_fee_account,
        pool_authority,
        split.operator_fee,
        mint.decimals,
        seeds,
    )
}

/// Vault balance gained across a claim CPI. A shrinking vault means the
/// callee misbehaved.
fn measure_inflow(vault: &mut InterfaceAccount<'_, TokenAccount>, before: u64) -> Result<u64> {
    vault.reload()?;
    vault
        .amount
        .checked_sub(before)
        .ok_or(ErrorCode::ExternalCallFailed.into())
}

#[program]
pub mod mining_pool {
    use super::*;

    pub fn initialize_pool(ctx: Context<InitializePool>, args: InitializePoolArgs) -> Result<()> {
        let config = MiningConfigView::load(
            &ctx.accounts.mining_config,
            ctx.accounts.mining_system.key,
        )?;
        Pool::validate_fee_rates(args.operator_fee_bps, args.protocol_fee_bps)?;
        Pool::validate_pool_cap(args.pool_cap, config.max_stake)?;

        let pool = &mut ctx.accounts.pool;
        let clock = Clock::get()?;

        pool.owner = ctx.accounts.creator.key();
        pool.pending_owner = None;
        pool.creator = ctx.accounts.creator.key();
        pool.staking_mint = ctx.accounts.staking_mint.key();
        pool.vault = ctx.accounts.vault.key();
        pool.mining_system = ctx.accounts.mining_system.key();
        pool.mining_config = ctx.accounts.mining_config.key();
        pool.miner = Pubkey::default();
        pool.bonus_system = ctx.accounts.bonus_system.key();
        pool.operator = args.operator;
        pool.operator_key = args.operator_key;
        pool.protocol_fee_recipient = args.protocol_fee_recipient;
        pool.state = PoolState::Idle;
        pool.total_principal = 0;
        pool.total_rewardable = 0;
        pool.principal_shortfall = 0;
        pool.reward_per_unit_stored = 0;
        pool.reward_remainder = 0;
        pool.operator_fee_bps = args.operator_fee_bps;
        pool.protocol_fee_bps = args.protocol_fee_bps;
        pool.pool_cap = args.pool_cap;
        pool.unstake_request_epoch = None;
        pool.allowed_action_codes = Vec::new();
        pool.locked = false;
        pool.created_at = clock.unix_timestamp;
        pool.bump = ctx.bumps.pool;
        pool.authority_bump = ctx.bumps.pool_authority;

        msg!(
            "Pool created: mint={}, operator_fee={}bps, protocol_fee={}bps, cap={}",
            pool.staking_mint, pool.operator_fee_bps, pool.protocol_fee_bps, pool.pool_cap
        );

        emit!(PoolInitialized {
            pool: pool.key(),
            owner: pool.owner,
            staking_mint: pool.staking_mint,
            operator: pool.operator,
            operator_fee_bps: pool.operator_fee_bps,
            protocol_fee_bps: pool.protocol_fee_bps,
            pool_cap: pool.pool_cap,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LEDGER
    // ═══════════════════════════════════════════════════════════════════════

    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        let config = MiningConfigView::load(
            &ctx.accounts.mining_config,
            &ctx.accounts.pool.mining_system,
        )?;
        let pool = &mut ctx.accounts.pool;
        let position = &mut ctx.accounts.position;

        // Fresh position from init_if_needed
        if position.owner == Pubkey::default() {
            position.pool = pool.key();
            position.owner = ctx.accounts.depositor.key();
            position.bump = ctx.bumps.position;
        }

        pool.acquire_lock()?;
        let units = pool.deposit(position, amount, config.max_stake)?;
        pool.exit(&crate::ID)?;

        transfer_to_vault(
            &ctx.accounts.token_program.to_account_info(),
            &ctx.accounts.depositor_token_account.to_account_info(),
            &ctx.accounts.staking_mint.to_account_info(),
            &ctx.accounts.vault.to_account_info(),
            &ctx.accounts.depositor.to_account_info(),
            amount,
            ctx.accounts.staking_mint.decimals,
        )?;

        pool.release_lock();

        #[cfg(feature = "verbose")]
        msg!("Deposit: {} (position={}, total={})", amount, position.principal, pool.total_principal);

        emit!(Deposited {
            pool: pool.key(),
            depositor: position.owner,
            amount,
            units,
            principal: position.principal,
            total_principal: pool.total_principal,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    pub fn withdraw_principal(ctx: Context<DepositorAction>, amount: u64) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        let position = &mut ctx.accounts.position;
        let pool_key = pool.key();
        let bump = [pool.authority_bump];
        let seeds: &[&[u8]] = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &bump];

        pool.acquire_lock()?;
        let payout = pool.withdraw_principal(position, amount)?;
        pool.exit(&crate::ID)?;

        transfer_from_vault(
            &ctx.accounts.token_program.to_account_info(),
            &ctx.accounts.vault.to_account_info(),
            &ctx.accounts.staking_mint.to_account_info(),
            &ctx.accounts.destination.to_account_info(),
            &ctx.accounts.pool_authority,
            payout,
            ctx.accounts.staking_mint.decimals,
            seeds,
        )?;

        pool.release_lock();

        #[cfg(feature = "verbose")]
        msg!("Withdraw: {} units for {} tokens", amount, payout);

        emit!(PrincipalWithdrawn {
            pool: pool_key,
            depositor: position.owner,
            amount,
            payout,
            principal: position.principal,
            total_principal: pool.total_principal,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Pays out the caller's settled reward. Allowed in every lifecycle state.
    pub fn claim_reward(ctx: Context<DepositorAction>) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        let position = &mut ctx.accounts.position;
        let pool_key = pool.key();
        let bump = [pool.authority_bump];
        let seeds: &[&[u8]] = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &bump];

        pool.acquire_lock()?;
        let amount = pool.claim_reward(position)?;
        if amount == 0 {
            pool.release_lock();
            msg!("Nothing to claim");
            return Ok(());
        }
        pool.exit(&crate::ID)?;

        transfer_from_vault(
            &ctx.accounts.token_program.to_account_info(),
            &ctx.accounts.vault.to_account_info(),
            &ctx.accounts.staking_mint.to_account_info(),
            &ctx.accounts.destination.to_account_info(),
            &ctx.accounts.pool_authority,
            amount,
            ctx.accounts.staking_mint.decimals,
            seeds,
        )?;

        pool.release_lock();

        emit!(RewardClaimed {
            pool: pool_key,
            depositor: position.owner,
            amount,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════

    /// Idle -> Active: stakes the whole principal into the Mining System
    pub fn stake_into_mining(ctx: Context<StakeIntoMining>) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        let pool_key = pool.key();
        let bump = [pool.authority_bump];
        let seeds: &[&[u8]] = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &bump];

        let amount = pool.begin_stake()?;
        pool.acquire_lock()?;
        pool.exit(&crate::ID)?;

        mining_stake_cpi(
            &ctx.accounts.mining_system,
            &ctx.accounts.miner,
            &ctx.accounts.mining_config,
            &ctx.accounts.pool_authority,
            &ctx.accounts.vault.to_account_info(),
            &ctx.accounts.mining_vault,
            &ctx.accounts.staking_mint.to_account_info(),
            &ctx.accounts.token_program.to_account_info(),
            &ctx.accounts.system_program.to_account_info(),
            amount,
            seeds,
        )?;

        let miner = MinerView::load(
            &ctx.accounts.miner,
            &pool.mining_system,
            ctx.accounts.pool_authority.key,
        )?;
        require!(miner.staked_amount >= amount, ErrorCode::ExternalCallFailed);
        pool.pin_miner(ctx.accounts.miner.key())?;
        let config = MiningConfigView::load(&ctx.accounts.mining_config, &pool.mining_system)?;

        pool.release_lock();

        msg!("Staked {} at epoch {}", amount, config.current_epoch);

        let clock = Clock::get()?;
        emit!(StateChanged {
            pool: pool_key,
            from: PoolState::Idle,
            to: PoolState::Active,
            caller: ctx.accounts.caller.key(),
            timestamp: clock.unix_timestamp,
        });
        emit!(StakedIntoMining {
            pool: pool_key,
            amount,
            epoch: config.current_epoch,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    /// Arms an unstake for the next epoch boundary. Does not change state.
    pub fn request_unstake(ctx: Context<Lifecycle>) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        let config = MiningConfigView::load(&ctx.accounts.mining_config, &pool.mining_system)?;

        pool.request_unstake(config.current_epoch)?;

        emit!(UnstakeRequested {
            pool: pool.key(),
            epoch: config.current_epoch,
            caller: ctx.accounts.caller.key(),
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Active -> Unstaking once the request epoch has ended
    pub fn execute_unstake(ctx: Context<Lifecycle>) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        let pool_key = pool.key();
        let bump = [pool.authority_bump];
        let seeds: &[&[u8]] = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &bump];

        let config = MiningConfigView::load(&ctx.accounts.mining_config, &pool.mining_system)?;
        let requested = pool.execute_unstake(config.current_epoch)?;
        pool.acquire_lock()?;
        pool.exit(&crate::ID)?;

        mining_cooldown_cpi(
            &ctx.accounts.mining_system,
            &ctx.accounts.miner,
            &ctx.accounts.mining_config,
            &ctx.accounts.pool_authority,
            &MINING_UNSTAKE_DISCRIMINATOR,
            seeds,
        )?;

        let miner = MinerView::load(
            &ctx.accounts.miner,
            &pool.mining_system,
            ctx.accounts.pool_authority.key,
        )?;

        pool.release_lock();

        msg!(
            "Unstake executed (requested epoch {}, now {}), withdrawable at {}",
            requested, config.current_epoch, miner.withdrawable_at
        );

        let clock = Clock::get()?;
        emit!(StateChanged {
            pool: pool_key,
            from: PoolState::Active,
            to: PoolState::Unstaking,
            caller: ctx.accounts.caller.key(),
            timestamp: clock.unix_timestamp,
        });
        emit!(UnstakeExecuted {
            pool: pool_key,
            epoch: config.current_epoch,
            withdrawable_at: miner.withdrawable_at,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    /// Unstaking -> Active. Owner or operator only.
    pub fn cancel_unstake(ctx: Context<Lifecycle>) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        let pool_key = pool.key();
        let bump = [pool.authority_bump];
        let seeds: &[&[u8]] = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &bump];

        pool.require_owner_or_operator(ctx.accounts.caller.key)?;
        let miner = MinerView::load(
            &ctx.accounts.miner,
            &pool.mining_system,
            ctx.accounts.pool_authority.key,
        )?;
        let clock = Clock::get()?;

        pool.cancel_unstake(clock.unix_timestamp, miner.withdrawable_at)?;
        pool.acquire_lock()?;
        pool.exit(&crate::ID)?;

        mining_cooldown_cpi(
            &ctx.accounts.mining_system,
            &ctx.accounts.miner,
            &ctx.accounts.mining_config,
            &ctx.accounts.pool_authority,
            &MINING_CANCEL_UNSTAKE_DISCRIMINATOR,
            seeds,
        )?;

        pool.release_lock();

        emit!(StateChanged {
            pool: pool_key,
            from: PoolState::Unstaking,
            to: PoolState::Active,
            caller: ctx.accounts.caller.key(),
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    /// Unstaking -> Idle once the cooldown has expired. Principal returns to the vault.
    ///
    /// Always lands in Idle once the Mining System pays out: a surplus is
    /// distributed like a reward, a shortfall is shared by every position.
    pub fn finalize_withdraw(ctx: Context<FinalizeWithdraw>) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        let pool_key = pool.key();
        let bump = [pool.authority_bump];
        let seeds: &[&[u8]] = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &bump];

        let miner = MinerView::load(
            &ctx.accounts.miner,
            &pool.mining_system,
            ctx.accounts.pool_authority.key,
        )?;
        let clock = Clock::get()?;

        pool.finalize_withdraw(clock.unix_timestamp, miner.withdrawable_at)?;
        pool.acquire_lock()?;
        pool.exit(&crate::ID)?;

        let before = ctx.accounts.vault.amount;
        payout_to_vault_cpi(
            &ctx.accounts.mining_system,
            &ctx.accounts.miner,
            &ctx.accounts.mining_config,
            &ctx.accounts.pool_authority,
            &ctx.accounts.vault.to_account_info(),
            &ctx.accounts.mining_vault,
            &ctx.accounts.staking_mint.to_account_info(),
            &ctx.accounts.token_program.to_account_info(),
            withdraw_data(),
            seeds,
        )?;
        let returned = measure_inflow(&mut ctx.accounts.vault, before)?;
        let reconciled = pool.reconcile_returned_principal(returned)?;

        let split = pool.distribute_rewards(reconciled.surplus)?;
        pay_fees(
            &split,
            &ctx.accounts.token_program.to_account_info(),
            &ctx.accounts.vault.to_account_info(),
            &ctx.accounts.staking_mint,
            &ctx.accounts.protocol_fee_account.to_account_info(),
            &ctx.accounts.operator_fee_account.to_account_info(),
            &ctx.accounts.pool_authority,
            seeds,
        )?;

        pool.release_lock();

        msg!(
            "Withdraw finalized: staked={}, returned={}",
            reconciled.staked, returned
        );

        emit!(StateChanged {
            pool: pool_key,
            from: PoolState::Unstaking,
            to: PoolState::Idle,
            caller: ctx.accounts.caller.key(),
            timestamp: clock.unix_timestamp,
        });
        emit!(WithdrawFinalized {
            pool: pool_key,
            returned,
            total_principal: pool.total_principal,
            surplus: reconciled.surplus,
            timestamp: clock.unix_timestamp,
        });
        if reconciled.surplus > 0 {
            emit!(RewardsDistributed {
                pool: pool_key,
                gross: reconciled.surplus,
                protocol_fee: split.protocol_fee,
                operator_fee: split.operator_fee,
                distributable: split.distributable,
                reward_per_unit_stored: pool.reward_per_unit_stored,
                is_bonus: false,
                timestamp: clock.unix_timestamp,
            });
        }
        if reconciled.shortfall > 0 {
            msg!("Principal shortfall: {}", reconciled.shortfall);
            emit!(PrincipalShortfall {
                pool: pool_key,
                staked: reconciled.staked,
                returned,
                shortfall: reconciled.shortfall,
                principal_backing: pool.principal_backing(),
                timestamp: clock.unix_timestamp,
            });
        }

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // REWARDS
    // ═══════════════════════════════════════════════════════════════════════

    /// Claims regular Mining System rewards and distributes the inflow
    pub fn claim_mining_rewards(ctx: Context<ClaimMiningRewards>, epoch_ids: Vec<u64>) -> Result<()> {
        require!(
            !epoch_ids.is_empty() && epoch_ids.len() <= MAX_CLAIM_EPOCHS,
            ErrorCode::InvalidAmount
        );
        let pool = &mut ctx.accounts.pool;
        let pool_key = pool.key();
        let bump = [pool.authority_bump];
        let seeds: &[&[u8]] = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &bump];

        pool.acquire_lock()?;
        pool.exit(&crate::ID)?;

        let before = ctx.accounts.vault.amount;
        payout_to_vault_cpi(
            &ctx.accounts.mining_system,
            &ctx.accounts.miner,
            &ctx.accounts.mining_config,
            &ctx.accounts.pool_authority,
            &ctx.accounts.vault.to_account_info(),
            &ctx.accounts.reward_vault,
            &ctx.accounts.staking_mint.to_account_info(),
            &ctx.accounts.token_program.to_account_info(),
            claim_data(&epoch_ids),
            seeds,
        )?;
        let gross = measure_inflow(&mut ctx.accounts.vault, before)?;

        let split = pool.distribute_rewards(gross)?;
        pay_fees(
            &split,
            &ctx.accounts.token_program.to_account_info(),
            &ctx.accounts.vault.to_account_info(),
            &ctx.accounts.staking_mint,
            &ctx.accounts.protocol_fee_account.to_account_info(),
            &ctx.accounts.operator_fee_account.to_account_info(),
            &ctx.accounts.pool_authority,
            seeds,
        )?;

        pool.release_lock();

        if gross == 0 {
            msg!("No mining rewards for {} epochs", epoch_ids.len());
            return Ok(());
        }

        msg!(
            "Mining rewards: gross={}, protocol={}, operator={}, depositors={}",
            gross, split.protocol_fee, split.operator_fee, split.distributable
        );

        emit!(RewardsDistributed {
            pool: pool_key,
            gross,
            protocol_fee: split.protocol_fee,
            operator_fee: split.operator_fee,
            distributable: split.distributable,
            reward_per_unit_stored: pool.reward_per_unit_stored,
            is_bonus: false,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Claims Bonus System rewards through the same fee path
    pub fn claim_bonus_rewards(ctx: Context<ClaimBonusRewards>, epoch_ids: Vec<u64>) -> Result<()> {
        require!(
            !epoch_ids.is_empty() && epoch_ids.len() <= MAX_CLAIM_EPOCHS,
            ErrorCode::InvalidAmount
        );
        let pool = &mut ctx.accounts.pool;
        let pool_key = pool.key();
        let bump = [pool.authority_bump];
        let seeds: &[&[u8]] = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &bump];

        pool.acquire_lock()?;
        pool.exit(&crate::ID)?;

        let before = ctx.accounts.vault.amount;
        payout_to_vault_cpi(
            &ctx.accounts.bonus_system,
            &ctx.accounts.miner,
            &ctx.accounts.bonus_state,
            &ctx.accounts.pool_authority,
            &ctx.accounts.vault.to_account_info(),
            &ctx.accounts.reward_vault,
            &ctx.accounts.staking_mint.to_account_info(),
            &ctx.accounts.token_program.to_account_info(),
            claim_bonus_data(&epoch_ids),
            seeds,
        )?;
        let gross = measure_inflow(&mut ctx.accounts.vault, before)?;

        let split = pool.distribute_rewards(gross)?;
        pay_fees(
            &split,
            &ctx.accounts.token_program.to_account_info(),
            &ctx.accounts.vault.to_account_info(),
            &ctx.accounts.staking_mint,
            &ctx.accounts.protocol_fee_account.to_account_info(),
            &ctx.accounts.operator_fee_account.to_account_info(),
            &ctx.accounts.pool_authority,
            seeds,
        )?;

        pool.release_lock();

        if gross == 0 {
            msg!("No bonus rewards for {} epochs", epoch_ids.len());
            return Ok(());
        }

        msg!(
            "Bonus rewards: gross={}, protocol={}, operator={}, depositors={}",
            gross, split.protocol_fee, split.operator_fee, split.distributable
        );

        emit!(RewardsDistributed {
            pool: pool_key,
            gross,
            protocol_fee: split.protocol_fee,
            operator_fee: split.operator_fee,
            distributable: split.distributable,
            reward_per_unit_stored: pool.reward_per_unit_stored,
            is_bonus: true,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DELEGATED AUTHORIZATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Operator forwards a whitelisted action to the Mining System.
    /// The leading 8 payload bytes are the action code.
    pub fn submit_forwarded<'info>(
        ctx: Context<'_, '_, 'info, 'info, SubmitForwarded<'info>>,
        payload: Vec<u8>,
    ) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        let pool_key = pool.key();
        let bump = [pool.authority_bump];
        let seeds: &[&[u8]] = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &bump];

        pool.require_operator(ctx.accounts.operator.key)?;
        let action_code = pool.check_forwarded_action(&payload)?;
        let payload_len = payload.len() as u32;

        pool.acquire_lock()?;
        pool.exit(&crate::ID)?;

        forward_cpi(
            &ctx.accounts.mining_system,
            &ctx.accounts.pool_authority,
            ctx.remaining_accounts,
            payload,
            seeds,
        )?;

        pool.release_lock();

        emit!(ForwardedSubmission {
            pool: pool_key,
            operator: ctx.accounts.operator.key(),
            action_code,
            payload_len,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Returns SIGNATURE_APPROVED when `signature` over `hash` was produced
    /// by the registered operator key, SIGNATURE_REJECTED otherwise.
    pub fn verify_signature(
        ctx: Context<VerifySignature>,
        hash: [u8; 32],
        signature: Vec<u8>,
    ) -> Result<[u8; 4]> {
        let result = verify_operator_signature(
            &Secp256k1Recovery,
            &ctx.accounts.pool.operator_key,
            &hash,
            &signature,
        );

        #[cfg(feature = "verbose")]
        msg!("Signature check: {:?}", result);

        Ok(result)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ADMIN
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_operator(
        ctx: Context<AdminControl>,
        operator: Pubkey,
        operator_key: [u8; 20],
    ) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        let old_operator = pool.set_operator(operator, operator_key);

        msg!("Operator: {} -> {}", old_operator, operator);

        emit!(OperatorChanged {
            pool: pool.key(),
            old_operator,
            new_operator: operator,
            operator_key,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    pub fn set_allowed_action(
        ctx: Context<AdminControl>,
        code: [u8; ACTION_CODE_LEN],
        allowed: bool,
    ) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        pool.set_allowed_action(code, allowed)?;

        emit!(AllowedActionUpdated {
            pool: pool.key(),
            code,
            allowed,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Operator fee can only go down
    pub fn set_operator_fee_rate(ctx: Context<AdminControl>, new_bps: u16) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        let old_bps = pool.set_operator_fee_rate(new_bps)?;

        msg!("Operator fee: {}bps -> {}bps", old_bps, new_bps);

        emit!(OperatorFeeRateLowered {
            pool: pool.key(),
            old_bps,
            new_bps,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    pub fn transfer_ownership(ctx: Context<AdminControl>, new_owner: Pubkey) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        pool.propose_owner(new_owner);

        emit!(OwnershipTransferInitiated {
            pool: pool.key(),
            owner: pool.owner,
            pending_owner: new_owner,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    pub fn accept_ownership(ctx: Context<AcceptOwnership>) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        let old_owner = pool.accept_ownership(ctx.accounts.new_owner.key)?;

        msg!("Ownership transferred: {} -> {}", old_owner, pool.owner);

        emit!(OwnershipTransferred {
            pool: pool.key(),
            old_owner,
            new_owner: pool.owner,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // VIEWS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn pool_summary(ctx: Context<PoolSummaryView>) -> Result<PoolSummary> {
        let pool = &ctx.accounts.pool;
        // Before the first stake the miner may not exist yet
        let miner = if pool.miner == Pubkey::default() {
            MinerView::load_or_empty(
                &ctx.accounts.miner,
                &pool.mining_system,
                ctx.accounts.pool_authority.key,
            )?
        } else {
            MinerView::load(
                &ctx.accounts.miner,
                &pool.mining_system,
                ctx.accounts.pool_authority.key,
            )?
        };
        let config = MiningConfigView::load(&ctx.accounts.mining_config, &pool.mining_system)?;
        Ok(pool.summary(&miner, &config))
    }

    pub fn position_summary(ctx: Context<PositionSummaryView>) -> Result<PositionSummary> {
        ctx.accounts.pool.position_summary(&ctx.accounts.position)
    }
}
