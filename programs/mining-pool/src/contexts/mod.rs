use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};
use crate::constants::*;
use crate::errors::ErrorCode;
use crate::state::*;

// ACCOUNTS - Instruction account validation structs

/// InitializePool - Registry entry point creating one pool and its vault
#[derive(Accounts)]
pub struct InitializePool<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,
    pub staking_mint: InterfaceAccount<'info, Mint>,
    #[account(
        init,
        payer = creator,
        space = 8 + Pool::LEN,
        seeds = [POOL_SEED, creator.key().as_ref(), staking_mint.key().as_ref()],
        bump
    )]
    pub pool: Account<'info, Pool>,
    /// CHECK: PDA signer for all Mining System calls, holds no data
    #[account(seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()], bump)]
    pub pool_authority: AccountInfo<'info>,
    #[account(
        init,
        payer = creator,
        associated_token::mint = staking_mint,
        associated_token::authority = pool_authority,
        associated_token::token_program = token_program
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,
    /// CHECK: Mining System program
    #[account(executable)]
    pub mining_system: AccountInfo<'info>,
    /// CHECK: Mining System config - owner checked here, layout decoded in handler
    #[account(constraint = mining_config.owner == mining_system.key @ ErrorCode::ExternalCallFailed)]
    pub mining_config: AccountInfo<'info>,
    /// CHECK: Bonus System program
    #[account(executable)]
    pub bonus_system: AccountInfo<'info>,
    pub token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// Deposit - Add principal while the pool is idle
#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(
        mut,
        seeds = [POOL_SEED, pool.creator.as_ref(), pool.staking_mint.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,
    #[account(
        init_if_needed,
        payer = depositor,
        space = 8 + DepositorPosition::LEN,
        seeds = [POSITION_SEED, pool.key().as_ref(), depositor.key().as_ref()],
        bump
    )]
    pub position: Account<'info, DepositorPosition>,
    #[account(mut, address = pool.vault)]
    pub vault: InterfaceAccount<'info, TokenAccount>,
    #[account(
        mut,
        token::mint = staking_mint,
        token::authority = depositor
    )]
    pub depositor_token_account: InterfaceAccount<'info, TokenAccount>,
    #[account(address = pool.staking_mint)]
    pub staking_mint: InterfaceAccount<'info, Mint>,
    /// CHECK: Mining System config (hard cap) - address pinned to pool config
    #[account(address = pool.mining_config)]
    pub mining_config: AccountInfo<'info>,
    #[account(mut)]
    pub depositor: Signer<'info>,
    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

/// DepositorAction - withdraw_principal and claim_reward
#[derive(Accounts)]
pub struct DepositorAction<'info> {
    #[account(
        mut,
        seeds = [POOL_SEED, pool.creator.as_ref(), pool.staking_mint.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,
    #[account(
        mut,
        seeds = [POSITION_SEED, pool.key().as_ref(), depositor.key().as_ref()],
        bump = position.bump,
        constraint = position.owner == depositor.key() @ ErrorCode::InvalidAccount
    )]
    pub position: Account<'info, DepositorPosition>,
    /// CHECK: PDA signer for vault transfers
    #[account(seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()], bump = pool.authority_bump)]
    pub pool_authority: AccountInfo<'info>,
    #[account(mut, address = pool.vault)]
    pub vault: InterfaceAccount<'info, TokenAccount>,
    #[account(mut, token::mint = staking_mint)]
    pub destination: InterfaceAccount<'info, TokenAccount>,
    #[account(address = pool.staking_mint)]
    pub staking_mint: InterfaceAccount<'info, Mint>,
    pub depositor: Signer<'info>,
    pub token_program: Interface<'info, TokenInterface>,
}

/// StakeIntoMining - Push all principal into the Mining System
///
/// SECURITY NOTES:
/// - miner: owner and authority verified in handler after the CPI
/// - mining_vault: validated by the Mining System during CPI
#[derive(Accounts)]
pub struct StakeIntoMining<'info> {
    #[account(
        mut,
        seeds = [POOL_SEED, pool.creator.as_ref(), pool.staking_mint.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,
    /// CHECK: PDA miner identity
    #[account(mut, seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()], bump = pool.authority_bump)]
    pub pool_authority: AccountInfo<'info>,
    #[account(mut, address = pool.vault)]
    pub vault: InterfaceAccount<'info, TokenAccount>,
    #[account(address = pool.staking_mint)]
    pub staking_mint: InterfaceAccount<'info, Mint>,
    /// CHECK: Mining System program - address pinned to pool config
    #[account(address = pool.mining_system)]
    pub mining_system: AccountInfo<'info>,
    /// CHECK: Mining System config - address pinned to pool config
    #[account(address = pool.mining_config)]
    pub mining_config: AccountInfo<'info>,
    /// CHECK: Pool's miner account - pinned after the first stake, verified in handler
    #[account(mut, constraint = pool.accepts_miner(miner.key) @ ErrorCode::InvalidAccount)]
    pub miner: AccountInfo<'info>,
    /// CHECK: Mining System stake vault - validated by the Mining System during CPI
    #[account(mut)]
    pub mining_vault: AccountInfo<'info>,
    pub caller: Signer<'info>,
    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

/// Lifecycle - request_unstake, execute_unstake, cancel_unstake
#[derive(Accounts)]
pub struct Lifecycle<'info> {
    #[account(
        mut,
        seeds = [POOL_SEED, pool.creator.as_ref(), pool.staking_mint.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,
    /// CHECK: PDA miner identity
    #[account(seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()], bump = pool.authority_bump)]
    pub pool_authority: AccountInfo<'info>,
    /// CHECK: Mining System program - address pinned to pool config
    #[account(address = pool.mining_system)]
    pub mining_system: AccountInfo<'info>,
    /// CHECK: Mining System config - address pinned to pool config
    #[account(address = pool.mining_config)]
    pub mining_config: AccountInfo<'info>,
    /// CHECK: Pool's miner account - pinned, layout verified in handler
    #[account(mut, constraint = pool.accepts_miner(miner.key) @ ErrorCode::InvalidAccount)]
    pub miner: AccountInfo<'info>,
    pub caller: Signer<'info>,
}

/// FinalizeWithdraw - Pull principal back once the cooldown has expired
#[derive(Accounts)]
pub struct FinalizeWithdraw<'info> {
    #[account(
        mut,
        seeds = [POOL_SEED, pool.creator.as_ref(), pool.staking_mint.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,
    /// CHECK: PDA miner identity
    #[account(seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()], bump = pool.authority_bump)]
    pub pool_authority: AccountInfo<'info>,
    #[account(mut, address = pool.vault)]
    pub vault: InterfaceAccount<'info, TokenAccount>,
    #[account(address = pool.staking_mint)]
    pub staking_mint: InterfaceAccount<'info, Mint>,
    /// CHECK: Mining System program - address pinned to pool config
    #[account(address = pool.mining_system)]
    pub mining_system: AccountInfo<'info>,
    /// CHECK: Mining System config - address pinned to pool config
    #[account(mut, address = pool.mining_config)]
    pub mining_config: AccountInfo<'info>,
    /// CHECK: Pool's miner account - pinned, layout verified in handler
    #[account(mut, constraint = pool.accepts_miner(miner.key) @ ErrorCode::InvalidAccount)]
    pub miner: AccountInfo<'info>,
    /// CHECK: Mining System stake vault - validated by the Mining System during CPI
    #[account(mut)]
    pub mining_vault: AccountInfo<'info>,
    /// Receives the protocol cut of any surplus
    #[account(
        mut,
        token::mint = staking_mint,
        constraint = protocol_fee_account.owner == pool.protocol_fee_recipient @ ErrorCode::InvalidAccount
    )]
    pub protocol_fee_account: InterfaceAccount<'info, TokenAccount>,
    #[account(
        mut,
        token::mint = staking_mint,
        constraint = operator_fee_account.owner == pool.operator @ ErrorCode::InvalidAccount
    )]
    pub operator_fee_account: InterfaceAccount<'info, TokenAccount>,
    pub caller: Signer<'info>,
    pub token_program: Interface<'info, TokenInterface>,
}

/// ClaimMiningRewards - Claim regular epoch rewards and distribute them
#[derive(Accounts)]
pub struct ClaimMiningRewards<'info> {
    #[account(
        mut,
        seeds = [POOL_SEED, pool.creator.as_ref(), pool.staking_mint.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,
    /// CHECK: PDA miner identity
    #[account(seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()], bump = pool.authority_bump)]
    pub pool_authority: AccountInfo<'info>,
    #[account(mut, address = pool.vault)]
    pub vault: InterfaceAccount<'info, TokenAccount>,
    #[account(address = pool.staking_mint)]
    pub staking_mint: InterfaceAccount<'info, Mint>,
    /// CHECK: Mining System program - address pinned to pool config
    #[account(address = pool.mining_system)]
    pub mining_system: AccountInfo<'info>,
    /// CHECK: Mining System config - address pinned to pool config
    #[account(mut, address = pool.mining_config)]
    pub mining_config: AccountInfo<'info>,
    /// CHECK: Pool's miner account - pinned, validated by the Mining System during CPI
    #[account(mut, constraint = pool.accepts_miner(miner.key) @ ErrorCode::InvalidAccount)]
    pub miner: AccountInfo<'info>,
    /// CHECK: Mining System reward vault - validated by the Mining System during CPI
    #[account(mut)]
    pub reward_vault: AccountInfo<'info>,
    #[account(
        mut,
        token::mint = staking_mint,
        constraint = protocol_fee_account.owner == pool.protocol_fee_recipient @ ErrorCode::InvalidAccount
    )]
    pub protocol_fee_account: InterfaceAccount<'info, TokenAccount>,
    #[account(
        mut,
        token::mint = staking_mint,
        constraint = operator_fee_account.owner == pool.operator @ ErrorCode::InvalidAccount
    )]
    pub operator_fee_account: InterfaceAccount<'info, TokenAccount>,
    pub caller: Signer<'info>,
    pub token_program: Interface<'info, TokenInterface>,
}

/// ClaimBonusRewards - Claim Bonus System rewards and distribute them
#[derive(Accounts)]
pub struct ClaimBonusRewards<'info> {
    #[account(
        mut,
        seeds = [POOL_SEED, pool.creator.as_ref(), pool.staking_mint.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,
    /// CHECK: PDA miner identity
    #[account(seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()], bump = pool.authority_bump)]
    pub pool_authority: AccountInfo<'info>,
    #[account(mut, address = pool.vault)]
    pub vault: InterfaceAccount<'info, TokenAccount>,
    #[account(address = pool.staking_mint)]
    pub staking_mint: InterfaceAccount<'info, Mint>,
    /// CHECK: Bonus System program - address pinned to pool config
    #[account(address = pool.bonus_system)]
    pub bonus_system: AccountInfo<'info>,
    /// CHECK: Bonus System state - must be owned by the Bonus System
    #[account(mut, constraint = bonus_state.owner == &pool.bonus_system @ ErrorCode::ExternalCallFailed)]
    pub bonus_state: AccountInfo<'info>,
    /// CHECK: Pool's miner account - pinned, validated by the Bonus System during CPI
    #[account(mut, constraint = pool.accepts_miner(miner.key) @ ErrorCode::InvalidAccount)]
    pub miner: AccountInfo<'info>,
    /// CHECK: Bonus System reward vault - validated by the Bonus System during CPI
    #[account(mut)]
    pub reward_vault: AccountInfo<'info>,
    #[account(
        mut,
        token::mint = staking_mint,
        constraint = protocol_fee_account.owner == pool.protocol_fee_recipient @ ErrorCode::InvalidAccount
    )]
    pub protocol_fee_account: InterfaceAccount<'info, TokenAccount>,
    #[account(
        mut,
        token::mint = staking_mint,
        constraint = operator_fee_account.owner == pool.operator @ ErrorCode::InvalidAccount
    )]
    pub operator_fee_account: InterfaceAccount<'info, TokenAccount>,
    pub caller: Signer<'info>,
    pub token_program: Interface<'info, TokenInterface>,
}

/// SubmitForwarded - Operator forwards a whitelisted payload to the Mining System.
/// Accounts for the forwarded instruction are passed as remaining accounts.
#[derive(Accounts)]
pub struct SubmitForwarded<'info> {
    #[account(
        mut,
        seeds = [POOL_SEED, pool.creator.as_ref(), pool.staking_mint.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,
    /// CHECK: PDA miner identity
    #[account(seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()], bump = pool.authority_bump)]
    pub pool_authority: AccountInfo<'info>,
    /// CHECK: Mining System program - address pinned to pool config
    #[account(address = pool.mining_system)]
    pub mining_system: AccountInfo<'info>,
    pub operator: Signer<'info>,
}

/// VerifySignature - Read-only delegated signature check
#[derive(Accounts)]
pub struct VerifySignature<'info> {
    pub pool: Account<'info, Pool>,
}

/// AdminControl - Owner-only configuration
#[derive(Accounts)]
pub struct AdminControl<'info> {
    #[account(
        mut,
        seeds = [POOL_SEED, pool.creator.as_ref(), pool.staking_mint.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,
    #[account(constraint = owner.key() == pool.owner @ ErrorCode::NotOwner)]
    pub owner: Signer<'info>,
}

/// AcceptOwnership - Second step of the ownership transfer
#[derive(Accounts)]
pub struct AcceptOwnership<'info> {
    #[account(
        mut,
        seeds = [POOL_SEED, pool.creator.as_ref(), pool.staking_mint.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,
    pub new_owner: Signer<'info>,
}

/// PoolSummaryView - Dashboard aggregate read
#[derive(Accounts)]
pub struct PoolSummaryView<'info> {
    pub pool: Account<'info, Pool>,
    /// CHECK: PDA miner identity
    #[account(seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()], bump = pool.authority_bump)]
    pub pool_authority: AccountInfo<'info>,
    /// CHECK: Mining System config - address pinned to pool config
    #[account(address = pool.mining_config)]
    pub mining_config: AccountInfo<'info>,
    /// CHECK: Pool's miner account - pinned, layout verified in handler
    #[account(constraint = pool.accepts_miner(miner.key) @ ErrorCode::InvalidAccount)]
    pub miner: AccountInfo<'info>,
}

/// PositionSummaryView - Dashboard per-depositor read
#[derive(Accounts)]
pub struct PositionSummaryView<'info> {
    pub pool: Account<'info, Pool>,
    #[account(constraint = position.pool == pool.key() @ ErrorCode::InvalidAccount)]
    pub position: Account<'info, DepositorPosition>,
}
