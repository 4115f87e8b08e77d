use anchor_lang::prelude::*;

/// Mining Pool Error Codes
///
/// Every failure leaves pool state unchanged: the runtime discards all
/// account writes of a failed instruction.
#[error_code]
pub enum ErrorCode {
    // Ledger
    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Pool is not idle")]
    NotIdle,

    #[msg("Pool is not active")]
    NotActive,

    #[msg("Pool is not unstaking")]
    NotUnstaking,

    #[msg("Deposit would exceed the pool cap")]
    CapExceeded,

    #[msg("Withdrawal exceeds deposited principal")]
    InsufficientPrincipal,

    #[msg("Principal is staked in the mining system - withdraw after unstake completes")]
    FundsStaked,

    // Lifecycle
    #[msg("Unstake already requested")]
    UnstakeAlreadyRequested,

    #[msg("No unstake request pending")]
    NoUnstakeRequest,

    #[msg("Epoch has not advanced since the unstake request")]
    EpochNotElapsed,

    #[msg("Cooldown not expired")]
    CooldownNotExpired,

    #[msg("Cooldown already expired - finalize instead")]
    CooldownExpired,

    // Rewards
    #[msg("No stakers to distribute rewards to")]
    NoStakers,

    #[msg("Fee rate exceeds ceiling")]
    FeeRateTooHigh,

    #[msg("Operator fee can only decrease")]
    FeeRateNotDecreasing,

    // Delegated authorization
    #[msg("Action not whitelisted")]
    ActionNotWhitelisted,

    #[msg("Action whitelist is full")]
    WhitelistFull,

    #[msg("Caller is not the operator")]
    NotOperator,

    #[msg("Caller is not the owner")]
    NotOwner,

    #[msg("No pending ownership transfer")]
    NoPendingOwner,

    // External
    #[msg("Mining system call failed or returned unexpected state")]
    ExternalCallFailed,

    // Safety
    #[msg("Reentrant call rejected")]
    Reentrancy,

    #[msg("Math overflow")]
    MathOverflow,

    // Account validation
    #[msg("Account does not belong to this pool")]
    InvalidAccount,

    #[msg("Action code is reserved for pool-managed mining calls")]
    ActionReserved,

    #[msg("Principal fully lost - deposits reopen once every position has exited")]
    PrincipalImpaired,
}
