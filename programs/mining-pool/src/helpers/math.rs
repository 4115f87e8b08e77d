use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::ErrorCode;

/// Result of splitting a gross reward inflow.
/// protocol_fee + operator_fee + distributable == gross, always.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeSplit {
    pub protocol_fee: u64,
    pub operator_fee: u64,
    pub distributable: u64,
}

/// floor(amount * bps / 10000)
pub fn apply_bps(amount: u64, bps: u16) -> Result<u64> {
    let scaled = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(ErrorCode::MathOverflow)?
        / BPS_DENOMINATOR as u128;
    u64::try_from(scaled).map_err(|_| error!(ErrorCode::MathOverflow))
}

/// Cascading fee split: the protocol cut comes off the gross amount,
/// the operator cut comes off what remains.
///
/// ```text
/// protocol      = floor(gross * protocol_bps / 10000)
/// operator      = floor((gross - protocol) * operator_bps / 10000)
/// distributable = gross - protocol - operator
/// ```
pub fn split_reward(gross: u64, protocol_fee_bps: u16, operator_fee_bps: u16) -> Result<FeeSplit> {
    require!(
        protocol_fee_bps as u64 <= BPS_DENOMINATOR && operator_fee_bps as u64 <= BPS_DENOMINATOR,
        ErrorCode::FeeRateTooHigh
    );

    let protocol_fee = apply_bps(gross, protocol_fee_bps)?;
    let after_protocol = gross
        .checked_sub(protocol_fee)
        .ok_or(ErrorCode::MathOverflow)?;
    let operator_fee = apply_bps(after_protocol, operator_fee_bps)?;
    let distributable = after_protocol
        .checked_sub(operator_fee)
        .ok_or(ErrorCode::MathOverflow)?;

    #[cfg(feature = "verbose")]
    msg!(
        "split_reward: gross={}, protocol={}, operator={}, distributable={}",
        gross, protocol_fee, operator_fee, distributable
    );

    Ok(FeeSplit {
        protocol_fee,
        operator_fee,
        distributable,
    })
}

/// Accumulator increment for a distributable amount.
///
/// `remainder` is the scaled dust left over by the previous update; it is
/// added to the numerator so rounding never loses value across updates.
/// Returns `(delta, new_remainder)`.
pub fn reward_per_unit_delta(
    distributable: u64,
    remainder: u128,
    total_rewardable: u64,
) -> Result<(u128, u128)> {
    require!(total_rewardable > 0, ErrorCode::NoStakers);

    let scaled = (distributable as u128)
        .checked_mul(SCALE)
        .ok_or(ErrorCode::MathOverflow)?
        .checked_add(remainder)
        .ok_or(ErrorCode::MathOverflow)?;
    let denominator = total_rewardable as u128;

    Ok((scaled / denominator, scaled % denominator))
}

/// Reward accrued by `principal` between two accumulator snapshots.
/// `principal * (stored - paid) / SCALE`, floored.
pub fn pending_reward(principal: u64, reward_per_unit_stored: u128, reward_per_unit_paid: u128) -> Result<u64> {
    let delta = reward_per_unit_stored
        .checked_sub(reward_per_unit_paid)
        .ok_or(ErrorCode::MathOverflow)?;
    let owed = (principal as u128)
        .checked_mul(delta)
        .ok_or(ErrorCode::MathOverflow)?
        / SCALE;
    u64::try_from(owed).map_err(|_| error!(ErrorCode::MathOverflow))
}

/// floor(a * b / c) over u128
fn mul_div(a: u64, b: u64, c: u64) -> Result<u64> {
    require!(c > 0, ErrorCode::MathOverflow);
    let value = (a as u128)
        .checked_mul(b as u128)
        .ok_or(ErrorCode::MathOverflow)?
        / c as u128;
    u64::try_from(value).map_err(|_| error!(ErrorCode::MathOverflow))
}

/// Principal units credited for `amount` tokens.
///
/// Units and tokens are 1:1 until a Mining System shortfall leaves fewer
/// tokens (`backing`) than units. New deposits then buy units at the
/// impaired rate so they do not absorb the earlier loss.
pub fn units_for_deposit(amount: u64, total_units: u64, backing: u64) -> Result<u64> {
    if backing == total_units {
        return Ok(amount);
    }
    require!(backing > 0, ErrorCode::PrincipalImpaired);
    mul_div(amount, total_units, backing)
}

/// Tokens paid out for redeeming `units` (floored, rounding stays with the pool)
pub fn tokens_for_units(units: u64, total_units: u64, backing: u64) -> Result<u64> {
    if backing == total_units {
        return Ok(units);
    }
    mul_div(units, backing, total_units)
}

/// Share of the pool held by `principal`, in basis points (floored).
pub fn share_of_pool_bps(principal: u64, total_principal: u64) -> u64 {
    if total_principal == 0 {
        return 0;
    }
    ((principal as u128 * BPS_DENOMINATOR as u128) / total_principal as u128) as u64
}
