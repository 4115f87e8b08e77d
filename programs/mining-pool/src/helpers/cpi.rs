use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::invoke_signed;
use anchor_spl::token_interface::{self as token_interface, TransferChecked};
use crate::constants::*;

// Mining System CPIs. Every call is signed by the pool authority PDA, which is
// the pool's miner identity. A failing callee aborts the whole transaction
// with its own error, so nothing here maps or swallows CPI errors.

/// Instruction data for calls taking `epoch_ids: Vec<u64>` (borsh layout)
fn epoch_ids_data(discriminator: &[u8; 8], epoch_ids: &[u64]) -> Vec<u8> {
    let mut data = Vec::with_capacity(8 + 4 + 8 * epoch_ids.len());
    data.extend_from_slice(discriminator);
    data.extend_from_slice(&(epoch_ids.len() as u32).to_le_bytes());
    for epoch in epoch_ids {
        data.extend_from_slice(&epoch.to_le_bytes());
    }
    data
}

/// stake(amount): pool vault -> mining vault
#[inline(never)]
pub fn mining_stake_cpi<'info>(
    mining_system: &AccountInfo<'info>,
    miner: &AccountInfo<'info>,
    mining_config: &AccountInfo<'info>,
    pool_authority: &AccountInfo<'info>,
    pool_vault: &AccountInfo<'info>,
    mining_vault: &AccountInfo<'info>,
    staking_mint: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    amount: u64,
    seeds: &[&[u8]],
) -> Result<()> {
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&MINING_STAKE_DISCRIMINATOR);
    data.extend_from_slice(&amount.to_le_bytes());

    let ix = Instruction {
        program_id: mining_system.key(),
        accounts: vec![
            AccountMeta::new(miner.key(), false),
            AccountMeta::new_readonly(mining_config.key(), false),
            AccountMeta::new(pool_authority.key(), true),
            AccountMeta::new(pool_vault.key(), false),
            AccountMeta::new(mining_vault.key(), false),
            AccountMeta::new_readonly(staking_mint.key(), false),
            AccountMeta::new_readonly(token_program.key(), false),
            AccountMeta::new_readonly(system_program.key(), false),
        ],
        data,
    };

    invoke_signed(
        &ix,
        &[
            miner.clone(),
            mining_config.clone(),
            pool_authority.clone(),
            pool_vault.clone(),
            mining_vault.clone(),
            staking_mint.clone(),
            token_program.clone(),
            system_program.clone(),
            mining_system.clone(),
        ],
        &[seeds],
    )?;
    Ok(())
}

/// unstake() / cancel_unstake(): both only touch the miner account
#[inline(never)]
pub fn mining_cooldown_cpi<'info>(
    mining_system: &AccountInfo<'info>,
    miner: &AccountInfo<'info>,
    mining_config: &AccountInfo<'info>,
    pool_authority: &AccountInfo<'info>,
    discriminator: &[u8; 8],
    seeds: &[&[u8]],
) -> Result<()> {
    let ix = Instruction {
        program_id: mining_system.key(),
        accounts: vec![
            AccountMeta::new(miner.key(), false),
            AccountMeta::new_readonly(mining_config.key(), false),
            AccountMeta::new_readonly(pool_authority.key(), true),
        ],
        data: discriminator.to_vec(),
    };

    invoke_signed(
        &ix,
        &[
            miner.clone(),
            mining_config.clone(),
            pool_authority.clone(),
            mining_system.clone(),
        ],
        &[seeds],
    )?;
    Ok(())
}

/// Token-moving calls back into the pool vault: withdraw() and the two claims.
///
/// `state_account` is the Mining System config for withdraw/claim and the
/// Bonus System state for claim_bonus.
#[inline(never)]
pub fn payout_to_vault_cpi<'info>(
    program: &AccountInfo<'info>,
    miner: &AccountInfo<'info>,
    state_account: &AccountInfo<'info>,
    pool_authority: &AccountInfo<'info>,
    pool_vault: &AccountInfo<'info>,
    source_vault: &AccountInfo<'info>,
    staking_mint: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    data: Vec<u8>,
    seeds: &[&[u8]],
) -> Result<()> {
    let ix = Instruction {
        program_id: program.key(),
        accounts: vec![
            AccountMeta::new(miner.key(), false),
            AccountMeta::new(state_account.key(), false),
            AccountMeta::new_readonly(pool_authority.key(), true),
            AccountMeta::new(pool_vault.key(), false),
            AccountMeta::new(source_vault.key(), false),
            AccountMeta::new_readonly(staking_mint.key(), false),
            AccountMeta::new_readonly(token_program.key(), false),
        ],
        data,
    };

    invoke_signed(
        &ix,
        &[
            miner.clone(),
            state_account.clone(),
            pool_authority.clone(),
            pool_vault.clone(),
            source_vault.clone(),
            staking_mint.clone(),
            token_program.clone(),
            program.clone(),
        ],
        &[seeds],
    )?;
    Ok(())
}

pub fn withdraw_data() -> Vec<u8> {
    MINING_WITHDRAW_DISCRIMINATOR.to_vec()
}

pub fn claim_data(epoch_ids: &[u64]) -> Vec<u8> {
    epoch_ids_data(&MINING_CLAIM_DISCRIMINATOR, epoch_ids)
}

pub fn claim_bonus_data(epoch_ids: &[u64]) -> Vec<u8> {
    epoch_ids_data(&BONUS_CLAIM_DISCRIMINATOR, epoch_ids)
}

/// Forward an operator payload verbatim to the Mining System.
///
/// Accounts come from the caller's remaining accounts; the pool authority
/// is marked as signer wherever it appears.
#[inline(never)]
pub fn forward_cpi<'info>(
    mining_system: &AccountInfo<'info>,
    pool_authority: &AccountInfo<'info>,
    remaining_accounts: &[AccountInfo<'info>],
    payload: Vec<u8>,
    seeds: &[&[u8]],
) -> Result<()> {
    let authority_key = pool_authority.key();
    let accounts = remaining_accounts
        .iter()
        .map(|account| AccountMeta {
            pubkey: account.key(),
            is_signer: account.is_signer || account.key() == authority_key,
            is_writable: account.is_writable,
        })
        .collect();

    let ix = Instruction {
        program_id: mining_system.key(),
        accounts,
        data: payload,
    };

    let mut account_infos = Vec::with_capacity(remaining_accounts.len() + 2);
    account_infos.extend_from_slice(remaining_accounts);
    account_infos.push(pool_authority.clone());
    account_infos.push(mining_system.clone());

    invoke_signed(&ix, &account_infos, &[seeds])?;
    Ok(())
}

// Staking asset transfers

/// Vault -> recipient, signed by the pool authority
#[inline(never)]
pub fn transfer_from_vault<'info>(
    token_program: &AccountInfo<'info>,
    pool_vault: &AccountInfo<'info>,
    staking_mint: &AccountInfo<'info>,
    destination: &AccountInfo<'info>,
    pool_authority: &AccountInfo<'info>,
    amount: u64,
    decimals: u8,
    seeds: &[&[u8]],
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let signer_seeds: &[&[&[u8]]] = &[seeds];
    token_interface::transfer_checked(
        CpiContext::new_with_signer(
            token_program.clone(),
            TransferChecked {
                from: pool_vault.clone(),
                mint: staking_mint.clone(),
                to: destination.clone(),
                authority: pool_authority.clone(),
            },
            signer_seeds,
        ),
        amount,
        decimals,
    )
}

/// Depositor -> vault, signed by the depositor
#[inline(never)]
pub fn transfer_to_vault<'info>(
    token_program: &AccountInfo<'info>,
    source: &AccountInfo<'info>,
    staking_mint: &AccountInfo<'info>,
    pool_vault: &AccountInfo<'info>,
    depositor: &AccountInfo<'info>,
    amount: u64,
    decimals: u8,
) -> Result<()> {
    token_interface::transfer_checked(
        CpiContext::new(
            token_program.clone(),
            TransferChecked {
                from: source.clone(),
                mint: staking_mint.clone(),
                to: pool_vault.clone(),
                authority: depositor.clone(),
            },
        ),
        amount,
        decimals,
    )
}
