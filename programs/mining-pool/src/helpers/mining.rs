use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::ErrorCode;

/// Decoded view of the Mining System `Miner` account that tracks the pool's stake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MinerView {
    pub authority: Pubkey,
    pub staked_amount: u64,
    /// Unix timestamp at which unstaked funds become withdrawable (0 = no cooldown running)
    pub withdrawable_at: i64,
    pub eligible: bool,
}

impl MinerView {
    /// Manually deserialize the miner account (discriminator checked, trailing bytes ignored)
    pub fn parse(data: &[u8]) -> Result<Self> {
        require!(data.len() >= MINER_ACCOUNT_MIN_LEN, ErrorCode::ExternalCallFailed);
        require!(
            data[0..8] == MINER_ACCOUNT_DISCRIMINATOR,
            ErrorCode::ExternalCallFailed
        );

        let authority = Pubkey::try_from(&data[8..40])
            .map_err(|_| ErrorCode::ExternalCallFailed)?;
        let staked_amount = u64::from_le_bytes(
            data[40..48].try_into().map_err(|_| ErrorCode::ExternalCallFailed)?
        );
        let withdrawable_at = i64::from_le_bytes(
            data[48..56].try_into().map_err(|_| ErrorCode::ExternalCallFailed)?
        );
        let eligible = data[56] != 0;

        Ok(Self {
            authority,
            staked_amount,
            withdrawable_at,
            eligible,
        })
    }

    /// Load the miner account, verifying it belongs to the Mining System and to this pool.
    pub fn load(info: &AccountInfo, mining_system: &Pubkey, pool_authority: &Pubkey) -> Result<Self> {
        require!(!info.data_is_empty(), ErrorCode::ExternalCallFailed);
        require_keys_eq!(*info.owner, *mining_system, ErrorCode::ExternalCallFailed);

        let view = Self::parse(&info.try_borrow_data()?)?;
        require_keys_eq!(view.authority, *pool_authority, ErrorCode::ExternalCallFailed);

        #[cfg(feature = "verbose")]
        msg!(
            "Miner: staked={}, withdrawable_at={}, eligible={}",
            view.staked_amount, view.withdrawable_at, view.eligible
        );

        Ok(view)
    }

    /// Like `load`, but an account the Mining System has not created yet
    /// (no data) reads as an empty stake. Only valid before the first stake.
    pub fn load_or_empty(
        info: &AccountInfo,
        mining_system: &Pubkey,
        pool_authority: &Pubkey,
    ) -> Result<Self> {
        if info.data_is_empty() {
            return Ok(Self {
                authority: *pool_authority,
                ..Self::default()
            });
        }
        Self::load(info, mining_system, pool_authority)
    }
}

/// Decoded view of the Mining System global config.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MiningConfigView {
    pub current_epoch: u64,
    /// Absolute per-miner stake cap (0 = uncapped)
    pub max_stake: u64,
}

impl MiningConfigView {
    pub fn parse(data: &[u8]) -> Result<Self> {
        require!(data.len() >= MINING_CONFIG_ACCOUNT_MIN_LEN, ErrorCode::ExternalCallFailed);
        require!(
            data[0..8] == MINING_CONFIG_ACCOUNT_DISCRIMINATOR,
            ErrorCode::ExternalCallFailed
        );

        let current_epoch = u64::from_le_bytes(
            data[8..16].try_into().map_err(|_| ErrorCode::ExternalCallFailed)?
        );
        let max_stake = u64::from_le_bytes(
            data[16..24].try_into().map_err(|_| ErrorCode::ExternalCallFailed)?
        );

        Ok(Self {
            current_epoch,
            max_stake,
        })
    }

    pub fn load(info: &AccountInfo, mining_system: &Pubkey) -> Result<Self> {
        require_keys_eq!(*info.owner, *mining_system, ErrorCode::ExternalCallFailed);
        Self::parse(&info.try_borrow_data()?)
    }
}
