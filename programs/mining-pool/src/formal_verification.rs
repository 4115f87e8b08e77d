// ============================================================================
// FORMAL VERIFICATION & PROPERTY-BASED TESTS
// ============================================================================
//
// Run with: cargo test --lib formal_verification
//
// This module implements:
// 1. Ledger and accumulator invariants
// 2. Fuzzing harnesses over random call interleavings (proptest)
// 3. Security properties (fees, access, fund recovery)
// 4. Lifecycle state machine properties
// ============================================================================

#[cfg(test)]
mod formal_tests {
    use anchor_lang::error::ERROR_CODE_OFFSET;
    use anchor_lang::prelude::*;
    use proptest::prelude::*;

    use crate::constants::*;
    use crate::errors::ErrorCode;
    use crate::helpers::math::*;
    use crate::state::*;

    fn error_code<T>(result: Result<T>) -> Option<u32> {
        match result {
            Err(anchor_lang::error::Error::AnchorError(e)) => Some(e.error_code_number),
            _ => None,
        }
    }

    fn code(e: ErrorCode) -> Option<u32> {
        Some(ERROR_CODE_OFFSET + e as u32)
    }

    fn new_pool(protocol_fee_bps: u16, operator_fee_bps: u16) -> Pool {
        Pool {
            owner: Pubkey::new_unique(),
            operator: Pubkey::new_unique(),
            protocol_fee_bps,
            operator_fee_bps,
            ..Pool::default()
        }
    }

    fn principal_sum(positions: &[DepositorPosition]) -> u64 {
        positions.iter().map(|p| p.principal).sum()
    }

    // ========================================================================
    // SECTION 1: CORE INVARIANTS
    // ========================================================================

    mod invariants {
        use super::*;

        /// Fee split never creates or destroys value
        #[test]
        fn fee_split_conserves_gross() {
            let cases: [(u64, u16, u16); 6] = [
                (1_000, 200, 500),
                (1, MAX_PROTOCOL_FEE_BPS, MAX_OPERATOR_FEE_BPS),
                (999_999_999, 0, MAX_OPERATOR_FEE_BPS),
                (u64::MAX, MAX_PROTOCOL_FEE_BPS, MAX_OPERATOR_FEE_BPS),
                (10_000, 10_000, 10_000),
                (7, 3_333, 6_666),
            ];
            for (gross, protocol, operator) in cases {
                let split = split_reward(gross, protocol, operator).unwrap();
                assert_eq!(
                    split.protocol_fee as u128 + split.operator_fee as u128 + split.distributable as u128,
                    gross as u128
                );
            }
        }

        /// Sum of position principal equals total_principal after any ledger call
        #[test]
        fn principal_sum_matches_total() {
            let mut pool = new_pool(0, 0);
            let mut positions = vec![DepositorPosition::default(); 4];

            pool.deposit(&mut positions[0], 500, 0).unwrap();
            pool.deposit(&mut positions[1], 300, 0).unwrap();
            pool.deposit(&mut positions[2], 200, 0).unwrap();
            pool.withdraw_principal(&mut positions[1], 100).unwrap();
            pool.deposit(&mut positions[3], 1, 0).unwrap();
            let _ = pool.withdraw_principal(&mut positions[2], 201);

            assert_eq!(principal_sum(&positions), pool.total_principal);
            assert_eq!(pool.total_principal, pool.total_rewardable);
            assert_eq!(pool.depositor_count, 4);
        }

        /// Accumulator remainder is always below the denominator
        #[test]
        fn remainder_below_denominator() {
            let mut pool = new_pool(0, 0);
            let mut a = DepositorPosition::default();
            pool.deposit(&mut a, 7, 0).unwrap();
            for gross in [1u64, 2, 3, 5, 8, 13, 21] {
                pool.distribute_rewards(gross).unwrap();
                assert!(pool.reward_remainder < pool.total_rewardable as u128);
            }
        }

        /// A failed call leaves the pool unchanged
        #[test]
        fn failed_calls_leave_state_unchanged() {
            let mut pool = new_pool(200, 500);
            pool.pool_cap = 100;
            let mut a = DepositorPosition::default();
            pool.deposit(&mut a, 100, 0).unwrap();

            let before = (pool.total_principal, pool.reward_per_unit_stored, a.principal);
            assert_eq!(error_code(pool.deposit(&mut a, 1, 0)), code(ErrorCode::CapExceeded));
            assert_eq!(
                error_code(pool.withdraw_principal(&mut a, 101)),
                code(ErrorCode::InsufficientPrincipal)
            );
            assert_eq!(before, (pool.total_principal, pool.reward_per_unit_stored, a.principal));
        }
    }

    // ========================================================================
    // SECTION 2: FUZZING
    // ========================================================================

    mod fuzzing {
        use super::*;

        #[derive(Clone, Copy, Debug)]
        enum LedgerOp {
            Deposit(usize, u64),
            Withdraw(usize, u64),
            Claim(usize),
            Reward(u64),
        }

        fn ledger_op() -> impl Strategy<Value = LedgerOp> {
            prop_oneof![
                (0usize..3, 1u64..1_000_000).prop_map(|(i, a)| LedgerOp::Deposit(i, a)),
                (0usize..3, 1u64..1_000_000).prop_map(|(i, a)| LedgerOp::Withdraw(i, a)),
                (0usize..3).prop_map(LedgerOp::Claim),
                (0u64..10_000_000).prop_map(LedgerOp::Reward),
            ]
        }

        proptest! {
            /// Random interleavings keep the ledger consistent and never
            /// promise more reward than was distributed
            #[test]
            fn interleaved_ledger_calls(
                ops in prop::collection::vec(ledger_op(), 1..80),
                protocol in 0u16..=MAX_PROTOCOL_FEE_BPS,
                operator in 0u16..=MAX_OPERATOR_FEE_BPS,
            ) {
                let mut pool = new_pool(protocol, operator);
                let mut positions = vec![DepositorPosition::default(); 3];
                let mut distributed: u128 = 0;
                let mut claimed: u128 = 0;

                for op in ops {
                    let stored_before = pool.reward_per_unit_stored;
                    match op {
                        LedgerOp::Deposit(i, amount) => {
                            pool.deposit(&mut positions[i], amount, 0).unwrap();
                        }
                        LedgerOp::Withdraw(i, amount) => {
                            let amount = amount.min(positions[i].principal);
                            if amount > 0 {
                                pool.withdraw_principal(&mut positions[i], amount).unwrap();
                            }
                        }
                        LedgerOp::Claim(i) => {
                            claimed += pool.claim_reward(&mut positions[i]).unwrap() as u128;
                        }
                        LedgerOp::Reward(gross) => {
                            if pool.total_rewardable == 0 && gross > 0 {
                                prop_assert_eq!(
                                    error_code(pool.distribute_rewards(gross)),
                                    code(ErrorCode::NoStakers)
                                );
                            } else {
                                let split = pool.distribute_rewards(gross).unwrap();
                                distributed += split.distributable as u128;
                            }
                        }
                    }

                    prop_assert_eq!(principal_sum(&positions), pool.total_principal);
                    prop_assert_eq!(pool.total_principal, pool.total_rewardable);
                    prop_assert!(pool.reward_per_unit_stored >= stored_before);

                    let owed: u128 = positions
                        .iter()
                        .map(|p| pool.earned(p).unwrap() as u128)
                        .sum();
                    prop_assert!(claimed + owed <= distributed);
                }
            }

            /// Three depositors: the order of deposits and claims does not
            /// change what anyone receives
            #[test]
            fn reward_order_independence(
                amounts in prop::array::uniform3(1u64..1_000_000_000),
                gross in 1u64..1_000_000_000_000,
                deposit_order in Just(vec![0usize, 1, 2]).prop_shuffle(),
                claim_order in Just(vec![0usize, 1, 2]).prop_shuffle(),
            ) {
                let run = |deposits: &[usize], claims: &[usize]| -> [u64; 3] {
                    let mut pool = new_pool(200, 500);
                    let mut positions = vec![DepositorPosition::default(); 3];
                    for &i in deposits {
                        pool.deposit(&mut positions[i], amounts[i], 0).unwrap();
                    }
                    pool.distribute_rewards(gross).unwrap();
                    let mut paid = [0u64; 3];
                    for &i in claims {
                        paid[i] = pool.claim_reward(&mut positions[i]).unwrap();
                    }
                    paid
                };

                let baseline = run(&[0, 1, 2], &[0, 1, 2]);
                prop_assert_eq!(run(&deposit_order, &claim_order), baseline);

                // Each share is within one unit below the exact pro-rata amount
                let total: u128 = amounts.iter().map(|a| *a as u128).sum();
                let distributable = split_reward(gross, 200, 500).unwrap().distributable as u128;
                for i in 0..3 {
                    let exact = distributable * amounts[i] as u128;
                    prop_assert!(baseline[i] as u128 * total <= exact);
                    prop_assert!((baseline[i] as u128 + 2) * total > exact);
                }
            }

            /// Operator fee rate only ever goes down
            #[test]
            fn operator_fee_monotonic(
                initial in 0u16..=MAX_OPERATOR_FEE_BPS,
                proposals in prop::collection::vec(0u16..=MAX_OPERATOR_FEE_BPS, 1..40),
            ) {
                let mut pool = new_pool(0, initial);
                for proposal in proposals {
                    let before = pool.operator_fee_bps;
                    match pool.set_operator_fee_rate(proposal) {
                        Ok(old) => {
                            prop_assert_eq!(old, before);
                            prop_assert!(pool.operator_fee_bps < before);
                        }
                        Err(_) => {
                            prop_assert!(proposal >= before);
                            prop_assert_eq!(pool.operator_fee_bps, before);
                        }
                    }
                }
            }

            #[test]
            fn fee_split_conservation(
                gross in any::<u64>(),
                protocol in 0u16..=10_000,
                operator in 0u16..=10_000,
            ) {
                let split = split_reward(gross, protocol, operator).unwrap();
                prop_assert_eq!(
                    split.protocol_fee as u128 + split.operator_fee as u128 + split.distributable as u128,
                    gross as u128
                );
                prop_assert!(split.protocol_fee as u128 * 10_000 <= gross as u128 * protocol as u128);
            }

            /// Dust carried in the remainder is never lost across updates
            #[test]
            fn accumulator_carries_all_dust(
                total in 1u64..1_000_000,
                inflows in prop::collection::vec(0u64..1_000_000, 1..30),
            ) {
                let mut pool = new_pool(0, 0);
                let mut a = DepositorPosition::default();
                pool.deposit(&mut a, total, 0).unwrap();

                let mut sum: u128 = 0;
                for gross in inflows {
                    pool.distribute_rewards(gross).unwrap();
                    sum += gross as u128;
                }
                prop_assert_eq!(
                    pool.reward_per_unit_stored * total as u128 + pool.reward_remainder,
                    sum * SCALE
                );
            }
        }
    }

    // ========================================================================
    // SECTION 3: SECURITY PROPERTIES
    // ========================================================================

    mod security {
        use super::*;

        /// Principal cannot leave the pool while it is staked
        #[test]
        fn no_withdrawal_while_staked() {
            let mut pool = new_pool(0, 0);
            let mut a = DepositorPosition::default();
            pool.deposit(&mut a, 1_000, 0).unwrap();
            pool.begin_stake().unwrap();

            assert_eq!(
                error_code(pool.withdraw_principal(&mut a, 1_000)),
                code(ErrorCode::FundsStaked)
            );
            pool.request_unstake(5).unwrap();
            pool.execute_unstake(6).unwrap();
            assert_eq!(
                error_code(pool.withdraw_principal(&mut a, 1_000)),
                code(ErrorCode::FundsStaked)
            );
            assert_eq!(a.principal, 1_000);
        }

        /// The fee ceilings bound what a pool can ever charge
        #[test]
        fn fees_bounded_by_ceilings() {
            let split = split_reward(1_000_000, MAX_PROTOCOL_FEE_BPS, MAX_OPERATOR_FEE_BPS).unwrap();
            assert_eq!(split.protocol_fee, 100_000);
            assert_eq!(split.operator_fee, 180_000);
            assert_eq!(split.distributable, 720_000);
        }

        /// Only the whitelisted action codes pass, however the payload is padded
        #[test]
        fn forwarded_actions_bounded_by_whitelist() {
            let mut pool = new_pool(0, 0);
            let allowed = *b"allowed!";
            pool.set_allowed_action(allowed, true).unwrap();

            let mut payload = b"allowe".to_vec();
            payload.extend_from_slice(b"d?extra");
            assert_eq!(
                error_code(pool.check_forwarded_action(&payload)),
                code(ErrorCode::ActionNotWhitelisted)
            );

            pool.set_allowed_action(allowed, false).unwrap();
            assert_eq!(
                error_code(pool.check_forwarded_action(b"allowed!rest")),
                code(ErrorCode::ActionNotWhitelisted)
            );
        }

        /// The operator cannot raise its own fee or rotate itself
        #[test]
        fn operator_has_no_admin_rights() {
            let pool = new_pool(0, 500);
            assert_eq!(error_code(pool.require_owner(&pool.operator)), code(ErrorCode::NotOwner));
        }

        /// Lifecycle and claim calls stay out of the operator's reach
        #[test]
        fn reserved_actions_never_forwardable() {
            let mut pool = new_pool(0, 0);
            for reserved in RESERVED_ACTION_CODES {
                assert_eq!(
                    error_code(pool.set_allowed_action(reserved, true)),
                    code(ErrorCode::ActionReserved)
                );
                assert_eq!(
                    error_code(pool.check_forwarded_action(&reserved)),
                    code(ErrorCode::ActionReserved)
                );
            }
        }

        proptest! {
            /// Whatever the Mining System pays back, finalizing lands in Idle
            /// and depositors never redeem more than came back
            #[test]
            fn returned_principal_shared_pro_rata(
                deposits in prop::collection::vec(1u64..1_000_000, 1..6),
                returned_bps in 0u64..=20_000,
            ) {
                let mut pool = new_pool(200, 500);
                let mut positions: Vec<DepositorPosition> =
                    deposits.iter().map(|_| DepositorPosition::default()).collect();
                for (p, &amount) in positions.iter_mut().zip(&deposits) {
                    pool.deposit(p, amount, 0).unwrap();
                }
                let staked = pool.begin_stake().unwrap();
                pool.request_unstake(1).unwrap();
                pool.execute_unstake(2).unwrap();
                pool.finalize_withdraw(10, 10).unwrap();
                prop_assert_eq!(pool.state, PoolState::Idle);

                let returned = (staked as u128 * returned_bps as u128 / 10_000) as u64;
                let reconciled = pool.reconcile_returned_principal(returned).unwrap();
                pool.distribute_rewards(reconciled.surplus).unwrap();
                prop_assert_eq!(pool.principal_backing(), returned.min(staked));

                let mut paid: u64 = 0;
                for (p, &amount) in positions.iter_mut().zip(&deposits) {
                    let share = amount as u128 * returned.min(staked) as u128 / staked as u128;
                    let payout = pool.withdraw_principal(p, amount).unwrap();
                    prop_assert!(payout as u128 + 1 >= share);
                    paid += payout;
                }
                prop_assert!(paid <= returned.min(staked));
                prop_assert_eq!(pool.total_principal, 0);
                prop_assert_eq!(pool.principal_shortfall, 0);
            }
        }

        /// A nested call while a guarded section is open fails
        #[test]
        fn reentrant_call_rejected() {
            let mut pool = new_pool(0, 0);
            pool.acquire_lock().unwrap();
            assert_eq!(error_code(pool.acquire_lock()), code(ErrorCode::Reentrancy));
            assert!(pool.locked);
        }
    }

    // ========================================================================
    // SECTION 4: STATE MACHINE
    // ========================================================================

    mod state_machine {
        use super::*;

        #[derive(Clone, Copy, Debug)]
        enum LifecycleOp {
            Stake,
            Request,
            Execute,
            Cancel,
            Finalize,
            AdvanceEpoch,
            AdvanceTime(i64),
        }

        fn lifecycle_op() -> impl Strategy<Value = LifecycleOp> {
            prop_oneof![
                Just(LifecycleOp::Stake),
                Just(LifecycleOp::Request),
                Just(LifecycleOp::Execute),
                Just(LifecycleOp::Cancel),
                Just(LifecycleOp::Finalize),
                Just(LifecycleOp::AdvanceEpoch),
                (1i64..1_000).prop_map(LifecycleOp::AdvanceTime),
            ]
        }

        fn allowed_transition(from: PoolState, to: PoolState) -> bool {
            matches!(
                (from, to),
                (PoolState::Idle, PoolState::Active)
                    | (PoolState::Active, PoolState::Unstaking)
                    | (PoolState::Unstaking, PoolState::Active)
                    | (PoolState::Unstaking, PoolState::Idle)
            ) || from == to
        }

        proptest! {
            /// Any call sequence only walks legal edges, unstake only lands
            /// after an epoch boundary, and principal is untouched throughout
            #[test]
            fn lifecycle_walks_legal_edges(ops in prop::collection::vec(lifecycle_op(), 1..100)) {
                const COOLDOWN: i64 = 500;
                let mut pool = new_pool(0, 0);
                let mut a = DepositorPosition::default();
                pool.deposit(&mut a, 10_000, 0).unwrap();

                let mut epoch = 1u64;
                let mut now = 0i64;
                let mut withdrawable_at = 0i64;

                for op in ops {
                    let before = pool.state;
                    let request = pool.unstake_request_epoch;
                    match op {
                        LifecycleOp::Stake => {
                            let _ = pool.begin_stake();
                        }
                        LifecycleOp::Request => {
                            let _ = pool.request_unstake(epoch);
                        }
                        LifecycleOp::Execute => {
                            if pool.execute_unstake(epoch).is_ok() {
                                let requested = request.unwrap();
                                prop_assert!(epoch > requested);
                                withdrawable_at = now + COOLDOWN;
                            }
                        }
                        LifecycleOp::Cancel => {
                            if pool.cancel_unstake(now, withdrawable_at).is_ok() {
                                prop_assert!(now < withdrawable_at);
                            }
                        }
                        LifecycleOp::Finalize => {
                            if pool.finalize_withdraw(now, withdrawable_at).is_ok() {
                                prop_assert!(now >= withdrawable_at);
                            }
                        }
                        LifecycleOp::AdvanceEpoch => epoch += 1,
                        LifecycleOp::AdvanceTime(dt) => now += dt,
                    }

                    prop_assert!(allowed_transition(before, pool.state));
                    prop_assert_eq!(pool.total_principal, 10_000);
                    if pool.state != PoolState::Idle {
                        prop_assert_eq!(
                            error_code(pool.withdraw_principal(&mut a, 1)),
                            code(ErrorCode::FundsStaked)
                        );
                    }
                    if pool.state != PoolState::Active {
                        prop_assert_eq!(pool.unstake_request_epoch, None);
                    }
                }
            }
        }

        /// From any state the permissionless path reaches Idle
        #[test]
        fn exit_path_always_reaches_idle() {
            for start in [PoolState::Idle, PoolState::Active, PoolState::Unstaking] {
                let mut pool = new_pool(0, 0);
                pool.state = start;
                pool.total_principal = 1;
                let (mut epoch, mut now) = (10u64, 100i64);
                let withdrawable_at = now + 50;

                if pool.state == PoolState::Active {
                    pool.request_unstake(epoch).unwrap();
                    epoch += 1;
                    pool.execute_unstake(epoch).unwrap();
                }
                if pool.state == PoolState::Unstaking {
                    assert_eq!(
                        error_code(pool.finalize_withdraw(now, withdrawable_at)),
                        code(ErrorCode::CooldownNotExpired)
                    );
                    now = withdrawable_at;
                    pool.finalize_withdraw(now, withdrawable_at).unwrap();
                }
                assert_eq!(pool.state, PoolState::Idle);
            }
        }
    }
}
