// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]

mod common;

use amunchain_ledger::core::contract::{ContractError, EventType, StateKind};
use amunchain_ledger::core::runner::math::{get_amount_in, get_amount_out};
use amunchain_ledger::core::runtime::ExecError;
use amunchain_ledger::core::tx::builder;
use amunchain_ledger::core::tx::function::{ExactIn, ExactOut, RemoveLiquidity};
use amunchain_ledger::core::tx::Transaction;
use amunchain_ledger::core::types::Address;
use common::{amounts, Amm, FUNDING};
use proptest::prelude::*;

const POOL: u64 = 1_000_000;

fn exact_in(amm: &Amm, amount_in: u64, min: u64, path: Vec<Address>, deadline: u64) -> Transaction {
    builder::swap_exact_in(
        amm.chain.head(&amm.admin),
        amm.exchange.clone(),
        ExactIn {
            amount_in,
            amount_out_min: min,
            path,
            to: amm.admin.clone(),
            deadline,
        },
    )
}

fn seeded() -> Amm {
    let mut amm = Amm::new(None);
    let (a, b) = (amm.a.clone(), amm.b.clone());
    amm.add_liquidity(&a, &b, POOL, POOL);
    amm
}

#[test]
fn exact_in_pays_constant_product_output() {
    let mut amm = seeded();
    let (admin, a, b) = (amm.admin.clone(), amm.a.clone(), amm.b.clone());
    let expected = get_amount_out(100_000, POOL, POOL).unwrap();
    assert_eq!(expected, 100_000 * 995 * POOL / (POOL * 1000 + 100_000 * 995));

    let tx = exact_in(&amm, 100_000, expected, vec![a.clone(), b.clone()], 0);
    let msg = amm.chain.call_ok(&tx);
    assert_eq!(amounts(&msg), vec![100_000, expected]);

    assert_eq!(amm.chain.balance(&admin, &a), FUNDING - POOL - 100_000);
    assert_eq!(amm.chain.balance(&admin, &b), FUNDING - POOL + expected);
    amm.assert_reserves_settled(&a, &b);

    let stored = amm.chain.exec.contract_result(&tx.hash().unwrap()).unwrap().unwrap();
    assert_eq!(stored.error, msg);
    assert_eq!(amm.chain.metrics.swaps_total.get(), 1);
}

#[test]
fn exact_in_on_thousand_unit_pool() {
    // 4000/4000 mints 3000 LP; withdrawing all of it leaves the locked 1000/1000.
    let mut amm = Amm::new(None);
    let (admin, a, b) = (amm.admin.clone(), amm.a.clone(), amm.b.clone());
    amm.add_liquidity(&a, &b, 4000, 4000);
    let remove = builder::remove_liquidity(
        amm.chain.net(),
        amm.chain.head(&admin),
        RemoveLiquidity {
            exchange: amm.exchange.clone(),
            token_a: a.clone(),
            token_b: b.clone(),
            to: admin.clone(),
            liquidity: 3000,
            amount_a_min: 0,
            amount_b_min: 0,
            deadline: 0,
        },
    );
    amm.chain.call_ok(&remove);
    let pair = amm.chain.pair(&amm.pair_address(&a, &b));
    assert_eq!((pair.reserve0, pair.reserve1), (1000, 1000));

    let expected = 100 * 995 * 1000 / (1000 * 1000 + 100 * 995);
    assert_eq!(expected, 90);

    let greedy = exact_in(&amm, 100, expected + 1, vec![a.clone(), b.clone()], 0);
    let state = amm.chain.submit(&greedy).unwrap().unwrap();
    assert_eq!(state.state, StateKind::Failed);

    let msg = amm.chain.call_ok(&exact_in(&amm, 100, expected, vec![a.clone(), b.clone()], 0));
    assert_eq!(amounts(&msg), vec![100, 90]);
    amm.assert_reserves_settled(&a, &b);
}

#[test]
fn exact_in_below_minimum_fails_without_moving_funds() {
    let mut amm = seeded();
    let (admin, a, b) = (amm.admin.clone(), amm.a.clone(), amm.b.clone());
    let expected = get_amount_out(100_000, POOL, POOL).unwrap();
    let reserves = amm.chain.pair(&amm.pair_address(&a, &b)).reserves();

    let tx = exact_in(&amm, 100_000, expected + 1, vec![a.clone(), b.clone()], 0);
    let state = amm.chain.submit(&tx).unwrap().unwrap();
    assert_eq!(state.state, StateKind::Failed);
    assert_eq!(
        state.error,
        format!("outAmount {expected} is less than the minimum output {}", expected + 1)
    );
    assert_eq!(amm.chain.balance(&admin, &a), FUNDING - POOL);
    assert_eq!(amm.chain.balance(&admin, &b), FUNDING - POOL);
    assert_eq!(amm.chain.pair(&amm.pair_address(&a, &b)).reserves(), reserves);
    assert_eq!(amm.chain.metrics.contract_failed_total.get(), 1);
}

#[test]
fn exact_out_charges_rounded_up_input() {
    let mut amm = seeded();
    let (admin, a, b) = (amm.admin.clone(), amm.a.clone(), amm.b.clone());
    let needed = get_amount_in(50_000, POOL, POOL).unwrap();

    let tx = builder::swap_exact_out(
        amm.chain.head(&admin),
        amm.exchange.clone(),
        ExactOut {
            amount_out: 50_000,
            amount_in_max: needed,
            path: vec![a.clone(), b.clone()],
            to: admin.clone(),
            deadline: 0,
        },
    );
    let msg = amm.chain.call_ok(&tx);
    assert_eq!(amounts(&msg), vec![needed, 50_000]);
    assert_eq!(amm.chain.balance(&admin, &a), FUNDING - POOL - needed);
    assert_eq!(amm.chain.balance(&admin, &b), FUNDING - POOL + 50_000);
    amm.assert_reserves_settled(&a, &b);

    let greedy = builder::swap_exact_out(
        amm.chain.head(&admin),
        amm.exchange.clone(),
        ExactOut {
            amount_out: 50_000,
            amount_in_max: 1,
            path: vec![a.clone(), b.clone()],
            to: admin.clone(),
            deadline: 0,
        },
    );
    let state = amm.chain.submit(&greedy).unwrap().unwrap();
    assert_eq!(state.state, StateKind::Failed);
    assert!(state.error.contains("greater than the maximum input amount 1"));
}

#[test]
fn multi_hop_routes_intermediate_output_to_next_pair() {
    let mut amm = seeded();
    let (admin, a, b, c) = (amm.admin.clone(), amm.a.clone(), amm.b.clone(), amm.c.clone());
    amm.add_liquidity(&b, &c, POOL, 2 * POOL);

    let pairs = amm.chain.exec.exchange_pairs(&amm.exchange).unwrap();
    assert_eq!(pairs.len(), 2);
    let path = builder::calculate_shortest_path(&a, &c, &pairs).unwrap();
    assert_eq!(path, vec![a.clone(), b.clone(), c.clone()]);

    let hop1 = get_amount_out(100_000, POOL, POOL).unwrap();
    let hop2 = get_amount_out(hop1, POOL, 2 * POOL).unwrap();

    let tx = exact_in(&amm, 100_000, 0, path, 0);
    let state = amm.chain.submit(&tx).unwrap().unwrap();
    assert_eq!(state.state, StateKind::Success, "{}", state.error);
    assert_eq!(amounts(&state.error), vec![100_000, hop1, hop2]);

    let ab = amm.pair_address(&a, &b);
    let bc = amm.pair_address(&b, &c);
    let legs: Vec<_> = state
        .events
        .iter()
        .map(|e| (e.event_type, e.from.clone(), e.to.clone(), e.token.clone(), e.amount))
        .collect();
    assert_eq!(
        legs,
        vec![
            (EventType::Transfer, admin.clone(), ab.clone(), a.clone(), 100_000),
            (EventType::Transfer, ab.clone(), bc.clone(), b.clone(), hop1),
            (EventType::Transfer, bc.clone(), admin.clone(), c.clone(), hop2),
        ]
    );

    assert_eq!(amm.chain.balance(&admin, &b), FUNDING - 2 * POOL);
    assert_eq!(amm.chain.balance(&admin, &c), FUNDING - 2 * POOL + hop2);
    amm.assert_reserves_settled(&a, &b);
    amm.assert_reserves_settled(&b, &c);
}

#[test]
fn tokens_sent_to_a_pair_count_as_swap_input() {
    let mut amm = seeded();
    let (a, b) = (amm.a.clone(), amm.b.clone());
    let pair = amm.pair_address(&a, &b);
    amm.chain.fund(&pair, &a, 5_000);

    let expected = get_amount_out(100_000, POOL, POOL).unwrap();
    let tx = exact_in(&amm, 100_000, expected, vec![a.clone(), b.clone()], 0);
    amm.chain.call_ok(&tx);

    let p = amm.chain.pair(&pair);
    let (reserve_a, reserve_b) = if p.token0 == a {
        (p.reserve0, p.reserve1)
    } else {
        (p.reserve1, p.reserve0)
    };
    assert_eq!(reserve_a, POOL + 100_000 + 5_000);
    assert_eq!(reserve_b, POOL - expected);
    amm.assert_reserves_settled(&a, &b);
}

#[test]
fn pair_holding_less_than_reserves_fails_k() {
    let mut amm = seeded();
    let (admin, a, b) = (amm.admin.clone(), amm.a.clone(), amm.b.clone());
    let pair = amm.pair_address(&a, &b);
    let reserves = amm.chain.pair(&pair).reserves();
    amm.chain
        .exec
        .accounts()
        .burn(&pair, &a, 50_000, amm.chain.height)
        .unwrap();

    let tx = exact_in(&amm, 100_000, 0, vec![a.clone(), b.clone()], 0);
    let state = amm.chain.submit(&tx).unwrap().unwrap();
    assert_eq!(state.state, StateKind::Failed);
    assert_eq!(state.error, ContractError::K.to_string());
    assert_eq!(amm.chain.pair(&pair).reserves(), reserves);
    assert_eq!(amm.chain.balance(&admin, &a), FUNDING - POOL);
}

#[test]
fn route_without_pair_is_rejected() {
    let mut amm = seeded();
    let (a, c) = (amm.a.clone(), amm.c.clone());
    let tx = exact_in(&amm, 1_000, 0, vec![a.clone(), c.clone()], 0);
    assert!(matches!(
        amm.chain.submit(&tx),
        Err(ExecError::Contract(ContractError::RouteHopMissing(x, y))) if x == a && y == c
    ));
}

#[test]
fn expired_deadline_is_rejected() {
    let mut amm = seeded();
    let (a, b) = (amm.a.clone(), amm.b.clone());
    assert!(amm.chain.height > 1);
    let tx = exact_in(&amm, 1_000, 0, vec![a.clone(), b.clone()], 1);
    assert!(matches!(
        amm.chain.submit(&tx),
        Err(ExecError::Contract(ContractError::Deadline))
    ));

    let tx = exact_in(&amm, 1_000, 0, vec![a, b], amm.chain.height + 1);
    amm.chain.call_ok(&tx);
}

#[test]
fn swap_beyond_balance_is_rejected_at_admission() {
    let mut amm = seeded();
    let (a, b) = (amm.a.clone(), amm.b.clone());
    let tx = exact_in(&amm, FUNDING, 0, vec![a, b], 0);
    assert!(matches!(
        amm.chain.submit(&tx),
        Err(ExecError::Contract(ContractError::BalanceNotEnough))
    ));
}

#[test]
fn price_accumulators_advance_with_block_time() {
    let mut amm = seeded();
    let (a, b) = (amm.a.clone(), amm.b.clone());
    let address = amm.pair_address(&a, &b);
    let before = amm.chain.pair(&address);
    assert_eq!(before.price0_cumulative_last, 0);

    amm.chain.call_ok(&exact_in(&amm, 1_000, 0, vec![a, b], 0));
    let after = amm.chain.pair(&address);
    // Equal reserves: price 1.0 in Q64.64 for each elapsed second.
    let elapsed = u128::from(after.block_timestamp_last - before.block_timestamp_last);
    assert!(elapsed > 0);
    assert_eq!(after.price0_cumulative_last, (1u128 << 64) * elapsed);
    assert_eq!(after.price1_cumulative_last, (1u128 << 64) * elapsed);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn swaps_never_decrease_k(amount in 1u64..400_000, forward in any::<bool>()) {
        let mut amm = seeded();
        let (a, b) = (amm.a.clone(), amm.b.clone());
        let address = amm.pair_address(&a, &b);
        let before = amm.chain.pair(&address);

        let path = if forward { vec![a.clone(), b.clone()] } else { vec![b.clone(), a.clone()] };
        let state = amm.chain.submit(&exact_in(&amm, amount, 0, path, 0)).unwrap().unwrap();
        let after = amm.chain.pair(&address);

        if state.state == StateKind::Success {
            prop_assert!(
                u128::from(after.reserve0) * u128::from(after.reserve1)
                    >= u128::from(before.reserve0) * u128::from(before.reserve1)
            );
        } else {
            prop_assert_eq!(after.reserves(), before.reserves());
        }
        amm.assert_reserves_settled(&a, &b);
    }
}
