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

//! Exchange deployment, governance and multi-hop swaps.

use super::{check_deadline, check_spend, math, settle, Call, Outcome, RunnerLibrary, Stored};
use crate::core::contract::pair::sort_token;
use crate::core::contract::{ContractBody, ContractError, ContractV2, Event, Exchange, Pair};
use crate::core::tx::function::{ExactIn, ExactOut};
use crate::core::types::Address;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::info;

pub(crate) fn verify_init(call: &Call<'_>) -> Result<(), ContractError> {
    if call.lib.get_contract_v2(call.contract)?.is_some() {
        return Err(ContractError::ExchangeExists(call.contract.clone()));
    }
    Ok(())
}

pub(crate) fn init(
    call: &Call<'_>,
    admin: &Address,
    fee_to: Option<&Address>,
) -> Result<Outcome, ContractError> {
    verify_init(call)?;
    call.lib.set_contract_v2(&ContractV2 {
        address: call.contract.clone(),
        create_hash: call.tx_hash,
        body: ContractBody::Exchange(Exchange::new(admin.clone(), fee_to.cloned())),
    })?;
    info!(exchange = %call.contract, admin = %admin, "exchange deployed");
    Ok(Outcome::default())
}

pub(crate) fn verify_setter(call: &Call<'_>) -> Result<Stored<Exchange>, ContractError> {
    let ex = call.lib.exchange(call.contract)?;
    ex.value.verify_setter(call.sender)?;
    Ok(ex)
}

pub(crate) fn set_admin(call: &Call<'_>, address: &Address) -> Result<Outcome, ContractError> {
    let mut ex = call.lib.exchange(call.contract)?;
    ex.value.set_admin(address.clone(), call.sender)?;
    call.lib.save_exchange(&ex)?;
    info!(exchange = %call.contract, admin = %address, "exchange admin replaced");
    Ok(Outcome::default())
}

pub(crate) fn set_fee_to(
    call: &Call<'_>,
    address: Option<&Address>,
) -> Result<Outcome, ContractError> {
    let mut ex = call.lib.exchange(call.contract)?;
    ex.value.set_fee_to(address.cloned(), call.sender)?;
    call.lib.save_exchange(&ex)?;
    info!(exchange = %call.contract, fee_on = address.is_some(), "protocol fee receiver set");
    Ok(Outcome::default())
}

/// Exchange, hop registration and deadline.
fn route(call: &Call<'_>, path: &[Address], deadline: u64) -> Result<Stored<Exchange>, ContractError> {
    let ex = call.lib.exchange(call.contract)?;
    if path.len() < 2 {
        return Err(ContractError::InvalidPath);
    }
    for hop in path.windows(2) {
        call.lib.pair_address_of(&ex.value, &hop[0], &hop[1])?;
    }
    check_deadline(deadline, call.height)?;
    Ok(ex)
}

pub(crate) fn verify_swap(
    call: &Call<'_>,
    path: &[Address],
    deadline: u64,
    spend: u64,
) -> Result<(), ContractError> {
    route(call, path, deadline)?;
    check_spend(call, &path[0], spend)
}

fn amounts_out(
    lib: &RunnerLibrary,
    ex: &Exchange,
    amount_in: u64,
    path: &[Address],
) -> Result<Vec<u64>, ContractError> {
    let mut amounts = Vec::with_capacity(path.len());
    amounts.push(amount_in);
    let mut current = amount_in;
    for hop in path.windows(2) {
        let address = lib.pair_address_of(ex, &hop[0], &hop[1])?;
        let (reserve_in, reserve_out) = lib.reserves_by_pair_address(&address, &hop[0], &hop[1])?;
        current = math::get_amount_out(current, reserve_in, reserve_out)?;
        amounts.push(current);
    }
    Ok(amounts)
}

fn amounts_in(
    lib: &RunnerLibrary,
    ex: &Exchange,
    amount_out: u64,
    path: &[Address],
) -> Result<Vec<u64>, ContractError> {
    let mut amounts = vec![0u64; path.len()];
    let last = path.len() - 1;
    amounts[last] = amount_out;
    for i in (1..path.len()).rev() {
        let address = lib.pair_address_of(ex, &path[i - 1], &path[i])?;
        let (reserve_in, reserve_out) =
            lib.reserves_by_pair_address(&address, &path[i - 1], &path[i])?;
        amounts[i - 1] = math::get_amount_in(amounts[i], reserve_in, reserve_out)?;
    }
    Ok(amounts)
}

pub(crate) fn swap_exact_in(call: &Call<'_>, f: &ExactIn) -> Result<Outcome, ContractError> {
    let ex = route(call, &f.path, f.deadline)?;
    let amounts = amounts_out(call.lib, &ex.value, f.amount_in, &f.path)?;
    let out = amounts.last().copied().unwrap_or_default();
    if out < f.amount_out_min {
        return Err(ContractError::OutputBelowMin {
            out,
            min: f.amount_out_min,
        });
    }
    check_spend(call, &f.path[0], amounts[0])?;
    execute(call, &ex.value, &amounts, &f.path, &f.to)
}

pub(crate) fn swap_exact_out(call: &Call<'_>, f: &ExactOut) -> Result<Outcome, ContractError> {
    let ex = route(call, &f.path, f.deadline)?;
    let amounts = amounts_in(call.lib, &ex.value, f.amount_out, &f.path)?;
    if amounts[0] > f.amount_in_max {
        return Err(ContractError::InputAboveMax {
            amount_in: amounts[0],
            max: f.amount_in_max,
        });
    }
    check_spend(call, &f.path[0], amounts[0])?;
    execute(call, &ex.value, &amounts, &f.path, &f.to)
}

/// Pay `amounts[0]` into the first pair, then swap hop by hop. Every
/// intermediate output goes straight to the next pair.
fn execute(
    call: &Call<'_>,
    ex: &Exchange,
    amounts: &[u64],
    path: &[Address],
    to: &Address,
) -> Result<Outcome, ContractError> {
    let lib = call.lib;
    let first = lib.pair_address_of(ex, &path[0], &path[1])?;
    let mut events = vec![Event::transfer(
        call.sender,
        &first,
        &path[0],
        amounts[0],
        call.height,
    )];
    let mut pairs: BTreeMap<Address, Stored<Pair>> = BTreeMap::new();

    for i in 0..path.len() - 1 {
        let (input, output) = (&path[i], &path[i + 1]);
        let address = lib.pair_address_of(ex, input, output)?;
        let recipient = if i + 2 < path.len() {
            lib.pair_address_of(ex, output, &path[i + 2])?
        } else {
            to.clone()
        };
        let pair = match pairs.entry(address) {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => {
                let loaded = lib.pair(v.key())?;
                v.insert(loaded)
            }
        };
        let (token0, _) = sort_token(input, output);
        let amount_out = amounts[i + 1];
        let legs = if input == token0 {
            Legs {
                out0: 0,
                out1: amount_out,
            }
        } else {
            Legs {
                out0: amount_out,
                out1: 0,
            }
        };
        swap(call, pair, legs, &recipient, &mut events)?;
    }

    settle(lib, &events)?;
    for pair in pairs.values() {
        lib.save_pair(pair)?;
    }
    let message = amounts
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("-");
    info!(exchange = %call.contract, amounts = %message, "swap executed");
    Ok(Outcome { events, message })
}

struct Legs {
    out0: u64,
    out1: u64,
}

/// What `holder` owns of `token` once `events` are settled: ledger holdings
/// (settled plus journaled credits) plus this call's legs so far.
fn balance_after(
    lib: &RunnerLibrary,
    events: &[Event],
    holder: &Address,
    token: &Address,
) -> Result<u64, ContractError> {
    let mut incoming = lib.holdings(holder, token)?;
    let mut outgoing = 0u64;
    for ev in events.iter().filter(|ev| ev.token == *token) {
        if ev.to == *holder {
            incoming = incoming.checked_add(ev.amount).ok_or(ContractError::Overflow)?;
        }
        if ev.from == *holder {
            outgoing = outgoing.checked_add(ev.amount).ok_or(ContractError::Overflow)?;
        }
    }
    incoming
        .checked_sub(outgoing)
        .ok_or(ContractError::InsufficientLiquidity)
}

/// One hop. The K check runs on the pair's holdings after every leg so far,
/// so tokens sent to the pair outside a swap count as input.
fn swap(
    call: &Call<'_>,
    pair: &mut Stored<Pair>,
    legs: Legs,
    to: &Address,
    events: &mut Vec<Event>,
) -> Result<(), ContractError> {
    if legs.out0 == 0 && legs.out1 == 0 {
        return Err(ContractError::InsufficientOutputAmount);
    }
    let p = &mut pair.value;
    let (reserve0, reserve1) = (p.reserve0, p.reserve1);
    if legs.out0 >= reserve0 || legs.out1 >= reserve1 {
        return Err(ContractError::InsufficientLiquidity);
    }
    if *to == p.token0 || *to == p.token1 {
        return Err(ContractError::InvalidTo);
    }
    if legs.out0 > 0 {
        events.push(Event::transfer(&pair.address, to, &p.token0, legs.out0, call.height));
    }
    if legs.out1 > 0 {
        events.push(Event::transfer(&pair.address, to, &p.token1, legs.out1, call.height));
    }

    let balance0 = balance_after(call.lib, events, &pair.address, &p.token0)?;
    let balance1 = balance_after(call.lib, events, &pair.address, &p.token1)?;
    let amount0_in = balance0.saturating_sub(reserve0 - legs.out0);
    let amount1_in = balance1.saturating_sub(reserve1 - legs.out1);
    if amount0_in == 0 && amount1_in == 0 {
        return Err(ContractError::InsufficientInputAmount);
    }
    math::k_check(balance0, balance1, amount0_in, amount1_in, reserve0, reserve1)?;
    p.update(balance0, balance1, call.block_time);
    Ok(())
}
