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

//! Pair creation, liquidity provision and withdrawal.
//!
//! LP units are a ledger token whose id is the pair address. When the
//! protocol fee is on, fee liquidity is minted before any other amount is
//! computed, so callers always see the post-fee supply.

use super::{check_deadline, check_spend, math, settle, Call, Outcome, Stored};
use crate::core::contract::pair::{sort_token, MINIMUM_LIQUIDITY};
use crate::core::contract::{ContractError, Event, Exchange, Pair};
use crate::core::tx::builder::pair_address;
use crate::core::tx::function::{AddLiquidity, RemoveLiquidity};
use crate::core::types::Address;
use tracing::info;

fn check_tokens(call: &Call<'_>, token_a: &Address, token_b: &Address) -> Result<(), ContractError> {
    for token in [token_a, token_b] {
        if !call.lib.token_exists(token)? {
            return Err(ContractError::TokenNotExist(token.clone()));
        }
    }
    Ok(())
}

fn check_pair_address(
    call: &Call<'_>,
    exchange: &Address,
    token_a: &Address,
    token_b: &Address,
) -> Result<(), ContractError> {
    let derived = pair_address(call.lib.params().network, token_a, token_b, exchange);
    if derived != *call.contract {
        return Err(ContractError::WrongPairAddress);
    }
    Ok(())
}

/// Exchange and pair of an existing, correctly addressed pair.
fn load_pair(
    call: &Call<'_>,
    exchange: &Address,
    token_a: &Address,
    token_b: &Address,
) -> Result<(Stored<Exchange>, Stored<Pair>), ContractError> {
    let ex = call.lib.exchange(exchange)?;
    check_tokens(call, token_a, token_b)?;
    check_pair_address(call, exchange, token_a, token_b)?;
    let (t0, t1) = sort_token(token_a, token_b);
    if !ex.value.exists(t0, t1) {
        return Err(ContractError::PairNotExist(call.contract.clone()));
    }
    let pair = call.lib.pair(call.contract)?;
    Ok((ex, pair))
}

/// Mint protocol fee liquidity for growth since `k_last`, or clear `k_last`
/// when the fee is off.
fn mint_fee(
    pair: &mut Stored<Pair>,
    fee_to: Option<&Address>,
    height: u64,
    events: &mut Vec<Event>,
) -> Result<(), ContractError> {
    let p = &mut pair.value;
    match fee_to {
        Some(to) => {
            let fee = math::fee_liquidity(p.reserve0, p.reserve1, p.k_last, p.total_supply)?;
            if fee > 0 {
                p.mint(fee)?;
                events.push(Event::mint(to, &pair.address, fee, height));
            }
        }
        None => p.k_last = 0,
    }
    Ok(())
}

pub(crate) fn verify_create(
    call: &Call<'_>,
    exchange: &Address,
    token_a: &Address,
    token_b: &Address,
) -> Result<Stored<Exchange>, ContractError> {
    let ex = call.lib.exchange(exchange)?;
    ex.value.verify_setter(call.sender)?;
    check_tokens(call, token_a, token_b)?;
    let (t0, t1) = sort_token(token_a, token_b);
    if ex.value.exists(t0, t1) || call.lib.get_contract_v2(call.contract)?.is_some() {
        return Err(ContractError::PairExists(call.contract.clone()));
    }
    check_pair_address(call, exchange, token_a, token_b)?;
    Ok(ex)
}

pub(crate) fn pair_create(
    call: &Call<'_>,
    exchange: &Address,
    token_a: &Address,
    token_b: &Address,
) -> Result<Outcome, ContractError> {
    let mut ex = verify_create(call, exchange, token_a, token_b)?;
    let (t0, t1) = sort_token(token_a, token_b);
    ex.value
        .add_pair(t0.clone(), t1.clone(), call.contract.clone());
    let pair = Stored {
        address: call.contract.clone(),
        create_hash: call.tx_hash,
        value: Pair::new(exchange.clone(), t0.clone(), t1.clone()),
    };
    call.lib.save_pair(&pair)?;
    call.lib.save_exchange(&ex)?;
    info!(exchange = %exchange, pair = %call.contract, token0 = %t0, token1 = %t1, "pair created");
    Ok(Outcome::default())
}

/// Admission checks of an add; returns the deposit in caller order.
pub(crate) fn verify_add(
    call: &Call<'_>,
    f: &AddLiquidity,
) -> Result<(Stored<Exchange>, Stored<Pair>, u64, u64), ContractError> {
    let (ex, pair) = load_pair(call, &f.exchange, &f.token_a, &f.token_b)?;
    check_deadline(f.deadline, call.height)?;
    let (reserve_a, reserve_b) = call.lib.reserves_by_pair(&pair.value, &f.token_a, &f.token_b);
    let (amount_a, amount_b) = math::optimal_amount(
        reserve_a,
        reserve_b,
        f.amount_a_desired,
        f.amount_b_desired,
        f.amount_a_min,
        f.amount_b_min,
    )?;
    check_spend(call, &f.token_a, amount_a)?;
    check_spend(call, &f.token_b, amount_b)?;
    Ok((ex, pair, amount_a, amount_b))
}

pub(crate) fn add_liquidity(call: &Call<'_>, f: &AddLiquidity) -> Result<Outcome, ContractError> {
    let (ex, mut pair, amount_a, amount_b) = verify_add(call, f)?;
    let fee_to = ex.value.fee_to();
    let (reserve0, reserve1) = (pair.value.reserve0, pair.value.reserve1);
    let (amount0, amount1) = if f.token_a == pair.value.token0 {
        (amount_a, amount_b)
    } else {
        (amount_b, amount_a)
    };

    let mut events = vec![
        Event::transfer(call.sender, &pair.address, &f.token_a, amount_a, call.height),
        Event::transfer(call.sender, &pair.address, &f.token_b, amount_b, call.height),
    ];
    mint_fee(&mut pair, fee_to, call.height, &mut events)?;

    let p = &mut pair.value;
    let first = p.total_supply == 0;
    let liquidity = math::mint_liquidity(amount0, amount1, reserve0, reserve1, p.total_supply)?;
    if first {
        p.mint(MINIMUM_LIQUIDITY)?;
    }
    p.mint(liquidity)?;
    events.push(Event::mint(&f.to, &pair.address, liquidity, call.height));

    let balance0 = reserve0.checked_add(amount0).ok_or(ContractError::Overflow)?;
    let balance1 = reserve1.checked_add(amount1).ok_or(ContractError::Overflow)?;
    p.update(balance0, balance1, call.block_time);
    p.refresh_k_last(fee_to.is_some());

    settle(call.lib, &events)?;
    call.lib.save_pair(&pair)?;
    info!(pair = %pair.address, amount_a, amount_b, liquidity, "liquidity added");
    Ok(Outcome {
        events,
        message: format!("{amount_a}-{amount_b}-{liquidity}"),
    })
}

/// Full withdrawal plan on copies: updated pair, legs, and amounts in token order.
pub(crate) fn plan_remove(
    call: &Call<'_>,
    f: &RemoveLiquidity,
) -> Result<(Stored<Pair>, Vec<Event>, u64, u64), ContractError> {
    check_deadline(f.deadline, call.height)?;
    let (ex, mut pair) = load_pair(call, &f.exchange, &f.token_a, &f.token_b)?;
    if call.lib.balance(call.sender, call.contract)? < f.liquidity {
        return Err(ContractError::LiquidityNotEnough(call.sender.clone()));
    }
    if pair.value.total_supply < f.liquidity {
        return Err(ContractError::LiquidityNotEnough(call.contract.clone()));
    }
    let fee_to = ex.value.fee_to();
    let (reserve0, reserve1) = (pair.value.reserve0, pair.value.reserve1);
    let mut events = Vec::new();
    mint_fee(&mut pair, fee_to, call.height, &mut events)?;

    let p = &mut pair.value;
    let (amount0, amount1) = math::burn_amounts(f.liquidity, reserve0, reserve1, p.total_supply)?;
    let (min0, min1) = if f.token_a == p.token0 {
        (f.amount_a_min, f.amount_b_min)
    } else {
        (f.amount_b_min, f.amount_a_min)
    };
    if amount0 < min0 || amount1 < min1 {
        return Err(ContractError::NotMeetExpectations);
    }
    p.burn(f.liquidity)?;
    events.push(Event::burn(call.sender, &pair.address, f.liquidity, call.height));
    if amount0 > 0 {
        events.push(Event::transfer(&pair.address, &f.to, &p.token0, amount0, call.height));
    }
    if amount1 > 0 {
        events.push(Event::transfer(&pair.address, &f.to, &p.token1, amount1, call.height));
    }
    p.update(reserve0 - amount0, reserve1 - amount1, call.block_time);
    p.refresh_k_last(fee_to.is_some());
    Ok((pair, events, amount0, amount1))
}

pub(crate) fn remove_liquidity(
    call: &Call<'_>,
    f: &RemoveLiquidity,
) -> Result<Outcome, ContractError> {
    let (pair, events, amount0, amount1) = plan_remove(call, f)?;
    settle(call.lib, &events)?;
    call.lib.save_pair(&pair)?;
    info!(pair = %pair.address, liquidity = f.liquidity, amount0, amount1, "liquidity removed");
    Ok(Outcome {
        events,
        message: format!("{amount0}-{amount1}"),
    })
}
