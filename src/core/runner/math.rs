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
#![warn(missing_docs)]

//! Constant-product math. All intermediates are 256-bit; every result is
//! range-checked back into `u64`.
//!
//! Swap fee is 0.5%: inputs are weighted by 995/1000 and the K check
//! discounts `5/1000` of each input.

use crate::core::contract::pair::MINIMUM_LIQUIDITY;
use crate::core::contract::ContractError;
use primitive_types::U256;

const FEE_KEEP: u64 = 995;
const FEE_BASE: u64 = 1000;
const FEE_TAKE: u64 = FEE_BASE - FEE_KEEP;

fn u(v: u64) -> U256 {
    U256::from(v)
}

fn narrow(v: U256) -> Result<u64, ContractError> {
    if v > U256::from(u64::MAX) {
        return Err(ContractError::Overflow);
    }
    Ok(v.low_u64())
}

/// Output for an exact input.
pub fn get_amount_out(amount_in: u64, reserve_in: u64, reserve_out: u64) -> Result<u64, ContractError> {
    if amount_in == 0 {
        return Err(ContractError::InsufficientInputAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(ContractError::InsufficientLiquidity);
    }
    let with_fee = u(amount_in) * u(FEE_KEEP);
    let numerator = with_fee * u(reserve_out);
    let denominator = u(reserve_in) * u(FEE_BASE) + with_fee;
    narrow(numerator / denominator)
}

/// Input needed for an exact output, rounded up by one unit.
pub fn get_amount_in(amount_out: u64, reserve_in: u64, reserve_out: u64) -> Result<u64, ContractError> {
    if amount_out == 0 {
        return Err(ContractError::InsufficientOutputAmount);
    }
    if reserve_in == 0 || reserve_out == 0 || amount_out >= reserve_out {
        return Err(ContractError::InsufficientLiquidity);
    }
    let numerator = u(amount_out) * u(reserve_in) * u(FEE_BASE);
    let denominator = u(reserve_out - amount_out) * u(FEE_KEEP);
    narrow(numerator / denominator + U256::one())
}

/// Counter-amount of `amount_a` at the current price, truncated.
pub fn quote(amount_a: u64, reserve_a: u64, reserve_b: u64) -> Result<u64, ContractError> {
    if amount_a == 0 {
        return Err(ContractError::InsufficientAmount);
    }
    if reserve_a == 0 || reserve_b == 0 {
        return Err(ContractError::InsufficientLiquidity);
    }
    narrow(u(amount_a) * u(reserve_b) / u(reserve_a))
}

/// Deposit amounts that keep the pool price, bounded by desired and minimum amounts.
pub fn optimal_amount(
    reserve_a: u64,
    reserve_b: u64,
    desired_a: u64,
    desired_b: u64,
    min_a: u64,
    min_b: u64,
) -> Result<(u64, u64), ContractError> {
    if reserve_a == 0 && reserve_b == 0 {
        return Ok((desired_a, desired_b));
    }
    let optimal_b = quote(desired_a, reserve_a, reserve_b)?;
    if optimal_b <= desired_b {
        if optimal_b < min_b {
            return Err(ContractError::InsufficientAmountB);
        }
        return Ok((desired_a, optimal_b));
    }
    let optimal_a = quote(desired_b, reserve_b, reserve_a)?;
    if optimal_a < min_a {
        return Err(ContractError::InsufficientAmountA);
    }
    Ok((optimal_a, desired_b))
}

/// LP units owed to the fee receiver for the growth of `sqrt(k)` since `k_last`.
pub fn fee_liquidity(
    reserve0: u64,
    reserve1: u64,
    k_last: u128,
    total_supply: u64,
) -> Result<u64, ContractError> {
    if k_last == 0 {
        return Ok(0);
    }
    let root_k = (u(reserve0) * u(reserve1)).integer_sqrt();
    let root_k_last = U256::from(k_last).integer_sqrt();
    if root_k <= root_k_last {
        return Ok(0);
    }
    let numerator = (root_k - root_k_last) * u(total_supply);
    let denominator = root_k * u(5) + root_k_last;
    narrow(numerator / denominator)
}

/// LP units for a deposit. The first deposit locks `MINIMUM_LIQUIDITY`, which
/// is not included in the returned amount.
pub fn mint_liquidity(
    amount0: u64,
    amount1: u64,
    reserve0: u64,
    reserve1: u64,
    total_supply: u64,
) -> Result<u64, ContractError> {
    if total_supply == 0 {
        let root = narrow((u(amount0) * u(amount1)).integer_sqrt())?;
        return match root.checked_sub(MINIMUM_LIQUIDITY) {
            Some(l) if l > 0 => Ok(l),
            _ => Err(ContractError::InsufficientLiquidityMinted),
        };
    }
    if reserve0 == 0 || reserve1 == 0 {
        return Err(ContractError::InsufficientLiquidity);
    }
    let l0 = narrow(u(amount0) * u(total_supply) / u(reserve0))?;
    let l1 = narrow(u(amount1) * u(total_supply) / u(reserve1))?;
    let liquidity = l0.min(l1);
    if liquidity == 0 {
        return Err(ContractError::InsufficientLiquidityMinted);
    }
    Ok(liquidity)
}

/// Pro-rata share of both reserves for `liquidity` units.
pub fn burn_amounts(
    liquidity: u64,
    reserve0: u64,
    reserve1: u64,
    total_supply: u64,
) -> Result<(u64, u64), ContractError> {
    if total_supply == 0 || liquidity > total_supply {
        return Err(ContractError::InsufficientLiquidityBurned);
    }
    let a0 = narrow(u(liquidity) * u(reserve0) / u(total_supply))?;
    let a1 = narrow(u(liquidity) * u(reserve1) / u(total_supply))?;
    if a0 == 0 && a1 == 0 {
        return Err(ContractError::InsufficientLiquidityBurned);
    }
    Ok((a0, a1))
}

/// Fee-adjusted product after a swap must not fall below the product before it.
pub fn k_check(
    balance0: u64,
    balance1: u64,
    amount0_in: u64,
    amount1_in: u64,
    reserve0: u64,
    reserve1: u64,
) -> Result<(), ContractError> {
    let adjusted0 = (u(balance0) * u(FEE_BASE))
        .checked_sub(u(amount0_in) * u(FEE_TAKE))
        .ok_or(ContractError::K)?;
    let adjusted1 = (u(balance1) * u(FEE_BASE))
        .checked_sub(u(amount1_in) * u(FEE_TAKE))
        .ok_or(ContractError::K)?;
    if adjusted0 * adjusted1 < u(reserve0) * u(reserve1) * u(FEE_BASE * FEE_BASE) {
        return Err(ContractError::K);
    }
    Ok(())
}
