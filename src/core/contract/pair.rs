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

//! Constant-product pair record.

use crate::core::contract::ContractError;
use crate::core::types::Address;
use serde::{Deserialize, Serialize};

/// LP units locked forever on the first mint. They count toward
/// `total_supply` but no ledger account holds them.
pub const MINIMUM_LIQUIDITY: u64 = 1000;

/// Canonical token order of a pair: the lexicographically larger token comes first.
pub fn sort_token<'a>(a: &'a Address, b: &'a Address) -> (&'a Address, &'a Address) {
    if a > b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Pair record. Tokens are in canonical order (see `sort_token`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    /// Owning exchange.
    pub exchange: Address,
    /// Canonical first token.
    pub token0: Address,
    /// Canonical second token.
    pub token1: Address,
    /// Pool balance of `token0`.
    pub reserve0: u64,
    /// Pool balance of `token1`.
    pub reserve1: u64,
    /// Block time of the last reserve update, modulo 2^32.
    pub block_timestamp_last: u32,
    /// Time-weighted `reserve1/reserve0`, Q64.64, wrapping.
    pub price0_cumulative_last: u128,
    /// Time-weighted `reserve0/reserve1`, Q64.64, wrapping.
    pub price1_cumulative_last: u128,
    /// `reserve0 * reserve1` after the last liquidity event while the fee was on.
    pub k_last: u128,
    /// Outstanding LP units, including the locked minimum.
    pub total_supply: u64,
}

impl Pair {
    /// Empty pair.
    pub fn new(exchange: Address, token0: Address, token1: Address) -> Self {
        Self {
            exchange,
            token0,
            token1,
            reserve0: 0,
            reserve1: 0,
            block_timestamp_last: 0,
            price0_cumulative_last: 0,
            price1_cumulative_last: 0,
            k_last: 0,
            total_supply: 0,
        }
    }

    /// `(reserve0, reserve1, block_timestamp_last)`.
    pub fn reserves(&self) -> (u64, u64, u32) {
        (self.reserve0, self.reserve1, self.block_timestamp_last)
    }

    /// Create LP units. Holdings themselves live in the ledger under the pair address.
    pub fn mint(&mut self, amount: u64) -> Result<(), ContractError> {
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(ContractError::Overflow)?;
        Ok(())
    }

    /// Destroy LP units.
    pub fn burn(&mut self, amount: u64) -> Result<(), ContractError> {
        self.total_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(ContractError::InsufficientLiquidityBurned)?;
        Ok(())
    }

    /// Set new reserves and advance the price accumulators by the elapsed time.
    pub fn update(&mut self, balance0: u64, balance1: u64, block_time: u64) {
        let ts = (block_time % (1u64 << 32)) as u32;
        let elapsed = ts.wrapping_sub(self.block_timestamp_last);
        if elapsed > 0 && self.reserve0 != 0 && self.reserve1 != 0 {
            let p0 = (u128::from(self.reserve1) << 64) / u128::from(self.reserve0);
            let p1 = (u128::from(self.reserve0) << 64) / u128::from(self.reserve1);
            self.price0_cumulative_last = self
                .price0_cumulative_last
                .wrapping_add(p0.wrapping_mul(u128::from(elapsed)));
            self.price1_cumulative_last = self
                .price1_cumulative_last
                .wrapping_add(p1.wrapping_mul(u128::from(elapsed)));
        }
        self.reserve0 = balance0;
        self.reserve1 = balance1;
        self.block_timestamp_last = ts;
    }

    /// Record the current product when the protocol fee is on.
    pub fn refresh_k_last(&mut self, fee_on: bool) {
        if fee_on {
            self.k_last = u128::from(self.reserve0) * u128::from(self.reserve1);
        }
    }
}
