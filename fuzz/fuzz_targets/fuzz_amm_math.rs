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

#![no_main]
#![forbid(unsafe_code)]

use amunchain_ledger::core::runner::math::{get_amount_in, get_amount_out, k_check};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Clone, Debug, Arbitrary)]
struct Input {
    amount: u64,
    reserve_in: u64,
    reserve_out: u64,
}

fuzz_target!(|inp: Input| {
    let Input {
        amount,
        reserve_in,
        reserve_out,
    } = inp;
    if let Ok(out) = get_amount_out(amount, reserve_in, reserve_out) {
        assert!(out < reserve_out);
        if out > 0 {
            if let (Some(b_in), Some(b_out)) = (reserve_in.checked_add(amount), reserve_out.checked_sub(out)) {
                // Priced output always keeps the product.
                assert!(k_check(b_in, b_out, amount, 0, reserve_in, reserve_out).is_ok());
            }
        }
    }
    if let Ok(needed) = get_amount_in(amount, reserve_in, reserve_out) {
        assert!(needed > 0);
    }
});
