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

use amunchain_ledger::core::contract::{ContractV2, ContractV2State, TokenContract};
use amunchain_ledger::core::ledger::Account;
use amunchain_ledger::core::tx::Transaction;
use amunchain_ledger::core::types::{decode_canonical_limited, encode_canonical};
use libfuzzer_sys::fuzz_target;

const LIMIT: usize = 1 << 20;

// Decoding untrusted store bytes must never panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(acc) = decode_canonical_limited::<Account>(data, LIMIT) {
        // Re-encoding a decoded record must succeed and decode again.
        let bytes = encode_canonical(&acc).expect("encode decoded account");
        let again = decode_canonical_limited::<Account>(&bytes, LIMIT).expect("decode re-encoded account");
        assert_eq!(again, acc);
    }
    let _ = decode_canonical_limited::<ContractV2>(data, LIMIT);
    let _ = decode_canonical_limited::<ContractV2State>(data, LIMIT);
    let _ = decode_canonical_limited::<TokenContract>(data, LIMIT);
    let _ = decode_canonical_limited::<Transaction>(data, LIMIT);
});
