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

use amunchain_ledger::core::state::TrieStore;
use proptest::prelude::*;
use std::collections::BTreeMap;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_state_root_deterministic(
        kvs in prop::collection::vec((prop::collection::vec(any::<u8>(), 1..16),
                                      prop::collection::vec(any::<u8>(), 0..32)), 1..50)
    ) {
        let dir1 = tempfile::tempdir().unwrap();
        let dir2 = tempfile::tempdir().unwrap();
        let mut st1 = TrieStore::open(dir1.path()).unwrap();
        let mut st2 = TrieStore::open(dir2.path()).unwrap();

        let mut map: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();
        for (k, v) in kvs.into_iter() { map.insert(k, v); }

        // Same records, opposite write order.
        for (k, v) in map.iter() {
            st1.set(k, v.clone());
        }
        for (k, v) in map.iter().rev() {
            st2.set(k, v.clone());
        }

        let staged = st1.root_hash().unwrap();
        let r1 = st1.commit().unwrap();
        let r2 = st2.commit().unwrap();

        prop_assert_eq!(staged, r1);
        prop_assert_eq!(r1, r2);
    }
}
