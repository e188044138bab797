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

//! Contract record store.
//!
//! Keys:
//! - `c2:<address>`  AMM contract (`ContractV2`)
//! - `tk:<address>`  issued token (`TokenContract`)
//! - `rs:<tx hash>`  execution result (`ContractV2State`)
//!
//! Reads return owned copies; nothing read can alias stored state.

use crate::core::contract::token::IssueRecord;
use crate::core::contract::{ContractError, ContractV2, ContractV2State, TokenContract};
use crate::core::state::TrieStore;
use crate::core::tx::{Transaction, TxBody};
use crate::core::types::{decode_canonical_limited, encode_canonical, Address, H256};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tracing::debug;

const CONTRACT_PREFIX: &[u8] = b"c2:";
const TOKEN_PREFIX: &[u8] = b"tk:";
const RESULT_PREFIX: &[u8] = b"rs:";

fn key(prefix: &[u8], id: &[u8]) -> Vec<u8> {
    let mut k = Vec::with_capacity(prefix.len() + id.len());
    k.extend_from_slice(prefix);
    k.extend_from_slice(id);
    k
}

/// Contract store.
pub struct ContractState {
    store: RwLock<TrieStore>,
    max_record_bytes: usize,
}

impl ContractState {
    /// Open the contract store at `path`.
    pub fn open(path: impl AsRef<Path>, max_record_bytes: usize) -> Result<Self, ContractError> {
        Ok(Self {
            store: RwLock::new(TrieStore::open(path)?),
            max_record_bytes,
        })
    }

    /// Reset to the committed state, which must hash to `root`.
    pub fn init_trie(&self, root: &H256) -> Result<(), ContractError> {
        self.store.write().init_trie(root)?;
        Ok(())
    }

    /// Persist staged writes and return the root.
    pub fn commit(&self) -> Result<H256, ContractError> {
        Ok(self.store.write().commit()?)
    }

    /// Root including staged writes.
    pub fn root_hash(&self) -> Result<H256, ContractError> {
        Ok(self.store.read().root_hash()?)
    }

    /// Drop staged writes.
    pub fn discard(&self) {
        self.store.write().discard();
    }

    fn get<T: DeserializeOwned>(&self, k: &[u8]) -> Result<Option<T>, ContractError> {
        match self.store.read().get(k)? {
            Some(raw) => Ok(Some(decode_canonical_limited(&raw, self.max_record_bytes)?)),
            None => Ok(None),
        }
    }

    fn set<T: Serialize>(&self, k: &[u8], v: &T) -> Result<(), ContractError> {
        let raw = encode_canonical(v)?;
        self.store.write().set(k, raw);
        Ok(())
    }

    /// AMM contract at `address`.
    pub fn get_contract_v2(&self, address: &Address) -> Result<Option<ContractV2>, ContractError> {
        self.get(&key(CONTRACT_PREFIX, address.as_bytes()))
    }

    /// Store an AMM contract under its address.
    pub fn set_contract_v2(&self, contract: &ContractV2) -> Result<(), ContractError> {
        self.set(&key(CONTRACT_PREFIX, contract.address.as_bytes()), contract)
    }

    /// Execution result of `tx_hash`.
    pub fn get_contract_v2_state(
        &self,
        tx_hash: &H256,
    ) -> Result<Option<ContractV2State>, ContractError> {
        self.get(&key(RESULT_PREFIX, tx_hash.as_bytes()))
    }

    /// Store the execution result of `tx_hash`.
    pub fn set_contract_v2_state(
        &self,
        tx_hash: &H256,
        state: &ContractV2State,
    ) -> Result<(), ContractError> {
        self.set(&key(RESULT_PREFIX, tx_hash.as_bytes()), state)
    }

    /// Issued token at `address`.
    pub fn get_contract(&self, address: &Address) -> Result<Option<TokenContract>, ContractError> {
        self.get(&key(TOKEN_PREFIX, address.as_bytes()))
    }

    /// Store an issued token.
    pub fn set_contract(&self, token: &TokenContract) -> Result<(), ContractError> {
        self.set(&key(TOKEN_PREFIX, token.address.as_bytes()), token)
    }

    /// Admission check of a token issue against stored state.
    pub fn verify_state(&self, tx: &Transaction) -> Result<(), ContractError> {
        let TxBody::Contract(body) = tx.body() else {
            return Ok(());
        };
        match self.get_contract(&body.contract)? {
            Some(token) => token.verify_increase(tx.from(), body.amount),
            None => Ok(()),
        }
    }

    /// Apply a token issue: create the record or append to it.
    pub fn update_contract(&self, tx: &Transaction, height: u64) -> Result<(), ContractError> {
        let TxBody::Contract(body) = tx.body() else {
            return Err(ContractError::NotContractCall);
        };
        let mut token = match self.get_contract(&body.contract)? {
            Some(t) => {
                t.verify_increase(tx.from(), body.amount)?;
                t
            }
            None => TokenContract::new(tx.from(), body),
        };
        token.add_record(IssueRecord {
            height,
            tx_hash: tx.hash()?,
            time: tx.time(),
            amount: body.amount,
            receiver: body.to.clone(),
        });
        self.set_contract(&token)?;
        debug!(token = %token.address, amount = body.amount, height, "token issued");
        Ok(())
    }
}
