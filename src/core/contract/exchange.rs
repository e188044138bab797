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

//! Exchange: pair registry plus admin and protocol-fee governance.
//!
//! Only `admin`, `fee_to` and the insertion-ordered pair list are encoded.
//! The `(token0, token1)` index is rebuilt on decode.

use crate::core::contract::ContractError;
use crate::core::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Registered pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairEntry {
    /// Canonical first token.
    pub token0: Address,
    /// Canonical second token.
    pub token1: Address,
    /// Pair contract address.
    pub address: Address,
}

/// Encoded form of an exchange.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExchangeRecord {
    /// Governance principal.
    pub admin: Address,
    /// Protocol fee receiver.
    pub fee_to: Option<Address>,
    /// Pairs in registration order.
    pub all_pairs: Vec<PairEntry>,
}

/// Exchange record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ExchangeRecord", into = "ExchangeRecord")]
pub struct Exchange {
    admin: Address,
    fee_to: Option<Address>,
    pairs: BTreeMap<(Address, Address), Address>,
    all_pairs: Vec<PairEntry>,
}

impl From<ExchangeRecord> for Exchange {
    fn from(r: ExchangeRecord) -> Self {
        let pairs = r
            .all_pairs
            .iter()
            .map(|p| ((p.token0.clone(), p.token1.clone()), p.address.clone()))
            .collect();
        Self {
            admin: r.admin,
            fee_to: r.fee_to,
            pairs,
            all_pairs: r.all_pairs,
        }
    }
}

impl From<Exchange> for ExchangeRecord {
    fn from(e: Exchange) -> Self {
        Self {
            admin: e.admin,
            fee_to: e.fee_to,
            all_pairs: e.all_pairs,
        }
    }
}

impl Exchange {
    /// Empty registry.
    pub fn new(admin: Address, fee_to: Option<Address>) -> Self {
        Self {
            admin,
            fee_to,
            pairs: BTreeMap::new(),
            all_pairs: Vec::new(),
        }
    }

    /// Governance principal.
    pub fn admin(&self) -> &Address {
        &self.admin
    }

    /// Protocol fee receiver.
    pub fn fee_to(&self) -> Option<&Address> {
        self.fee_to.as_ref()
    }

    /// Reject anyone but the admin.
    pub fn verify_setter(&self, sender: &Address) -> Result<(), ContractError> {
        if *sender != self.admin {
            return Err(ContractError::Forbidden);
        }
        Ok(())
    }

    /// Replace the admin.
    pub fn set_admin(&mut self, address: Address, sender: &Address) -> Result<(), ContractError> {
        self.verify_setter(sender)?;
        self.admin = address;
        Ok(())
    }

    /// Replace the fee receiver.
    pub fn set_fee_to(
        &mut self,
        address: Option<Address>,
        sender: &Address,
    ) -> Result<(), ContractError> {
        self.verify_setter(sender)?;
        self.fee_to = address;
        Ok(())
    }

    /// True if a pair for the canonical `(token0, token1)` is registered.
    pub fn exists(&self, token0: &Address, token1: &Address) -> bool {
        self.pairs
            .contains_key(&(token0.clone(), token1.clone()))
    }

    /// Address of the canonical `(token0, token1)` pair.
    pub fn pair_address(&self, token0: &Address, token1: &Address) -> Option<&Address> {
        self.pairs.get(&(token0.clone(), token1.clone()))
    }

    /// Register a pair. The caller checks for duplicates.
    pub fn add_pair(&mut self, token0: Address, token1: Address, address: Address) {
        self.pairs
            .insert((token0.clone(), token1.clone()), address.clone());
        self.all_pairs.push(PairEntry {
            token0,
            token1,
            address,
        });
    }

    /// Pairs in registration order.
    pub fn all_pairs(&self) -> &[PairEntry] {
        &self.all_pairs
    }
}
