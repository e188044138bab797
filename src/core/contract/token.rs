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

use crate::core::contract::ContractError;
use crate::core::tx::TokenIssueBody;
use crate::core::types::{Address, H256};
use serde::{Deserialize, Serialize};

/// One issuance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Block height.
    pub height: u64,
    /// Issuing transaction.
    pub tx_hash: H256,
    /// Transaction time.
    pub time: u64,
    /// Issued amount.
    pub amount: u64,
    /// Receiver.
    pub receiver: Address,
}

/// Issued token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenContract {
    /// Token id.
    pub address: Address,
    /// Display name.
    pub name: String,
    /// Abbreviation.
    pub abbr: String,
    /// Free text.
    pub description: String,
    /// Whether the issuer may issue again.
    pub increase_switch: bool,
    /// First issuer.
    pub issuer: Address,
    /// Issuances in order.
    pub records: Vec<IssueRecord>,
}

impl TokenContract {
    /// Record for a first issuance.
    pub fn new(issuer: &Address, body: &TokenIssueBody) -> Self {
        Self {
            address: body.contract.clone(),
            name: body.name.clone(),
            abbr: body.abbr.clone(),
            description: body.description.clone(),
            increase_switch: body.increase_switch,
            issuer: issuer.clone(),
            records: Vec::new(),
        }
    }

    /// Sum of all issuances.
    pub fn total_issued(&self) -> u64 {
        self.records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.amount))
    }

    /// A further issuance must come from the issuer of an open token and keep the supply in range.
    pub fn verify_increase(&self, sender: &Address, amount: u64) -> Result<(), ContractError> {
        if !self.increase_switch {
            return Err(ContractError::IncreaseClosed(self.address.clone()));
        }
        if *sender != self.issuer {
            return Err(ContractError::Forbidden);
        }
        self.total_issued()
            .checked_add(amount)
            .map(|_| ())
            .ok_or(ContractError::Overflow)
    }

    /// Append an issuance.
    pub fn add_record(&mut self, record: IssueRecord) {
        self.records.push(record);
    }
}
