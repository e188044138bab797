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

//! Height-keyed logs of unsettled balance deltas.
//!
//! Entries are unique per `(height, token)`; a second addition under the same
//! key merges into the existing entry. Arrival order is kept for folding.

use crate::core::ledger::LedgerError;
use crate::core::types::Address;
use serde::{Deserialize, Serialize};

/// Pending outgoing delta. `fees` are always denominated in the native token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutEntry {
    /// Block height the debit was applied at.
    pub height: u64,
    /// Token of `amount`.
    pub token: Address,
    /// Locked amount of `token`.
    pub amount: u64,
    /// Locked native fee.
    pub fees: u64,
    /// Highest nonce merged into this entry.
    pub nonce: u64,
    /// Latest tx time merged into this entry.
    pub time: u64,
}

/// Pending incoming delta.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InEntry {
    /// Block height the credit was applied at.
    pub height: u64,
    /// Credited token.
    pub token: Address,
    /// Locked amount.
    pub amount: u64,
}

/// Outgoing journal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutJournal {
    entries: Vec<OutEntry>,
}

impl OutJournal {
    /// Record a debit, merging with an existing `(height, token)` entry.
    pub fn add(
        &mut self,
        height: u64,
        token: &Address,
        amount: u64,
        fees: u64,
        nonce: u64,
        time: u64,
    ) -> Result<(), LedgerError> {
        if let Some(e) = self
            .entries
            .iter_mut()
            .find(|e| e.height == height && e.token == *token)
        {
            e.amount = e.amount.checked_add(amount).ok_or(LedgerError::Overflow)?;
            e.fees = e.fees.checked_add(fees).ok_or(LedgerError::Overflow)?;
            e.nonce = e.nonce.max(nonce);
            e.time = e.time.max(time);
            return Ok(());
        }
        self.entries.push(OutEntry {
            height,
            token: token.clone(),
            amount,
            fees,
            nonce,
            time,
        });
        Ok(())
    }

    /// Entries settled at `confirmed_height`, in arrival order.
    pub fn due(&self, confirmed_height: u64) -> Vec<OutEntry> {
        self.entries
            .iter()
            .filter(|e| e.height <= confirmed_height)
            .cloned()
            .collect()
    }

    /// Remove the `(height, token)` entry.
    pub fn remove(&mut self, height: u64, token: &Address) {
        self.entries
            .retain(|e| !(e.height == height && e.token == *token));
    }

    /// Open entries.
    pub fn entries(&self) -> &[OutEntry] {
        &self.entries
    }

    /// True if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Incoming journal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InJournal {
    entries: Vec<InEntry>,
}

impl InJournal {
    /// Record a credit, merging with an existing `(height, token)` entry.
    pub fn add(&mut self, height: u64, token: &Address, amount: u64) -> Result<(), LedgerError> {
        if let Some(e) = self
            .entries
            .iter_mut()
            .find(|e| e.height == height && e.token == *token)
        {
            e.amount = e.amount.checked_add(amount).ok_or(LedgerError::Overflow)?;
            return Ok(());
        }
        self.entries.push(InEntry {
            height,
            token: token.clone(),
            amount,
        });
        Ok(())
    }

    /// Entries settled at `confirmed_height`, in arrival order.
    pub fn due(&self, confirmed_height: u64) -> Vec<InEntry> {
        self.entries
            .iter()
            .filter(|e| e.height <= confirmed_height)
            .cloned()
            .collect()
    }

    /// Remove the `(height, token)` entry.
    pub fn remove(&mut self, height: u64, token: &Address) {
        self.entries
            .retain(|e| !(e.height == height && e.token == *token));
    }

    /// Open entries.
    pub fn entries(&self) -> &[InEntry] {
        &self.entries
    }

    /// True if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
