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

//! Per-address balances under deferred settlement.
//!
//! Invariant: for every token, `lock_out` equals the sum of open out-journal
//! amounts (plus fees for the native token) and `lock_in` equals the sum of
//! open in-journal amounts.

use crate::core::config::ChainParams;
use crate::core::ledger::journal::{InJournal, OutJournal};
use crate::core::ledger::LedgerError;
use crate::core::tx::{Transaction, TxBody};
use crate::core::types::Address;
use serde::{Deserialize, Serialize};

/// Balance record of one token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinAccount {
    /// Token id.
    pub token: Address,
    /// Settled, spendable amount.
    pub balance: u64,
    /// Debited, awaiting confirmation.
    pub lock_out: u64,
    /// Credited, awaiting confirmation.
    pub lock_in: u64,
}

impl CoinAccount {
    fn empty(token: &Address) -> Self {
        Self {
            token: token.clone(),
            balance: 0,
            lock_out: 0,
            lock_in: 0,
        }
    }
}

/// Account record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Owner.
    pub address: Address,
    /// Last applied nonce.
    pub nonce: u64,
    /// Time of the last applied transaction.
    pub time: u64,
    /// Height of the last journal fold.
    pub confirmed_height: u64,
    /// Highest nonce among folded out entries.
    pub confirmed_nonce: u64,
    /// Latest time among folded out entries.
    pub confirmed_time: u64,
    /// Per-token balances; the native token is always present.
    pub coins: Vec<CoinAccount>,
    /// Pending debits.
    pub out_journal: OutJournal,
    /// Pending credits.
    pub in_journal: InJournal,
}

impl Account {
    /// Fresh account holding a zeroed native coin.
    pub fn new(address: Address, native: &Address) -> Self {
        Self {
            address,
            nonce: 0,
            time: 0,
            confirmed_height: 0,
            confirmed_nonce: 0,
            confirmed_time: 0,
            coins: vec![CoinAccount::empty(native)],
            out_journal: OutJournal::default(),
            in_journal: InJournal::default(),
        }
    }

    /// Coin record of `token`.
    pub fn coin(&self, token: &Address) -> Option<&CoinAccount> {
        self.coins.iter().find(|c| c.token == *token)
    }

    fn coin_mut(&mut self, token: &Address) -> &mut CoinAccount {
        let idx = match self.coins.iter().position(|c| c.token == *token) {
            Some(i) => i,
            None => {
                self.coins.push(CoinAccount::empty(token));
                self.coins.len() - 1
            }
        };
        &mut self.coins[idx]
    }

    /// Settled balance of `token`.
    pub fn balance(&self, token: &Address) -> u64 {
        self.coin(token).map(|c| c.balance).unwrap_or(0)
    }

    /// Pending incoming amount of `token`.
    pub fn locked_in(&self, token: &Address) -> u64 {
        self.coin(token).map(|c| c.lock_in).unwrap_or(0)
    }

    /// Pending outgoing amount of `token`.
    pub fn locked_out(&self, token: &Address) -> u64 {
        self.coin(token).map(|c| c.lock_out).unwrap_or(0)
    }

    /// True if a journal entry is open.
    pub fn needs_update(&self) -> bool {
        !self.out_journal.is_empty() || !self.in_journal.is_empty()
    }

    /// Fold every journal entry at or below `confirmed_height`: outs first, then ins.
    pub fn update(&mut self, confirmed_height: u64, native: &Address) -> Result<(), LedgerError> {
        let mut confirmed_nonce = self.confirmed_nonce;
        let mut confirmed_time = self.confirmed_time;

        for out in self.out_journal.due(confirmed_height) {
            let coin = self
                .coins
                .iter_mut()
                .find(|c| c.token == out.token)
                .ok_or(LedgerError::Journal("missing coin for out entry"))?;
            coin.lock_out = coin
                .lock_out
                .checked_sub(out.amount)
                .ok_or(LedgerError::Journal("locked out amount not enough"))?;
            let native_coin = self
                .coins
                .iter_mut()
                .find(|c| c.token == *native)
                .ok_or(LedgerError::Journal("missing native coin"))?;
            native_coin.lock_out = native_coin
                .lock_out
                .checked_sub(out.fees)
                .ok_or(LedgerError::Journal("locked out fees not enough"))?;
            self.out_journal.remove(out.height, &out.token);
            confirmed_nonce = confirmed_nonce.max(out.nonce);
            confirmed_time = confirmed_time.max(out.time);
        }

        for inc in self.in_journal.due(confirmed_height) {
            let coin = self.coin_mut(&inc.token);
            coin.lock_in = coin
                .lock_in
                .checked_sub(inc.amount)
                .ok_or(LedgerError::Journal("locked in amount not enough"))?;
            coin.balance = coin
                .balance
                .checked_add(inc.amount)
                .ok_or(LedgerError::Journal("balance overflow on fold"))?;
            self.in_journal.remove(inc.height, &inc.token);
        }

        self.confirmed_height = self.confirmed_height.max(confirmed_height);
        self.confirmed_nonce = confirmed_nonce;
        self.confirmed_time = confirmed_time;
        Ok(())
    }

    /// Admission nonce rule: above the current nonce, within `max_gap`.
    pub fn verify_nonce(&self, nonce: u64, max_gap: u64) -> Result<(), LedgerError> {
        if nonce <= self.nonce {
            return Err(LedgerError::NonceRepeat);
        }
        if nonce > self.nonce.saturating_add(max_gap) {
            return Err(LedgerError::TooBigNonce);
        }
        Ok(())
    }

    fn check_next_nonce(&self, nonce: u64) -> Result<(), LedgerError> {
        let expected = self.nonce.saturating_add(1);
        if nonce != expected {
            return Err(LedgerError::Nonce {
                expected,
                got: nonce,
            });
        }
        Ok(())
    }

    /// Move `amount` of `token` plus native `fees` from balance to lock_out.
    fn lock(
        &mut self,
        token: &Address,
        amount: u64,
        fees: u64,
        native: &Address,
    ) -> Result<(), LedgerError> {
        if token == native {
            let total = amount.checked_add(fees).ok_or(LedgerError::Overflow)?;
            let coin = self.coin_mut(native);
            if coin.balance < total {
                return Err(LedgerError::NotEnoughBalance);
            }
            coin.balance -= total;
            coin.lock_out = coin.lock_out.checked_add(total).ok_or(LedgerError::Overflow)?;
            return Ok(());
        }
        if self.balance(native) < fees {
            return Err(LedgerError::NotEnoughFees);
        }
        if self.balance(token) < amount {
            return Err(LedgerError::NotEnoughBalance);
        }
        let n = self.coin_mut(native);
        n.balance -= fees;
        n.lock_out = n.lock_out.checked_add(fees).ok_or(LedgerError::Overflow)?;
        let c = self.coin_mut(token);
        c.balance -= amount;
        c.lock_out = c.lock_out.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Sender side of a transaction: nonce, fee and amount debit, one out entry.
    pub fn change_from(
        &mut self,
        tx: &Transaction,
        height: u64,
        params: &ChainParams,
    ) -> Result<(), LedgerError> {
        self.check_next_nonce(tx.nonce())?;
        let native = &params.native_token;
        let fees = tx.fees();
        let (token, amount) = match tx.body() {
            TxBody::Transfer { token, amount, .. } if token == native => {
                // The declared native amount already includes the fee.
                let net = amount.checked_sub(fees).ok_or(LedgerError::NotEnoughFees)?;
                (token, net)
            }
            TxBody::Transfer { token, amount, .. } => (token, *amount),
            TxBody::TransferV2 { token, .. } => (
                token,
                tx.amount().map_err(|e| LedgerError::InvalidTx(e.to_string()))?,
            ),
            TxBody::Contract(_) | TxBody::ContractV2(_) => (native, 0),
        };
        self.lock(token, amount, fees, native)?;
        self.out_journal
            .add(height, token, amount, fees, tx.nonce(), tx.time())?;
        self.nonce = tx.nonce();
        self.time = tx.time();
        Ok(())
    }

    /// Credit `amount` of `token` into lock_in with an in entry.
    pub fn transfer_in(
        &mut self,
        token: &Address,
        amount: u64,
        height: u64,
    ) -> Result<(), LedgerError> {
        let coin = self.coin_mut(token);
        coin.lock_in = coin.lock_in.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.in_journal.add(height, token, amount)
    }

    /// Fee-less debit used by contract legs.
    pub fn transfer_out(
        &mut self,
        token: &Address,
        amount: u64,
        height: u64,
        native: &Address,
    ) -> Result<(), LedgerError> {
        self.lock(token, amount, 0, native)?;
        self.out_journal.add(height, token, amount, 0, 0, 0)
    }

    /// Admission check against this (already folded) account.
    pub fn verify_tx_state(
        &self,
        tx: &Transaction,
        params: &ChainParams,
        now: u64,
    ) -> Result<(), LedgerError> {
        if tx.time() > now {
            return Err(LedgerError::FutureTime);
        }
        self.verify_nonce(tx.nonce(), params.max_address_txs)?;

        let native = &params.native_token;
        let fees = tx.fees();
        match tx.body() {
            TxBody::Transfer { token, amount, .. } if token == native => {
                if self.balance(native) < *amount {
                    return Err(LedgerError::NotEnoughBalance);
                }
            }
            TxBody::TransferV2 { token, .. } if token == native => {
                let total = tx
                    .amount()
                    .map_err(|e| LedgerError::InvalidTx(e.to_string()))?
                    .checked_add(fees)
                    .ok_or(LedgerError::Overflow)?;
                if self.balance(native) < total {
                    return Err(LedgerError::NotEnoughBalance);
                }
            }
            TxBody::Transfer { token, .. } | TxBody::TransferV2 { token, .. } => {
                if self.balance(native) < fees {
                    return Err(LedgerError::NotEnoughFees);
                }
                let amount = tx.amount().map_err(|e| LedgerError::InvalidTx(e.to_string()))?;
                if self.balance(token) < amount {
                    return Err(LedgerError::NotEnoughBalance);
                }
            }
            TxBody::Contract(_) | TxBody::ContractV2(_) => {
                if self.balance(native) < fees {
                    return Err(LedgerError::NotEnoughFees);
                }
            }
        }
        Ok(())
    }
}
