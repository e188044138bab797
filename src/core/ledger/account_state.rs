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

//! Account store.
//!
//! Every read folds the account's journals at the current confirmed height
//! before returning it. Folded copies are written back only by mutating calls.

use crate::core::config::ChainParams;
use crate::core::contract::{Event, EventType};
use crate::core::ledger::{Account, LedgerError};
use crate::core::state::TrieStore;
use crate::core::tx::{Transaction, TxBody, TxType};
use crate::core::types::{decode_canonical_limited, encode_canonical, now_secs, Address, H256};
use parking_lot::RwLock;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error};

/// Ledger of all accounts.
pub struct AccountState {
    store: RwLock<TrieStore>,
    confirmed_height: AtomicU64,
    folds: AtomicU64,
    params: ChainParams,
}

/// Folded copies of the accounts touched by one batch of legs.
struct Working<'a> {
    state: &'a AccountState,
    store: &'a TrieStore,
    accounts: BTreeMap<Address, Account>,
}

impl<'a> Working<'a> {
    fn new(state: &'a AccountState, store: &'a TrieStore) -> Self {
        Self {
            state,
            store,
            accounts: BTreeMap::new(),
        }
    }

    fn account(&mut self, address: &Address) -> Result<&mut Account, LedgerError> {
        match self.accounts.entry(address.clone()) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(v) => Ok(v.insert(self.state.load_folded(self.store, address)?)),
        }
    }

    fn apply(&mut self, ev: &Event) -> Result<(), LedgerError> {
        let state = self.state;
        let native = &state.params.native_token;
        match ev.event_type {
            EventType::Transfer => {
                self.account(&ev.from)?
                    .transfer_out(&ev.token, ev.amount, ev.height, native)?;
                self.account(&ev.to)?
                    .transfer_in(&ev.token, ev.amount, ev.height)
            }
            EventType::Mint => self
                .account(&ev.to)?
                .transfer_in(&ev.token, ev.amount, ev.height),
            EventType::Burn => self
                .account(&ev.from)?
                .transfer_out(&ev.token, ev.amount, ev.height, native),
        }
    }
}

impl AccountState {
    /// Open the account store at `path`.
    pub fn open(path: impl AsRef<Path>, params: ChainParams) -> Result<Self, LedgerError> {
        Ok(Self {
            store: RwLock::new(TrieStore::open(path)?),
            confirmed_height: AtomicU64::new(0),
            folds: AtomicU64::new(0),
            params,
        })
    }

    /// Chain parameters.
    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    /// Reset to the committed state, which must hash to `root`.
    pub fn init_trie(&self, root: &H256) -> Result<(), LedgerError> {
        self.store.write().init_trie(root)?;
        Ok(())
    }

    /// Advance (or rewind) the finality cursor used by journal folds.
    pub fn set_confirmed_height(&self, height: u64) {
        self.confirmed_height.store(height, Ordering::SeqCst);
    }

    /// Current finality cursor.
    pub fn confirmed_height(&self) -> u64 {
        self.confirmed_height.load(Ordering::SeqCst)
    }

    /// Journal folds performed since open, reads included.
    pub fn journal_folds(&self) -> u64 {
        self.folds.load(Ordering::Relaxed)
    }

    fn load(&self, store: &TrieStore, address: &Address) -> Result<Account, LedgerError> {
        match store.get(address.as_bytes())? {
            Some(raw) => Ok(decode_canonical_limited(&raw, self.params.max_record_bytes)?),
            None => Ok(Account::new(address.clone(), &self.params.native_token)),
        }
    }

    fn load_folded(&self, store: &TrieStore, address: &Address) -> Result<Account, LedgerError> {
        let mut account = self.load(store, address)?;
        if account.needs_update() {
            let height = self.confirmed_height();
            if let Err(e) = account.update(height, &self.params.native_token) {
                error!(address = %address, height, error = %e, "journal fold failed");
                return Err(e);
            }
            self.folds.fetch_add(1, Ordering::Relaxed);
        }
        Ok(account)
    }

    fn save(&self, store: &mut TrieStore, account: &Account) -> Result<(), LedgerError> {
        let raw = encode_canonical(account)?;
        store.set(account.address.as_bytes(), raw);
        Ok(())
    }

    /// Account with every qualifying journal entry folded.
    pub fn get_account_state(&self, address: &Address) -> Result<Account, LedgerError> {
        let store = self.store.read();
        self.load_folded(&store, address)
    }

    /// Last applied nonce.
    pub fn account_nonce(&self, address: &Address) -> Result<u64, LedgerError> {
        Ok(self.get_account_state(address)?.nonce)
    }

    /// Settled balance.
    pub fn balance(&self, address: &Address, token: &Address) -> Result<u64, LedgerError> {
        Ok(self.get_account_state(address)?.balance(token))
    }

    /// Admission check at wall-clock time.
    pub fn verify_state(&self, tx: &Transaction) -> Result<(), LedgerError> {
        self.verify_state_at(tx, now_secs())
    }

    /// Admission check at `now` (unix seconds).
    pub fn verify_state_at(&self, tx: &Transaction, now: u64) -> Result<(), LedgerError> {
        let account = self.get_account_state(tx.from())?;
        account.verify_tx_state(tx, &self.params, now)
    }

    fn expect_type(tx: &Transaction, want: TxType) -> Result<(), LedgerError> {
        if tx.tx_type() != want {
            return Err(LedgerError::InvalidTx(format!(
                "expected {want:?}, got {:?}",
                tx.tx_type()
            )));
        }
        Ok(())
    }

    fn update_from(&self, tx: &Transaction, height: u64) -> Result<(), LedgerError> {
        let mut store = self.store.write();
        let mut account = self.load_folded(&store, tx.from())?;
        account.change_from(tx, height, &self.params)?;
        self.save(&mut store, &account)?;
        debug!(address = %tx.from(), nonce = tx.nonce(), height, "sender debited");
        Ok(())
    }

    fn credit(&self, credits: &[(&Address, &Address, u64)], height: u64) -> Result<(), LedgerError> {
        let mut store = self.store.write();
        let mut work = Working::new(self, &store);
        for (address, token, amount) in credits {
            work.account(address)?.transfer_in(token, *amount, height)?;
        }
        let accounts = work.accounts;
        for account in accounts.values() {
            self.save(&mut store, account)?;
        }
        Ok(())
    }

    /// Sender side of a single-receiver transfer.
    pub fn update_transfer_from(&self, tx: &Transaction, height: u64) -> Result<(), LedgerError> {
        Self::expect_type(tx, TxType::Transfer)?;
        self.update_from(tx, height)
    }

    /// Receiver side of a single-receiver transfer. A native receiver gets the amount net of fee.
    pub fn update_transfer_to(&self, tx: &Transaction, height: u64) -> Result<(), LedgerError> {
        let TxBody::Transfer { token, to, amount } = tx.body() else {
            return Self::expect_type(tx, TxType::Transfer);
        };
        let credited = if self.params.is_native(token) {
            amount
                .checked_sub(tx.fees())
                .ok_or(LedgerError::NotEnoughFees)?
        } else {
            *amount
        };
        self.credit(&[(to, token, credited)], height)
    }

    /// Sender side of a multi-receiver transfer.
    pub fn update_transfer_v2_from(
        &self,
        tx: &Transaction,
        height: u64,
    ) -> Result<(), LedgerError> {
        Self::expect_type(tx, TxType::TransferV2)?;
        self.update_from(tx, height)
    }

    /// Receiver side of a multi-receiver transfer.
    pub fn update_transfer_v2_to(&self, tx: &Transaction, height: u64) -> Result<(), LedgerError> {
        let TxBody::TransferV2 { token, receivers } = tx.body() else {
            return Self::expect_type(tx, TxType::TransferV2);
        };
        let credits: Vec<(&Address, &Address, u64)> = receivers
            .iter()
            .map(|r| (&r.address, token, r.amount))
            .collect();
        self.credit(&credits, height)
    }

    /// Sender side of a contract call or token issue: fee only.
    pub fn update_contract_from(&self, tx: &Transaction, height: u64) -> Result<(), LedgerError> {
        match tx.tx_type() {
            TxType::Contract | TxType::ContractV2 => self.update_from(tx, height),
            _ => Self::expect_type(tx, TxType::Contract),
        }
    }

    /// Receiver side of a token issue.
    pub fn update_contract_to(&self, tx: &Transaction, height: u64) -> Result<(), LedgerError> {
        let TxBody::Contract(body) = tx.body() else {
            return Self::expect_type(tx, TxType::Contract);
        };
        self.credit(&[(&body.to, &body.contract, body.amount)], height)
    }

    /// Credit the fee collector.
    pub fn update_fees(&self, fees: u64, height: u64) -> Result<(), LedgerError> {
        if fees == 0 {
            return Ok(());
        }
        let p = &self.params;
        self.credit(&[(&p.fee_address, &p.native_token, fees)], height)
    }

    /// Credit the consumption sink.
    pub fn update_consumption(&self, amount: u64, height: u64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        let p = &self.params;
        self.credit(&[(&p.eater_address, &p.native_token, amount)], height)
    }

    /// Check a fee-less transfer without mutating anything.
    pub fn pre_transfer(
        &self,
        from: &Address,
        to: &Address,
        token: &Address,
        amount: u64,
        height: u64,
    ) -> Result<(), LedgerError> {
        self.pre_run_events(&[Event::transfer(from, to, token, amount, height)])
    }

    /// Fee-less transfer: sender lock_out, receiver lock_in, journaled at `height`.
    pub fn transfer(
        &self,
        from: &Address,
        to: &Address,
        token: &Address,
        amount: u64,
        height: u64,
    ) -> Result<(), LedgerError> {
        self.run_events(&[Event::transfer(from, to, token, amount, height)])
    }

    /// Credit newly created units of `token`.
    pub fn mint(
        &self,
        to: &Address,
        token: &Address,
        amount: u64,
        height: u64,
    ) -> Result<(), LedgerError> {
        self.run_events(&[Event::mint(to, token, amount, height)])
    }

    /// Destroy units of `token` held by `from`.
    pub fn burn(
        &self,
        from: &Address,
        token: &Address,
        amount: u64,
        height: u64,
    ) -> Result<(), LedgerError> {
        self.run_events(&[Event::burn(from, token, amount, height)])
    }

    /// Apply `events` in order to throwaway copies.
    pub fn pre_run_events(&self, events: &[Event]) -> Result<(), LedgerError> {
        let store = self.store.read();
        let mut work = Working::new(self, &store);
        for ev in events {
            work.apply(ev)?;
        }
        Ok(())
    }

    /// Apply `events` in order; all of them or none.
    pub fn run_events(&self, events: &[Event]) -> Result<(), LedgerError> {
        let mut store = self.store.write();
        let mut work = Working::new(self, &store);
        for ev in events {
            work.apply(ev)?;
        }
        let accounts = work.accounts;
        for account in accounts.values() {
            self.save(&mut store, account)?;
        }
        Ok(())
    }

    /// Persist staged writes and return the root.
    pub fn commit(&self) -> Result<H256, LedgerError> {
        Ok(self.store.write().commit()?)
    }

    /// Root including staged writes.
    pub fn root_hash(&self) -> Result<H256, LedgerError> {
        Ok(self.store.read().root_hash()?)
    }

    /// Drop staged writes.
    pub fn discard(&self) {
        self.store.write().discard();
    }
}
