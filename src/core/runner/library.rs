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

//! Facade the contract runners use to reach the ledger and contract store.
//!
//! Every read returns an owned copy. Runners mutate copies and write them
//! back only after all ledger legs are known to succeed.

use crate::core::config::ChainParams;
use crate::core::contract::pair::sort_token;
use crate::core::contract::{
    ContractBody, ContractError, ContractKind, ContractState, ContractV2, ContractV2State, Event,
    Exchange, Pair, TokenContract,
};
use crate::core::ledger::AccountState;
use crate::core::types::{Address, H256};
use std::sync::Arc;

/// A contract payload together with its envelope fields.
#[derive(Clone, Debug)]
pub struct Stored<T> {
    /// Contract address.
    pub address: Address,
    /// Hash of the creating transaction.
    pub create_hash: H256,
    /// Payload copy.
    pub value: T,
}

/// Runner facade.
#[derive(Clone)]
pub struct RunnerLibrary {
    accounts: Arc<AccountState>,
    contracts: Arc<ContractState>,
}

impl RunnerLibrary {
    /// Wrap both stores.
    pub fn new(accounts: Arc<AccountState>, contracts: Arc<ContractState>) -> Self {
        Self {
            accounts,
            contracts,
        }
    }

    /// Account ledger.
    pub fn accounts(&self) -> &Arc<AccountState> {
        &self.accounts
    }

    /// Contract store.
    pub fn contracts(&self) -> &Arc<ContractState> {
        &self.contracts
    }

    /// Chain parameters.
    pub fn params(&self) -> &ChainParams {
        self.accounts.params()
    }

    /// Settled balance.
    pub fn balance(&self, address: &Address, token: &Address) -> Result<u64, ContractError> {
        Ok(self.accounts.balance(address, token)?)
    }

    /// Settled plus journaled incoming amount of `token` held by `address`.
    /// Outgoing legs already left the balance when they were journaled.
    pub fn holdings(&self, address: &Address, token: &Address) -> Result<u64, ContractError> {
        let account = self.accounts.get_account_state(address)?;
        account
            .balance(token)
            .checked_add(account.locked_in(token))
            .ok_or(ContractError::Overflow)
    }

    /// Check a fee-less transfer.
    pub fn pre_transfer(
        &self,
        from: &Address,
        to: &Address,
        token: &Address,
        amount: u64,
        height: u64,
    ) -> Result<(), ContractError> {
        Ok(self.accounts.pre_transfer(from, to, token, amount, height)?)
    }

    /// Fee-less transfer.
    pub fn transfer(
        &self,
        from: &Address,
        to: &Address,
        token: &Address,
        amount: u64,
        height: u64,
    ) -> Result<(), ContractError> {
        Ok(self.accounts.transfer(from, to, token, amount, height)?)
    }

    /// Canonical pair order.
    pub fn sort_token<'a>(&self, a: &'a Address, b: &'a Address) -> (&'a Address, &'a Address) {
        sort_token(a, b)
    }

    /// Check every leg against copies.
    pub fn pre_run_events(&self, events: &[Event]) -> Result<(), ContractError> {
        Ok(self.accounts.pre_run_events(events)?)
    }

    /// Apply every leg, or none.
    pub fn run_events(&self, events: &[Event]) -> Result<(), ContractError> {
        Ok(self.accounts.run_events(events)?)
    }

    /// Raw contract record.
    pub fn get_contract_v2(&self, address: &Address) -> Result<Option<ContractV2>, ContractError> {
        self.contracts.get_contract_v2(address)
    }

    /// Store a raw contract record.
    pub fn set_contract_v2(&self, contract: &ContractV2) -> Result<(), ContractError> {
        self.contracts.set_contract_v2(contract)
    }

    /// Execution result of `tx_hash`.
    pub fn get_contract_v2_state(
        &self,
        tx_hash: &H256,
    ) -> Result<Option<ContractV2State>, ContractError> {
        self.contracts.get_contract_v2_state(tx_hash)
    }

    /// Store the execution result of `tx_hash`.
    pub fn set_contract_v2_state(
        &self,
        tx_hash: &H256,
        state: &ContractV2State,
    ) -> Result<(), ContractError> {
        self.contracts.set_contract_v2_state(tx_hash, state)
    }

    /// Issued token record.
    pub fn token(&self, address: &Address) -> Result<Option<TokenContract>, ContractError> {
        self.contracts.get_contract(address)
    }

    /// The native token, or a token with an issuance record.
    pub fn token_exists(&self, address: &Address) -> Result<bool, ContractError> {
        if self.params().is_native(address) {
            return Ok(true);
        }
        Ok(self.token(address)?.is_some())
    }

    /// Exchange at `address`.
    pub fn exchange(&self, address: &Address) -> Result<Stored<Exchange>, ContractError> {
        let record = self
            .get_contract_v2(address)?
            .ok_or_else(|| ContractError::ExchangeNotExist(address.clone()))?;
        match record.body {
            ContractBody::Exchange(value) => Ok(Stored {
                address: record.address,
                create_hash: record.create_hash,
                value,
            }),
            ContractBody::Pair(_) => Err(ContractError::WrongKind(
                address.clone(),
                ContractKind::Exchange,
            )),
        }
    }

    /// Pair at `address`.
    pub fn pair(&self, address: &Address) -> Result<Stored<Pair>, ContractError> {
        let record = self
            .get_contract_v2(address)?
            .ok_or_else(|| ContractError::PairNotExist(address.clone()))?;
        match record.body {
            ContractBody::Pair(value) => Ok(Stored {
                address: record.address,
                create_hash: record.create_hash,
                value,
            }),
            ContractBody::Exchange(_) => {
                Err(ContractError::WrongKind(address.clone(), ContractKind::Pair))
            }
        }
    }

    /// Write an exchange back.
    pub fn save_exchange(&self, exchange: &Stored<Exchange>) -> Result<(), ContractError> {
        self.set_contract_v2(&ContractV2 {
            address: exchange.address.clone(),
            create_hash: exchange.create_hash,
            body: ContractBody::Exchange(exchange.value.clone()),
        })
    }

    /// Write a pair back.
    pub fn save_pair(&self, pair: &Stored<Pair>) -> Result<(), ContractError> {
        self.set_contract_v2(&ContractV2 {
            address: pair.address.clone(),
            create_hash: pair.create_hash,
            body: ContractBody::Pair(pair.value.clone()),
        })
    }

    /// Registered pair address of `token_a`/`token_b` in `exchange`.
    pub fn pair_address_of(
        &self,
        exchange: &Exchange,
        token_a: &Address,
        token_b: &Address,
    ) -> Result<Address, ContractError> {
        let (t0, t1) = sort_token(token_a, token_b);
        exchange
            .pair_address(t0, t1)
            .cloned()
            .ok_or_else(|| ContractError::RouteHopMissing(token_a.clone(), token_b.clone()))
    }

    /// Reserves of `pair` in the caller's `(token_a, token_b)` order.
    pub fn reserves_by_pair(&self, pair: &Pair, token_a: &Address, token_b: &Address) -> (u64, u64) {
        let (token0, _) = sort_token(token_a, token_b);
        if token_a == token0 {
            (pair.reserve0, pair.reserve1)
        } else {
            (pair.reserve1, pair.reserve0)
        }
    }

    /// Reserves of the pair stored at `address`, in caller order.
    pub fn reserves_by_pair_address(
        &self,
        address: &Address,
        token_a: &Address,
        token_b: &Address,
    ) -> Result<(u64, u64), ContractError> {
        let pair = self.pair(address)?;
        Ok(self.reserves_by_pair(&pair.value, token_a, token_b))
    }
}
