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

//! Transaction executor.
//!
//! Applies a transaction's effects in node order: sender debit (fee and
//! nonce), receiver credit, fee collector credit, then contract execution.
//! All writes are staged until `commit`, which returns both state roots.

use crate::core::config::{ChainParams, NodeConfig};
use crate::core::contract::{ContractError, ContractState, ContractV2State, StateKind};
use crate::core::ledger::{AccountState, LedgerError};
use crate::core::runner::{ContractRunner, ExchangePair, RunnerError, RunnerLibrary};
use crate::core::tx::function::Function;
use crate::core::tx::{Transaction, TxBody, TxError, TxType};
use crate::core::types::{now_secs, Address, CodecError, H256};
use crate::monitoring::metrics::Metrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Execution error.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid transaction: {0}")]
    Tx(#[from] TxError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ExecError {
    /// True if block application must stop and staged state be discarded.
    pub fn is_fatal(&self) -> bool {
        match self {
            ExecError::Tx(_) => false,
            ExecError::Ledger(e) => e.is_fatal(),
            ExecError::Contract(e) => e.is_fatal(),
            ExecError::Runner(_) | ExecError::Codec(_) => true,
        }
    }
}

/// Account and contract roots after a commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRoots {
    /// Account store root.
    pub account: H256,
    /// Contract store root.
    pub contract: H256,
}

/// Ledger plus contract engine.
pub struct TxExecutor {
    accounts: Arc<AccountState>,
    contracts: Arc<ContractState>,
    runner: ContractRunner,
    metrics: Option<Arc<Metrics>>,
}

impl TxExecutor {
    /// Open both stores under the configured data directory.
    pub fn open(config: &NodeConfig) -> Result<Self, ExecError> {
        let accounts = Arc::new(AccountState::open(config.account_dir(), config.chain.clone())?);
        let contracts = Arc::new(ContractState::open(
            config.contract_dir(),
            config.chain.max_record_bytes,
        )?);
        let runner = ContractRunner::new(RunnerLibrary::new(accounts.clone(), contracts.clone()));
        info!(data_dir = %config.node.data_dir.display(), network = ?config.chain.network, "state opened");
        Ok(Self {
            accounts,
            contracts,
            runner,
            metrics: None,
        })
    }

    /// Report into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Chain parameters.
    pub fn params(&self) -> &ChainParams {
        self.accounts.params()
    }

    /// Account ledger.
    pub fn accounts(&self) -> &AccountState {
        &self.accounts
    }

    /// Contract store.
    pub fn contracts(&self) -> &ContractState {
        &self.contracts
    }

    /// Contract runner.
    pub fn runner(&self) -> &ContractRunner {
        &self.runner
    }

    /// Admission check at wall-clock time against the state after `last_height`.
    pub fn verify_tx(&self, tx: &Transaction, last_height: u64) -> Result<(), ExecError> {
        self.verify_tx_at(tx, last_height, now_secs())
    }

    /// Admission check at `now` (unix seconds). Reads only.
    pub fn verify_tx_at(&self, tx: &Transaction, last_height: u64, now: u64) -> Result<(), ExecError> {
        let result = self.verify_inner(tx, last_height, now);
        if let Err(e) = &result {
            debug!(from = %tx.from(), nonce = tx.nonce(), error = %e, "transaction rejected");
            if let Some(m) = &self.metrics {
                m.transactions_rejected_total.inc();
            }
        }
        result
    }

    fn verify_inner(&self, tx: &Transaction, last_height: u64, now: u64) -> Result<(), ExecError> {
        tx.verify_body(self.params())?;
        self.accounts.verify_state_at(tx, now)?;
        match tx.body() {
            TxBody::Contract(_) => self.contracts.verify_state(tx)?,
            TxBody::ContractV2(_) => self.runner.verify(tx, last_height)?,
            TxBody::Transfer { .. } | TxBody::TransferV2 { .. } => {}
        }
        Ok(())
    }

    /// Apply one admitted transaction at `height`. Contract calls return their stored result.
    pub fn apply_tx(
        &self,
        tx: &Transaction,
        height: u64,
        block_time: u64,
    ) -> Result<Option<ContractV2State>, ExecError> {
        let mut result = None;
        match tx.tx_type() {
            TxType::Transfer => {
                self.accounts.update_transfer_from(tx, height)?;
                self.accounts.update_transfer_to(tx, height)?;
                self.accounts.update_fees(tx.fees(), height)?;
            }
            TxType::TransferV2 => {
                self.accounts.update_transfer_v2_from(tx, height)?;
                self.accounts.update_transfer_v2_to(tx, height)?;
                self.accounts.update_fees(tx.fees(), height)?;
            }
            TxType::Contract => {
                // Reject before anything is debited.
                self.contracts.verify_state(tx)?;
                self.accounts.update_contract_from(tx, height)?;
                self.contracts.update_contract(tx, height)?;
                self.accounts.update_contract_to(tx, height)?;
                self.accounts.update_consumption(tx.fees(), height)?;
            }
            TxType::ContractV2 => {
                self.accounts.update_contract_from(tx, height)?;
                self.accounts.update_fees(tx.fees(), height)?;
                let state = self.runner.run_contract(tx, height, block_time)?;
                self.observe_contract(tx, &state);
                result = Some(state);
            }
        }
        if let Some(m) = &self.metrics {
            m.transactions_total.inc();
            m.journal_folds.set(to_gauge(self.accounts.journal_folds()));
        }
        debug!(from = %tx.from(), nonce = tx.nonce(), height, kind = ?tx.tx_type(), "transaction applied");
        Ok(result)
    }

    fn observe_contract(&self, tx: &Transaction, state: &ContractV2State) {
        if state.state == StateKind::Failed {
            warn!(from = %tx.from(), nonce = tx.nonce(), error = %state.error, "contract call failed");
        }
        let Some(m) = &self.metrics else {
            return;
        };
        if state.state != StateKind::Success {
            m.contract_failed_total.inc();
            return;
        }
        m.contract_success_total.inc();
        if let TxBody::ContractV2(body) = tx.body() {
            match body.function {
                Function::SwapExactIn(_) | Function::SwapExactOut(_) => m.swaps_total.inc(),
                Function::AddLiquidity(_) | Function::RemoveLiquidity(_) => {
                    m.liquidity_ops_total.inc()
                }
                _ => {}
            }
        }
    }

    /// Apply every transaction of a block in order. Stops at the first error;
    /// the caller then discards the staged state.
    pub fn apply_block(
        &self,
        txs: &[Transaction],
        height: u64,
        block_time: u64,
    ) -> Result<Vec<Option<ContractV2State>>, ExecError> {
        let mut results = Vec::with_capacity(txs.len());
        for tx in txs {
            results.push(self.apply_tx(tx, height, block_time)?);
        }
        if let Some(m) = &self.metrics {
            m.block_height.set(to_gauge(height));
        }
        info!(height, txs = txs.len(), "block applied");
        Ok(results)
    }

    /// Advance the finality cursor.
    pub fn set_confirmed_height(&self, height: u64) {
        self.accounts.set_confirmed_height(height);
        if let Some(m) = &self.metrics {
            m.confirmed_height.set(to_gauge(height));
        }
    }

    /// Reset both stores to committed state matching `roots`.
    pub fn init(&self, roots: &StateRoots) -> Result<(), ExecError> {
        self.accounts.init_trie(&roots.account)?;
        self.contracts.init_trie(&roots.contract)?;
        Ok(())
    }

    /// Persist staged writes of both stores.
    pub fn commit(&self) -> Result<StateRoots, ExecError> {
        let roots = StateRoots {
            account: self.accounts.commit()?,
            contract: self.contracts.commit()?,
        };
        info!(account_root = %roots.account, contract_root = %roots.contract, "state committed");
        Ok(roots)
    }

    /// Roots including staged writes.
    pub fn roots(&self) -> Result<StateRoots, ExecError> {
        Ok(StateRoots {
            account: self.accounts.root_hash()?,
            contract: self.contracts.root_hash()?,
        })
    }

    /// Drop staged writes of both stores.
    pub fn discard(&self) {
        self.accounts.discard();
        self.contracts.discard();
    }

    /// Stored result of a contract call.
    pub fn contract_result(&self, tx_hash: &H256) -> Result<Option<ContractV2State>, ExecError> {
        Ok(self.contracts.get_contract_v2_state(tx_hash)?)
    }

    /// Routing view of an exchange.
    pub fn exchange_pairs(&self, exchange: &Address) -> Result<Vec<ExchangePair>, ExecError> {
        Ok(self.runner.exchange_pairs(exchange)?)
    }
}

fn to_gauge(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
