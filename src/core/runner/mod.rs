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

//! AMM contract execution.
//!
//! `verify` is the read-only admission check and may run concurrently with
//! other verifications. `run_contract` holds the gate exclusively, so at most
//! one contract execution is in flight. A run either commits every ledger leg
//! and contract record it produced, or none of them; in both cases the result
//! is stored under the transaction hash.

/// Exchange governance and swaps.
pub mod exchange_runner;
/// Facade over ledger and contract store.
pub mod library;
/// Constant-product math.
pub mod math;
/// Pair creation and liquidity.
pub mod pair_runner;

pub use library::{RunnerLibrary, Stored};

use crate::core::contract::{ContractError, ContractV2State, Event};
use crate::core::ledger::LedgerError;
use crate::core::state::StateError;
use crate::core::tx::function::Function;
use crate::core::tx::{Transaction, TxBody};
use crate::core::types::{Address, CodecError, H256};
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

/// Failures that abort block application. Contract rejections never surface here.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("not a contract call")]
    NotContractCall,
    #[error("unexpected contract error: {0}")]
    Unexpected(String),
}

impl From<ContractError> for RunnerError {
    fn from(e: ContractError) -> Self {
        match e {
            ContractError::Ledger(e) => RunnerError::Ledger(e),
            ContractError::State(e) => RunnerError::State(e),
            ContractError::Codec(e) => RunnerError::Codec(e),
            ContractError::NotContractCall => RunnerError::NotContractCall,
            other => RunnerError::Unexpected(other.to_string()),
        }
    }
}

/// Routing view of one registered pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExchangePair {
    /// Pair contract address.
    pub address: Address,
    /// Canonical first token.
    pub token0: Address,
    /// Canonical second token.
    pub token1: Address,
    /// Reserve of `token0`.
    pub reserve0: u64,
    /// Reserve of `token1`.
    pub reserve1: u64,
}

/// Per-transaction context handed to the operation runners.
pub(crate) struct Call<'a> {
    pub lib: &'a RunnerLibrary,
    pub sender: &'a Address,
    pub contract: &'a Address,
    pub tx_hash: H256,
    /// Native fee still to be covered by the sender's balance; zero once charged.
    pub fees: u64,
    pub height: u64,
    pub block_time: u64,
}

/// Ledger legs and message of a successful run.
#[derive(Default)]
pub(crate) struct Outcome {
    pub events: Vec<Event>,
    pub message: String,
}

/// A deadline is a block height; zero disables it.
pub(crate) fn check_deadline(deadline: u64, height: u64) -> Result<(), ContractError> {
    if deadline != 0 && deadline < height {
        return Err(ContractError::Deadline);
    }
    Ok(())
}

/// Sender must hold `amount` of `token`, plus the pending fee when `token` is native.
pub(crate) fn check_spend(call: &Call<'_>, token: &Address, amount: u64) -> Result<(), ContractError> {
    let need = if call.lib.params().is_native(token) {
        amount.checked_add(call.fees).ok_or(ContractError::Overflow)?
    } else {
        amount
    };
    if call.lib.balance(call.sender, token)? < need {
        return Err(ContractError::BalanceNotEnough);
    }
    Ok(())
}

/// Check every leg, then apply all of them.
pub(crate) fn settle(lib: &RunnerLibrary, events: &[Event]) -> Result<(), ContractError> {
    lib.pre_run_events(events)?;
    lib.run_events(events)
}

/// Serialized contract executor.
pub struct ContractRunner {
    gate: RwLock<()>,
    library: RunnerLibrary,
}

impl ContractRunner {
    /// Runner over `library`.
    pub fn new(library: RunnerLibrary) -> Self {
        Self {
            gate: RwLock::new(()),
            library,
        }
    }

    /// Underlying facade.
    pub fn library(&self) -> &RunnerLibrary {
        &self.library
    }

    /// Admission check against the state after `last_height`. Reads only.
    pub fn verify(&self, tx: &Transaction, last_height: u64) -> Result<(), ContractError> {
        let _gate = self.gate.read();
        let TxBody::ContractV2(body) = tx.body() else {
            return Err(ContractError::NotContractCall);
        };
        let call = Call {
            lib: &self.library,
            sender: tx.from(),
            contract: &body.contract,
            tx_hash: tx.hash()?,
            fees: tx.fees(),
            height: last_height,
            block_time: 0,
        };
        match &body.function {
            Function::ExchangeInit { .. } => exchange_runner::verify_init(&call),
            Function::SetAdmin { .. } | Function::SetFeeTo { .. } => {
                exchange_runner::verify_setter(&call).map(|_| ())
            }
            Function::PairCreate {
                exchange,
                token_a,
                token_b,
            } => pair_runner::verify_create(&call, exchange, token_a, token_b).map(|_| ()),
            Function::AddLiquidity(f) => pair_runner::verify_add(&call, f).map(|_| ()),
            Function::RemoveLiquidity(f) => pair_runner::plan_remove(&call, f).map(|_| ()),
            Function::SwapExactIn(f) => {
                exchange_runner::verify_swap(&call, &f.path, f.deadline, f.amount_in)
            }
            Function::SwapExactOut(f) => {
                exchange_runner::verify_swap(&call, &f.path, f.deadline, f.amount_in_max)
            }
        }
    }

    /// Execute a contract call at `height` and store its result.
    ///
    /// The sender's fee and nonce must already be applied. Rejections come back
    /// as a `Failed` state; only storage or ledger corruption is an error.
    pub fn run_contract(
        &self,
        tx: &Transaction,
        height: u64,
        block_time: u64,
    ) -> Result<ContractV2State, RunnerError> {
        let _gate = self.gate.write();
        let TxBody::ContractV2(body) = tx.body() else {
            return Err(RunnerError::NotContractCall);
        };
        let tx_hash = tx.hash()?;
        let call = Call {
            lib: &self.library,
            sender: tx.from(),
            contract: &body.contract,
            tx_hash,
            fees: 0,
            height,
            block_time,
        };
        let result = match &body.function {
            Function::ExchangeInit { admin, fee_to } => {
                exchange_runner::init(&call, admin, fee_to.as_ref())
            }
            Function::SetAdmin { address } => exchange_runner::set_admin(&call, address),
            Function::SetFeeTo { address } => exchange_runner::set_fee_to(&call, address.as_ref()),
            Function::PairCreate {
                exchange,
                token_a,
                token_b,
            } => pair_runner::pair_create(&call, exchange, token_a, token_b),
            Function::AddLiquidity(f) => pair_runner::add_liquidity(&call, f),
            Function::RemoveLiquidity(f) => pair_runner::remove_liquidity(&call, f),
            Function::SwapExactIn(f) => exchange_runner::swap_exact_in(&call, f),
            Function::SwapExactOut(f) => exchange_runner::swap_exact_out(&call, f),
        };
        let state = match result {
            Ok(outcome) => {
                info!(tx = %tx_hash, function = body.function.name(), height, "contract executed");
                ContractV2State::success(outcome.events, outcome.message)
            }
            Err(e) if e.is_fatal() => {
                error!(tx = %tx_hash, function = body.function.name(), height, error = %e, "contract execution aborted");
                return Err(e.into());
            }
            Err(e) => {
                debug!(tx = %tx_hash, function = body.function.name(), height, error = %e, "contract rejected");
                ContractV2State::failed(&e)
            }
        };
        self.library.set_contract_v2_state(&tx_hash, &state)?;
        Ok(state)
    }

    /// Pairs of `exchange` in registration order, with current reserves.
    pub fn exchange_pairs(&self, exchange: &Address) -> Result<Vec<ExchangePair>, ContractError> {
        let _gate = self.gate.read();
        let ex = self.library.exchange(exchange)?;
        ex.value
            .all_pairs()
            .iter()
            .map(|entry| {
                let pair = self.library.pair(&entry.address)?;
                Ok(ExchangePair {
                    address: entry.address.clone(),
                    token0: pair.value.token0,
                    token1: pair.value.token1,
                    reserve0: pair.value.reserve0,
                    reserve1: pair.value.reserve1,
                })
            })
            .collect()
    }
}
