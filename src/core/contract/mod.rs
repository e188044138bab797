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

//! Contract records: exchanges, pairs, issued tokens and execution results.

/// Contract record store.
pub mod contract_state;
/// Exchange registry and governance.
pub mod exchange;
/// Constant-product pair.
pub mod pair;
/// Issued token records.
pub mod token;

pub use contract_state::ContractState;
pub use exchange::Exchange;
pub use pair::Pair;
pub use token::TokenContract;

use crate::core::ledger::LedgerError;
use crate::core::state::StateError;
use crate::core::types::{Address, CodecError, H256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of an AMM contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractKind {
    /// Exchange (pair registry and router entry point).
    Exchange,
    /// Liquidity pair.
    Pair,
}

/// Contract payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractBody {
    /// Exchange.
    Exchange(Exchange),
    /// Pair.
    Pair(Pair),
}

/// Stored AMM contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractV2 {
    /// Contract address.
    pub address: Address,
    /// Hash of the creating transaction.
    pub create_hash: H256,
    /// Payload.
    pub body: ContractBody,
}

/// Outcome of a contract execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateKind {
    /// Applied.
    Success,
    /// Rejected; nothing but the fee was applied.
    Failed,
    /// Not executed yet.
    Wait,
}

/// Ledger effect recorded by a contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// Move units between two holders.
    Transfer,
    /// Create units for `to`.
    Mint,
    /// Destroy units held by `from`.
    Burn,
}

/// One ledger leg of a contract execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Leg kind.
    pub event_type: EventType,
    /// Debited holder; empty for mints.
    pub from: Address,
    /// Credited holder; empty for burns.
    pub to: Address,
    /// Token id.
    pub token: Address,
    /// Amount.
    pub amount: u64,
    /// Journal height.
    pub height: u64,
}

impl Event {
    /// Transfer leg.
    pub fn transfer(from: &Address, to: &Address, token: &Address, amount: u64, height: u64) -> Self {
        Self {
            event_type: EventType::Transfer,
            from: from.clone(),
            to: to.clone(),
            token: token.clone(),
            amount,
            height,
        }
    }

    /// Mint leg.
    pub fn mint(to: &Address, token: &Address, amount: u64, height: u64) -> Self {
        Self {
            event_type: EventType::Mint,
            from: Address::zero(),
            to: to.clone(),
            token: token.clone(),
            amount,
            height,
        }
    }

    /// Burn leg.
    pub fn burn(from: &Address, token: &Address, amount: u64, height: u64) -> Self {
        Self {
            event_type: EventType::Burn,
            from: from.clone(),
            to: Address::zero(),
            token: token.clone(),
            amount,
            height,
        }
    }
}

/// Execution result stored under the transaction hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractV2State {
    /// Outcome.
    pub state: StateKind,
    /// Applied legs (empty on failure).
    pub events: Vec<Event>,
    /// Rejection message, or swap amounts on success.
    pub error: String,
}

impl ContractV2State {
    /// Successful result.
    pub fn success(events: Vec<Event>, message: String) -> Self {
        Self {
            state: StateKind::Success,
            events,
            error: message,
        }
    }

    /// Failed result.
    pub fn failed(error: &ContractError) -> Self {
        Self {
            state: StateKind::Failed,
            events: Vec::new(),
            error: error.to_string(),
        }
    }
}

/// Contract rejections, plus the storage failures that surface through them.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("exchange {0} already exist")]
    ExchangeExists(Address),
    #[error("exchange {0} is not exist")]
    ExchangeNotExist(Address),
    #[error("forbidden")]
    Forbidden,
    #[error("pair {0} already exist")]
    PairExists(Address),
    #[error("pair {0} is not exist")]
    PairNotExist(Address),
    #[error("the pair of {0} and {1} does not exist")]
    RouteHopMissing(Address, Address),
    #[error("wrong pair contract address")]
    WrongPairAddress,
    #[error("contract {0} is not a {1:?}")]
    WrongKind(Address, ContractKind),
    #[error("token {0} is not exist")]
    TokenNotExist(Address),
    #[error("token {0} already exist")]
    TokenExists(Address),
    #[error("token {0} does not allow increase")]
    IncreaseClosed(Address),
    #[error("invalid path")]
    InvalidPath,
    #[error("past the deadline")]
    Deadline,
    #[error("balance not enough")]
    BalanceNotEnough,
    #[error("insufficient amount")]
    InsufficientAmount,
    #[error("insufficient amountA")]
    InsufficientAmountA,
    #[error("insufficient amountB")]
    InsufficientAmountB,
    #[error("insufficient liquidity")]
    InsufficientLiquidity,
    #[error("insufficient input amount")]
    InsufficientInputAmount,
    #[error("insufficient output amount")]
    InsufficientOutputAmount,
    #[error("insufficient liquidity minted")]
    InsufficientLiquidityMinted,
    #[error("insufficient liquidity burned")]
    InsufficientLiquidityBurned,
    #[error("{0}'s liquidity token is insufficient")]
    LiquidityNotEnough(Address),
    #[error("not meet expectations")]
    NotMeetExpectations,
    #[error("invalid to")]
    InvalidTo,
    #[error("K")]
    K,
    #[error("outAmount {out} is less than the minimum output {min}")]
    OutputBelowMin { out: u64, min: u64 },
    #[error("amountIn {amount_in} is greater than the maximum input amount {max}")]
    InputAboveMax { amount_in: u64, max: u64 },
    #[error("overflow")]
    Overflow,
    #[error("not a contract call")]
    NotContractCall,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ContractError {
    /// True for storage and ledger corruption; false for ordinary rejections.
    pub fn is_fatal(&self) -> bool {
        match self {
            ContractError::Ledger(e) => e.is_fatal(),
            ContractError::State(_) | ContractError::Codec(_) => true,
            _ => false,
        }
    }
}
