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

//! Account ledger with deferred settlement.
//!
//! Debits move funds from `balance` to `lock_out` and credits land in
//! `lock_in`; both are journaled at the block height. Once the confirmed
//! height reaches that height, the next read folds the journals into
//! `balance`.

/// Accounts and per-token coin records.
pub mod account;
/// Store of accounts and the confirmed height.
pub mod account_state;
/// Out/in journals.
pub mod journal;

pub use account::{Account, CoinAccount};
pub use account_state::AccountState;

use crate::core::state::StateError;
use crate::core::types::CodecError;
use thiserror::Error;

/// Ledger errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("nonce is repeated")]
    NonceRepeat,
    #[error("nonce is too big")]
    TooBigNonce,
    #[error("wrong nonce: expected {expected}, got {got}")]
    Nonce { expected: u64, got: u64 },
    #[error("transaction time is in the future")]
    FutureTime,
    #[error("not enough balance")]
    NotEnoughBalance,
    #[error("not enough fees")]
    NotEnoughFees,
    #[error("balance overflow")]
    Overflow,
    #[error("invalid transaction: {0}")]
    InvalidTx(String),
    /// Journal and locks disagree. The account is corrupt.
    #[error("wrong journal: {0}")]
    Journal(&'static str),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl LedgerError {
    /// True for errors that must halt block application.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LedgerError::Journal(_) | LedgerError::State(_) | LedgerError::Codec(_)
        )
    }
}
