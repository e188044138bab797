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

//! Transaction envelope and typed bodies.
//!
//! Transactions reach this crate already authenticated; the signature is
//! carried but never checked here and is excluded from the hash.

/// Canonical transaction construction and address derivation.
pub mod builder;
/// Contract call functions.
pub mod function;

use crate::core::config::ChainParams;
use crate::core::types::{encode_canonical, Address, CodecError, H256};
use function::Function;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on receivers of one multi-receiver transfer.
pub const MAX_RECEIVERS: usize = 1000;

/// Stateless transaction rejections.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TxError {
    #[error("invalid from address {0}")]
    InvalidFrom(Address),
    #[error("invalid receiver address {0}")]
    InvalidReceiver(Address),
    #[error("invalid token address {0}")]
    InvalidToken(Address),
    #[error("invalid contract address {0}")]
    InvalidContract(Address),
    #[error("wrong exchange contract address")]
    WrongExchangeAddress,
    #[error("wrong token contract address")]
    WrongTokenAddress,
    #[error("no receivers")]
    NoReceivers,
    #[error("the maximum number of receivers is {0}")]
    TooManyReceivers(usize),
    #[error("amount must be positive")]
    ZeroAmount,
    #[error("amount overflow")]
    Overflow,
    #[error("amount does not cover fees")]
    AmountBelowFees,
    #[error("invalid path")]
    InvalidPath,
    #[error("identical tokens")]
    IdenticalTokens,
    #[error("invalid token name or abbreviation")]
    InvalidTokenName,
}

/// Transaction class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxType {
    /// Single-receiver transfer; native amount includes the fee.
    Transfer,
    /// Multi-receiver transfer; fee is charged on top.
    TransferV2,
    /// Token issuance.
    Contract,
    /// AMM contract call.
    ContractV2,
}

/// Envelope fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHead {
    /// Sender.
    pub from: Address,
    /// Sender nonce; must be exactly one above the account nonce when applied.
    pub nonce: u64,
    /// Native fee.
    pub fees: u64,
    /// Sender-declared unix time (seconds).
    pub time: u64,
    /// Opaque signature bytes.
    pub signature: Vec<u8>,
}

impl TxHead {
    /// Unsigned head.
    pub fn new(from: Address, nonce: u64, fees: u64, time: u64) -> Self {
        Self {
            from,
            nonce,
            fees,
            time,
            signature: Vec::new(),
        }
    }
}

/// One receiver of a multi-receiver transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    /// Receiver address.
    pub address: Address,
    /// Credited amount.
    pub amount: u64,
}

/// Token issuance body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIssueBody {
    /// Token address, derived from sender and abbreviation.
    pub contract: Address,
    /// Receiver of the issued amount.
    pub to: Address,
    /// Issued amount.
    pub amount: u64,
    /// Display name.
    pub name: String,
    /// Abbreviation.
    pub abbr: String,
    /// Free text.
    pub description: String,
    /// Whether later issues are allowed.
    pub increase_switch: bool,
}

/// AMM contract call body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractV2Body {
    /// Called contract (exchange or pair).
    pub contract: Address,
    /// Operation.
    pub function: Function,
}

/// Typed transaction body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxBody {
    /// Single-receiver transfer.
    Transfer {
        /// Transferred token.
        token: Address,
        /// Receiver.
        to: Address,
        /// Amount (native: fee included).
        amount: u64,
    },
    /// Multi-receiver transfer.
    TransferV2 {
        /// Transferred token.
        token: Address,
        /// Receivers.
        receivers: Vec<Receiver>,
    },
    /// Token issuance.
    Contract(TokenIssueBody),
    /// AMM contract call.
    ContractV2(ContractV2Body),
}

/// Authenticated transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Envelope.
    pub head: TxHead,
    /// Body.
    pub body: TxBody,
}

impl Transaction {
    /// Assemble a transaction.
    pub fn new(head: TxHead, body: TxBody) -> Self {
        Self { head, body }
    }

    /// Transaction class.
    pub fn tx_type(&self) -> TxType {
        match self.body {
            TxBody::Transfer { .. } => TxType::Transfer,
            TxBody::TransferV2 { .. } => TxType::TransferV2,
            TxBody::Contract(_) => TxType::Contract,
            TxBody::ContractV2(_) => TxType::ContractV2,
        }
    }

    /// Body.
    pub fn body(&self) -> &TxBody {
        &self.body
    }

    /// Sender.
    pub fn from(&self) -> &Address {
        &self.head.from
    }

    /// Sender nonce.
    pub fn nonce(&self) -> u64 {
        self.head.nonce
    }

    /// Native fee.
    pub fn fees(&self) -> u64 {
        self.head.fees
    }

    /// Declared time.
    pub fn time(&self) -> u64 {
        self.head.time
    }

    /// Total amount moved by the body.
    pub fn amount(&self) -> Result<u64, TxError> {
        match &self.body {
            TxBody::Transfer { amount, .. } => Ok(*amount),
            TxBody::TransferV2 { receivers, .. } => receivers
                .iter()
                .try_fold(0u64, |acc, r| acc.checked_add(r.amount))
                .ok_or(TxError::Overflow),
            TxBody::Contract(b) => Ok(b.amount),
            TxBody::ContractV2(_) => Ok(0),
        }
    }

    /// Hash over head (without signature) and body.
    pub fn hash(&self) -> Result<H256, CodecError> {
        let h = &self.head;
        let bytes = encode_canonical(&(&h.from, h.nonce, h.fees, h.time, &self.body))?;
        Ok(H256::digest(&bytes))
    }

    /// Stateless checks of envelope and body.
    pub fn verify_body(&self, params: &ChainParams) -> Result<(), TxError> {
        let net = params.network;
        if !self.head.from.is_account(net) {
            return Err(TxError::InvalidFrom(self.head.from.clone()));
        }
        match &self.body {
            TxBody::Transfer { token, to, amount } => {
                if !params.is_valid_token(token) {
                    return Err(TxError::InvalidToken(token.clone()));
                }
                if !to.is_account(net) {
                    return Err(TxError::InvalidReceiver(to.clone()));
                }
                if params.is_native(token) && *amount < self.head.fees {
                    return Err(TxError::AmountBelowFees);
                }
                Ok(())
            }
            TxBody::TransferV2 { token, receivers } => {
                if !params.is_valid_token(token) {
                    return Err(TxError::InvalidToken(token.clone()));
                }
                if receivers.is_empty() {
                    return Err(TxError::NoReceivers);
                }
                if receivers.len() > MAX_RECEIVERS {
                    return Err(TxError::TooManyReceivers(MAX_RECEIVERS));
                }
                if let Some(r) = receivers.iter().find(|r| !r.address.is_account(net)) {
                    return Err(TxError::InvalidReceiver(r.address.clone()));
                }
                self.amount().map(|_| ())
            }
            TxBody::Contract(b) => {
                if b.name.is_empty() || b.abbr.is_empty() || b.abbr.len() > 20 || b.name.len() > 64
                {
                    return Err(TxError::InvalidTokenName);
                }
                if b.contract != builder::token_address(net, &self.head.from, &b.abbr) {
                    return Err(TxError::WrongTokenAddress);
                }
                if !b.to.is_account(net) {
                    return Err(TxError::InvalidReceiver(b.to.clone()));
                }
                if b.amount == 0 {
                    return Err(TxError::ZeroAmount);
                }
                Ok(())
            }
            TxBody::ContractV2(b) => {
                if !b.contract.is_contract(net) {
                    return Err(TxError::InvalidContract(b.contract.clone()));
                }
                if let Function::ExchangeInit { .. } = b.function {
                    let expected = builder::exchange_address(net, &self.head.from, self.head.nonce);
                    if b.contract != expected {
                        return Err(TxError::WrongExchangeAddress);
                    }
                }
                b.function.verify(params)
            }
        }
    }
}
