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

//! AMM contract functions. The contract kind follows from the function.

use crate::core::config::ChainParams;
use crate::core::tx::TxError;
use crate::core::types::Address;
use serde::{Deserialize, Serialize};

/// Add liquidity to an existing pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidity {
    /// Owning exchange.
    pub exchange: Address,
    /// First token, in caller order.
    pub token_a: Address,
    /// Second token, in caller order.
    pub token_b: Address,
    /// Receiver of LP units.
    pub to: Address,
    /// Upper bound for `token_a`.
    pub amount_a_desired: u64,
    /// Upper bound for `token_b`.
    pub amount_b_desired: u64,
    /// Lower bound for `token_a`.
    pub amount_a_min: u64,
    /// Lower bound for `token_b`.
    pub amount_b_min: u64,
    /// Last accepted block height, 0 for none.
    pub deadline: u64,
}

/// Burn LP units for the underlying tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidity {
    /// Owning exchange.
    pub exchange: Address,
    /// First token, in caller order.
    pub token_a: Address,
    /// Second token, in caller order.
    pub token_b: Address,
    /// Receiver of both tokens.
    pub to: Address,
    /// LP units to burn.
    pub liquidity: u64,
    /// Lower bound for `token_a`.
    pub amount_a_min: u64,
    /// Lower bound for `token_b`.
    pub amount_b_min: u64,
    /// Last accepted block height, 0 for none.
    pub deadline: u64,
}

/// Swap a fixed input along `path`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactIn {
    /// Input amount of `path[0]`.
    pub amount_in: u64,
    /// Minimum output of the last token.
    pub amount_out_min: u64,
    /// Token route, at least two entries.
    pub path: Vec<Address>,
    /// Receiver of the output.
    pub to: Address,
    /// Last accepted block height, 0 for none.
    pub deadline: u64,
}

/// Swap for a fixed output along `path`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOut {
    /// Output amount of the last token.
    pub amount_out: u64,
    /// Maximum input of `path[0]`.
    pub amount_in_max: u64,
    /// Token route, at least two entries.
    pub path: Vec<Address>,
    /// Receiver of the output.
    pub to: Address,
    /// Last accepted block height, 0 for none.
    pub deadline: u64,
}

/// Contract operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Function {
    /// Deploy an exchange at the derived address.
    ExchangeInit {
        /// Governance principal.
        admin: Address,
        /// Protocol fee receiver.
        fee_to: Option<Address>,
    },
    /// Replace the admin.
    SetAdmin {
        /// New admin.
        address: Address,
    },
    /// Replace or clear the protocol fee receiver.
    SetFeeTo {
        /// New receiver; `None` turns the fee off.
        address: Option<Address>,
    },
    /// Register an empty pair.
    PairCreate {
        /// Owning exchange.
        exchange: Address,
        /// First token.
        token_a: Address,
        /// Second token.
        token_b: Address,
    },
    /// Add liquidity.
    AddLiquidity(AddLiquidity),
    /// Remove liquidity.
    RemoveLiquidity(RemoveLiquidity),
    /// Exact-input swap.
    SwapExactIn(ExactIn),
    /// Exact-output swap.
    SwapExactOut(ExactOut),
}

fn check_token(params: &ChainParams, token: &Address) -> Result<(), TxError> {
    if params.is_valid_token(token) {
        Ok(())
    } else {
        Err(TxError::InvalidToken(token.clone()))
    }
}

fn check_pair_tokens(params: &ChainParams, a: &Address, b: &Address) -> Result<(), TxError> {
    check_token(params, a)?;
    check_token(params, b)?;
    if a == b {
        return Err(TxError::IdenticalTokens);
    }
    Ok(())
}

fn check_account(params: &ChainParams, a: &Address) -> Result<(), TxError> {
    if a.is_account(params.network) {
        Ok(())
    } else {
        Err(TxError::InvalidReceiver(a.clone()))
    }
}

fn check_exchange(params: &ChainParams, a: &Address) -> Result<(), TxError> {
    if a.is_contract(params.network) {
        Ok(())
    } else {
        Err(TxError::InvalidContract(a.clone()))
    }
}

fn check_path(params: &ChainParams, path: &[Address]) -> Result<(), TxError> {
    if path.len() < 2 {
        return Err(TxError::InvalidPath);
    }
    for t in path {
        check_token(params, t)?;
    }
    if path.windows(2).any(|w| w[0] == w[1]) {
        return Err(TxError::InvalidPath);
    }
    Ok(())
}

impl Function {
    /// Short operation name for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Function::ExchangeInit { .. } => "exchange_init",
            Function::SetAdmin { .. } => "set_admin",
            Function::SetFeeTo { .. } => "set_fee_to",
            Function::PairCreate { .. } => "pair_create",
            Function::AddLiquidity(_) => "add_liquidity",
            Function::RemoveLiquidity(_) => "remove_liquidity",
            Function::SwapExactIn(_) => "swap_exact_in",
            Function::SwapExactOut(_) => "swap_exact_out",
        }
    }

    /// Stateless argument checks.
    pub fn verify(&self, params: &ChainParams) -> Result<(), TxError> {
        match self {
            Function::ExchangeInit { admin, fee_to } => {
                check_account(params, admin)?;
                if let Some(f) = fee_to {
                    check_account(params, f)?;
                }
                Ok(())
            }
            Function::SetAdmin { address } => check_account(params, address),
            Function::SetFeeTo { address } => match address {
                Some(a) => check_account(params, a),
                None => Ok(()),
            },
            Function::PairCreate {
                exchange,
                token_a,
                token_b,
            } => {
                check_exchange(params, exchange)?;
                check_pair_tokens(params, token_a, token_b)
            }
            Function::AddLiquidity(f) => {
                check_exchange(params, &f.exchange)?;
                check_pair_tokens(params, &f.token_a, &f.token_b)?;
                check_account(params, &f.to)?;
                if f.amount_a_desired == 0 || f.amount_b_desired == 0 {
                    return Err(TxError::ZeroAmount);
                }
                Ok(())
            }
            Function::RemoveLiquidity(f) => {
                check_exchange(params, &f.exchange)?;
                check_pair_tokens(params, &f.token_a, &f.token_b)?;
                check_account(params, &f.to)?;
                if f.liquidity == 0 {
                    return Err(TxError::ZeroAmount);
                }
                Ok(())
            }
            Function::SwapExactIn(f) => {
                check_path(params, &f.path)?;
                check_account(params, &f.to)?;
                if f.amount_in == 0 {
                    return Err(TxError::ZeroAmount);
                }
                Ok(())
            }
            Function::SwapExactOut(f) => {
                check_path(params, &f.path)?;
                check_account(params, &f.to)?;
                if f.amount_out == 0 || f.amount_in_max == 0 {
                    return Err(TxError::ZeroAmount);
                }
                Ok(())
            }
        }
    }
}
