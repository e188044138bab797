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

//! Deterministic address derivation and canonical transaction construction.
//!
//! Every node must derive byte-identical contract addresses from the same
//! inputs; pair creation and liquidity calls are rejected otherwise.

use crate::core::config::ChainParams;
use crate::core::contract::pair::sort_token;
use crate::core::router::{Graph, GraphError};
use crate::core::runner::ExchangePair;
use crate::core::tx::function::{AddLiquidity, ExactIn, ExactOut, Function, RemoveLiquidity};
use crate::core::tx::{ContractV2Body, Receiver, TokenIssueBody, Transaction, TxBody, TxHead};
use crate::core::types::{Address, Network};

/// Exchange deployed by `from` with the transaction nonce `nonce`.
pub fn exchange_address(net: Network, from: &Address, nonce: u64) -> Address {
    let mut payload = from.as_bytes().to_vec();
    payload.extend_from_slice(&nonce.to_be_bytes());
    Address::contract(net, &payload)
}

/// Pair of `token_a`/`token_b` under `exchange`. Token order does not matter.
pub fn pair_address(net: Network, token_a: &Address, token_b: &Address, exchange: &Address) -> Address {
    let (t0, t1) = sort_token(token_a, token_b);
    let mut payload = Vec::with_capacity(t0.as_bytes().len() + t1.as_bytes().len() + exchange.as_bytes().len());
    payload.extend_from_slice(t0.as_bytes());
    payload.extend_from_slice(t1.as_bytes());
    payload.extend_from_slice(exchange.as_bytes());
    Address::contract(net, &payload)
}

/// Token issued by `from` under abbreviation `abbr`.
pub fn token_address(net: Network, from: &Address, abbr: &str) -> Address {
    let mut payload = from.as_bytes().to_vec();
    payload.extend_from_slice(abbr.as_bytes());
    Address::contract(net, &payload)
}

/// Header paying the chain's default fee.
pub fn head(params: &ChainParams, from: Address, nonce: u64, time: u64) -> TxHead {
    TxHead::new(from, nonce, params.default_fees, time)
}

fn contract_call(head: TxHead, contract: Address, function: Function) -> Transaction {
    Transaction::new(head, TxBody::ContractV2(ContractV2Body { contract, function }))
}

/// Single-receiver transfer. For the native token `amount` includes the fee.
pub fn transfer(head: TxHead, token: Address, to: Address, amount: u64) -> Transaction {
    Transaction::new(head, TxBody::Transfer { token, to, amount })
}

/// Multi-receiver transfer.
pub fn transfer_v2(head: TxHead, token: Address, receivers: Vec<Receiver>) -> Transaction {
    Transaction::new(head, TxBody::TransferV2 { token, receivers })
}

/// Token issuance parameters.
#[derive(Clone, Debug)]
pub struct TokenIssue {
    /// Receiver of the issued amount.
    pub to: Address,
    /// Issued amount.
    pub amount: u64,
    /// Display name.
    pub name: String,
    /// Abbreviation; part of the token address.
    pub abbr: String,
    /// Free text.
    pub description: String,
    /// Whether later issues are allowed.
    pub increase_switch: bool,
}

/// Token issuance at the address derived from sender and abbreviation.
pub fn token_issue(net: Network, head: TxHead, issue: TokenIssue) -> Transaction {
    let contract = token_address(net, &head.from, &issue.abbr);
    Transaction::new(
        head,
        TxBody::Contract(TokenIssueBody {
            contract,
            to: issue.to,
            amount: issue.amount,
            name: issue.name,
            abbr: issue.abbr,
            description: issue.description,
            increase_switch: issue.increase_switch,
        }),
    )
}

/// Exchange deployment at the address derived from sender and nonce.
pub fn exchange_init(net: Network, head: TxHead, admin: Address, fee_to: Option<Address>) -> Transaction {
    let contract = exchange_address(net, &head.from, head.nonce);
    contract_call(head, contract, Function::ExchangeInit { admin, fee_to })
}

/// Replace the exchange admin.
pub fn set_admin(head: TxHead, exchange: Address, address: Address) -> Transaction {
    contract_call(head, exchange, Function::SetAdmin { address })
}

/// Replace or clear the protocol fee receiver.
pub fn set_fee_to(head: TxHead, exchange: Address, address: Option<Address>) -> Transaction {
    contract_call(head, exchange, Function::SetFeeTo { address })
}

/// Register the pair of `token_a`/`token_b`.
pub fn pair_create(
    net: Network,
    head: TxHead,
    exchange: Address,
    token_a: Address,
    token_b: Address,
) -> Transaction {
    let contract = pair_address(net, &token_a, &token_b, &exchange);
    contract_call(
        head,
        contract,
        Function::PairCreate {
            exchange,
            token_a,
            token_b,
        },
    )
}

/// Add liquidity; the call targets the derived pair.
pub fn add_liquidity(net: Network, head: TxHead, f: AddLiquidity) -> Transaction {
    let contract = pair_address(net, &f.token_a, &f.token_b, &f.exchange);
    contract_call(head, contract, Function::AddLiquidity(f))
}

/// Remove liquidity; the call targets the derived pair.
pub fn remove_liquidity(net: Network, head: TxHead, f: RemoveLiquidity) -> Transaction {
    let contract = pair_address(net, &f.token_a, &f.token_b, &f.exchange);
    contract_call(head, contract, Function::RemoveLiquidity(f))
}

/// Exact-input swap through `exchange`.
pub fn swap_exact_in(head: TxHead, exchange: Address, f: ExactIn) -> Transaction {
    contract_call(head, exchange, Function::SwapExactIn(f))
}

/// Exact-output swap through `exchange`.
pub fn swap_exact_out(head: TxHead, exchange: Address, f: ExactOut) -> Transaction {
    contract_call(head, exchange, Function::SwapExactOut(f))
}

/// Fewest-hop token route from `token_a` to `token_b` over `pairs`.
pub fn calculate_shortest_path(
    token_a: &Address,
    token_b: &Address,
    pairs: &[ExchangePair],
) -> Result<Vec<Address>, GraphError> {
    let mut graph = Graph::new();
    for p in pairs {
        graph.add_edge(p.token0.clone(), p.token1.clone());
    }
    graph.shortest_path(token_a, token_b)
}
