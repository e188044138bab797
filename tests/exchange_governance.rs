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

mod common;

use amunchain_ledger::core::contract::{ContractError, ContractKind, StateKind};
use amunchain_ledger::core::runtime::ExecError;
use amunchain_ledger::core::tx::builder;
use amunchain_ledger::core::tx::TxError;
use common::{account, Amm, FEES, FUNDING};

#[test]
fn set_fee_to_is_admin_only() {
    let mut amm = Amm::new(None);
    let bob = account("bob");
    let native = amm.chain.native();
    amm.chain.fund(&bob, &native, FUNDING);

    let tx = builder::set_fee_to(amm.chain.head(&bob), amm.exchange.clone(), Some(bob.clone()));
    assert!(matches!(
        amm.chain.submit(&tx),
        Err(ExecError::Contract(ContractError::Forbidden))
    ));

    // Forced into a block it still fails, but the fee is spent.
    let state = amm.chain.apply(&tx).unwrap().unwrap();
    assert_eq!(state.state, StateKind::Failed);
    assert_eq!(state.error, "forbidden");
    assert_eq!(amm.chain.balance(&bob, &native), FUNDING - FEES);
    assert_eq!(amm.chain.exec.accounts().account_nonce(&bob).unwrap(), 1);

    let admin = amm.admin.clone();
    let tx = builder::set_fee_to(amm.chain.head(&admin), amm.exchange.clone(), Some(bob.clone()));
    amm.chain.call_ok(&tx);
    let ex = amm.chain.exec.runner().library().exchange(&amm.exchange).unwrap();
    assert_eq!(ex.value.fee_to(), Some(&bob));
}

#[test]
fn set_admin_hands_over_governance() {
    let mut amm = Amm::new(None);
    let (old, a, c) = (amm.admin.clone(), amm.a.clone(), amm.c.clone());
    let bob = account("bob");
    let native = amm.chain.native();
    amm.chain.fund(&bob, &native, FUNDING);

    amm.chain
        .call_ok(&builder::set_admin(amm.chain.head(&old), amm.exchange.clone(), bob.clone()));

    let net = amm.chain.net();
    let by_old = builder::pair_create(net, amm.chain.head(&old), amm.exchange.clone(), a.clone(), c.clone());
    assert!(matches!(
        amm.chain.submit(&by_old),
        Err(ExecError::Contract(ContractError::Forbidden))
    ));
    let by_new = builder::pair_create(net, amm.chain.head(&bob), amm.exchange.clone(), a, c);
    amm.chain.call_ok(&by_new);
    assert_eq!(amm.chain.exec.exchange_pairs(&amm.exchange).unwrap().len(), 3);
}

#[test]
fn exchange_address_is_bound_to_sender_nonce() {
    let mut amm = Amm::new(None);
    let admin = amm.admin.clone();
    let net = amm.chain.net();

    let mut tx = builder::exchange_init(net, amm.chain.head(&admin), admin.clone(), None);
    if let amunchain_ledger::core::tx::TxBody::ContractV2(body) = &mut tx.body {
        body.contract = amm.exchange.clone();
    }
    assert!(matches!(
        amm.chain.submit(&tx),
        Err(ExecError::Tx(TxError::WrongExchangeAddress))
    ));
}

#[test]
fn pair_registration_rules() {
    let mut amm = Amm::new(None);
    let (admin, a, b) = (amm.admin.clone(), amm.a.clone(), amm.b.clone());
    let net = amm.chain.net();

    // Either token order maps to the same pair.
    let again = builder::pair_create(net, amm.chain.head(&admin), amm.exchange.clone(), b.clone(), a.clone());
    assert!(matches!(
        amm.chain.submit(&again),
        Err(ExecError::Contract(ContractError::PairExists(_)))
    ));

    let ghost = builder::token_address(net, &admin, "GHOST");
    let unknown = builder::pair_create(net, amm.chain.head(&admin), amm.exchange.clone(), a.clone(), ghost.clone());
    assert!(matches!(
        amm.chain.submit(&unknown),
        Err(ExecError::Contract(ContractError::TokenNotExist(t))) if t == ghost
    ));

    let same = builder::pair_create(net, amm.chain.head(&admin), amm.exchange.clone(), a.clone(), a.clone());
    assert!(matches!(
        amm.chain.submit(&same),
        Err(ExecError::Tx(TxError::IdenticalTokens))
    ));

    // A pair address where an exchange is expected.
    let pair = amm.pair_address(&a, &b);
    let wrong = builder::pair_create(net, amm.chain.head(&admin), pair.clone(), a.clone(), amm.c.clone());
    assert!(matches!(
        amm.chain.submit(&wrong),
        Err(ExecError::Contract(ContractError::WrongKind(addr, ContractKind::Exchange))) if addr == pair
    ));

    let stored = amm.chain.pair(&pair);
    assert_eq!(stored.exchange, amm.exchange);
    assert!(stored.token0 > stored.token1);
}

#[test]
fn liquidity_on_unregistered_pair_is_rejected() {
    let mut amm = Amm::new(None);
    let (admin, a, c) = (amm.admin.clone(), amm.a.clone(), amm.c.clone());
    let tx = amm.add_liquidity_tx(&admin, &a, &c, 10_000, 10_000);
    assert!(matches!(
        amm.chain.submit(&tx),
        Err(ExecError::Contract(ContractError::PairNotExist(_)))
    ));
}
