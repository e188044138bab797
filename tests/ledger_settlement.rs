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

use amunchain_ledger::core::config::NodeConfig;
use amunchain_ledger::core::contract::ContractError;
use amunchain_ledger::core::ledger::{Account, LedgerError};
use amunchain_ledger::core::runner::RunnerError;
use amunchain_ledger::core::runtime::{ExecError, StateRoots, TxExecutor};
use amunchain_ledger::core::state::TrieStore;
use amunchain_ledger::core::tx::builder::{self, TokenIssue};
use amunchain_ledger::core::tx::function::ExactIn;
use amunchain_ledger::core::tx::{Receiver, TxError, TxHead};
use amunchain_ledger::core::types::{decode_canonical_limited, encode_canonical, Address};
use common::{account, Amm, Chain, FEES, NOW};
use proptest::prelude::*;

#[test]
fn transfer_settles_at_confirmation() {
    let chain = Chain::new();
    let native = chain.native();
    let (alice, bob) = (account("alice"), account("bob"));
    chain.fund(&alice, &native, 1_000_000);

    let tx = builder::transfer(chain.head(&alice), native.clone(), bob.clone(), 10_000);
    chain.exec.verify_tx_at(&tx, 0, NOW).unwrap();
    chain.exec.apply_tx(&tx, 1, NOW).unwrap();

    // Nothing settles before height 1 is confirmed.
    let a = chain.exec.accounts().get_account_state(&alice).unwrap();
    assert_eq!(a.balance(&native), 990_000);
    assert_eq!(a.locked_out(&native), 10_000);
    assert_eq!(a.nonce, 1);
    let b = chain.exec.accounts().get_account_state(&bob).unwrap();
    assert_eq!(b.balance(&native), 0);
    assert_eq!(b.locked_in(&native), 10_000 - FEES);
    let fee_address = chain.params().fee_address.clone();
    assert_eq!(chain.balance(&fee_address, &native), 0);

    chain.exec.set_confirmed_height(1);
    let a = chain.exec.accounts().get_account_state(&alice).unwrap();
    assert_eq!(a.balance(&native), 990_000);
    assert_eq!(a.locked_out(&native), 0);
    assert!(!a.needs_update());
    assert_eq!(chain.balance(&bob, &native), 10_000 - FEES);
    assert_eq!(chain.balance(&fee_address, &native), FEES);
}

#[test]
fn fold_is_idempotent() {
    let chain = Chain::new();
    let native = chain.native();
    let (alice, bob) = (account("alice"), account("bob"));
    chain.fund(&alice, &native, 1_000_000);
    let tx = builder::transfer(chain.head(&alice), native.clone(), bob.clone(), 5_000);
    chain.exec.apply_tx(&tx, 1, NOW).unwrap();
    chain.exec.set_confirmed_height(1);

    let first = chain.exec.accounts().get_account_state(&bob).unwrap();
    let second = chain.exec.accounts().get_account_state(&bob).unwrap();
    assert_eq!(first, second);

    let mut refold = first.clone();
    refold.update(1, &native).unwrap();
    assert_eq!(refold, first);
    assert!(chain.exec.accounts().journal_folds() > 0);
}

#[test]
fn transfer_v2_charges_fee_on_top() {
    let chain = Chain::new();
    let native = chain.native();
    let alice = account("alice");
    chain.fund(&alice, &native, 100_000);
    let receivers: Vec<Receiver> = ["r1", "r2", "r3"]
        .iter()
        .map(|n| Receiver {
            address: account(n),
            amount: 10_000,
        })
        .collect();

    let tx = builder::transfer_v2(chain.head(&alice), native.clone(), receivers);
    chain.exec.verify_tx_at(&tx, 0, NOW).unwrap();
    chain.exec.apply_tx(&tx, 1, NOW).unwrap();
    chain.exec.set_confirmed_height(1);

    assert_eq!(chain.balance(&alice, &native), 100_000 - 30_000 - FEES);
    for n in ["r1", "r2", "r3"] {
        assert_eq!(chain.balance(&account(n), &native), 10_000);
    }
}

#[test]
fn admission_rejects_bad_transactions() {
    let chain = Chain::new();
    let native = chain.native();
    let (alice, bob) = (account("alice"), account("bob"));
    chain.fund(&alice, &native, 50_000);

    let over = builder::transfer(chain.head(&alice), native.clone(), bob.clone(), 50_001);
    assert!(matches!(
        chain.exec.verify_tx_at(&over, 0, NOW),
        Err(ExecError::Ledger(LedgerError::NotEnoughBalance))
    ));

    let future = builder::transfer(
        TxHead::new(alice.clone(), 1, FEES, NOW + 60),
        native.clone(),
        bob.clone(),
        5_000,
    );
    assert!(matches!(
        chain.exec.verify_tx_at(&future, 0, NOW),
        Err(ExecError::Ledger(LedgerError::FutureTime))
    ));

    let gap = chain.params().max_address_txs + 1;
    let far = builder::transfer(TxHead::new(alice.clone(), gap, FEES, NOW), native.clone(), bob.clone(), 5_000);
    assert!(matches!(
        chain.exec.verify_tx_at(&far, 0, NOW),
        Err(ExecError::Ledger(LedgerError::TooBigNonce))
    ));

    let below_fee = builder::transfer(chain.head(&alice), native.clone(), bob.clone(), FEES - 1);
    assert!(matches!(
        chain.exec.verify_tx_at(&below_fee, 0, NOW),
        Err(ExecError::Tx(TxError::AmountBelowFees))
    ));

    let to_contract = builder::transfer(
        chain.head(&alice),
        native.clone(),
        builder::token_address(chain.net(), &alice, "X"),
        5_000,
    );
    assert!(matches!(
        chain.exec.verify_tx_at(&to_contract, 0, NOW),
        Err(ExecError::Tx(TxError::InvalidReceiver(_)))
    ));
    assert_eq!(chain.metrics.transactions_rejected_total.get(), 5);
}

#[test]
fn replayed_transaction_is_rejected() {
    let chain = Chain::new();
    let native = chain.native();
    let (alice, bob) = (account("alice"), account("bob"));
    chain.fund(&alice, &native, 1_000_000);

    let tx = builder::transfer(chain.head(&alice), native.clone(), bob.clone(), 5_000);
    chain.exec.apply_tx(&tx, 1, NOW).unwrap();
    assert!(matches!(
        chain.exec.verify_tx_at(&tx, 1, NOW),
        Err(ExecError::Ledger(LedgerError::NonceRepeat))
    ));
    assert!(matches!(
        chain.exec.apply_tx(&tx, 2, NOW),
        Err(ExecError::Ledger(LedgerError::Nonce { expected: 2, got: 1 }))
    ));
}

#[test]
fn token_issue_pays_consumption_and_respects_increase_switch() {
    let chain = Chain::new();
    let native = chain.native();
    let alice = account("alice");
    chain.fund(&alice, &native, 1_000_000);
    let net = chain.net();

    let issue = |head: TxHead, increase_switch: bool| {
        builder::token_issue(
            net,
            head,
            TokenIssue {
                to: alice.clone(),
                amount: 500,
                name: "Fixed".to_string(),
                abbr: "FIX".to_string(),
                description: "fixed supply".to_string(),
                increase_switch,
            },
        )
    };
    let tx = issue(chain.head(&alice), false);
    chain.exec.verify_tx_at(&tx, 0, NOW).unwrap();
    chain.exec.apply_tx(&tx, 1, NOW).unwrap();
    chain.exec.set_confirmed_height(1);

    let token = builder::token_address(net, &alice, "FIX");
    assert_eq!(chain.balance(&alice, &token), 500);
    let eater = chain.params().eater_address.clone();
    assert_eq!(chain.balance(&eater, &native), FEES);
    let record = chain.exec.contracts().get_contract(&token).unwrap().unwrap();
    assert_eq!(record.total_issued(), 500);
    assert_eq!(record.issuer, alice);

    let more = issue(chain.head(&alice), true);
    assert!(matches!(
        chain.exec.verify_tx_at(&more, 1, NOW),
        Err(ExecError::Contract(ContractError::IncreaseClosed(t))) if t == token
    ));
}

#[test]
fn commit_discard_and_init_roots() {
    let chain = Chain::new();
    let native = chain.native();
    let (alice, bob) = (account("alice"), account("bob"));
    chain.fund(&alice, &native, 1_000_000);
    let committed = chain.exec.commit().unwrap();
    assert_eq!(chain.exec.roots().unwrap(), committed);

    let tx = builder::transfer(chain.head(&alice), native.clone(), bob.clone(), 5_000);
    chain.exec.apply_tx(&tx, 1, NOW).unwrap();
    assert_ne!(chain.exec.roots().unwrap().account, committed.account);

    chain.exec.discard();
    assert_eq!(chain.exec.roots().unwrap(), committed);
    assert_eq!(chain.exec.accounts().account_nonce(&alice).unwrap(), 0);

    chain.exec.init(&committed).unwrap();
    assert!(chain.exec.init(&StateRoots::default()).is_err());
}

#[test]
fn library_transfer_moves_journaled_funds() {
    let chain = Chain::new();
    let native = chain.native();
    let (alice, bob) = (account("alice"), account("bob"));
    chain.fund(&alice, &native, 1_000);
    let lib = chain.exec.runner().library();

    assert!(lib.pre_transfer(&alice, &bob, &native, 1_001, 1).is_err());
    lib.pre_transfer(&alice, &bob, &native, 1_000, 1).unwrap();
    lib.transfer(&alice, &bob, &native, 600, 1).unwrap();
    assert_eq!(lib.balance(&bob, &native).unwrap(), 0);
    chain.exec.set_confirmed_height(1);
    assert_eq!(lib.balance(&bob, &native).unwrap(), 600);
    assert_eq!(lib.balance(&alice, &native).unwrap(), 400);
}

#[test]
fn builder_head_pays_default_fee() {
    let chain = Chain::new();
    let native = chain.native();
    let (alice, bob) = (account("alice"), account("bob"));
    chain.fund(&alice, &native, 1_000_000);
    let fee = chain.params().default_fees;
    assert_eq!(fee, 100_000);

    let head = builder::head(chain.params(), alice.clone(), 1, NOW);
    assert_eq!(head.fees, fee);
    let tx = builder::transfer(head, native.clone(), bob.clone(), 500_000);
    chain.exec.verify_tx_at(&tx, 0, NOW).unwrap();
    chain.exec.apply_tx(&tx, 1, NOW).unwrap();
    chain.exec.set_confirmed_height(1);

    let fee_address = chain.params().fee_address.clone();
    assert_eq!(chain.balance(&alice, &native), 500_000);
    assert_eq!(chain.balance(&bob, &native), 500_000 - fee);
    assert_eq!(chain.balance(&fee_address, &native), fee);
}

#[test]
fn wall_clock_admission_rejects_future_time() {
    let chain = Chain::new();
    let native = chain.native();
    let (alice, bob) = (account("alice"), account("bob"));
    chain.fund(&alice, &native, 1_000_000);

    let past = builder::transfer(
        TxHead::new(alice.clone(), 1, FEES, NOW),
        native.clone(),
        bob.clone(),
        10_000,
    );
    chain.exec.verify_tx(&past, 0).unwrap();
    chain.exec.accounts().verify_state(&past).unwrap();

    let future = builder::transfer(
        TxHead::new(alice.clone(), 1, FEES, u64::MAX / 2),
        native.clone(),
        bob,
        10_000,
    );
    assert!(matches!(
        chain.exec.verify_tx(&future, 0),
        Err(ExecError::Ledger(LedgerError::FutureTime))
    ));
    assert!(matches!(
        chain.exec.accounts().verify_state(&future),
        Err(LedgerError::FutureTime)
    ));
}

#[test]
fn unbacked_out_entry_fails_the_fold() {
    let native = Address::new("AMN");
    let mut record = Account::new(account("alice"), &native);
    record.out_journal.add(3, &native, 500, 0, 1, NOW).unwrap();

    // Not due yet: nothing is folded.
    record.update(2, &native).unwrap();
    let err = record.update(3, &native).unwrap_err();
    assert!(matches!(err, LedgerError::Journal(_)), "{err}");
    assert!(err.is_fatal());
}

/// Add an out entry at `height` with nothing locked behind it.
fn corrupt_account(cfg: &NodeConfig, who: &Address, token: &Address, height: u64) {
    let limit = cfg.chain.max_record_bytes;
    let mut store = TrieStore::open(cfg.account_dir()).unwrap();
    let raw = store.get(who.as_bytes()).unwrap().unwrap();
    let mut record: Account = decode_canonical_limited(&raw, limit).unwrap();
    record
        .out_journal
        .add(height, token, 500, 0, record.nonce, NOW)
        .unwrap();
    store.set(who.as_bytes(), encode_canonical(&record).unwrap());
    store.commit().unwrap();
}

#[test]
fn corrupt_sender_journal_halts_admission_and_apply() {
    let chain = Chain::new();
    let native = chain.native();
    let (alice, bob) = (account("alice"), account("bob"));
    chain.fund(&alice, &native, 1_000_000);
    let (_dir, cfg, height) = chain.close();

    corrupt_account(&cfg, &alice, &native, height);
    let exec = TxExecutor::open(&cfg).unwrap();
    exec.set_confirmed_height(height);

    let tx = builder::transfer(
        TxHead::new(alice.clone(), 1, FEES, NOW),
        native.clone(),
        bob,
        10_000,
    );
    let err = exec.verify_tx_at(&tx, height, NOW).unwrap_err();
    assert!(matches!(err, ExecError::Ledger(LedgerError::Journal(_))), "{err}");
    assert!(err.is_fatal());

    let err = exec.apply_tx(&tx, height + 1, NOW).unwrap_err();
    assert!(matches!(err, ExecError::Ledger(LedgerError::Journal(_))), "{err}");
    assert!(err.is_fatal());
}

#[test]
fn corrupt_pair_journal_aborts_contract_call() {
    let mut amm = Amm::new(None);
    let (a, b) = (amm.a.clone(), amm.b.clone());
    amm.add_liquidity(&a, &b, 1_000_000, 1_000_000);
    let (admin, exchange) = (amm.admin.clone(), amm.exchange.clone());
    let pair = amm.pair_address(&a, &b);
    let (_dir, cfg, height) = amm.chain.close();

    corrupt_account(&cfg, &pair, &a, height);
    let exec = TxExecutor::open(&cfg).unwrap();
    exec.set_confirmed_height(height);

    let nonce = exec.accounts().account_nonce(&admin).unwrap() + 1;
    let tx = builder::swap_exact_in(
        TxHead::new(admin.clone(), nonce, FEES, NOW),
        exchange,
        ExactIn {
            amount_in: 10_000,
            amount_out_min: 0,
            path: vec![a, b],
            to: admin,
            deadline: 0,
        },
    );
    let err = exec.apply_tx(&tx, height + 1, NOW + height + 1).unwrap_err();
    assert!(
        matches!(err, ExecError::Runner(RunnerError::Ledger(LedgerError::Journal(_)))),
        "{err}"
    );
    assert!(err.is_fatal());
    // Aborted calls leave no stored result behind.
    assert!(exec.contract_result(&tx.hash().unwrap()).unwrap().is_none());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn only_the_next_nonce_applies(nonces in prop::collection::vec(1u64..8, 1..12)) {
        let chain = Chain::new();
        let native = chain.native();
        let (alice, bob) = (account("alice"), account("bob"));
        chain.fund(&alice, &native, 1_000_000);

        let mut expected = 0u64;
        for (i, nonce) in nonces.into_iter().enumerate() {
            let height = i as u64 + 1;
            let tx = builder::transfer(
                TxHead::new(alice.clone(), nonce, FEES, NOW),
                native.clone(),
                bob.clone(),
                FEES + 1,
            );
            let applied = chain.exec.apply_tx(&tx, height, NOW);
            if nonce == expected + 1 {
                prop_assert!(applied.is_ok());
                expected = nonce;
            } else {
                prop_assert!(applied.is_err());
            }
            prop_assert_eq!(chain.exec.accounts().account_nonce(&alice).unwrap(), expected);
        }
        chain.exec.set_confirmed_height(u64::MAX);
        prop_assert_eq!(chain.balance(&bob, &native), expected);
    }
}
