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

#![allow(dead_code)]

use amunchain_ledger::core::config::{ChainParams, NodeConfig};
use amunchain_ledger::core::contract::{ContractV2State, Pair, StateKind};
use amunchain_ledger::core::runtime::{ExecError, TxExecutor};
use amunchain_ledger::core::tx::builder::{self, TokenIssue};
use amunchain_ledger::core::tx::function::AddLiquidity;
use amunchain_ledger::core::tx::{Transaction, TxHead};
use amunchain_ledger::core::types::{Address, Network};
use amunchain_ledger::monitoring::metrics::Metrics;
use std::sync::Arc;
use tempfile::TempDir;

pub const NOW: u64 = 1_700_000_000;
pub const FEES: u64 = 1_000;
pub const FUNDING: u64 = 1_000_000_000;

pub fn account(name: &str) -> Address {
    Address::account_from_public_key(Network::Mainnet, name.as_bytes())
}

/// One executor over a scratch directory. Every submitted transaction gets
/// its own block, which is confirmed right after it is applied.
pub struct Chain {
    _dir: TempDir,
    pub cfg: NodeConfig,
    pub exec: TxExecutor,
    pub metrics: Arc<Metrics>,
    pub height: u64,
}

impl Chain {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = NodeConfig::default();
        cfg.node.data_dir = dir.path().to_path_buf();
        let metrics = Arc::new(Metrics::new().unwrap());
        let exec = TxExecutor::open(&cfg).unwrap().with_metrics(metrics.clone());
        Self {
            _dir: dir,
            cfg,
            exec,
            metrics,
            height: 0,
        }
    }

    /// Commit and close the stores. The directory stays alive with the
    /// returned guard so the state can be edited and reopened.
    pub fn close(self) -> (TempDir, NodeConfig, u64) {
        self.exec.commit().unwrap();
        let Chain {
            _dir,
            cfg,
            exec,
            height,
            ..
        } = self;
        drop(exec);
        (_dir, cfg, height)
    }

    pub fn params(&self) -> &ChainParams {
        self.exec.params()
    }

    pub fn net(&self) -> Network {
        self.params().network
    }

    pub fn native(&self) -> Address {
        self.params().native_token.clone()
    }

    /// Credit `amount` of `token` and settle it immediately.
    pub fn fund(&self, who: &Address, token: &Address, amount: u64) {
        self.exec
            .accounts()
            .mint(who, token, amount, self.height)
            .unwrap();
        self.exec.set_confirmed_height(self.height);
    }

    pub fn balance(&self, who: &Address, token: &Address) -> u64 {
        self.exec.accounts().balance(who, token).unwrap()
    }

    pub fn head(&self, who: &Address) -> TxHead {
        let nonce = self.exec.accounts().account_nonce(who).unwrap() + 1;
        TxHead::new(who.clone(), nonce, FEES, NOW)
    }

    /// Admission at the current height, then apply in a new confirmed block.
    pub fn submit(&mut self, tx: &Transaction) -> Result<Option<ContractV2State>, ExecError> {
        self.exec.verify_tx_at(tx, self.height, NOW)?;
        self.apply(tx)
    }

    /// Apply without admission, in a new confirmed block.
    pub fn apply(&mut self, tx: &Transaction) -> Result<Option<ContractV2State>, ExecError> {
        self.height += 1;
        let result = self.exec.apply_tx(tx, self.height, NOW + self.height)?;
        self.exec.set_confirmed_height(self.height);
        Ok(result)
    }

    /// Submit a contract call that must succeed; returns its message.
    pub fn call_ok(&mut self, tx: &Transaction) -> String {
        let state = self.submit(tx).unwrap().expect("contract call");
        assert_eq!(state.state, StateKind::Success, "{}", state.error);
        state.error
    }

    pub fn issue(&mut self, issuer: &Address, abbr: &str, amount: u64) -> Address {
        let net = self.net();
        let tx = builder::token_issue(
            net,
            self.head(issuer),
            TokenIssue {
                to: issuer.clone(),
                amount,
                name: format!("{abbr} token"),
                abbr: abbr.to_string(),
                description: String::new(),
                increase_switch: false,
            },
        );
        self.submit(&tx).unwrap();
        builder::token_address(net, issuer, abbr)
    }

    pub fn pair(&self, address: &Address) -> Pair {
        self.exec.runner().library().pair(address).unwrap().value
    }
}

/// Exchange with three issued tokens and the A/B and B/C pairs registered.
pub struct Amm {
    pub chain: Chain,
    pub admin: Address,
    pub exchange: Address,
    pub a: Address,
    pub b: Address,
    pub c: Address,
}

impl Amm {
    pub fn new(fee_to: Option<Address>) -> Self {
        let mut chain = Chain::new();
        let admin = account("admin");
        let native = chain.native();
        chain.fund(&admin, &native, FUNDING);
        let a = chain.issue(&admin, "TKA", FUNDING);
        let b = chain.issue(&admin, "TKB", FUNDING);
        let c = chain.issue(&admin, "TKC", FUNDING);

        let net = chain.net();
        let head = chain.head(&admin);
        let exchange = builder::exchange_address(net, &admin, head.nonce);
        chain.call_ok(&builder::exchange_init(net, head, admin.clone(), fee_to));

        let mut amm = Self {
            chain,
            admin,
            exchange,
            a,
            b,
            c,
        };
        let (a, b, c) = (amm.a.clone(), amm.b.clone(), amm.c.clone());
        amm.create_pair(&a, &b);
        amm.create_pair(&b, &c);
        amm
    }

    pub fn pair_address(&self, x: &Address, y: &Address) -> Address {
        builder::pair_address(self.chain.net(), x, y, &self.exchange)
    }

    pub fn create_pair(&mut self, x: &Address, y: &Address) -> Address {
        let net = self.chain.net();
        let tx = builder::pair_create(
            net,
            self.chain.head(&self.admin),
            self.exchange.clone(),
            x.clone(),
            y.clone(),
        );
        self.chain.call_ok(&tx);
        self.pair_address(x, y)
    }

    pub fn add_liquidity_tx(&self, who: &Address, x: &Address, y: &Address, ax: u64, ay: u64) -> Transaction {
        builder::add_liquidity(
            self.chain.net(),
            self.chain.head(who),
            AddLiquidity {
                exchange: self.exchange.clone(),
                token_a: x.clone(),
                token_b: y.clone(),
                to: who.clone(),
                amount_a_desired: ax,
                amount_b_desired: ay,
                amount_a_min: 0,
                amount_b_min: 0,
                deadline: 0,
            },
        )
    }

    pub fn add_liquidity(&mut self, x: &Address, y: &Address, ax: u64, ay: u64) -> String {
        let admin = self.admin.clone();
        let tx = self.add_liquidity_tx(&admin, x, y, ax, ay);
        self.chain.call_ok(&tx)
    }

    /// Ledger holdings of a pair must match its reserves once settled.
    pub fn assert_reserves_settled(&self, x: &Address, y: &Address) {
        let address = self.pair_address(x, y);
        let pair = self.chain.pair(&address);
        assert_eq!(self.chain.balance(&address, &pair.token0), pair.reserve0);
        assert_eq!(self.chain.balance(&address, &pair.token1), pair.reserve1);
    }
}

/// Numbers in a swap or liquidity message.
pub fn amounts(message: &str) -> Vec<u64> {
    message.split('-').map(|s| s.parse().unwrap()).collect()
}
