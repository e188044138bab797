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

//! Amunchain ledger entrypoint.
//! Opens the state stores, reports their roots and prints current metrics.

use std::sync::Arc;

use amunchain_ledger::core::config::{LogSection, NodeConfig};
use amunchain_ledger::core::runtime::TxExecutor;
use amunchain_ledger::monitoring::metrics::Metrics;
use anyhow::Context;
use prometheus::{Encoder, TextEncoder};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogSection) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    if log.json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .compact()
            .try_init();
    }
}

fn main() -> anyhow::Result<()> {
    let cfg = NodeConfig::from_env().context("loading configuration")?;
    init_tracing(&cfg.log);

    info!(
        node = %cfg.node.name,
        version = env!("CARGO_PKG_VERSION"),
        git = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        "amunchain ledger starting"
    );

    let metrics = Arc::new(Metrics::new().context("metrics init")?);
    let executor = TxExecutor::open(&cfg)
        .context("opening state")?
        .with_metrics(metrics.clone());

    let roots = executor.roots().context("reading state roots")?;
    info!(account_root = %roots.account, contract_root = %roots.contract, "state ready");

    let mut buf = Vec::new();
    TextEncoder::new()
        .encode(&metrics.registry.gather(), &mut buf)
        .context("encoding metrics")?;
    print!("{}", String::from_utf8_lossy(&buf));
    Ok(())
}
