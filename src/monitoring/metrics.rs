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

use prometheus::{IntCounter, IntGauge, Registry};
use thiserror::Error;

/// Metrics errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus")]
    Prom,
}

/// Metrics container.
#[derive(Clone)]
pub struct Metrics {
    /// Registry.
    pub registry: Registry,

    /// Height of the last applied block.
    pub block_height: IntGauge,
    /// Finality cursor used for journal folds.
    pub confirmed_height: IntGauge,
    /// Applied transactions.
    pub transactions_total: IntCounter,
    /// Transactions rejected at admission.
    pub transactions_rejected_total: IntCounter,

    /// Contract calls stored as `Success`.
    pub contract_success_total: IntCounter,
    /// Contract calls stored as `Failed`.
    pub contract_failed_total: IntCounter,
    /// Successful swaps.
    pub swaps_total: IntCounter,
    /// Successful liquidity additions and removals.
    pub liquidity_ops_total: IntCounter,
    /// Journal folds performed by the ledger.
    pub journal_folds: IntGauge,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, MetricsError> {
    let c = IntCounter::new(name, help).map_err(|_| MetricsError::Prom)?;
    registry
        .register(Box::new(c.clone()))
        .map_err(|_| MetricsError::Prom)?;
    Ok(c)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge, MetricsError> {
    let g = IntGauge::new(name, help).map_err(|_| MetricsError::Prom)?;
    registry
        .register(Box::new(g.clone()))
        .map_err(|_| MetricsError::Prom)?;
    Ok(g)
}

impl Metrics {
    /// Create and register metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let block_height = gauge(&registry, "amunchain_block_height", "Last applied block height")?;
        let confirmed_height =
            gauge(&registry, "amunchain_confirmed_height", "Confirmed block height")?;
        let transactions_total =
            counter(&registry, "amunchain_transactions_total", "Applied transactions")?;
        let transactions_rejected_total = counter(
            &registry,
            "amunchain_transactions_rejected_total",
            "Transactions rejected at admission",
        )?;

        let contract_success_total = counter(
            &registry,
            "amunchain_contract_success_total",
            "Contract calls executed successfully",
        )?;
        let contract_failed_total = counter(
            &registry,
            "amunchain_contract_failed_total",
            "Contract calls recorded as failed",
        )?;
        let swaps_total = counter(&registry, "amunchain_swaps_total", "Executed swaps")?;
        let liquidity_ops_total = counter(
            &registry,
            "amunchain_liquidity_ops_total",
            "Executed liquidity additions and removals",
        )?;
        let journal_folds =
            gauge(&registry, "amunchain_journal_folds", "Journal folds performed")?;

        Ok(Self {
            registry,
            block_height,
            confirmed_height,
            transactions_total,
            transactions_rejected_total,
            contract_success_total,
            contract_failed_total,
            swaps_total,
            liquidity_ops_total,
            journal_folds,
        })
    }
}
