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

//! Ledger, contract engine and their supporting primitives.

/// Node configuration and chain parameters.
pub mod config;
/// Contract records and their store.
pub mod contract;
/// Account ledger with deferred settlement.
pub mod ledger;
/// Token graph for swap routing.
pub mod router;
/// AMM contract execution.
pub mod runner;
/// Transaction executor.
pub mod runtime;
/// Record storage with deterministic roots.
pub mod state;
/// Transactions, contract functions and builders.
pub mod tx;
/// Hashes, addresses and canonical encoding.
pub mod types;
