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

//! Amunchain ledger - account settlement and AMM contract engine.
//!
//! This crate provides:
//! - An account ledger whose debits and credits settle only once the
//!   confirmed height reaches the block that produced them
//! - Exchange and pair contracts with constant-product swaps, liquidity
//!   provisioning and an optional protocol fee
//! - Persistent key-value state with deterministic Merkle roots and proofs
//! - Monitoring via Prometheus metrics and structured JSON logging

/// Ledger, contracts, state and transactions.
pub mod core;
/// Observability (metrics).
pub mod monitoring;
