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
#![deny(missing_docs)]

//! Node configuration.
//!
//! ## Format (TOML)
//! ```text
//! [node]
//! name = "amunchain-ledger"
//! data_dir = "./data"
//!
//! [chain]
//! network = "mainnet"
//! native_token = "AMN"
//! fee_address = "Am..."
//! eater_address = "Am..."
//! max_address_txs = 1000
//! default_fees = 100000
//! max_record_bytes = 1048576
//!
//! [log]
//! json = false
//! level = "info"
//! ```
//!
//! Every field is optional. `AMUN_CONFIG` names the file; `AMUN_DATA_DIR`
//! overrides `node.data_dir`.

use crate::core::types::{Address, Network};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Cannot read config file.
    #[error("read config")]
    Read,
    /// Cannot parse TOML.
    #[error("parse config: {0}")]
    Parse(String),
    /// A configured address is malformed.
    #[error("invalid {0} address")]
    InvalidAddress(&'static str),
    /// Zero where a positive value is required.
    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

/// `[node]` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeSection {
    /// Instance name used in logs.
    pub name: String,
    /// Root directory for the account and contract stores.
    pub data_dir: PathBuf,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            name: "amunchain-ledger".to_string(),
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// `[chain]` section. Runtime parameters shared by the ledger and the runners.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainParams {
    /// Network id mixed into every derived address.
    pub network: Network,
    /// Id of the primary token that pays fees.
    pub native_token: Address,
    /// Collector credited with transaction fees.
    pub fee_address: Address,
    /// Sink credited with consumed amounts.
    pub eater_address: Address,
    /// Maximum nonce gap accepted at admission.
    pub max_address_txs: u64,
    /// Fee paid by headers from `builder::head`.
    pub default_fees: u64,
    /// Decode limit for any persisted record.
    pub max_record_bytes: usize,
}

impl Default for ChainParams {
    fn default() -> Self {
        let network = Network::Mainnet;
        Self {
            network,
            native_token: Address::new("AMN"),
            fee_address: Address::account_from_public_key(network, b"amunchain/fee-collector"),
            eater_address: Address::account_from_public_key(network, b"amunchain/consumption"),
            max_address_txs: 1000,
            default_fees: 100_000,
            max_record_bytes: 1 << 20,
        }
    }
}

impl ChainParams {
    /// True if `token` is the native token.
    pub fn is_native(&self, token: &Address) -> bool {
        *token == self.native_token
    }

    /// Native token or a well-formed contract address.
    pub fn is_valid_token(&self, token: &Address) -> bool {
        self.is_native(token) || token.is_contract(self.network)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.native_token.is_empty() {
            return Err(ConfigError::InvalidAddress("native token"));
        }
        if !self.fee_address.is_account(self.network) {
            return Err(ConfigError::InvalidAddress("fee"));
        }
        if !self.eater_address.is_account(self.network) {
            return Err(ConfigError::InvalidAddress("eater"));
        }
        if self.max_address_txs == 0 {
            return Err(ConfigError::NotPositive("max_address_txs"));
        }
        if self.max_record_bytes == 0 {
            return Err(ConfigError::NotPositive("max_record_bytes"));
        }
        Ok(())
    }
}

/// `[log]` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    /// Emit JSON lines instead of compact text.
    pub json: bool,
    /// Default filter directive.
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            json: false,
            level: "info".to_string(),
        }
    }
}

/// Full node configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// `[node]`.
    pub node: NodeSection,
    /// `[chain]`.
    pub chain: ChainParams,
    /// `[log]`.
    pub log: LogSection,
}

impl NodeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: NodeConfig = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.chain.validate()?;
        Ok(cfg)
    }

    /// Load from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|_| ConfigError::Read)?;
        Self::from_toml_str(&raw)
    }

    /// Load from `AMUN_CONFIG` if set, else defaults; then apply `AMUN_DATA_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var("AMUN_CONFIG") {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        if let Ok(dir) = std::env::var("AMUN_DATA_DIR") {
            cfg.node.data_dir = PathBuf::from(dir);
        }
        Ok(cfg)
    }

    /// Directory of the account store.
    pub fn account_dir(&self) -> PathBuf {
        self.node.data_dir.join("account_state")
    }

    /// Directory of the contract store.
    pub fn contract_dir(&self) -> PathBuf {
        self.node.data_dir.join("contract_state")
    }
}
