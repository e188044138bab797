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

//! Deterministic core types, canonical encoding helpers and address derivation.

use bincode::Options;
use ring::digest;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Canonical serialization error.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("serialization")]
    Serialize,
    #[error("deserialization")]
    Deserialize,
    #[error("size limit exceeded")]
    TooLarge,
}

/// Wall-clock unix seconds; 0 if the clock is before the epoch.
pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Canonical bincode options (deterministic).
fn bincode_opts() -> impl Options {
    // Fixint encoding provides a stable integer representation.
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode with deterministic rules. Requires deterministic container ordering (use BTreeMap/BTreeSet).
pub fn encode_canonical<T: Serialize>(v: &T) -> Result<Vec<u8>, CodecError> {
    bincode_opts()
        .serialize(v)
        .map_err(|_| CodecError::Serialize)
}

/// Decode with a hard size cap.
pub fn decode_canonical_limited<T: DeserializeOwned>(
    bytes: &[u8],
    max: usize,
) -> Result<T, CodecError> {
    if bytes.len() > max {
        return Err(CodecError::TooLarge);
    }
    // The deserializer limit also caps container lengths declared inside the payload.
    bincode_opts()
        .with_limit(max as u64)
        .deserialize(bytes)
        .map_err(|_| CodecError::Deserialize)
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let d = digest::digest(&digest::SHA256, data);
    let mut out = [0u8; 32];
    out.copy_from_slice(d.as_ref());
    out
}

/// 256-bit hash type (32 bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct H256([u8; 32]);

impl H256 {
    /// Construct from raw bytes.
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }
    /// Return bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
    /// All-zero hash (empty root).
    pub fn zero() -> Self {
        Self([0u8; 32])
    }
    /// True for the all-zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
    /// SHA-256 digest of `data`.
    pub fn digest(data: &[u8]) -> Self {
        Self(sha256(data))
    }
    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Network the node runs on. Part of every derived address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    #[default]
    Mainnet,
    /// Public test network.
    Testnet,
}

impl Network {
    /// Human-readable address prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            Network::Mainnet => "Am",
            Network::Testnet => "At",
        }
    }
}

const ACCOUNT_VERSION: u8 = 0x00;
const CONTRACT_VERSION: u8 = 0x05;
const ADDRESS_BODY_LEN: usize = 21;
const CHECKSUM_LEN: usize = 4;

/// Account, contract or token identifier.
///
/// Ordering is plain lexicographic string ordering; token ordering for pairs
/// depends on it, so it must never change.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Wrap an address string without validation.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Empty address. Used as the holder of permanently locked liquidity.
    pub fn zero() -> Self {
        Self(String::new())
    }

    /// True for the empty address.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Address string bytes (used as storage key and in derivations).
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Derive an account address from a public key.
    pub fn account_from_public_key(net: Network, public_key: &[u8]) -> Self {
        Self::derive(net, ACCOUNT_VERSION, public_key)
    }

    /// Derive a contract address from an arbitrary payload.
    pub fn contract(net: Network, payload: &[u8]) -> Self {
        Self::derive(net, CONTRACT_VERSION, payload)
    }

    fn derive(net: Network, version: u8, payload: &[u8]) -> Self {
        let mut pre = Vec::with_capacity(net.prefix().len() + payload.len());
        pre.extend_from_slice(net.prefix().as_bytes());
        pre.extend_from_slice(payload);
        let h = sha256(&pre);

        let mut body = Vec::with_capacity(ADDRESS_BODY_LEN + CHECKSUM_LEN);
        body.push(version);
        body.extend_from_slice(&h[..ADDRESS_BODY_LEN - 1]);
        let check = sha256(&sha256(&body));
        body.extend_from_slice(&check[..CHECKSUM_LEN]);
        Self(format!("{}{}", net.prefix(), bs58::encode(body).into_string()))
    }

    fn version(&self, net: Network) -> Option<u8> {
        let rest = self.0.strip_prefix(net.prefix())?;
        let raw = bs58::decode(rest).into_vec().ok()?;
        if raw.len() != ADDRESS_BODY_LEN + CHECKSUM_LEN {
            return None;
        }
        let (body, check) = raw.split_at(ADDRESS_BODY_LEN);
        if sha256(&sha256(body))[..CHECKSUM_LEN] != *check {
            return None;
        }
        Some(body[0])
    }

    /// Well-formed account address on `net`.
    pub fn is_account(&self, net: Network) -> bool {
        self.version(net) == Some(ACCOUNT_VERSION)
    }

    /// Well-formed contract address on `net`.
    pub fn is_contract(&self, net: Network) -> bool {
        self.version(net) == Some(CONTRACT_VERSION)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
