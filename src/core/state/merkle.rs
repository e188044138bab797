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

//! Deterministic Merkle tree over sorted ledger records.
//!
//! leaf = H( "Amunchain-Ledger-Leaf-v1" || H(key) || H(value) )
//! node = H( "Amunchain-Ledger-Node-v1" || left || right )
//!
//! An odd node at the end of a level is paired with itself.

use crate::core::types::{sha256, H256};
use serde::{Deserialize, Serialize};

const LEAF_DOMAIN: &[u8] = b"Amunchain-Ledger-Leaf-v1";
const NODE_DOMAIN: &[u8] = b"Amunchain-Ledger-Node-v1";

/// Side of sibling in proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Sibling is left.
    Left,
    /// Sibling is right.
    Right,
}

/// One proof item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofItem {
    /// Whether sibling is left or right of current hash.
    pub side: Side,
    /// Sibling hash.
    pub sibling: H256,
}

/// Merkle inclusion proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Leaf hash.
    pub leaf: H256,
    /// Path items from leaf to root.
    pub path: Vec<ProofItem>,
}

/// Leaf hash of one record.
pub fn hash_leaf(key: &[u8], value: &[u8]) -> H256 {
    let mut buf = Vec::with_capacity(LEAF_DOMAIN.len() + 64);
    buf.extend_from_slice(LEAF_DOMAIN);
    buf.extend_from_slice(&sha256(key));
    buf.extend_from_slice(&sha256(value));
    H256::digest(&buf)
}

fn hash_node(left: &H256, right: &H256) -> H256 {
    let mut buf = Vec::with_capacity(NODE_DOMAIN.len() + 64);
    buf.extend_from_slice(NODE_DOMAIN);
    buf.extend_from_slice(left.as_bytes());
    buf.extend_from_slice(right.as_bytes());
    H256::digest(&buf)
}

fn parent_level(level: &[H256]) -> Vec<H256> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [l, r] => hash_node(l, r),
            [l] => hash_node(l, l),
            _ => H256::zero(),
        })
        .collect()
}

/// Root over records sorted by key. Empty input yields the zero hash.
pub fn merkle_root_sorted(pairs: &[(Vec<u8>, Vec<u8>)]) -> H256 {
    let mut level: Vec<H256> = pairs.iter().map(|(k, v)| hash_leaf(k, v)).collect();
    if level.is_empty() {
        return H256::zero();
    }
    while level.len() > 1 {
        level = parent_level(&level);
    }
    level[0]
}

/// Inclusion proof for the record at `index` (records must be sorted).
pub fn merkle_proof_sorted(pairs: &[(Vec<u8>, Vec<u8>)], index: usize) -> Option<MerkleProof> {
    if index >= pairs.len() {
        return None;
    }

    let mut level: Vec<H256> = pairs.iter().map(|(k, v)| hash_leaf(k, v)).collect();
    let leaf = level[index];
    let mut idx = index;
    let mut path = Vec::new();

    while level.len() > 1 {
        let is_right = idx % 2 == 1;
        let sib_idx = if is_right { idx - 1 } else { idx + 1 };
        let sibling = level.get(sib_idx).copied().unwrap_or(level[idx]);
        path.push(ProofItem {
            side: if is_right { Side::Left } else { Side::Right },
            sibling,
        });
        level = parent_level(&level);
        idx /= 2;
    }

    Some(MerkleProof { leaf, path })
}

/// Verify proof against root.
pub fn verify_proof(root: &H256, proof: &MerkleProof) -> bool {
    let cur = proof.path.iter().fold(proof.leaf, |cur, item| match item.side {
        Side::Left => hash_node(&item.sibling, &cur),
        Side::Right => hash_node(&cur, &item.sibling),
    });
    cur == *root
}
