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

//! Record store backed by sled, with a pending write overlay, deterministic
//! Merkle roots and inclusion proofs.
//!
//! Writes go to the overlay and become durable on `commit`, which applies them
//! in one sled transaction. Reads see the overlay first.

use crate::core::state::merkle::{merkle_proof_sorted, merkle_root_sorted, MerkleProof};
use crate::core::types::H256;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// State errors.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("db open")]
    DbOpen,
    #[error("db io")]
    DbIo,
    #[error("tx conflict")]
    TxConflict,
    #[error("state root mismatch: expected {expected}, found {found}")]
    RootMismatch { expected: H256, found: H256 },
}

/// Record store.
pub struct TrieStore {
    db: sled::Db,
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl TrieStore {
    /// Open sled DB at path (directory).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let db = sled::open(path).map_err(|_| StateError::DbOpen)?;
        Ok(Self {
            db,
            pending: BTreeMap::new(),
        })
    }

    /// Get value, pending writes first.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        if let Some(v) = self.pending.get(key) {
            return Ok(v.clone());
        }
        let v = self.db.get(key).map_err(|_| StateError::DbIo)?;
        Ok(v.map(|iv| iv.to_vec()))
    }

    /// Stage a put.
    pub fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.pending.insert(key.to_vec(), Some(value));
    }

    /// Stage a delete.
    pub fn delete(&mut self, key: &[u8]) {
        self.pending.insert(key.to_vec(), None);
    }

    /// Number of staged writes.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop all staged writes.
    pub fn discard(&mut self) {
        self.pending.clear();
    }

    /// Apply staged writes atomically and return the new root.
    pub fn commit(&mut self) -> Result<H256, StateError> {
        if !self.pending.is_empty() {
            let ops = std::mem::take(&mut self.pending);
            self.commit_atomic(&ops)?;
            self.db.flush().map_err(|_| StateError::DbIo)?;
        }
        self.committed_root()
    }

    fn commit_atomic(&self, ops: &BTreeMap<Vec<u8>, Option<Vec<u8>>>) -> Result<(), StateError> {
        let res = self.db.transaction(|t| {
            for (key, value) in ops.iter() {
                let r = match value {
                    Some(v) => t.insert(key.as_slice(), v.as_slice()).map(|_| ()),
                    None => t.remove(key.as_slice()).map(|_| ()),
                };
                r.map_err(|_| ConflictableTransactionError::Abort(StateError::DbIo))?;
            }
            Ok(())
        });

        match res {
            Ok(()) => Ok(()),
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(_)) => Err(StateError::DbIo),
        }
    }

    fn committed_pairs(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateError> {
        let mut pairs = Vec::new();
        for item in self.db.iter() {
            let (k, v) = item.map_err(|_| StateError::DbIo)?;
            pairs.push((k.to_vec(), v.to_vec()));
        }
        // sled iterates in key order already.
        Ok(pairs)
    }

    fn merged_pairs(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = self.committed_pairs()?.into_iter().collect();
        for (k, v) in self.pending.iter() {
            match v {
                Some(v) => {
                    merged.insert(k.clone(), v.clone());
                }
                None => {
                    merged.remove(k);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }

    fn committed_root(&self) -> Result<H256, StateError> {
        Ok(merkle_root_sorted(&self.committed_pairs()?))
    }

    /// Root over committed records plus staged writes.
    pub fn root_hash(&self) -> Result<H256, StateError> {
        Ok(merkle_root_sorted(&self.merged_pairs()?))
    }

    /// Reset to the committed state and check that it hashes to `root`.
    pub fn init_trie(&mut self, root: &H256) -> Result<(), StateError> {
        self.pending.clear();
        let found = self.committed_root()?;
        if found != *root {
            return Err(StateError::RootMismatch {
                expected: *root,
                found,
            });
        }
        Ok(())
    }

    /// Inclusion proof for a committed key, with its value and the committed root.
    pub fn prove_key(
        &self,
        key: &[u8],
    ) -> Result<Option<(Vec<u8>, H256, MerkleProof)>, StateError> {
        let pairs = self.committed_pairs()?;
        let Ok(i) = pairs.binary_search_by(|p| p.0.as_slice().cmp(key)) else {
            return Ok(None);
        };
        let root = merkle_root_sorted(&pairs);
        Ok(merkle_proof_sorted(&pairs, i).map(|p| (pairs[i].1.clone(), root, p)))
    }

    /// Verify a Merkle proof.
    pub fn verify_proof(root: &H256, proof: &MerkleProof) -> bool {
        crate::core::state::merkle::verify_proof(root, proof)
    }
}
