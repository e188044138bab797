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

//! Undirected graph used to route swaps through registered pairs.
//!
//! Neighbors keep edge insertion order, so path enumeration is deterministic
//! for a given sequence of `add_edge` calls.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use thiserror::Error;

/// Routing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// No path connects the two nodes.
    #[error("route not found")]
    RouteNotFound,
    /// Source and destination are the same node.
    #[error("source and destination are identical")]
    SameNode,
}

/// Undirected graph.
#[derive(Clone, Debug)]
pub struct Graph<T: Ord + Clone> {
    nodes: Vec<T>,
    edges: BTreeMap<T, Vec<T>>,
}

impl<T: Ord + Clone> Default for Graph<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: BTreeMap::new(),
        }
    }
}

impl<T: Ord + Clone> Graph<T> {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node if absent.
    pub fn add_node(&mut self, node: T) {
        if !self.edges.contains_key(&node) {
            self.edges.insert(node.clone(), Vec::new());
            self.nodes.push(node);
        }
    }

    /// Add an undirected edge, inserting both nodes. Duplicate edges are ignored.
    pub fn add_edge(&mut self, u: T, v: T) {
        self.add_node(u.clone());
        self.add_node(v.clone());
        if let Some(n) = self.edges.get_mut(&u) {
            if !n.contains(&v) {
                n.push(v.clone());
            }
        }
        if let Some(n) = self.edges.get_mut(&v) {
            if !n.contains(&u) {
                n.push(u);
            }
        }
    }

    /// True if `node` is present.
    pub fn contains(&self, node: &T) -> bool {
        self.edges.contains_key(node)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every simple path from `from` to `to`, depth first.
    pub fn find_node_path(&self, from: &T, to: &T) -> Result<Vec<Vec<T>>, GraphError> {
        if from == to {
            return Err(GraphError::SameNode);
        }
        if !self.contains(from) || !self.contains(to) {
            return Err(GraphError::RouteNotFound);
        }
        let mut paths = Vec::new();
        let mut path = vec![from.clone()];
        let mut visited = BTreeSet::new();
        visited.insert(from.clone());
        self.walk(from, to, &mut path, &mut visited, &mut paths);
        if paths.is_empty() {
            return Err(GraphError::RouteNotFound);
        }
        Ok(paths)
    }

    fn walk(
        &self,
        node: &T,
        to: &T,
        path: &mut Vec<T>,
        visited: &mut BTreeSet<T>,
        paths: &mut Vec<Vec<T>>,
    ) {
        let Some(nexts) = self.edges.get(node) else {
            return;
        };
        for next in nexts {
            if next == to {
                let mut found = path.clone();
                found.push(next.clone());
                paths.push(found);
            } else if !visited.contains(next) {
                visited.insert(next.clone());
                path.push(next.clone());
                self.walk(next, to, path, visited, paths);
                path.pop();
                visited.remove(next);
            }
        }
    }

    /// Path with the fewest hops; the first one found wins ties.
    pub fn shortest_path(&self, from: &T, to: &T) -> Result<Vec<T>, GraphError> {
        let paths = self.find_node_path(from, to)?;
        let mut best: Option<Vec<T>> = None;
        for p in paths {
            if best.as_ref().map_or(true, |b| p.len() < b.len()) {
                best = Some(p);
            }
        }
        best.ok_or(GraphError::RouteNotFound)
    }

    /// Breadth-first traversal from `start`, calling `f` once per reachable node.
    pub fn bfs<F: FnMut(&T)>(&self, start: &T, mut f: F) {
        if !self.contains(start) {
            return;
        }
        let mut queue = VecDeque::new();
        let mut visited = BTreeSet::new();
        queue.push_back(start.clone());
        visited.insert(start.clone());
        while let Some(node) = queue.pop_front() {
            if let Some(nexts) = self.edges.get(&node) {
                for next in nexts {
                    if visited.insert(next.clone()) {
                        queue.push_back(next.clone());
                    }
                }
            }
            f(&node);
        }
    }
}
