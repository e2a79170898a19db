//! Join point for asynchronous stage loads.
//!
//! A stage registers every resource it needs before physics may start; loader callbacks
//! signal each one as it resolves. The barrier is ready exactly when all required
//! resources have been signalled, and failed as soon as any of them fails.

use std::{collections::HashSet, fmt::Debug, hash::Hash};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BarrierState<K> {
    /// Waiting on `remaining` resources.
    Pending { remaining: usize },
    Ready,
    Failed { key: K, reason: String },
}

#[derive(Clone, Debug)]
pub struct LoadBarrier<K> {
    pending: HashSet<K>,
    done: HashSet<K>,
    failure: Option<(K, String)>,
}

impl<K> Default for LoadBarrier<K> {
    fn default() -> Self {
        Self {
            pending: HashSet::new(),
            done: HashSet::new(),
            failure: None,
        }
    }
}

impl<K: Clone + Debug + Eq + Hash> LoadBarrier<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a barrier that waits on every key in `keys`.
    pub fn with_required(keys: impl IntoIterator<Item = K>) -> Self {
        let mut barrier = Self::new();
        for key in keys {
            barrier.require(key);
        }
        barrier
    }

    /// Add a resource to wait on. Requiring an already-completed key is a no-op.
    pub fn require(&mut self, key: K) {
        if !self.done.contains(&key) {
            self.pending.insert(key);
        }
    }

    /// Mark `key` as loaded. Returns `true` if this signal completed the barrier.
    ///
    /// Signals for keys that were never required are ignored.
    pub fn signal(&mut self, key: &K) -> bool {
        if self.failure.is_some() {
            return false;
        }
        match self.pending.take(key) {
            Some(key) => {
                self.done.insert(key);
                self.pending.is_empty()
            }
            None => false,
        }
    }

    /// Mark `key` as failed. The first failure wins.
    pub fn fail(&mut self, key: K, reason: impl Into<String>) {
        if self.failure.is_none() {
            self.failure = Some((key, reason.into()));
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains(key)
    }

    /// Keys still outstanding, in no particular order.
    pub fn pending(&self) -> impl Iterator<Item = &K> {
        self.pending.iter()
    }

    pub fn is_ready(&self) -> bool {
        self.failure.is_none() && self.pending.is_empty()
    }

    pub fn state(&self) -> BarrierState<K> {
        if let Some((key, reason)) = &self.failure {
            return BarrierState::Failed {
                key: key.clone(),
                reason: reason.clone(),
            };
        }
        if self.pending.is_empty() {
            BarrierState::Ready
        } else {
            BarrierState::Pending {
                remaining: self.pending.len(),
            }
        }
    }
}
