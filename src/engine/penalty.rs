use std::collections::VecDeque;

use crate::engine::token::Token;

pub const DEFAULT_CAPACITY: usize = 1024;

/// Bounded, insertion-ordered multiset of mistyped tokens.
///
/// A token may be present many times; repeated presence is its weight when
/// the selector draws from the store. Adding a token that is not yet present
/// to a full store evicts exactly one entry, the oldest. Adding a token that
/// is already present never evicts, so the store can only exceed capacity
/// through weight for tokens it already holds; `add` trims that back down
/// from the front as well so the capacity bound always holds.
#[derive(Clone, Debug)]
pub struct PenaltyStore {
    entries: VecDeque<Token>,
    capacity: usize,
}

impl Default for PenaltyStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl PenaltyStore {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, token: &Token) -> bool {
        self.entries.contains(token)
    }

    /// Number of occurrences of `token`.
    pub fn weight(&self, token: &Token) -> usize {
        self.entries.iter().filter(|t| *t == token).count()
    }

    pub fn add(&mut self, token: Token) {
        if self.entries.len() >= self.capacity && !self.entries.contains(&token) {
            self.entries.pop_front();
        }
        self.entries.push_back(token);
        // Only reachable when a present token was re-added at capacity.
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn add_times(&mut self, token: &Token, times: usize) {
        for _ in 0..times {
            self.add(token.clone());
        }
    }

    /// Adds `token` once unless it is already present.
    pub fn add_once(&mut self, token: &Token) {
        if !self.contains(token) {
            self.add(token.clone());
        }
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.entries.get(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Token> {
        self.entries.remove(index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.entries.iter()
    }
}
