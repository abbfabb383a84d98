use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::engine::penalty::PenaltyStore;
use crate::engine::token::Token;

/// Resampling attempts before a clashing candidate is accepted.
pub const MAX_RESAMPLES: usize = 1024;

/// An ordered, index-addressable pool the selector can draw from.
pub trait TokenPool {
    fn len(&self) -> usize;
    fn get(&self, index: usize) -> Option<&Token>;
    fn remove(&mut self, index: usize) -> Option<Token>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position(&self, token: &Token) -> Option<usize> {
        (0..self.len()).find(|&i| self.get(i) == Some(token))
    }
}

impl TokenPool for VecDeque<Token> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }
    fn get(&self, index: usize) -> Option<&Token> {
        VecDeque::get(self, index)
    }
    fn remove(&mut self, index: usize) -> Option<Token> {
        VecDeque::remove(self, index)
    }
}

impl TokenPool for PenaltyStore {
    fn len(&self) -> usize {
        PenaltyStore::len(self)
    }
    fn get(&self, index: usize) -> Option<&Token> {
        PenaltyStore::get(self, index)
    }
    fn remove(&mut self, index: usize) -> Option<Token> {
        PenaltyStore::remove(self, index)
    }
}

/// Whether `candidate` would trivially continue the text typed so far.
///
/// The candidate's first word is compared with the last two words of `built`.
/// The candidate's last word is compared with the last word of `built` only,
/// not with the first word of the token that ended `built`. Any equal pair is
/// a clash.
pub fn clashes(built: &str, candidate: &str) -> bool {
    let mut tail = built.split_whitespace().rev();
    let last = tail.next();
    let before_last = tail.next();
    if last.is_none() {
        return false;
    }

    let mut words = candidate.split_whitespace();
    let Some(first) = words.next() else {
        return false;
    };
    let final_word = words.next_back().unwrap_or(first);

    Some(first) == last || Some(first) == before_last || Some(final_word) == last
}

/// Picks the next token from `pool` that does not clash with `built`.
///
/// Scans `pool` in order and removes the first non-clashing token. When every
/// pooled token clashes, resamples uniformly from `original` up to
/// [`MAX_RESAMPLES`] times and accepts the last draw even if it still clashes.
/// A resampled token that is also still pending in `pool` is consumed from it,
/// so a pool whose every token clashes still drains.
///
/// Returns `None` only when `pool` is empty.
pub fn select_next<P, R>(pool: &mut P, original: &[Token], built: &str, rng: &mut R) -> Option<Token>
where
    P: TokenPool + ?Sized,
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        return None;
    }

    let found = (0..pool.len()).find(|&i| {
        pool.get(i)
            .is_some_and(|candidate| !clashes(built, candidate.as_str()))
    });
    if let Some(index) = found {
        return pool.remove(index);
    }

    let Some(mut candidate) = original.choose(rng).cloned() else {
        return pool.remove(0);
    };
    let mut attempts = 0;
    while clashes(built, candidate.as_str()) && attempts < MAX_RESAMPLES {
        if let Some(next) = original.choose(rng) {
            candidate = next.clone();
        }
        attempts += 1;
    }
    if attempts >= MAX_RESAMPLES {
        debug!(target: "keychenga::engine", %candidate, built, "clash accepted after resampling");
    }

    if let Some(index) = pool.position(&candidate) {
        pool.remove(index);
    }
    Some(candidate)
}
