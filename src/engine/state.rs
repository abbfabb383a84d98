use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::{Config, TimeoutPolicy};
use crate::engine::clash::{TokenPool, select_next};
use crate::engine::penalty::PenaltyStore;
use crate::engine::token::Token;

#[derive(Clone, Debug)]
pub struct Tuning {
    pub question_length_limit: usize,
    pub penalty_capacity: usize,
    /// Chance that the next token is drawn from the penalty store.
    pub penalty_probability: f64,
    /// Chance that the sticky store is used when the penalty store was not.
    pub sticky_probability: f64,
    pub short_token_len: usize,
    pub short_token_weight: usize,
    pub long_token_weight: usize,
    pub timeout_weight: usize,
    pub timeout_policy: TimeoutPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Tuning {
    fn from(config: &Config) -> Self {
        Self {
            question_length_limit: config.question_length_limit,
            penalty_capacity: config.penalty_capacity,
            penalty_probability: config.penalty_probability,
            sticky_probability: config.sticky_probability,
            short_token_len: config.short_token_len,
            short_token_weight: config.short_token_weight,
            long_token_weight: config.long_token_weight,
            timeout_weight: config.timeout_weight,
            timeout_policy: config.timeout_policy,
        }
    }
}

impl Tuning {
    /// Repeat count for a mismatch on `token`; short tokens weigh more.
    pub fn mismatch_weight(&self, token: &Token) -> usize {
        if token.char_len() <= self.short_token_len {
            self.short_token_weight
        } else {
            self.long_token_weight
        }
    }
}

/// Per-session engine state, owned by the session worker.
///
/// `penalties` holds weighted repeats and is drained as tokens are served
/// from it. `sticky` holds one entry per token ever mistyped and is re-filled
/// whenever it serves a token.
pub struct EngineState {
    pub penalties: PenaltyStore,
    pub sticky: PenaltyStore,
    pub tuning: Tuning,
    rng: SmallRng,
}

impl EngineState {
    pub fn new(tuning: Tuning) -> Self {
        Self::with_rng(tuning, SmallRng::from_entropy())
    }

    pub fn seeded(tuning: Tuning, seed: u64) -> Self {
        Self::with_rng(tuning, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(tuning: Tuning, rng: SmallRng) -> Self {
        Self {
            penalties: PenaltyStore::with_capacity(tuning.penalty_capacity),
            sticky: PenaltyStore::with_capacity(tuning.penalty_capacity),
            tuning,
            rng,
        }
    }

    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    pub fn reset(&mut self) {
        self.penalties.clear();
        self.sticky.clear();
    }

    /// Chooses the next token for the line being assembled.
    ///
    /// Returns `None` once `remaining` is exhausted; draws from the penalty
    /// stores do not consume `remaining`.
    pub fn next_token<P>(&mut self, remaining: &mut P, original: &[Token], built: &str) -> Option<Token>
    where
        P: TokenPool + ?Sized,
    {
        if remaining.is_empty() {
            return None;
        }

        let use_penalties = !self.penalties.is_empty()
            && self.rng.gen_bool(self.tuning.penalty_probability.clamp(0.0, 1.0));
        if use_penalties {
            return select_next(&mut self.penalties, original, built, &mut self.rng);
        }

        let use_sticky = !self.sticky.is_empty()
            && self.rng.gen_bool(self.tuning.sticky_probability.clamp(0.0, 1.0));
        if use_sticky {
            let token = select_next(&mut self.sticky, original, built, &mut self.rng)?;
            self.sticky.add(token.clone());
            return Some(token);
        }

        select_next(remaining, original, built, &mut self.rng)
    }

    /// Records a mistyped attempt at `token`.
    pub fn register_mismatch(&mut self, token: &Token) {
        let weight = self.tuning.mismatch_weight(token);
        self.penalties.add_times(token, weight);
        self.sticky.add_once(token);
    }

    /// Records a stalled attempt at `token`. Returns whether a penalty was added.
    pub fn register_timeout(&mut self, token: &Token) -> bool {
        if self.tuning.timeout_policy != TimeoutPolicy::Penalize || self.penalties.contains(token) {
            return false;
        }
        self.penalties.add_times(token, self.tuning.timeout_weight);
        self.sticky.add_once(token);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    fn tokens(items: &[&str]) -> Vec<Token> {
        items.iter().map(|s| Token::new(s)).collect()
    }

    #[test]
    fn test_mismatch_weight_favours_short_tokens() {
        let tuning = Tuning::default();
        assert_eq!(tuning.mismatch_weight(&Token::new("{")), tuning.short_token_weight);
        assert_eq!(tuning.mismatch_weight(&Token::new("F12")), tuning.short_token_weight);
        assert_eq!(tuning.mismatch_weight(&Token::new("Ctrl F5")), tuning.long_token_weight);
        assert!(tuning.short_token_weight > tuning.long_token_weight);
    }

    #[test]
    fn test_register_mismatch_fills_both_stores() {
        let mut state = EngineState::seeded(Tuning::default(), 1);
        let token = Token::new("%");
        state.register_mismatch(&token);
        state.register_mismatch(&token);
        assert_eq!(state.penalties.weight(&token), 2 * state.tuning.short_token_weight);
        assert_eq!(state.sticky.weight(&token), 1);
    }

    #[test]
    fn test_register_timeout_only_once_per_token() {
        let mut state = EngineState::seeded(Tuning::default(), 1);
        let token = Token::new("Escape");
        assert!(state.register_timeout(&token));
        assert!(!state.register_timeout(&token));
        assert_eq!(state.penalties.weight(&token), state.tuning.timeout_weight);
    }

    #[test]
    fn test_register_timeout_respects_wait_policy() {
        let tuning = Tuning {
            timeout_policy: TimeoutPolicy::Wait,
            ..Tuning::default()
        };
        let mut state = EngineState::seeded(tuning, 1);
        assert!(!state.register_timeout(&Token::new("F3")));
        assert!(state.penalties.is_empty());
    }

    #[test]
    fn test_next_token_ends_when_remaining_empty() {
        let mut state = EngineState::seeded(Tuning::default(), 1);
        state.register_mismatch(&Token::new("x"));
        let mut remaining: VecDeque<Token> = VecDeque::new();
        assert_eq!(state.next_token(&mut remaining, &tokens(&["x"]), ""), None);
    }

    #[test]
    fn test_next_token_always_prefers_penalties_at_probability_one() {
        let tuning = Tuning {
            penalty_probability: 1.0,
            ..Tuning::default()
        };
        let mut state = EngineState::seeded(tuning, 9);
        state.penalties.add("F4".into());
        let original = tokens(&["F1", "F2", "F4"]);
        let mut remaining: VecDeque<Token> = tokens(&["F1", "F2"]).into();
        assert_eq!(state.next_token(&mut remaining, &original, ""), Some(Token::new("F4")));
        assert_eq!(remaining.len(), 2);
        assert!(state.penalties.is_empty());
    }

    #[test]
    fn test_next_token_sticky_draw_is_re_added() {
        let tuning = Tuning {
            penalty_probability: 0.0,
            sticky_probability: 1.0,
            ..Tuning::default()
        };
        let mut state = EngineState::seeded(tuning, 9);
        state.sticky.add("$".into());
        let original = tokens(&["$", "#"]);
        let mut remaining: VecDeque<Token> = tokens(&["#"]).into();
        assert_eq!(state.next_token(&mut remaining, &original, ""), Some(Token::new("$")));
        assert_eq!(state.sticky.weight(&Token::new("$")), 1);
        assert_eq!(remaining.len(), 1);
    }

    #[test]
    fn test_reset_clears_penalties() {
        let mut state = EngineState::seeded(Tuning::default(), 1);
        state.register_mismatch(&Token::new("a"));
        state.reset();
        assert!(state.penalties.is_empty());
        assert!(state.sticky.is_empty());
    }
}
